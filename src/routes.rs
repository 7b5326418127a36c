use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};

use crate::{
    crud,
    db::Db,
    error::AppError,
    models::*,
    roster::MembershipResult,
};

pub fn router(db: Db) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/classrooms", get(list_classrooms).post(create_classroom))
        .route(
            "/classrooms/:classroom_id",
            get(get_classroom).put(update_classroom).delete(delete_classroom),
        )
        .route("/classrooms/:classroom_id/students", get(list_students))
        .route("/classrooms/:classroom_id/students/:student_id", get(get_student))
        .route(
            "/classrooms/:classroom_id/import/students-from-bb",
            post(import_students_bb),
        )
        .with_state(db)
}

async fn index() -> Json<Value> {
    Json(json!({ "msg": "hello world" }))
}

async fn create_classroom(
    State(db): State<Db>,
    Json(req): Json<ClassroomCreate>,
) -> Result<(StatusCode, Json<Classroom>), AppError> {
    let classroom = crud::create_classroom(&db, req).await?;
    Ok((StatusCode::CREATED, Json(classroom)))
}

async fn list_classrooms(
    State(db): State<Db>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<Classroom>>, AppError> {
    Ok(Json(crud::get_classrooms(&db, params).await?))
}

async fn get_classroom(
    State(db): State<Db>,
    Path(classroom_id): Path<i64>,
) -> Result<Json<Classroom>, AppError> {
    Ok(Json(crud::get_classroom(&db, classroom_id).await?))
}

async fn update_classroom(
    State(db): State<Db>,
    Path(classroom_id): Path<i64>,
    Json(patch): Json<ClassroomUpdate>,
) -> Result<Json<Classroom>, AppError> {
    Ok(Json(crud::update_classroom(&db, classroom_id, patch).await?))
}

async fn delete_classroom(
    State(db): State<Db>,
    Path(classroom_id): Path<i64>,
) -> Result<Json<Value>, AppError> {
    crud::delete_classroom(&db, classroom_id).await?;
    Ok(Json(json!({ "ok": true })))
}

async fn list_students(
    State(db): State<Db>,
    Path(classroom_id): Path<i64>,
) -> Result<Json<Vec<Student>>, AppError> {
    Ok(Json(crud::get_students(&db, classroom_id).await?))
}

async fn get_student(
    State(db): State<Db>,
    Path((classroom_id, student_id)): Path<(i64, i64)>,
) -> Result<Json<Student>, AppError> {
    Ok(Json(crud::get_student(&db, classroom_id, student_id).await?))
}

async fn import_students_bb(
    State(db): State<Db>,
    Path(classroom_id): Path<i64>,
    Json(import): Json<MembershipResult>,
) -> Result<Json<ImportSummary>, AppError> {
    Ok(Json(crud::import_students_bb(&db, classroom_id, &import).await?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request},
    };
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;

    // Never connects: every request below is answered before a query runs.
    fn app() -> Router {
        let db = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/classroom_api_unused")
            .unwrap();
        router(db)
    }

    fn json_request(method: &str, uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_owned()))
            .unwrap()
    }

    #[tokio::test]
    async fn index_says_hello() {
        let resp = app()
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let value: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value, json!({ "msg": "hello world" }));
    }

    #[tokio::test]
    async fn create_with_missing_fields_is_rejected() {
        let resp = app()
            .oneshot(json_request("POST", "/classrooms", r#"{"name": "CS3560"}"#))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn create_with_bad_date_is_rejected() {
        let body = r#"{"name": "CS3560", "begin_date": "Jan 1", "end_date": "2023-05-05"}"#;
        let resp = app()
            .oneshot(json_request("POST", "/classrooms", body))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn create_without_json_content_type_is_rejected() {
        let req = Request::post("/classrooms")
            .body(Body::from(r#"{"name": "CS3560"}"#))
            .unwrap();
        let resp = app().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    }

    #[tokio::test]
    async fn import_with_malformed_roster_is_rejected() {
        let resp = app()
            .oneshot(json_request(
                "POST",
                "/classrooms/1/import/students-from-bb",
                r#"{"results": [{"courseRoleId": "Student"}]}"#,
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn non_numeric_id_is_rejected() {
        let resp = app()
            .oneshot(Request::get("/classrooms/abc").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn negative_skip_is_rejected() {
        let resp = app()
            .oneshot(Request::get("/classrooms?skip=-1").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
