//! Create, read, update and delete operations over classrooms and students.
//!
//! Every mutation commits before returning; nothing spans more than one call.

use sqlx::{Postgres, QueryBuilder};

use crate::{
    db::Db,
    error::AppError,
    models::*,
    roster::{self, MembershipResult},
};

const CLASSROOM_COLUMNS: &str = "id, name, begin_date, end_date, github_classroom_link";
const STUDENT_COLUMNS: &str = "id, first_name, last_name, username, classroom_id";

/// Postgres caps a statement at `u16::MAX` bind parameters; each student row binds 4.
const STUDENT_INSERT_CHUNK: usize = u16::MAX as usize / 4;

pub async fn create_classroom(db: &Db, new: ClassroomCreate) -> Result<Classroom, AppError> {
    let classroom = sqlx::query_as::<_, Classroom>(&format!(
        "INSERT INTO classrooms (name, begin_date, end_date, github_classroom_link)
         VALUES ($1, $2, $3, $4)
         RETURNING {CLASSROOM_COLUMNS}"
    ))
    .bind(new.name)
    .bind(new.begin_date)
    .bind(new.end_date)
    .bind(new.github_classroom_link)
    .fetch_one(db)
    .await?;

    tracing::info!(classroom_id = classroom.id, "classroom created");
    Ok(classroom)
}

pub async fn get_classrooms(db: &Db, params: ListParams) -> Result<Vec<Classroom>, AppError> {
    let rows = sqlx::query_as::<_, Classroom>(&format!(
        "SELECT {CLASSROOM_COLUMNS} FROM classrooms ORDER BY id OFFSET $1 LIMIT $2"
    ))
    .bind(i64::from(params.skip))
    .bind(i64::from(params.limit))
    .fetch_all(db)
    .await?;
    Ok(rows)
}

pub async fn get_classroom(db: &Db, classroom_id: i64) -> Result<Classroom, AppError> {
    sqlx::query_as::<_, Classroom>(&format!(
        "SELECT {CLASSROOM_COLUMNS} FROM classrooms WHERE id = $1"
    ))
    .bind(classroom_id)
    .fetch_optional(db)
    .await?
    .ok_or_else(|| AppError::classroom_not_found(classroom_id))
}

pub async fn update_classroom(
    db: &Db,
    classroom_id: i64,
    patch: ClassroomUpdate,
) -> Result<Classroom, AppError> {
    let mut tx = db.begin().await?;

    let mut classroom = sqlx::query_as::<_, Classroom>(&format!(
        "SELECT {CLASSROOM_COLUMNS} FROM classrooms WHERE id = $1 FOR UPDATE"
    ))
    .bind(classroom_id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or_else(|| AppError::classroom_not_found(classroom_id))?;

    patch.apply_to(&mut classroom);

    sqlx::query(
        "UPDATE classrooms
         SET name = $2, begin_date = $3, end_date = $4, github_classroom_link = $5
         WHERE id = $1",
    )
    .bind(classroom.id)
    .bind(&classroom.name)
    .bind(classroom.begin_date)
    .bind(classroom.end_date)
    .bind(&classroom.github_classroom_link)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    tracing::info!(classroom_id, "classroom updated");
    Ok(classroom)
}

/// Students go with their classroom (`ON DELETE CASCADE`).
pub async fn delete_classroom(db: &Db, classroom_id: i64) -> Result<(), AppError> {
    let res = sqlx::query("DELETE FROM classrooms WHERE id = $1")
        .bind(classroom_id)
        .execute(db)
        .await?;
    if res.rows_affected() == 0 {
        return Err(AppError::classroom_not_found(classroom_id));
    }
    tracing::info!(classroom_id, "classroom deleted");
    Ok(())
}

/// Empty for a classroom that does not exist.
pub async fn get_students(db: &Db, classroom_id: i64) -> Result<Vec<Student>, AppError> {
    let rows = sqlx::query_as::<_, Student>(&format!(
        "SELECT {STUDENT_COLUMNS} FROM students WHERE classroom_id = $1 ORDER BY id"
    ))
    .bind(classroom_id)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

pub async fn get_student(db: &Db, classroom_id: i64, student_id: i64) -> Result<Student, AppError> {
    sqlx::query_as::<_, Student>(&format!(
        "SELECT {STUDENT_COLUMNS} FROM students WHERE id = $1 AND classroom_id = $2"
    ))
    .bind(student_id)
    .bind(classroom_id)
    .fetch_optional(db)
    .await?
    .ok_or_else(|| AppError::student_not_found(classroom_id, student_id))
}

pub async fn import_students_bb(
    db: &Db,
    classroom_id: i64,
    import: &MembershipResult,
) -> Result<ImportSummary, AppError> {
    let mut tx = db.begin().await?;

    // Lock the classroom so a concurrent delete cannot race the insert.
    let exists: Option<i64> =
        sqlx::query_scalar("SELECT id FROM classrooms WHERE id = $1 FOR SHARE")
            .bind(classroom_id)
            .fetch_optional(&mut *tx)
            .await?;
    if exists.is_none() {
        return Err(AppError::classroom_not_found(classroom_id));
    }

    let students = roster::students_from_roster(classroom_id, import);
    let skipped = import.results.len() - students.len();
    if students.is_empty() {
        tracing::info!(classroom_id, skipped, "roster import had no students");
        return Ok(ImportSummary { count: 0 });
    }

    let mut count = 0;
    for chunk in students.chunks(STUDENT_INSERT_CHUNK) {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(
            "INSERT INTO students (first_name, last_name, username, classroom_id) ",
        );
        qb.push_values(chunk, |mut row, s| {
            row.push_bind(&s.first_name)
                .push_bind(&s.last_name)
                .push_bind(&s.username)
                .push_bind(s.classroom_id);
        });
        count += qb.build().execute(&mut *tx).await?.rows_affected();
    }

    tx.commit().await?;
    tracing::info!(classroom_id, count, skipped, "roster imported");
    Ok(ImportSummary { count })
}
