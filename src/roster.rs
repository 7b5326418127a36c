//! Blackboard course-membership export and its mapping onto student rows.
//!
//! Only `courseRoleId`, `user.name.{given,family}` and `user.userName` are
//! read; the rest of each membership record is ignored.

use serde::Deserialize;

use crate::models::NewStudent;

#[derive(Deserialize, Debug, Clone)]
pub struct MembershipResult {
    pub results: Vec<Membership>,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Membership {
    pub course_role_id: String,
    pub user: RosterUser,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct RosterUser {
    pub name: RosterName,
    pub user_name: String,
}

#[derive(Deserialize, Debug, Clone)]
pub struct RosterName {
    pub given: String,
    pub family: String,
}

/// Course roles that never become student rows.
pub fn is_staff_role(role: &str) -> bool {
    matches!(role, "Instructor" | "TeachingAssistant")
}

/// Drops staff memberships and projects the rest onto `classroom_id`, keeping payload order.
pub fn students_from_roster(classroom_id: i64, roster: &MembershipResult) -> Vec<NewStudent> {
    roster
        .results
        .iter()
        .filter(|m| !is_staff_role(&m.course_role_id))
        .map(|m| NewStudent {
            first_name: m.user.name.given.clone(),
            last_name: m.user.name.family.clone(),
            username: m.user.user_name.clone(),
            classroom_id,
        })
        .collect()
}
