use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(sqlx::FromRow, Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Classroom {
    pub id: i64,
    pub name: String,
    pub begin_date: NaiveDate,
    pub end_date: NaiveDate,
    pub github_classroom_link: Option<String>,
}

#[derive(sqlx::FromRow, Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Student {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub classroom_id: i64,
}

#[derive(Deserialize, Debug, Clone)]
pub struct ClassroomCreate {
    pub name: String,
    pub begin_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub github_classroom_link: Option<String>,
}

/// Partial update; `None` means "leave as is".
#[derive(Deserialize, Debug, Clone, Default)]
pub struct ClassroomUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub begin_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub github_classroom_link: Option<String>,
}

impl ClassroomUpdate {
    pub fn apply_to(self, classroom: &mut Classroom) {
        if let Some(name) = self.name {
            classroom.name = name;
        }
        if let Some(begin_date) = self.begin_date {
            classroom.begin_date = begin_date;
        }
        if let Some(end_date) = self.end_date {
            classroom.end_date = end_date;
        }
        if let Some(link) = self.github_classroom_link {
            classroom.github_classroom_link = Some(link);
        }
    }
}

/// A student row that has not been inserted yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewStudent {
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub classroom_id: i64,
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq)]
pub struct ImportSummary {
    pub count: u64,
}

#[derive(Deserialize, Debug, Clone, Copy)]
pub struct ListParams {
    #[serde(default)]
    pub skip: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
}

fn default_limit() -> u32 {
    100
}

impl Default for ListParams {
    fn default() -> Self {
        Self {
            skip: 0,
            limit: default_limit(),
        }
    }
}
