use chrono::NaiveDateTime;
use sqlx::FromRow;

#[derive(Debug, FromRow)]
pub struct User {
    pub id: i64,
    pub cf_handle: String,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, FromRow)]
pub struct Submission {
    pub id: i64,
    pub problem_id: String,
    pub problem_name: Option<String>,
    pub user_elo: Option<i64>,
    pub user_id: i64,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}
