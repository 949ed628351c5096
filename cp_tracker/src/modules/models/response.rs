use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum ResponseStatus {
    #[serde(rename = "OK")]
    Ok,
    Error,
}

/// One solved problem, merged from the judge's history and the stored rating.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SolvedProblem {
    pub problem_id: String,
    pub contest_id: Option<i64>,
    pub problem_index: String,
    pub problem_name: Option<String>,
    pub verdict: String,
    pub language: String,
    pub user_elo: Option<i64>,
    pub problem_rating: Option<i32>,
    pub problem_tags: Vec<String>,
    pub creation_time_seconds: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FetchSubmissionsResponse {
    pub status: ResponseStatus,
    pub submissions: Vec<SolvedProblem>,
}

impl FetchSubmissionsResponse {
    pub fn ok(submissions: Vec<SolvedProblem>) -> Self {
        Self {
            status: ResponseStatus::Ok,
            submissions,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub status: ResponseStatus,
    pub message: String,
}

impl MessageResponse {
    pub fn ok(message: impl ToString) -> Self {
        Self {
            status: ResponseStatus::Ok,
            message: message.to_string(),
        }
    }

    pub fn error(message: impl ToString) -> Self {
        Self {
            status: ResponseStatus::Error,
            message: message.to_string(),
        }
    }
}
