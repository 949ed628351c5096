use serde::{Deserialize, Serialize};
use std::fmt;

pub const DEFAULT_FAILURE_COMMENT: &str = "Failed to fetch data from Codeforces API";

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeforcesResponseStatus {
    #[serde(rename = "OK")]
    Ok,
    #[serde(rename = "FAILED")]
    Failed,
}

/// Envelope wrapping every Codeforces API response.
#[derive(Serialize, Deserialize, Debug)]
pub struct CodeforcesResponse<T> {
    pub status: CodeforcesResponseStatus,
    pub comment: Option<String>,
    pub result: Option<T>,
}

impl<T> CodeforcesResponse<T> {
    /// Unwraps the payload, or returns the judge's comment when the call did not succeed.
    pub fn into_result(self) -> Result<T, String> {
        match (self.status, self.result) {
            (CodeforcesResponseStatus::Ok, Some(result)) => Ok(result),
            _ => Err(self
                .comment
                .unwrap_or_else(|| String::from(DEFAULT_FAILURE_COMMENT))),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Verdict {
    Failed,
    Ok,
    Partial,
    CompilationError,
    RuntimeError,
    WrongAnswer,
    PresentationError,
    TimeLimitExceeded,
    MemoryLimitExceeded,
    IdlenessLimitExceeded,
    SecurityViolated,
    Crashed,
    InputPreparationCrashed,
    Challenged,
    Skipped,
    Testing,
    Rejected,
    #[serde(other)]
    Unknown,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match serde_json::to_value(self) {
            Ok(serde_json::Value::String(name)) => write!(f, "{}", name),
            _ => write!(f, "UNKNOWN"),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Problem {
    #[serde(alias = "contestId")]
    pub contest_id: Option<i64>,
    #[serde(alias = "problemsetName")]
    pub problemset_name: Option<String>,
    pub index: String,
    pub name: Option<String>,
    pub rating: Option<i32>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Problem {
    /// Contest id followed by the problem index, e.g. `1700A`.
    ///
    /// Problems outside of contests (acmsguru and friends) have no contest id and are named
    /// after their problemset instead.
    pub fn identifier(&self) -> String {
        match self.contest_id {
            Some(contest_id) => format!("{}{}", contest_id, self.index),
            None => format!(
                "{}{}",
                self.problemset_name.as_deref().unwrap_or_default(),
                self.index
            ),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Submission {
    pub id: i64,
    #[serde(alias = "contestId")]
    pub contest_id: Option<i64>,
    #[serde(alias = "creationTimeSeconds")]
    pub creation_time_seconds: i64,
    pub problem: Problem,
    #[serde(alias = "programmingLanguage")]
    pub programming_language: String,
    pub verdict: Option<Verdict>,
}

impl Submission {
    pub fn is_accepted(&self) -> bool {
        self.verdict == Some(Verdict::Ok)
    }
}
