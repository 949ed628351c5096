use crate::modules::models::response::MessageResponse;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use cp_tracker_libs::CodeforcesError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("{0}")]
    Validation(String),
    #[error("User not found")]
    UserNotFound,
    #[error("Submission not found. Fetch submissions first.")]
    SubmissionNotFound,
    #[error("{0}")]
    Upstream(#[from] CodeforcesError),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl TrackerError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            TrackerError::Validation(_) => StatusCode::BAD_REQUEST,
            TrackerError::UserNotFound | TrackerError::SubmissionNotFound => StatusCode::NOT_FOUND,
            TrackerError::Upstream(_) | TrackerError::Database(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for TrackerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("request failed cause: {:?}", self);
        } else {
            tracing::warn!("request rejected: {}", self);
        }

        (status, Json(MessageResponse::error(self.to_string()))).into_response()
    }
}
