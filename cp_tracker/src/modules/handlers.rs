use crate::modules::{
    error::TrackerError,
    models::{
        request::{FetchSubmissionsRequest, RateSubmissionRequest, ValidatedJson},
        response::{FetchSubmissionsResponse, MessageResponse},
    },
    submissions::{rating::RatingUpdater, synchronizer::SubmissionSynchronizer},
};
use axum::{extract::Extension, http::StatusCode, Json};
use cp_tracker_libs::JudgeClient;
use sqlx::{Pool, Sqlite};
use std::sync::Arc;

pub type SharedJudge = Arc<dyn JudgeClient>;

pub async fn fetch_submissions(
    Extension(pool): Extension<Pool<Sqlite>>,
    Extension(judge): Extension<SharedJudge>,
    ValidatedJson(params): ValidatedJson<FetchSubmissionsRequest>,
) -> Result<Json<FetchSubmissionsResponse>, TrackerError> {
    let solved = SubmissionSynchronizer::new(&pool, judge.as_ref())
        .run(&params.cf_handle)
        .await?;

    Ok(Json(FetchSubmissionsResponse::ok(solved)))
}

pub async fn rate_submission(
    Extension(pool): Extension<Pool<Sqlite>>,
    ValidatedJson(params): ValidatedJson<RateSubmissionRequest>,
) -> Result<Json<MessageResponse>, TrackerError> {
    let rating = params
        .elo_rating
        .value()
        .ok_or_else(|| TrackerError::Validation(String::from("Invalid Elo rating")))?;

    RatingUpdater::new(&pool)
        .rate(&params.cf_handle, &params.problem_id, rating)
        .await?;

    Ok(Json(MessageResponse::ok("Rating updated")))
}

pub async fn liveness() -> StatusCode {
    StatusCode::OK
}

pub async fn readiness(Extension(pool): Extension<Pool<Sqlite>>) -> StatusCode {
    match sqlx::query("SELECT 1").execute(&pool).await {
        Ok(_) => StatusCode::OK,
        Err(e) => {
            tracing::error!("database is not available: {:?}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}
