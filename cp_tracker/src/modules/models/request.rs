use crate::modules::error::TrackerError;
use axum::{
    async_trait,
    body::HttpBody,
    extract::FromRequest,
    http::Request,
    BoxError, Json,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::borrow::Cow;
use validator::{Validate, ValidationError};

#[derive(Debug, Deserialize, Validate)]
pub struct FetchSubmissionsRequest {
    #[serde(rename = "cfHandle", default)]
    #[validate(length(min = 1, max = 80))]
    pub cf_handle: String,
}

/// Rating as sent by the page: a JSON integer, or a string holding one.
#[derive(Debug, Default, Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum EloRating {
    #[default]
    Missing,
    Integer(i64),
    Text(String),
}

impl EloRating {
    pub fn value(&self) -> Option<i64> {
        match self {
            EloRating::Missing => None,
            EloRating::Integer(rating) => Some(*rating),
            EloRating::Text(text) => text.trim().parse::<i64>().ok(),
        }
    }
}

fn validate_elo_rating(rating: &EloRating) -> Result<(), ValidationError> {
    if *rating == EloRating::Missing {
        let mut error = ValidationError::new("required");
        error.message = Some(Cow::from("Missing data"));
        return Err(error);
    }

    match rating.value() {
        Some(_) => Ok(()),
        None => {
            let mut error = ValidationError::new("invalid_elo_rating");
            error.message = Some(Cow::from("Invalid Elo rating"));
            Err(error)
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct RateSubmissionRequest {
    #[serde(rename = "cfHandle", default)]
    #[validate(length(min = 1, max = 80))]
    pub cf_handle: String,
    #[serde(rename = "problemId", default)]
    #[validate(length(min = 1, max = 20))]
    pub problem_id: String,
    #[serde(rename = "eloRating", default)]
    #[validate(custom = "validate_elo_rating")]
    pub elo_rating: EloRating,
}

/// JSON body extractor that runs `validator` rules before the handler sees the value.
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<T, S, B> FromRequest<S, B> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
    B: HttpBody + Send + 'static,
    B::Data: Send,
    B::Error: Into<BoxError>,
{
    type Rejection = TrackerError;

    async fn from_request(req: Request<B>, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| {
                tracing::error!("Parsing error: {}", rejection);
                TrackerError::Validation(format!(
                    "invalid request body: [{}]",
                    rejection.body_text()
                ))
            })?;

        value.validate().map_err(|rejection| {
            tracing::error!("Validation error: {}", rejection);
            TrackerError::Validation(
                format!("Validation error: [{}]", rejection).replace('\n', ", "),
            )
        })?;

        Ok(ValidatedJson(value))
    }
}
