use crate::codeforces::model::*;
use async_trait::async_trait;
use reqwest::{self, Client, Url};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

type Result<T> = std::result::Result<T, CodeforcesError>;

#[derive(Debug, Error)]
pub enum CodeforcesError {
    #[error("Error connecting to Codeforces API: {0}")]
    RequestError(#[from] reqwest::Error),
    #[error("invalid Codeforces API url given")]
    InvalidUrlError(#[from] url::ParseError),
    #[error("{0}")]
    ApiError(String),
}

/// Source of a contestant's submission history.
#[async_trait]
pub trait JudgeClient: Send + Sync {
    /// Returns every submission of `handle`, newest first.
    async fn user_status(&self, handle: &str) -> Result<Vec<Submission>>;
}

pub struct CodeforcesClient {
    user_status_url: Url,
    client: Client,
}

impl CodeforcesClient {
    pub fn new(api_url: &str) -> Result<Self> {
        let mut api_url = Url::parse(api_url)?;
        api_url.set_path("");
        let user_status_url = api_url.join("api/user.status")?;

        let client = Client::builder()
            .gzip(true)
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(CodeforcesClient {
            user_status_url,
            client,
        })
    }
}

#[async_trait]
impl JudgeClient for CodeforcesClient {
    async fn user_status(&self, handle: &str) -> Result<Vec<Submission>> {
        tracing::info!("Retrieve submissions of {} from Codeforces", handle);
        let res = self
            .client
            .get(self.user_status_url.clone())
            .query(&[("handle", handle)])
            .send()
            .await?;

        let checked = res.error_for_status_ref().map(|_| ());
        match checked {
            Ok(()) => {
                let body: CodeforcesResponse<Vec<Submission>> = res.json().await?;
                body.into_result().map_err(CodeforcesError::ApiError)
            }
            Err(e) => {
                // Unknown handles come back as 400 with a FAILED envelope.
                let comment = res
                    .json::<CodeforcesResponse<Value>>()
                    .await
                    .ok()
                    .and_then(|body| body.comment);
                match comment {
                    Some(comment) => Err(CodeforcesError::ApiError(comment)),
                    None => Err(CodeforcesError::RequestError(e)),
                }
            }
        }
    }
}
