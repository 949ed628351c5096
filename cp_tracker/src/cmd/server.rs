use crate::{
    cmd::open_database,
    modules::handlers::{fetch_submissions, liveness, rate_submission, readiness, SharedJudge},
};
use anyhow::{Context, Result};
use axum::{extract::Extension, routing, Router, Server};
use clap::Args;
use cp_tracker_libs::{CodeforcesClient, JudgeClient};
use sqlx::{Pool, Sqlite};
use std::{
    env,
    net::SocketAddr,
    path::{Path, PathBuf},
    sync::Arc,
};
use tower_http::{
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};

#[derive(Debug, Args)]
pub struct ServerArgs {
    #[arg(long)]
    port: Option<u16>,
    #[arg(long)]
    assets_dir: Option<PathBuf>,
}

pub async fn run(args: ServerArgs) -> Result<()> {
    let api_url = env::var("CODEFORCES_API_URL").unwrap_or_else(|_| {
        tracing::warn!("CODEFORCES_API_URL environment variable is not set. Default value `https://codeforces.com` will be used.");
        String::from("https://codeforces.com")
    });
    let assets_dir = match args.assets_dir {
        Some(assets_dir) => assets_dir,
        None => PathBuf::from(env::var("ASSETS_DIR").unwrap_or_else(|_| {
            tracing::warn!("ASSETS_DIR environment variable is not set. Default value `assets` will be used.");
            String::from("assets")
        })),
    };

    let judge = CodeforcesClient::new(&api_url).with_context(|| {
        let message = "couldn't create Codeforces API client. check the value of CODEFORCES_API_URL environment variable.";
        tracing::error!(message);
        message
    })?;

    let pool = open_database().await?;

    let app = create_router(pool.clone(), judge, &assets_dir);
    let port = match args.port {
        Some(port) => port,
        None => {
            tracing::warn!("API server will be launched at default port number 5000");
            5000u16
        }
    };
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Server start at port {}", port);
    let served = Server::bind(&addr)
        .serve(app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server stopped unexpectedly.");

    pool.close().await;
    tracing::info!("Database connections closed.");

    served
}

pub fn create_router(
    pool: Pool<Sqlite>,
    judge: impl JudgeClient + 'static,
    assets_dir: &Path,
) -> Router {
    let judge: SharedJudge = Arc::new(judge);

    Router::new()
        .route(
            "/",
            routing::get_service(ServeFile::new(assets_dir.join("index.html"))),
        )
        .nest_service("/static", ServeDir::new(assets_dir.join("static")))
        .route("/fetch_submissions", routing::post(fetch_submissions))
        .route("/rate_submission", routing::post(rate_submission))
        .route("/api/liveness", routing::get(liveness))
        .route("/api/readiness", routing::get(readiness))
        .layer(Extension(pool))
        .layer(Extension(judge))
        .layer(TraceLayer::new_for_http())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {:?}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install signal handler: {:?}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown.");
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::modules::{
        database::memory_pool,
        models::response::{FetchSubmissionsResponse, MessageResponse, ResponseStatus},
        submissions::{reconciler::test::submission, synchronizer::test::StubJudge},
    };
    use axum::{
        body::Body,
        http::{header::CONTENT_TYPE, Method, Request, StatusCode},
    };
    use serde::de::DeserializeOwned;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn assets() -> PathBuf {
        PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/assets"))
    }

    fn tourist() -> StubJudge {
        StubJudge::with(vec![
            submission(5, "1857B", "OK", 500),
            submission(4, "4A", "OK", 400),
            submission(3, "1A", "WRONG_ANSWER", 300),
            submission(2, "4A", "OK", 200),
            submission(1, "4A", "WRONG_ANSWER", 100),
        ])
    }

    async fn app_with(judge: StubJudge) -> (Router, Pool<Sqlite>) {
        let pool = memory_pool().await;
        (create_router(pool.clone(), judge, &assets()), pool)
    }

    async fn post<T: DeserializeOwned>(app: &Router, uri: &str, body: Value) -> (StatusCode, T) {
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri(uri)
                    .header(CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = hyper::body::to_bytes(response.into_body()).await.unwrap();

        (status, serde_json::from_slice(&bytes).unwrap())
    }

    async fn get(app: &Router, uri: &str) -> StatusCode {
        app.clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
            .status()
    }

    #[tokio::test]
    async fn test_index_page() {
        let (app, _) = app_with(tourist()).await;

        assert_eq!(get(&app, "/").await, StatusCode::OK);
        assert_eq!(get(&app, "/static/js/main.js").await, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_index_page_controls() {
        let (app, _) = app_with(tourist()).await;

        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let bytes = hyper::body::to_bytes(response.into_body()).await.unwrap();
        let page = String::from_utf8(bytes.to_vec()).unwrap();

        for id in ["cf-handle", "language-filter", "sort-order", "next-page"] {
            assert!(page.contains(&format!(r#"id="{}""#, id)), "missing #{}", id);
        }
    }

    #[tokio::test]
    async fn test_health() {
        let (app, _) = app_with(tourist()).await;

        assert_eq!(get(&app, "/api/liveness").await, StatusCode::OK);
        assert_eq!(get(&app, "/api/readiness").await, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_fetch_twice_is_stable() {
        let (app, _) = app_with(tourist()).await;

        let (status, first): (_, FetchSubmissionsResponse) =
            post(&app, "/fetch_submissions", json!({"cfHandle": "tourist"})).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(first.status, ResponseStatus::Ok);

        let (_, second): (_, FetchSubmissionsResponse) =
            post(&app, "/fetch_submissions", json!({"cfHandle": "tourist"})).await;

        assert_eq!(first.submissions, second.submissions);
        assert!(second.submissions.iter().all(|s| s.user_elo.is_none()));
    }

    #[tokio::test]
    async fn test_fetch_response_shape() {
        let (app, _) = app_with(tourist()).await;

        let (_, body): (_, Value) =
            post(&app, "/fetch_submissions", json!({"cfHandle": "tourist"})).await;

        assert_eq!(body["status"], "OK");
        let submissions = body["submissions"].as_array().unwrap();
        assert_eq!(submissions.len(), 2);
        assert_eq!(submissions[0]["problem_id"], "4A");
        assert_eq!(submissions[0]["contest_id"], 4);
        assert_eq!(submissions[0]["problem_index"], "A");
        assert_eq!(submissions[0]["problem_name"], "Problem 4A");
        assert_eq!(submissions[0]["verdict"], "OK");
        assert_eq!(submissions[0]["language"], "Rust 2021");
        assert_eq!(submissions[0]["user_elo"], Value::Null);
        assert_eq!(submissions[0]["creation_time_seconds"], 200);
        assert_eq!(submissions[0]["problem_rating"], 800);
        assert_eq!(submissions[0]["problem_tags"], json!(["implementation"]));
        assert_eq!(submissions[1]["problem_id"], "1857B");
    }

    #[tokio::test]
    async fn test_rating_survives_refetch() {
        let (app, _) = app_with(tourist()).await;
        let _: (_, Value) = post(&app, "/fetch_submissions", json!({"cfHandle": "tourist"})).await;

        let (status, body): (_, MessageResponse) = post(
            &app,
            "/rate_submission",
            json!({"cfHandle": "tourist", "problemId": "4A", "eloRating": "1200"}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.status, ResponseStatus::Ok);
        assert_eq!(body.message, "Rating updated");

        let (_, refetched): (_, FetchSubmissionsResponse) =
            post(&app, "/fetch_submissions", json!({"cfHandle": "tourist"})).await;
        let ratings: Vec<(&str, Option<i64>)> = refetched
            .submissions
            .iter()
            .map(|s| (s.problem_id.as_str(), s.user_elo))
            .collect();
        assert_eq!(ratings, vec![("4A", Some(1200)), ("1857B", None)]);
    }

    #[tokio::test]
    async fn test_fetch_without_handle() {
        let (app, pool) = app_with(tourist()).await;

        let (status, body): (_, MessageResponse) =
            post(&app, "/fetch_submissions", json!({"cfHandle": ""})).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.status, ResponseStatus::Error);
        let users: i64 = sqlx::query_scalar(r#"SELECT COUNT(*) FROM "users""#)
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(users, 0);
    }

    #[tokio::test]
    async fn test_too_long_inputs() {
        let (app, pool) = app_with(tourist()).await;
        let handle = "a".repeat(81);

        let (status, _): (_, MessageResponse) =
            post(&app, "/fetch_submissions", json!({"cfHandle": handle})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let _: (_, Value) = post(&app, "/fetch_submissions", json!({"cfHandle": "tourist"})).await;
        let (status, body): (_, MessageResponse) = post(
            &app,
            "/rate_submission",
            json!({"cfHandle": "tourist", "problemId": "4".repeat(21), "eloRating": 1200}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.status, ResponseStatus::Error);

        let users: Vec<String> = sqlx::query_scalar(r#"SELECT "cf_handle" FROM "users""#)
            .fetch_all(&pool)
            .await
            .unwrap();
        assert_eq!(users, vec![String::from("tourist")]);
    }

    #[tokio::test]
    async fn test_fetch_upstream_failure() {
        let (app, pool) = app_with(StubJudge::failing()).await;

        let (status, body): (_, MessageResponse) =
            post(&app, "/fetch_submissions", json!({"cfHandle": "ghost"})).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.status, ResponseStatus::Error);
        assert_eq!(body.message, "handle: User with handle ghost not found");
        let users: i64 = sqlx::query_scalar(r#"SELECT COUNT(*) FROM "users""#)
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(users, 0);
    }

    #[tokio::test]
    async fn test_rate_with_invalid_rating() {
        let (app, _) = app_with(tourist()).await;
        let _: (_, Value) = post(&app, "/fetch_submissions", json!({"cfHandle": "tourist"})).await;

        let (status, body): (_, MessageResponse) = post(
            &app,
            "/rate_submission",
            json!({"cfHandle": "tourist", "problemId": "4A", "eloRating": "abc"}),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.status, ResponseStatus::Error);
    }

    #[tokio::test]
    async fn test_rate_with_missing_data() {
        let (app, _) = app_with(tourist()).await;

        let (status, _): (_, MessageResponse) = post(
            &app,
            "/rate_submission",
            json!({"cfHandle": "tourist", "problemId": "4A"}),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_rate_before_fetch() {
        let (app, _) = app_with(tourist()).await;

        let (status, body): (_, MessageResponse) = post(
            &app,
            "/rate_submission",
            json!({"cfHandle": "tourist", "problemId": "4A", "eloRating": 1200}),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body.message, "User not found");

        let _: (_, Value) = post(&app, "/fetch_submissions", json!({"cfHandle": "tourist"})).await;
        let (status, body): (_, MessageResponse) = post(
            &app,
            "/rate_submission",
            json!({"cfHandle": "tourist", "problemId": "1A", "eloRating": 1200}),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body.message, "Submission not found. Fetch submissions first.");
    }

    #[tokio::test]
    async fn test_rate_is_idempotent() {
        let (app, pool) = app_with(tourist()).await;
        let _: (_, Value) = post(&app, "/fetch_submissions", json!({"cfHandle": "tourist"})).await;
        let body = json!({"cfHandle": "tourist", "problemId": "4A", "eloRating": 1700});

        let (first, _): (_, MessageResponse) = post(&app, "/rate_submission", body.clone()).await;
        let (second, _): (_, MessageResponse) = post(&app, "/rate_submission", body).await;

        assert_eq!(first, StatusCode::OK);
        assert_eq!(second, StatusCode::OK);
        let ratings: Vec<(String, Option<i64>)> = sqlx::query_as(
            r#"SELECT "problem_id", "user_elo" FROM "submissions" ORDER BY "problem_id""#,
        )
        .fetch_all(&pool)
        .await
        .unwrap();
        assert_eq!(
            ratings,
            vec![
                (String::from("1857B"), None),
                (String::from("4A"), Some(1700))
            ]
        );
    }
}
