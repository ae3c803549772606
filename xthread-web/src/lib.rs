//! HTTP surface for posting threads.
//!
//! - `GET /` serves the form page
//! - `GET /static/script.js` serves the page script
//! - `GET /health` reports liveness
//! - `POST /post-thread` posts a thread and returns `{success, log}`

use anyhow::{Context, Result};
use axum::{
    extract::State,
    http::header,
    response::{Html, IntoResponse},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use xthread_lib::poster::NO_TEXT_MESSAGE;
use xthread_lib::{publish_thread, Config, Connector, PostOptions, ThreadReport, XConnector};

const INDEX_HTML: &str = include_str!("../static/index.html");
const SCRIPT_JS: &str = include_str!("../static/script.js");

/// State shared across handlers. Nothing in it changes between requests.
pub struct AppState {
    pub connector: Arc<dyn Connector>,
    pub options: PostOptions,
}

impl AppState {
    pub fn new(connector: Arc<dyn Connector>, options: PostOptions) -> Self {
        Self { connector, options }
    }

    /// State backed by the real X API.
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            Arc::new(XConnector::from_config(config)),
            PostOptions::from_config(config),
        )
    }
}

#[derive(Debug, Deserialize)]
pub struct PostThreadRequest {
    #[serde(default)]
    pub thread_text: Option<String>,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
}

/// Build the HTTP router.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/static/script.js", get(script_handler))
        .route("/health", get(health_handler))
        .route("/post-thread", post(post_thread_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind `addr` and serve until the process is stopped.
///
/// # Errors
///
/// Returns an error if the address cannot be bound or the server fails.
pub async fn run_server(state: Arc<AppState>, addr: &str) -> Result<()> {
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!(addr = %addr, "Thread poster listening");

    axum::serve(listener, app).await.context("HTTP server error")?;

    Ok(())
}

async fn index_handler() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn script_handler() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/javascript; charset=utf-8")],
        SCRIPT_JS,
    )
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

/// Every outcome, including bad input and auth failure, is a 200 with the
/// report body; the log carries the error text.
async fn post_thread_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<PostThreadRequest>,
) -> Json<ThreadReport> {
    let Some(thread_text) = request.thread_text.filter(|t| !t.is_empty()) else {
        warn!("Rejected request without thread text");
        return Json(ThreadReport::failure(NO_TEXT_MESSAGE));
    };

    let report = publish_thread(state.connector.as_ref(), &thread_text, &state.options).await;

    info!(
        success = report.success,
        log_lines = report.log.len(),
        "Thread request finished"
    );

    Json(report)
}
