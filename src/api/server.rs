//! HTTP server: shared state, router and listener

use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, State},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tower_http::trace::TraceLayer;
use tracing::info;

use super::{detection, feedback, pages, pages::Pages};
use crate::config::AppConfig;
use crate::error::Result;
use crate::inference::Classifier;
use crate::storage::{FeedbackLedger, ResultStore, UploadStore};

/// State shared by all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub uploads: Arc<UploadStore>,
    pub feedback: Arc<FeedbackLedger>,
    pub results: Arc<ResultStore>,
    pub classifier: Arc<dyn Classifier>,
    pub pages: Arc<Pages>,
}

impl AppState {
    /// Wire every component from one configuration
    pub fn new(config: AppConfig, classifier: Arc<dyn Classifier>) -> Result<Self> {
        Ok(Self {
            uploads: Arc::new(UploadStore::new(&config)),
            feedback: Arc::new(FeedbackLedger::new(&config)),
            results: Arc::new(ResultStore::new(&config)),
            pages: Arc::new(Pages::new()?),
            classifier,
            config: Arc::new(config),
        })
    }

    /// Create the upload and feedback directories
    pub async fn ensure_dirs(&self) -> Result<()> {
        self.uploads.ensure_dir().await?;
        tokio::fs::create_dir_all(&self.config.feedback_dir).await?;
        Ok(())
    }

    pub(super) async fn recent_uploads(&self) -> Result<Vec<String>> {
        self.uploads.list_recent(self.config.recent_uploads).await
    }
}

/// API server
pub struct ApiServer {
    state: AppState,
}

impl ApiServer {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }

    /// Build router
    pub fn router(&self) -> Router {
        build_router(self.state.clone())
    }

    /// Bind the configured address and serve until the process exits
    pub async fn serve(self) -> anyhow::Result<()> {
        let addr = self.state.config.bind_addr;
        let router = self.router();

        let listener = tokio::net::TcpListener::bind(addr).await?;
        info!("DermaVision listening on http://{}", addr);
        axum::serve(listener, router).await?;
        Ok(())
    }
}

/// Build the full route table over `state`
pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        // Pages
        .route("/", get(pages::index))
        .route("/insights", get(pages::insights))
        .route("/about", get(pages::about))
        .route("/static/js/main.js", get(pages::main_js))
        // Detection
        .route(
            "/detection",
            get(detection::detection_form).post(detection::detection_submit),
        )
        .route("/uploads/:filename", get(detection::uploaded_file))
        .route("/download_result/:filename", get(detection::download_result))
        // Feedback
        .route(
            "/contact",
            get(feedback::contact_form).post(feedback::contact_submit),
        )
        .route(
            "/admin_feedback",
            get(feedback::admin_query).post(feedback::admin_form),
        )
        // Health check
        .route("/health", get(health_handler))
        .with_state(state)
        // Middleware
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
}

/// Health check handler
#[derive(Debug, Serialize)]
struct HealthResponse {
    status: String,
    version: String,
    model_loaded: bool,
}

async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        model_loaded: state.classifier.is_ready().await,
    })
}
