//! Web presentation layer
//!
//! Provides:
//! - Home, insights and developer pages
//! - Image detection with advisory enrichment
//! - Stored upload and result-document downloads
//! - Contact form and the feedback viewer
//! - Health check

pub mod detection;
pub mod feedback;
pub mod pages;
pub mod server;

pub use pages::{Notice, Pages};
pub use server::{build_router, ApiServer, AppState};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

use crate::error::DermaError;

impl IntoResponse for DermaError {
    fn into_response(self) -> Response {
        match self {
            DermaError::NotFound(what) => {
                (StatusCode::NOT_FOUND, Json(json!({ "error": format!("{} not found", what) })))
                    .into_response()
            }
            DermaError::Validation(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg).into_response(),
            other => {
                error!("Request failed: {}", other);
                (StatusCode::INTERNAL_SERVER_ERROR, other.to_string()).into_response()
            }
        }
    }
}
