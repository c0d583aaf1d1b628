//! DermaVision - Skin-Lesion Classification Demo
//!
//! A small web service that classifies an uploaded skin-lesion photo into
//! one of four categories with a pre-trained ONNX model and explains the
//! result:
//! - Upload validation and timestamped storage
//! - Lazily loaded, shared inference adapter
//! - Deterministic advisory enrichment (description, guidelines, urgency, age note)
//! - Append-only feedback ledger with a password-gated viewer
//!
//! # Architecture
//!
//! - **Types**: labels, predictions, results, feedback entries
//! - **Enrichment**: label + age to advisory text
//! - **Inference**: preprocessing and the model backend
//! - **Storage**: uploads, feedback CSV, result documents
//! - **API**: axum routes and HTML pages
//!
//! # Example
//!
//! ```ignore
//! use dermavision_core::{AppConfig, AppState, ApiServer, InferenceAdapter};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = AppConfig::load(None)?;
//!     let classifier = Arc::new(InferenceAdapter::onnx(&config));
//!     let state = AppState::new(config, classifier)?;
//!     ApiServer::new(state).serve().await
//! }
//! ```

pub mod analysis;
pub mod api;
pub mod config;
pub mod enrichment;
pub mod error;
pub mod inference;
pub mod storage;
pub mod types;

// Re-export commonly used types
pub use analysis::analyze;
pub use api::{ApiServer, AppState};
pub use config::AppConfig;
pub use enrichment::{enrich, Advisory, AgeBand};
pub use error::{DermaError, Result};
pub use inference::{Classifier, ClassifierBackend, InferenceAdapter, OnnxClassifier};
pub use storage::{FeedbackLedger, ResultStore, UploadStore};
pub use types::{ClassificationResult, FeedbackEntry, Label, Prediction, SubmissionContext};
