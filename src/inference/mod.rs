//! Inference adapter around a pre-trained lesion classifier
//!
//! The adapter owns a lazily loaded [`ClassifierBackend`]. A startup load
//! failure is tolerated: every request that finds no backend retries the
//! load once, and only that request fails if the retry fails too.
//!
//! Blocking work (model loading, decoding, the forward pass) runs on the
//! Tokio blocking pool.

pub mod onnx;
pub mod preprocess;

pub use onnx::OnnxClassifier;
pub use preprocess::{preprocess, select_prediction};

use std::sync::Arc;

use async_trait::async_trait;
use ndarray::Array4;
use tokio::{sync::Mutex, task};
use tracing::{debug, info, warn};

use crate::config::AppConfig;
use crate::error::{DermaError, Result};
use crate::types::Prediction;

/// A loaded model that maps a preprocessed batch to class probabilities
///
/// Implementations must tolerate calls from several threads; backends that
/// need exclusive access serialize internally.
pub trait ClassifierBackend: Send + Sync {
    /// Run one forward pass and return the raw output vector
    fn predict(&self, input: Array4<f32>) -> Result<Vec<f32>>;

    /// Identifier for logs
    fn name(&self) -> String;
}

/// Produces a backend; called at most once per load attempt
pub type BackendLoader = Arc<dyn Fn() -> Result<Arc<dyn ClassifierBackend>> + Send + Sync>;

/// Image classification service used by the web layer and the CLI
#[async_trait]
pub trait Classifier: Send + Sync {
    /// Classify raw image bytes
    async fn classify(&self, image: &[u8]) -> Result<Prediction>;

    /// Whether a model is currently loaded
    async fn is_ready(&self) -> bool;
}

/// Lazily loading classifier adapter
pub struct InferenceAdapter {
    loader: BackendLoader,
    backend: Mutex<Option<Arc<dyn ClassifierBackend>>>,
    image_size: u32,
}

impl InferenceAdapter {
    /// Create an adapter that loads its backend through `loader` on demand
    pub fn new(image_size: u32, loader: BackendLoader) -> Self {
        Self {
            loader,
            backend: Mutex::new(None),
            image_size,
        }
    }

    /// Adapter for the ONNX model configured in `config.model_path`
    pub fn onnx(config: &AppConfig) -> Self {
        let path = config.model_path.clone();
        let loader: BackendLoader = Arc::new(move || -> Result<Arc<dyn ClassifierBackend>> {
            let model = OnnxClassifier::load(&path)?;
            Ok(Arc::new(model) as Arc<dyn ClassifierBackend>)
        });
        Self::new(config.image_size, loader)
    }

    /// Adapter with an already loaded backend
    pub fn with_backend(image_size: u32, backend: Arc<dyn ClassifierBackend>) -> Self {
        let cached = Arc::clone(&backend);
        Self {
            loader: Arc::new(move || -> Result<Arc<dyn ClassifierBackend>> {
                Ok(Arc::clone(&cached))
            }),
            backend: Mutex::new(Some(backend)),
            image_size,
        }
    }

    /// Eager load attempt for startup
    ///
    /// Failure is returned to the caller for logging; the next request
    /// retries.
    pub async fn warm_up(&self) -> Result<()> {
        self.backend().await.map(|_| ())
    }

    /// Loaded backend, loading it first if necessary
    async fn backend(&self) -> Result<Arc<dyn ClassifierBackend>> {
        let mut slot = self.backend.lock().await;
        if let Some(backend) = slot.as_ref() {
            return Ok(Arc::clone(backend));
        }

        debug!("No classifier loaded, attempting load");
        let loader = Arc::clone(&self.loader);
        let backend = task::spawn_blocking(move || loader())
            .await
            .map_err(|e| DermaError::Other(format!("Task join error: {}", e)))??;

        info!("Classifier ready: {}", backend.name());
        *slot = Some(Arc::clone(&backend));
        Ok(backend)
    }
}

#[async_trait]
impl Classifier for InferenceAdapter {
    async fn classify(&self, image: &[u8]) -> Result<Prediction> {
        let backend = self.backend().await.map_err(|e| {
            warn!("Classifier unavailable: {}", e);
            match e {
                DermaError::ModelLoad(msg) => DermaError::Prediction(msg),
                other => other,
            }
        })?;

        let bytes = image.to_vec();
        let size = self.image_size;

        let scores = task::spawn_blocking(move || {
            let input = preprocess(&bytes, size)?;
            backend.predict(input)
        })
        .await
        .map_err(|e| DermaError::Other(format!("Task join error: {}", e)))??;

        let prediction = select_prediction(&scores)?;
        debug!(
            "Predicted {} at {:.2}%",
            prediction.label, prediction.confidence
        );
        Ok(prediction)
    }

    async fn is_ready(&self) -> bool {
        self.backend.lock().await.is_some()
    }
}
