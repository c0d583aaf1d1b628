//! ONNX Runtime classifier backend
//!
//! Loads an exported classifier (`[1, H, W, 3]` f32 input, 4-way softmax
//! output) through the `ort` crate. `Session::run` needs exclusive access,
//! so the session sits behind a mutex and forward passes are serialized.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use ndarray::Array4;
use ort::{inputs, session::Session, value::Tensor};
use tracing::{debug, info};

use super::ClassifierBackend;
use crate::error::{DermaError, Result};

/// Classifier backed by an ONNX Runtime session
pub struct OnnxClassifier {
    session: Mutex<Session>,
    path: PathBuf,
}

impl OnnxClassifier {
    /// Load the model artifact at `path`
    ///
    /// Blocking: reads the file and builds the runtime session.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(DermaError::ModelLoad(format!(
                "model file not found: {}",
                path.display()
            )));
        }

        info!("Loading classifier model from {}", path.display());

        let session = Session::builder()
            .and_then(|builder| builder.commit_from_file(path))
            .map_err(|e| {
                DermaError::ModelLoad(format!("failed to load {}: {}", path.display(), e))
            })?;

        debug!(
            "Model inputs: {:?}, outputs: {:?}",
            session.inputs.iter().map(|i| i.name.as_str()).collect::<Vec<_>>(),
            session.outputs.iter().map(|o| o.name.as_str()).collect::<Vec<_>>()
        );

        Ok(Self {
            session: Mutex::new(session),
            path: path.to_path_buf(),
        })
    }
}

impl ClassifierBackend for OnnxClassifier {
    fn predict(&self, input: Array4<f32>) -> Result<Vec<f32>> {
        let tensor = Tensor::from_array(input)
            .map_err(|e| DermaError::Prediction(format!("invalid input tensor: {}", e)))?;

        let mut session = self
            .session
            .lock()
            .map_err(|e| DermaError::Prediction(format!("Mutex lock failed: {}", e)))?;

        let outputs = session
            .run(inputs![tensor])
            .map_err(|e| DermaError::Prediction(format!("inference failed: {}", e)))?;

        let (_, output) = outputs
            .iter()
            .next()
            .ok_or_else(|| DermaError::Prediction("model produced no outputs".to_string()))?;

        let scores: Vec<f32> = output
            .try_extract_array::<f32>()
            .map_err(|e| DermaError::Prediction(format!("unreadable model output: {}", e)))?
            .iter()
            .copied()
            .collect();

        Ok(scores)
    }

    fn name(&self) -> String {
        format!("onnx:{}", self.path.display())
    }
}
