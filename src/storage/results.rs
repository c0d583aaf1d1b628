//! Per-upload result documents (`{filename}.json`)

use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::{debug, info};

use super::is_safe_name;
use crate::config::AppConfig;
use crate::error::{DermaError, Result};
use crate::types::ClassificationResult;

pub struct ResultStore {
    dir: PathBuf,
}

impl ResultStore {
    pub fn new(config: &AppConfig) -> Self {
        Self::with_dir(&config.feedback_dir)
    }

    pub fn with_dir(dir: &Path) -> Self {
        Self {
            dir: dir.to_path_buf(),
        }
    }

    /// Path of the document for an upload; `None` for unsafe names
    pub fn path_for(&self, filename: &str) -> Option<PathBuf> {
        is_safe_name(filename).then(|| self.dir.join(format!("{}.json", filename)))
    }

    /// Raw JSON for an upload, if a document was written for it
    pub async fn load(&self, filename: &str) -> Result<Option<Vec<u8>>> {
        let Some(path) = self.path_for(filename) else {
            debug!("Rejected result lookup for unsafe name {:?}", filename);
            return Ok(None);
        };

        match fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Write the document for `result.filename`
    pub async fn save(&self, result: &ClassificationResult) -> Result<PathBuf> {
        let path = self.path_for(&result.filename).ok_or_else(|| {
            DermaError::Validation(format!("unsafe result name: {}", result.filename))
        })?;

        fs::create_dir_all(&self.dir).await?;
        let json = serde_json::to_vec_pretty(result)?;
        fs::write(&path, json).await?;

        info!("Persisted result {}", path.display());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enrichment::enrich;
    use crate::types::{Label, Prediction, SubmissionContext};
    use chrono::Local;
    use tempfile::TempDir;

    fn sample(filename: &str) -> ClassificationResult {
        ClassificationResult::new(
            filename.to_string(),
            Prediction {
                label: Label::BenignKeratosis,
                confidence: 64.2,
            },
            SubmissionContext::default(),
            &enrich(Label::BenignKeratosis, None),
            Local::now(),
        )
    }

    #[tokio::test]
    async fn test_missing_result_is_none() {
        let dir = TempDir::new().unwrap();
        let store = ResultStore::with_dir(dir.path());
        assert!(store.load("20240101000000_x.png").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let store = ResultStore::with_dir(&dir.path().join("feedback"));

        let result = sample("20240101000000_x.png");
        let path = store.save(&result).await.unwrap();
        assert!(path.ends_with("20240101000000_x.png.json"));

        let bytes = store.load("20240101000000_x.png").await.unwrap().unwrap();
        let loaded: ClassificationResult = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(loaded, result);
    }

    #[tokio::test]
    async fn test_unsafe_names_never_touch_disk() {
        let dir = TempDir::new().unwrap();
        let store = ResultStore::with_dir(dir.path());

        assert!(store.path_for("../feedbacks.csv").is_none());
        assert!(store.load("../feedbacks.csv").await.unwrap().is_none());
        assert!(store.save(&sample("../escape.png")).await.is_err());
    }
}
