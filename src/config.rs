//! Service configuration
//!
//! All paths, limits and the admin secret live in [`AppConfig`], which is
//! loaded once at startup and handed to every component constructor.
//! Sources, lowest precedence first: built-in defaults, an optional TOML
//! file, then `DERMAVISION_*` environment variables.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Prefix for environment variable overrides
pub const ENV_PREFIX: &str = "DERMAVISION_";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Main service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Address the HTTP server binds to
    pub bind_addr: SocketAddr,

    /// Directory holding uploaded images
    pub upload_dir: PathBuf,

    /// Directory holding the feedback CSV and persisted result JSON files
    pub feedback_dir: PathBuf,

    /// Path to the ONNX classifier artifact
    pub model_path: PathBuf,

    /// Square edge length the model expects, in pixels
    pub image_size: u32,

    /// Accepted upload extensions (compared case-insensitively)
    pub allowed_extensions: Vec<String>,

    /// Shared secret for the feedback viewer
    pub admin_password: String,

    /// Number of uploads listed in the recent-activity strip
    pub recent_uploads: usize,

    /// Request body cap for uploads (bytes)
    pub max_upload_bytes: usize,

    /// Write `{filename}.json` next to the feedback CSV after each detection
    pub persist_results: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: ([127, 0, 0, 1], 5000).into(),
            upload_dir: PathBuf::from("uploads"),
            feedback_dir: PathBuf::from("feedback"),
            model_path: PathBuf::from("final_model.onnx"),
            image_size: 224,
            allowed_extensions: vec!["png".to_string(), "jpg".to_string(), "jpeg".to_string()],
            admin_password: "admin123".to_string(),
            recent_uploads: 3,
            max_upload_bytes: 16 * 1024 * 1024, // 16MB
            persist_results: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Resolve the effective configuration: file (if given), then process
    /// environment overrides, then validation.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let base = match path {
            Some(path) => {
                debug!("Loading configuration from {}", path.display());
                let contents = std::fs::read_to_string(path)?;
                toml::from_str(&contents)?
            }
            None => AppConfig::default(),
        };

        let config = base.with_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `DERMAVISION_*` overrides using the given variable lookup
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(&format!("{}{}", ENV_PREFIX, name));

        if let Some(addr) = var("BIND_ADDR") {
            self.bind_addr = addr.parse().map_err(|e| {
                ConfigError::ValidationError(format!("BIND_ADDR '{}': {}", addr, e))
            })?;
        }
        if let Some(dir) = var("UPLOAD_DIR") {
            self.upload_dir = PathBuf::from(dir);
        }
        if let Some(dir) = var("FEEDBACK_DIR") {
            self.feedback_dir = PathBuf::from(dir);
        }
        if let Some(path) = var("MODEL_PATH") {
            self.model_path = PathBuf::from(path);
        }
        if let Some(password) = var("ADMIN_PASSWORD") {
            self.admin_password = password;
        }
        if let Some(flag) = var("PERSIST_RESULTS") {
            self.persist_results = match flag.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" => false,
                other => {
                    return Err(ConfigError::ValidationError(format!(
                        "PERSIST_RESULTS must be a boolean, got '{}'",
                        other
                    )))
                }
            };
        }

        Ok(self)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.image_size == 0 {
            return Err(ConfigError::ValidationError(
                "image_size must be greater than 0".to_string(),
            ));
        }

        if self.allowed_extensions.is_empty()
            || self.allowed_extensions.iter().any(|ext| ext.trim().is_empty())
        {
            return Err(ConfigError::ValidationError(
                "allowed_extensions must list at least one non-empty extension".to_string(),
            ));
        }

        if self.admin_password.is_empty() {
            return Err(ConfigError::ValidationError(
                "admin_password cannot be empty".to_string(),
            ));
        }

        if self.recent_uploads == 0 {
            return Err(ConfigError::ValidationError(
                "recent_uploads must be at least 1".to_string(),
            ));
        }

        if self.max_upload_bytes == 0 {
            return Err(ConfigError::ValidationError(
                "max_upload_bytes must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Render as TOML with the admin secret masked
    pub fn to_redacted_toml(&self) -> Result<String, ConfigError> {
        let mut shown = self.clone();
        shown.admin_password = "********".to_string();
        toml::to_string_pretty(&shown).map_err(|e| ConfigError::ValidationError(e.to_string()))
    }
}
