//! Upload directory for submitted images

use std::cmp::Reverse;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{DateTime, Local};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use super::{is_safe_name, secure_filename};
use crate::config::AppConfig;
use crate::error::{DermaError, Result};

/// Shown when the form carried no `image` part
pub const MISSING_FILE_MESSAGE: &str = "Please upload an image.";

/// Shown when the `image` part had an empty filename
pub const EMPTY_FILENAME_MESSAGE: &str = "Please choose a file.";

/// Upper bound on suffixed names tried for one upload
const MAX_NAME_ATTEMPTS: u32 = 1000;

/// A persisted upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredUpload {
    /// Name under the upload directory
    pub filename: String,
    pub path: PathBuf,
}

/// Directory of user-submitted images
pub struct UploadStore {
    dir: PathBuf,
    allowed_extensions: Vec<String>,
}

impl UploadStore {
    pub fn new(config: &AppConfig) -> Self {
        Self::with_dir(&config.upload_dir, &config.allowed_extensions)
    }

    pub fn with_dir(dir: &Path, allowed_extensions: &[String]) -> Self {
        Self {
            dir: dir.to_path_buf(),
            allowed_extensions: allowed_extensions
                .iter()
                .map(|ext| ext.trim().to_ascii_lowercase())
                .collect(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Create the upload directory if missing
    pub async fn ensure_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.dir).await?;
        Ok(())
    }

    /// Message listing the accepted extensions
    pub fn extension_message(&self) -> String {
        format!("Allowed: {}", self.allowed_extensions.join(", "))
    }

    /// Check a client filename against the empty-name and extension rules
    pub fn validate_filename(&self, original: &str) -> Result<()> {
        if original.is_empty() {
            return Err(DermaError::Validation(EMPTY_FILENAME_MESSAGE.to_string()));
        }

        let allowed = original
            .rsplit_once('.')
            .map(|(_, ext)| self.allowed_extensions.contains(&ext.to_ascii_lowercase()))
            .unwrap_or(false);

        if !allowed {
            return Err(DermaError::Validation(self.extension_message()));
        }

        Ok(())
    }

    /// Storage name for an upload received at `received_at`
    pub fn stored_name(original: &str, received_at: DateTime<Local>) -> String {
        secure_filename(&format!(
            "{}_{}",
            received_at.format("%Y%m%d%H%M%S"),
            original
        ))
    }

    /// Validate and persist an upload
    ///
    /// The file is created exclusively; a taken name gets a `_1`, `_2`, ...
    /// suffix before the extension.
    pub async fn save(&self, original: &str, bytes: &[u8]) -> Result<StoredUpload> {
        self.validate_filename(original)?;
        self.ensure_dir().await?;

        let base = Self::stored_name(original, Local::now());
        for attempt in 0..MAX_NAME_ATTEMPTS {
            let filename = with_counter(&base, attempt);
            let path = self.dir.join(&filename);

            let mut file = match fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(file) => file,
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                    debug!("Upload name {} taken, trying next", filename);
                    continue;
                }
                Err(e) => return Err(e.into()),
            };
            file.write_all(bytes).await?;
            file.flush().await?;

            info!("Stored upload {} ({} bytes)", filename, bytes.len());
            return Ok(StoredUpload { filename, path });
        }

        Err(DermaError::Other(format!(
            "no free upload name for {} after {} attempts",
            base, MAX_NAME_ATTEMPTS
        )))
    }

    /// Names of the `limit` most recently modified files, newest first
    pub async fn list_recent(&self, limit: usize) -> Result<Vec<String>> {
        let mut entries = match fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut files = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let metadata = entry.metadata().await?;
            if !metadata.is_file() {
                continue;
            }
            let modified = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);
            files.push((entry.file_name().to_string_lossy().into_owned(), modified));
        }

        Ok(order_recent(files, limit))
    }

    /// Read a stored file along with its content type
    pub async fn open(&self, name: &str) -> Result<(Vec<u8>, &'static str)> {
        if !is_safe_name(name) {
            debug!("Rejected upload lookup for unsafe name {:?}", name);
            return Err(DermaError::NotFound(name.to_string()));
        }

        match fs::read(self.dir.join(name)).await {
            Ok(bytes) => Ok((bytes, content_type(name))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(DermaError::NotFound(name.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// `name` with `_{n}` inserted before the extension; unchanged for `n == 0`
fn with_counter(name: &str, n: u32) -> String {
    if n == 0 {
        return name.to_string();
    }
    match name.rsplit_once('.') {
        Some((stem, ext)) => format!("{}_{}.{}", stem, n, ext),
        None => format!("{}_{}", name, n),
    }
}

/// Sort by modification time descending, then name ascending, and truncate
fn order_recent(mut files: Vec<(String, SystemTime)>, limit: usize) -> Vec<String> {
    files.sort_by(|a, b| (Reverse(a.1), &a.0).cmp(&(Reverse(b.1), &b.0)));
    files.into_iter().take(limit).map(|(name, _)| name).collect()
}

/// Content type from the file extension
pub fn content_type(name: &str) -> &'static str {
    match name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .as_deref()
    {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        _ => "application/octet-stream",
    }
}
