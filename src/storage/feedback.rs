//! Append-only feedback ledger
//!
//! Rows live in `feedbacks.csv` under the feedback directory with the header
//! `timestamp,name,email,message`. Appends are serialized by an async mutex
//! and go through an append-mode handle, so concurrent submissions never
//! interleave or overwrite each other.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use chrono::Local;
use tokio::{sync::Mutex, task};
use tracing::{debug, info};

use crate::config::AppConfig;
use crate::error::{DermaError, Result};
use crate::types::{FeedbackEntry, TIMESTAMP_FORMAT};

/// File name of the ledger inside the feedback directory
pub const FEEDBACK_FILE: &str = "feedbacks.csv";

/// Shown when any contact field is blank
pub const INCOMPLETE_FEEDBACK_MESSAGE: &str = "Please fill all fields.";

pub struct FeedbackLedger {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FeedbackLedger {
    pub fn new(config: &AppConfig) -> Self {
        Self::at(config.feedback_dir.join(FEEDBACK_FILE))
    }

    /// Ledger stored at an explicit CSV path
    pub fn at(path: PathBuf) -> Self {
        Self {
            path,
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Validate and append one submission
    ///
    /// Fields are trimmed; if any is empty nothing is written.
    pub async fn append(&self, name: &str, email: &str, message: &str) -> Result<FeedbackEntry> {
        let (name, email, message) = (name.trim(), email.trim(), message.trim());
        if name.is_empty() || email.is_empty() || message.is_empty() {
            return Err(DermaError::Validation(
                INCOMPLETE_FEEDBACK_MESSAGE.to_string(),
            ));
        }

        let entry = FeedbackEntry {
            timestamp: Local::now().format(TIMESTAMP_FORMAT).to_string(),
            name: name.to_string(),
            email: email.to_string(),
            message: message.to_string(),
        };

        let _guard = self.write_lock.lock().await;
        let path = self.path.clone();
        let row = entry.clone();
        task::spawn_blocking(move || append_row(&path, &row))
            .await
            .map_err(|e| DermaError::Other(format!("Task join error: {}", e)))??;

        info!("Recorded feedback from {}", entry.email);
        Ok(entry)
    }

    /// All rows in insertion order; empty when the ledger does not exist yet
    pub async fn list_all(&self) -> Result<Vec<FeedbackEntry>> {
        let path = self.path.clone();
        let entries = task::spawn_blocking(move || read_rows(&path))
            .await
            .map_err(|e| DermaError::Other(format!("Task join error: {}", e)))??;

        debug!("Loaded {} feedback rows", entries.len());
        Ok(entries)
    }
}

fn append_row(path: &Path, entry: &FeedbackEntry) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let needs_header = file.metadata()?.len() == 0;

    let mut writer = csv::WriterBuilder::new()
        .has_headers(needs_header)
        .from_writer(file);
    writer.serialize(entry)?;
    writer.flush()?;
    Ok(())
}

fn read_rows(path: &Path) -> Result<Vec<FeedbackEntry>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let mut reader = csv::Reader::from_path(path)?;
    let mut entries = Vec::new();
    for row in reader.deserialize() {
        entries.push(row?);
    }
    Ok(entries)
}
