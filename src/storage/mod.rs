//! Filesystem-backed stores
//!
//! - [`UploadStore`]: submitted images, timestamp-prefixed
//! - [`FeedbackLedger`]: append-only CSV of contact-form entries
//! - [`ResultStore`]: per-upload JSON results

pub mod feedback;
pub mod results;
pub mod uploads;

pub use feedback::FeedbackLedger;
pub use results::ResultStore;
pub use uploads::{StoredUpload, UploadStore};

/// Reduce a client-supplied filename to a safe single path component
///
/// Keeps ASCII letters, digits, `.`, `_` and `-`; whitespace becomes `_`;
/// path separators split the name and only the parts are kept; leading
/// dots and underscores are stripped. May return an empty string.
pub fn secure_filename(name: &str) -> String {
    let joined = name
        .split(['/', '\\'])
        .filter(|part| !part.is_empty() && *part != "." && *part != "..")
        .collect::<Vec<_>>()
        .join(" ");

    let cleaned: String = joined
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .collect();

    cleaned.trim_start_matches(['.', '_']).to_string()
}

/// Whether `name` can be used verbatim as a stored file name
pub fn is_safe_name(name: &str) -> bool {
    !name.is_empty() && secure_filename(name) == name
}
