//! Core data types for DermaVision
//!
//! Labels, predictions, per-upload classification results and feedback
//! entries. Results and feedback rows serialize to the same field names the
//! JSON download and the feedback CSV use.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::enrichment::Advisory;

/// Timestamp layout used in results and feedback rows
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Diagnostic category predicted by the classifier
///
/// Variant order matches the model's output vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Label {
    #[serde(rename = "Melanoma (MEL)")]
    Melanoma,
    #[serde(rename = "Melanocytic Nevus (NV)")]
    MelanocyticNevus,
    #[serde(rename = "Basal Cell Carcinoma (BCC)")]
    BasalCellCarcinoma,
    #[serde(rename = "Benign Keratosis (BKL)")]
    BenignKeratosis,
}

impl Label {
    /// All labels in model output order
    pub const ALL: [Label; 4] = [
        Label::Melanoma,
        Label::MelanocyticNevus,
        Label::BasalCellCarcinoma,
        Label::BenignKeratosis,
    ];

    /// Label for a model output index
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Position in the model output vector
    pub fn index(self) -> usize {
        match self {
            Label::Melanoma => 0,
            Label::MelanocyticNevus => 1,
            Label::BasalCellCarcinoma => 2,
            Label::BenignKeratosis => 3,
        }
    }

    /// Human-readable label text
    pub fn display_name(self) -> &'static str {
        match self {
            Label::Melanoma => "Melanoma (MEL)",
            Label::MelanocyticNevus => "Melanocytic Nevus (NV)",
            Label::BasalCellCarcinoma => "Basal Cell Carcinoma (BCC)",
            Label::BenignKeratosis => "Benign Keratosis (BKL)",
        }
    }

    /// Resolve free label text by keyword, first match wins:
    /// "Melanoma", then "Nevus", then "Basal", otherwise benign keratosis.
    pub fn from_display(text: &str) -> Self {
        if text.contains("Melanoma") {
            Label::Melanoma
        } else if text.contains("Nevus") {
            Label::MelanocyticNevus
        } else if text.contains("Basal") {
            Label::BasalCellCarcinoma
        } else {
            Label::BenignKeratosis
        }
    }
}

impl std::fmt::Display for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Classifier output for one image
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub label: Label,
    /// Maximum class probability as a percentage in [0, 100]
    pub confidence: f64,
}

/// User-supplied context submitted alongside an image
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionContext {
    pub age: Option<i64>,
    pub sex: Option<String>,
    #[serde(default)]
    pub medical_history: String,
}

/// Enriched result for one submitted image
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub timestamp: String,
    pub filename: String,
    pub predicted_class: Label,
    /// Percentage rounded to two decimals
    pub confidence: f64,
    pub age: Option<i64>,
    pub sex: Option<String>,
    pub medical_history: String,
    pub description: String,
    pub guidelines: Vec<String>,
    pub age_note: String,
    pub severity_hint: String,
}

impl ClassificationResult {
    pub fn new(
        filename: String,
        prediction: Prediction,
        context: SubmissionContext,
        advisory: &Advisory,
        created_at: DateTime<Local>,
    ) -> Self {
        Self {
            timestamp: created_at.format(TIMESTAMP_FORMAT).to_string(),
            filename,
            predicted_class: prediction.label,
            confidence: (prediction.confidence * 100.0).round() / 100.0,
            age: context.age,
            sex: context.sex,
            medical_history: context.medical_history,
            description: advisory.description.to_string(),
            guidelines: advisory.guidelines.iter().map(|g| g.to_string()).collect(),
            age_note: advisory.age_note.to_string(),
            severity_hint: advisory.severity_hint.to_string(),
        }
    }

    /// Confidence as shown on the result page, e.g. `87.0`
    pub fn confidence_display(&self) -> String {
        format!("{:.1}", self.confidence)
    }
}

/// One contact-form submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackEntry {
    pub timestamp: String,
    pub name: String,
    pub email: String,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enrichment::enrich;
    use chrono::TimeZone;

    #[test]
    fn test_label_index_round_trip() {
        for (i, label) in Label::ALL.iter().enumerate() {
            assert_eq!(label.index(), i);
            assert_eq!(Label::from_index(i), Some(*label));
        }
        assert_eq!(Label::from_index(4), None);
    }

    #[test]
    fn test_label_from_display_priority() {
        assert_eq!(Label::from_display("Melanoma (MEL)"), Label::Melanoma);
        assert_eq!(Label::from_display("Melanocytic Nevus (NV)"), Label::MelanocyticNevus);
        assert_eq!(Label::from_display("Basal Cell Carcinoma (BCC)"), Label::BasalCellCarcinoma);
        assert_eq!(Label::from_display("Benign Keratosis (BKL)"), Label::BenignKeratosis);
        assert_eq!(Label::from_display("anything else"), Label::BenignKeratosis);

        // Ambiguous text resolves to the earliest keyword in priority order
        assert_eq!(Label::from_display("Basal Nevus"), Label::MelanocyticNevus);
        assert_eq!(Label::from_display("Nevus with Melanoma"), Label::Melanoma);
    }

    #[test]
    fn test_label_serializes_as_display_text() {
        let json = serde_json::to_string(&Label::BasalCellCarcinoma).unwrap();
        assert_eq!(json, "\"Basal Cell Carcinoma (BCC)\"");

        let label: Label = serde_json::from_str("\"Melanoma (MEL)\"").unwrap();
        assert_eq!(label, Label::Melanoma);
    }

    #[test]
    fn test_result_rounds_confidence() {
        let prediction = Prediction {
            label: Label::Melanoma,
            confidence: 87.456_f64,
        };
        let context = SubmissionContext {
            age: Some(65),
            sex: Some("female".to_string()),
            medical_history: String::new(),
        };
        let created_at = Local.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();
        let advisory = enrich(Label::Melanoma, Some(65));

        let result = ClassificationResult::new(
            "20240309140507_mole.png".to_string(),
            prediction,
            context,
            &advisory,
            created_at,
        );

        assert_eq!(result.confidence, 87.46);
        assert_eq!(result.confidence_display(), "87.5");
        assert_eq!(result.timestamp, "2024-03-09 14:05:07");
        assert_eq!(result.guidelines.len(), 4);

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["predicted_class"], "Melanoma (MEL)");
        assert_eq!(json["age"], 65);
        assert!(json["severity_hint"].as_str().unwrap().starts_with("Higher urgency"));
    }
}
