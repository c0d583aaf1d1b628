//! Classification followed by enrichment for one stored image

use chrono::Local;

use crate::enrichment::enrich;
use crate::error::Result;
use crate::inference::Classifier;
use crate::types::{ClassificationResult, SubmissionContext};

/// Classify `image` and build the enriched result for `filename`
pub async fn analyze(
    classifier: &dyn Classifier,
    filename: &str,
    image: &[u8],
    context: SubmissionContext,
) -> Result<ClassificationResult> {
    let prediction = classifier.classify(image).await?;
    let advisory = enrich(prediction.label, context.age);

    Ok(ClassificationResult::new(
        filename.to_string(),
        prediction,
        context,
        &advisory,
        Local::now(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DermaError;
    use crate::types::{Label, Prediction};
    use async_trait::async_trait;

    struct Canned(Option<Prediction>);

    #[async_trait]
    impl Classifier for Canned {
        async fn classify(&self, _image: &[u8]) -> Result<Prediction> {
            self.0
                .ok_or_else(|| DermaError::Prediction("model exploded".to_string()))
        }

        async fn is_ready(&self) -> bool {
            self.0.is_some()
        }
    }

    #[tokio::test]
    async fn test_analyze_combines_prediction_and_advisory() {
        let classifier = Canned(Some(Prediction {
            label: Label::BasalCellCarcinoma,
            confidence: 71.234,
        }));
        let context = SubmissionContext {
            age: Some(19),
            sex: Some("male".to_string()),
            medical_history: "eczema".to_string(),
        };

        let result = analyze(&classifier, "20240101000000_a.jpg", b"img", context)
            .await
            .unwrap();

        assert_eq!(result.predicted_class, Label::BasalCellCarcinoma);
        assert_eq!(result.confidence, 71.23);
        assert_eq!(result.severity_hint, "Moderate urgency — early treatment recommended.");
        assert!(result.age_note.starts_with("Under 20"));
        assert_eq!(result.medical_history, "eczema");
        assert_eq!(result.filename, "20240101000000_a.jpg");
    }

    #[tokio::test]
    async fn test_analyze_propagates_prediction_failure() {
        let err = analyze(&Canned(None), "x.png", b"", SubmissionContext::default())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Prediction error: model exploded");
    }
}
