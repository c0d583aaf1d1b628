//! Detection form, uploaded images and result downloads

use axum::{
    extract::{Multipart, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use minijinja::context;
use serde_json::json;
use tracing::{debug, error, warn};

use super::pages::Notice;
use super::server::AppState;
use crate::analysis::analyze;
use crate::error::{DermaError, Result};
use crate::storage::uploads::MISSING_FILE_MESSAGE;
use crate::types::{ClassificationResult, SubmissionContext};

/// Fields of a detection submission
#[derive(Debug, Default)]
struct DetectionForm {
    /// `(client filename, bytes)` of the `image` part
    image: Option<(String, Vec<u8>)>,
    context: SubmissionContext,
}

impl DetectionForm {
    async fn from_multipart(mut multipart: Multipart) -> Result<Self> {
        let mut form = DetectionForm::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| DermaError::Validation(format!("Malformed upload: {}", e)))?
        {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "image" => {
                    let filename = field.file_name().unwrap_or_default().to_string();
                    let bytes = field
                        .bytes()
                        .await
                        .map_err(|e| DermaError::Validation(format!("Malformed upload: {}", e)))?;
                    form.image = Some((filename, bytes.to_vec()));
                }
                "age" | "sex" | "medical_history" => {
                    let value = field
                        .text()
                        .await
                        .map_err(|e| DermaError::Validation(format!("Malformed upload: {}", e)))?;
                    form.set_text(&name, value);
                }
                other => debug!("Ignoring unexpected form field {:?}", other),
            }
        }

        Ok(form)
    }

    fn set_text(&mut self, name: &str, value: String) {
        let trimmed = value.trim();
        match name {
            // Non-numeric ages are treated as absent
            "age" => self.context.age = trimmed.parse().ok(),
            "sex" => self.context.sex = (!trimmed.is_empty()).then(|| trimmed.to_string()),
            "medical_history" => self.context.medical_history = trimmed.to_string(),
            _ => {}
        }
    }
}

/// Render the detection page, optionally with a result
async fn render_detection(
    state: &AppState,
    status: StatusCode,
    notices: &[Notice],
    result: Option<&ClassificationResult>,
) -> Result<Response> {
    let recent = state.recent_uploads().await?;

    let page = match result {
        Some(result) => context! {
            recent,
            result,
            confidence => result.confidence_display(),
            uploaded_image => format!("/uploads/{}", result.filename),
            result_json => serde_json::to_string(result)?,
        },
        None => context! { recent },
    };

    let html = state.pages.render("detection.html", "Detection", notices, page)?;
    Ok((status, html).into_response())
}

pub(super) async fn detection_form(State(state): State<AppState>) -> Result<Response> {
    render_detection(&state, StatusCode::OK, &[], None).await
}

pub(super) async fn detection_submit(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Response> {
    let form = match DetectionForm::from_multipart(multipart).await {
        Ok(form) => form,
        Err(e) => {
            let notices = [Notice::warning(e.to_string())];
            return render_detection(&state, StatusCode::UNPROCESSABLE_ENTITY, &notices, None).await;
        }
    };

    let Some((original_name, bytes)) = form.image else {
        return render_detection(
            &state,
            StatusCode::UNPROCESSABLE_ENTITY,
            &[Notice::warning(MISSING_FILE_MESSAGE)],
            None,
        )
        .await;
    };

    let stored = match state.uploads.save(&original_name, &bytes).await {
        Ok(stored) => stored,
        Err(e) if e.is_validation() => {
            let notice = if original_name.is_empty() {
                Notice::warning(e.to_string())
            } else {
                Notice::danger(e.to_string())
            };
            return render_detection(&state, StatusCode::UNPROCESSABLE_ENTITY, &[notice], None).await;
        }
        Err(e) => return Err(e),
    };

    // The upload stays on disk even when classification fails
    let result = match analyze(state.classifier.as_ref(), &stored.filename, &bytes, form.context).await {
        Ok(result) => result,
        Err(e) => {
            error!("Classification of {} failed: {}", stored.filename, e);
            return render_detection(
                &state,
                StatusCode::INTERNAL_SERVER_ERROR,
                &[Notice::danger(e.to_string())],
                None,
            )
            .await;
        }
    };

    if state.config.persist_results {
        if let Err(e) = state.results.save(&result).await {
            warn!("Could not persist result for {}: {}", result.filename, e);
        }
    }

    render_detection(&state, StatusCode::OK, &[], Some(&result)).await
}

pub(super) async fn uploaded_file(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Response> {
    let (bytes, content_type) = state.uploads.open(&filename).await?;
    Ok(([(header::CONTENT_TYPE, content_type)], bytes).into_response())
}

pub(super) async fn download_result(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Response> {
    match state.results.load(&filename).await? {
        Some(bytes) => {
            let disposition = format!("attachment; filename=\"{}.json\"", filename);
            Ok((
                [
                    (header::CONTENT_TYPE, "application/json".to_string()),
                    (header::CONTENT_DISPOSITION, disposition),
                ],
                bytes,
            )
                .into_response())
        }
        None => Ok((
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "Result JSON not found" })),
        )
            .into_response()),
    }
}
