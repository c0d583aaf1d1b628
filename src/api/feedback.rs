//! Contact form and the password-gated feedback viewer

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Form,
};
use minijinja::context;
use serde::Deserialize;
use tracing::{debug, info};

use super::pages::Notice;
use super::server::AppState;
use crate::error::Result;

/// Shown after a successful submission
pub const FEEDBACK_RECORDED_MESSAGE: &str = "Thank you — feedback recorded.";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct ContactForm {
    name: String,
    email: String,
    message: String,
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct AdminCredentials {
    pwd: Option<String>,
}

pub(super) async fn contact_form(State(state): State<AppState>) -> Result<Response> {
    let html = state.pages.render("contact.html", "Contact", &[], context! {})?;
    Ok(html.into_response())
}

/// A body that is not an urlencoded form counts as empty fields
pub(super) async fn contact_submit(
    State(state): State<AppState>,
    form: Option<Form<ContactForm>>,
) -> Result<Response> {
    let form = form.map(|Form(form)| form).unwrap_or_default();
    let (status, notice) = match state
        .feedback
        .append(&form.name, &form.email, &form.message)
        .await
    {
        Ok(_) => (StatusCode::OK, Notice::success(FEEDBACK_RECORDED_MESSAGE)),
        Err(e) if e.is_validation() => (StatusCode::UNPROCESSABLE_ENTITY, Notice::warning(e.to_string())),
        Err(e) => return Err(e),
    };

    let html = state.pages.render("contact.html", "Contact", &[notice], context! {})?;
    Ok((status, html).into_response())
}

pub(super) async fn admin_query(
    State(state): State<AppState>,
    Query(credentials): Query<AdminCredentials>,
) -> Result<Response> {
    admin_page(&state, credentials.pwd).await
}

/// Only the form field is consulted; a missing form is an empty password
pub(super) async fn admin_form(
    State(state): State<AppState>,
    form: Option<Form<AdminCredentials>>,
) -> Result<Response> {
    let pwd = form.and_then(|Form(form)| form.pwd).unwrap_or_default();
    admin_page(&state, Some(pwd)).await
}

async fn admin_page(state: &AppState, pwd: Option<String>) -> Result<Response> {
    let authorized = pwd.as_deref() == Some(state.config.admin_password.as_str());

    if !authorized {
        let attempted = pwd.as_deref().is_some_and(|p| !p.is_empty());
        if attempted {
            info!("Rejected feedback viewer login");
        }
        let html = state.pages.render(
            "admin_login.html",
            "Admin - Login",
            &[],
            context! { error => attempted },
        )?;
        return Ok(html.into_response());
    }

    let feedbacks = state.feedback.list_all().await?;
    debug!("Showing {} feedback rows", feedbacks.len());
    let html = state.pages.render(
        "admin_view.html",
        "Admin - Feedback",
        &[],
        context! { feedbacks },
    )?;
    Ok(html.into_response())
}
