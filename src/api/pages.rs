//! HTML rendering and the static pages
//!
//! Templates are compiled into the binary and rendered with minijinja
//! (auto-escaping is on for every `.html` template).

use axum::{
    extract::State,
    http::header,
    response::{Html, IntoResponse},
};
use minijinja::{context, Environment, Value};
use serde::Serialize;

use super::server::AppState;
use crate::error::Result;

const TEMPLATES: &[(&str, &str)] = &[
    ("base.html", include_str!("../../templates/base.html")),
    ("recent.html", include_str!("../../templates/recent.html")),
    ("index.html", include_str!("../../templates/index.html")),
    ("detection.html", include_str!("../../templates/detection.html")),
    ("contact.html", include_str!("../../templates/contact.html")),
    ("insights.html", include_str!("../../templates/insights.html")),
    ("about.html", include_str!("../../templates/about.html")),
    ("admin_login.html", include_str!("../../templates/admin_login.html")),
    ("admin_view.html", include_str!("../../templates/admin_view.html")),
];

const MAIN_JS: &str = include_str!("../../static/js/main.js");

/// Inline message shown above the page content
#[derive(Debug, Clone, Serialize)]
pub struct Notice {
    pub level: &'static str,
    pub text: String,
}

impl Notice {
    pub fn success(text: impl Into<String>) -> Self {
        Self { level: "success", text: text.into() }
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Self { level: "warning", text: text.into() }
    }

    pub fn danger(text: impl Into<String>) -> Self {
        Self { level: "danger", text: text.into() }
    }
}

/// Compiled page templates
pub struct Pages {
    env: Environment<'static>,
}

impl Pages {
    pub fn new() -> Result<Self> {
        let mut env = Environment::new();
        for (name, source) in TEMPLATES {
            env.add_template(name, source)?;
        }
        Ok(Self { env })
    }

    /// Render `name` with a page title, notices and page-specific values
    pub fn render(&self, name: &str, title: &str, notices: &[Notice], page: Value) -> Result<Html<String>> {
        let ctx = context! { title, notices, ..page };
        let html = self.env.get_template(name)?.render(ctx)?;
        Ok(Html(html))
    }
}

pub(super) async fn index(State(state): State<AppState>) -> Result<Html<String>> {
    let recent = state.recent_uploads().await?;
    state.pages.render("index.html", "Home", &[], context! { recent })
}

pub(super) async fn insights(State(state): State<AppState>) -> Result<Html<String>> {
    state.pages.render("insights.html", "Insights", &[], context! {})
}

pub(super) async fn about(State(state): State<AppState>) -> Result<Html<String>> {
    state.pages.render("about.html", "Developer", &[], context! {})
}

pub(super) async fn main_js() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/javascript; charset=utf-8")], MAIN_JS)
}
