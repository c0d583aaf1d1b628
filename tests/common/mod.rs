//! Common test utilities and helpers

#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use dermavision_core::{
    api::build_router, AppConfig, AppState, Classifier, ClassifierBackend, DermaError,
    InferenceAdapter,
};
use dermavision_core::inference::BackendLoader;
use image::{ImageFormat, Rgb, RgbImage};
use ndarray::Array4;
use std::io::Cursor;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

pub const BOUNDARY: &str = "dermavision-test-boundary";

/// Backend returning the same scores for every image
pub struct ScriptedBackend(pub Vec<f32>);

impl ClassifierBackend for ScriptedBackend {
    fn predict(&self, _input: Array4<f32>) -> dermavision_core::Result<Vec<f32>> {
        Ok(self.0.clone())
    }

    fn name(&self) -> String {
        "scripted".to_string()
    }
}

/// A router over a temporary data directory
pub struct TestApp {
    pub dir: TempDir,
    pub config: AppConfig,
    pub router: Router,
}

impl TestApp {
    /// App whose model always answers with `scores`
    pub fn scripted(scores: &[f32]) -> Self {
        Self::build(false, |config| {
            Arc::new(InferenceAdapter::with_backend(
                config.image_size,
                Arc::new(ScriptedBackend(scores.to_vec())),
            ))
        })
    }

    /// Same as [`TestApp::scripted`] with result documents persisted
    pub fn scripted_persisting(scores: &[f32]) -> Self {
        Self::build(true, |config| {
            Arc::new(InferenceAdapter::with_backend(
                config.image_size,
                Arc::new(ScriptedBackend(scores.to_vec())),
            ))
        })
    }

    /// App whose model can never be loaded
    pub fn without_model() -> Self {
        Self::build(false, |config| {
            let loader: BackendLoader =
                Arc::new(|| -> dermavision_core::Result<Arc<dyn ClassifierBackend>> {
                    Err(DermaError::ModelLoad("final_model.onnx not found".to_string()))
                });
            Arc::new(InferenceAdapter::new(config.image_size, loader))
        })
    }

    fn build<F>(persist_results: bool, classifier: F) -> Self
    where
        F: FnOnce(&AppConfig) -> Arc<dyn Classifier>,
    {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let config = AppConfig {
            upload_dir: dir.path().join("uploads"),
            feedback_dir: dir.path().join("feedback"),
            image_size: 16,
            persist_results,
            ..AppConfig::default()
        };

        let state = AppState::new(config.clone(), classifier(&config))
            .expect("Failed to build app state");
        let router = build_router(state);

        Self { dir, config, router }
    }

    /// Send one request and collect the status and body
    pub async fn send(&self, request: Request<Body>) -> (StatusCode, String) {
        let (status, _, body) = self.send_raw(request).await;
        (status, String::from_utf8_lossy(&body).into_owned())
    }

    /// Send one request and keep the headers
    pub async fn send_raw(
        &self,
        request: Request<Body>,
    ) -> (StatusCode, axum::http::HeaderMap, Vec<u8>) {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");
        let status = response.status();
        let headers = response.headers().clone();
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read body");
        (status, headers, body.to_vec())
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, String) {
        self.send(Request::get(uri).body(Body::empty()).unwrap()).await
    }

    /// Names currently in the upload directory
    pub fn stored_uploads(&self) -> Vec<String> {
        match std::fs::read_dir(&self.config.upload_dir) {
            Ok(entries) => entries
                .filter_map(|e| e.ok())
                .map(|e| e.file_name().to_string_lossy().into_owned())
                .collect(),
            Err(_) => Vec::new(),
        }
    }
}

/// A small valid PNG
pub fn png_bytes() -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    RgbImage::from_pixel(12, 12, Rgb([180, 90, 60]))
        .write_to(&mut buf, ImageFormat::Png)
        .expect("Failed to encode PNG");
    buf.into_inner()
}

/// Builder for `multipart/form-data` request bodies
#[derive(Default)]
pub struct MultipartBody {
    body: Vec<u8>,
}

impl MultipartBody {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn file(mut self, name: &str, filename: &str, bytes: &[u8]) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(bytes);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
        self
    }

    /// POST request to `uri` carrying the finished body
    pub fn into_request(mut self, uri: &str) -> Request<Body> {
        self.body
            .extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        Request::post(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(self.body))
            .unwrap()
    }
}

/// POST an urlencoded form
pub fn form_request(uri: &str, body: &str) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}
