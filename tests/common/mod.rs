#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use bookshelf_kernel::{Module, ModuleRegistry, Settings};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

/// Full application router serving the given modules.
pub fn app(modules: Vec<Arc<dyn Module>>) -> Router {
    let mut registry = ModuleRegistry::new();
    for module in modules {
        registry.register_custom(module).unwrap();
    }
    bookshelf_http::build_router(&registry, &Settings::default())
}

/// Send one request and decode the JSON response body (`Null` when empty).
pub async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    send_request(app, request).await
}

pub async fn send_request(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}
