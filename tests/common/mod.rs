//! Shared test utilities and fixtures
//!
//! Common infrastructure for integration tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use glow::config::GlowConfig;

/// Start a mock server that simulates the chat-completion endpoint
pub async fn start_completion_mock() -> MockServer {
    MockServer::start().await
}

/// Mount a successful chat-completion response
pub async fn mount_completion(server: &MockServer, response_content: &str) {
    let body = serde_json::json!({
        "choices": [{
            "message": {
                "role": "assistant",
                "content": response_content
            }
        }]
    });

    Mock::given(method("POST"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

/// Mount a response whose body lacks the expected content field
pub async fn mount_completion_missing_content(server: &MockServer) {
    let body = serde_json::json!({
        "choices": [{
            "message": { "role": "assistant" }
        }]
    });

    Mock::given(method("POST"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

/// Mount a failing chat-completion response
pub async fn mount_completion_failure(server: &MockServer, status: u16, error_body: &str) {
    Mock::given(method("POST"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(status).set_body_string(error_body))
        .mount(server)
        .await;
}

/// A small catalog covering several categories
pub fn sample_catalog_json() -> serde_json::Value {
    serde_json::json!({
        "products": [
            {
                "id": 1,
                "name": "Morning Dew Cleanser",
                "brand": "Petal",
                "category": "cleanser",
                "image": "morning-dew.png",
                "description": "A gentle gel cleanser for daily use"
            },
            {
                "id": 2,
                "name": "Rose Water Toner",
                "brand": "Petal",
                "category": "toner",
                "image": "rose-water.png",
                "description": "Alcohol-free toner with rose extract"
            },
            {
                "id": 3,
                "name": "Vitamin C Serum",
                "brand": "Lumen",
                "category": "serum",
                "image": "vitamin-c.png",
                "description": "Brightening serum with 10% vitamin C"
            },
            {
                "id": 4,
                "name": "Cloud Cream",
                "brand": "Lumen",
                "category": "moisturizer",
                "image": "cloud-cream.png",
                "description": "Lightweight moisturizer for sensitive skin"
            }
        ]
    })
}

/// Write the sample catalog into `dir` and return its path
pub fn write_sample_catalog(dir: &Path) -> PathBuf {
    let path = dir.join("products.json");
    std::fs::write(&path, sample_catalog_json().to_string()).expect("write catalog fixture");
    path
}

/// Build a config pointing at a mock endpoint and a temp data dir
pub fn test_config(endpoint: &str, dir: &Path) -> GlowConfig {
    GlowConfig {
        endpoint: endpoint.to_string(),
        catalog_path: write_sample_catalog(dir),
        data_dir: dir.join("data"),
    }
}
