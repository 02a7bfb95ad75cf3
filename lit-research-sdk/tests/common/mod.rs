#![allow(dead_code)]

use lit_research_sdk::{ResearchClient, SdkConfig};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const API_KEY: &str = "test-api-key";

/// Config pointing at `server` with millisecond-scale backoff and polling
pub fn fast_config(server: &MockServer) -> SdkConfig {
    SdkConfig::new(server.uri())
        .with_api_key(API_KEY)
        .with_retry_base_delay(Duration::from_millis(1))
        .with_polling(10, Duration::from_millis(10))
}

pub fn fast_client(server: &MockServer) -> ResearchClient {
    ResearchClient::new(fast_config(server)).expect("valid test config")
}

pub fn status_body(status: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "status": status }))
}

pub fn sample_articles() -> serde_json::Value {
    json!({
        "articles": [
            {
                "title": "Ketamine for treatment-resistant depression",
                "authors": ["A. Author", "B. Author"],
                "abstract": "A randomized trial.",
                "pubmed_id": "31234567"
            },
            {
                "title": "Esketamine nasal spray outcomes",
                "authors": ["C. Author"],
                "abstract": "A cohort study.",
                "url": "https://example.org/esketamine"
            }
        ]
    })
}

pub async fn mount_health(server: &MockServer, status: u16) {
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(status).set_body_string("OK"))
        .mount(server)
        .await;
}

/// Count requests the server received on `request_path`
pub async fn hits(server: &MockServer, request_path: &str) -> usize {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|r| r.url.path() == request_path)
        .count()
}
