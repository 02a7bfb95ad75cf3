mod common;

use common::{fast_client, hits, mount_health, sample_articles, status_body};
use lit_research_sdk::{ErrorKind, FetchTopicRequest, ServiceHealth};
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_topic(server: &MockServer, topic_id: &str) {
    Mock::given(method("POST"))
        .and(path("/fetch-topic-data"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "topic_id": topic_id })))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/topic/{}/status", topic_id)))
        .respond_with(status_body("completed"))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/topic/{}/articles", topic_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(sample_articles()))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_research_collects_articles() {
    let server = MockServer::start().await;
    mount_health(&server, 200).await;
    mount_topic(&server, "t-1").await;

    let mut session = fast_client(&server).session();
    let result = session
        .research(FetchTopicRequest::new("ketamine depression"))
        .await;

    assert!(result.is_ok());
    assert_eq!(result.data.map(|a| a.len()), Some(2));
    assert_eq!(session.health(), ServiceHealth::Healthy);
    assert_eq!(session.active_job().map(|h| h.topic_id.as_str()), Some("t-1"));
    assert_eq!(session.articles().len(), 2);
}

#[tokio::test]
async fn test_research_is_refused_while_service_is_down() {
    let server = MockServer::start().await;
    mount_health(&server, 500).await;
    mount_topic(&server, "t-1").await;

    let mut session = fast_client(&server).session();
    let result = session.research(FetchTopicRequest::new("asthma")).await;

    assert_eq!(result.data, None);
    assert_eq!(result.kind, Some(ErrorKind::ServerError));
    assert_eq!(result.error.as_deref(), Some("server error"));
    assert_eq!(session.health(), ServiceHealth::Unavailable);
    assert_eq!(hits(&server, "/fetch-topic-data").await, 0);
}

#[tokio::test]
async fn test_failed_topic_is_not_kept_for_questions() {
    let server = MockServer::start().await;
    mount_health(&server, 200).await;
    Mock::given(method("POST"))
        .and(path("/fetch-topic-data"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "topic_id": "t-x" })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/topic/t-x/status"))
        .respond_with(status_body("error"))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/query"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "response": "unfounded", "conversation_id": "c-1" })),
        )
        .mount(&server)
        .await;

    let mut session = fast_client(&server).session();
    let result = session.research(FetchTopicRequest::new("asthma")).await;
    assert_eq!(result.kind, Some(ErrorKind::JobProcessing));
    assert!(session.active_job().is_none());
    assert!(session.articles().is_empty());

    let answer = session.ask("why?").await;
    assert_eq!(answer.data, None);
    assert_eq!(hits(&server, "/query").await, 0);
}

#[tokio::test]
async fn test_failed_topic_replaces_previous_job() {
    let server = MockServer::start().await;
    mount_health(&server, 200).await;
    mount_topic(&server, "t-1").await;

    let mut session = fast_client(&server).session();
    assert!(session.research(FetchTopicRequest::new("ketamine")).await.is_ok());
    assert!(session.active_job().is_some());

    // The next submission never leaves pending.
    server.reset().await;
    mount_health(&server, 200).await;
    Mock::given(method("POST"))
        .and(path("/fetch-topic-data"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "topic_id": "t-2" })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/topic/t-2/status"))
        .respond_with(status_body("pending"))
        .mount(&server)
        .await;

    let result = session.research(FetchTopicRequest::new("psilocybin")).await;
    assert_eq!(result.kind, Some(ErrorKind::JobTimeout));
    assert!(session.active_job().is_none());
    assert!(session.articles().is_empty());
}

#[tokio::test]
async fn test_blank_topic_fails_before_any_request() {
    let server = MockServer::start().await;

    let mut session = fast_client(&server).session();
    let result = session.research(FetchTopicRequest::new("  ")).await;

    assert_eq!(result.kind, Some(ErrorKind::Unexpected));
    assert_eq!(result.error.as_deref(), Some("Topic cannot be empty"));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_ask_requires_a_topic() {
    let server = MockServer::start().await;

    let mut session = fast_client(&server).session();
    let result = session.ask("What is known?").await;

    assert!(!result.is_ok());
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_ask_threads_conversation_id() {
    let server = MockServer::start().await;
    mount_health(&server, 200).await;
    mount_topic(&server, "t-1").await;
    Mock::given(method("POST"))
        .and(path("/query"))
        .and(body_partial_json(json!({ "topic_id": "t-1", "conversation_id": "c-42" })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "response": "Follow-up answer", "conversation_id": "c-42" })),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/query"))
        .and(body_partial_json(json!({ "topic_id": "t-1" })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "response": "First answer", "conversation_id": "c-42" })),
        )
        .mount(&server)
        .await;

    let mut session = fast_client(&server).session();
    assert!(session.check_health().await.is_ok());
    assert!(session.research(FetchTopicRequest::new("ketamine")).await.is_ok());

    let first = session.ask("What doses were used?").await;
    assert_eq!(first.data.as_deref(), Some("First answer"));
    assert_eq!(session.conversation_id(), Some("c-42"));

    let second = session.ask("And side effects?").await;
    assert_eq!(second.data.as_deref(), Some("Follow-up answer"));
}

#[tokio::test]
async fn test_new_topic_resets_conversation() {
    let server = MockServer::start().await;
    mount_health(&server, 200).await;
    mount_topic(&server, "t-1").await;
    Mock::given(method("POST"))
        .and(path("/query"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "response": "answer", "conversation_id": "c-1" })),
        )
        .mount(&server)
        .await;

    let mut session = fast_client(&server).session();
    assert!(session.research(FetchTopicRequest::new("ketamine")).await.is_ok());
    assert!(session.ask("Why?").await.is_ok());
    assert_eq!(session.conversation_id(), Some("c-1"));

    assert!(session.research(FetchTopicRequest::new("psilocybin")).await.is_ok());
    assert_eq!(session.conversation_id(), None);
}
