mod common;

use common::{fast_client, hits, sample_articles};
use lit_research_sdk::{ErrorKind, JobHandle, PollOutcome, QueryRequest, SdkError};
use serde_json::json;
use tokio_test::assert_ok;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_transient_server_errors_are_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/topic/t-1/articles"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/topic/t-1/articles"))
        .respond_with(ResponseTemplate::new(200).set_body_json(sample_articles()))
        .mount(&server)
        .await;

    let client = fast_client(&server);
    let articles = assert_ok!(client.topics().articles(&JobHandle::new("t-1")).await);

    assert_eq!(articles.len(), 2);
    assert_eq!(hits(&server, "/topic/t-1/articles").await, 3);
}

#[tokio::test]
async fn test_retries_stop_after_three() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/query"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = fast_client(&server);
    let error = client
        .queries()
        .ask(QueryRequest::new("What dosage?", "t-1"))
        .await
        .unwrap_err();

    assert_eq!(error.kind(), ErrorKind::ServerError);
    // first call plus three retries
    assert_eq!(hits(&server, "/query").await, 4);
}

#[tokio::test]
async fn test_rate_limit_is_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/query"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "1"))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/query"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"response": "Start low.", "conversation_id": "c-1"})),
        )
        .mount(&server)
        .await;

    let client = fast_client(&server);
    let answer = assert_ok!(
        client
            .queries()
            .ask(QueryRequest::new("What dosage?", "t-1"))
            .await
    );

    assert_eq!(answer.conversation_id, "c-1");
    assert_eq!(hits(&server, "/query").await, 2);
}

#[tokio::test]
async fn test_authentication_failure_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/topic/t-1/articles"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let client = fast_client(&server);
    let error = client
        .topics()
        .articles(&JobHandle::new("t-1"))
        .await
        .unwrap_err();

    assert!(matches!(error, SdkError::AuthenticationError(_)));
    assert_eq!(hits(&server, "/topic/t-1/articles").await, 1);
}

#[tokio::test]
async fn test_status_checks_bypass_retries() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/topic/t-1/status"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = fast_client(&server);
    let outcome = client.topics().wait(&JobHandle::new("t-1")).await;

    match outcome {
        PollOutcome::QueryFailed { attempts, error } => {
            assert_eq!(attempts, 1);
            assert_eq!(error.kind(), ErrorKind::ServerError);
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
    assert_eq!(hits(&server, "/topic/t-1/status").await, 1);
}

#[tokio::test]
async fn test_cancelled_client_never_sends() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/topic/t-1/articles"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let token = CancellationToken::new();
    token.cancel();
    let client = fast_client(&server).with_cancellation(token);

    let error = client
        .topics()
        .articles(&JobHandle::new("t-1"))
        .await
        .unwrap_err();

    assert!(error.is_cancelled());
    assert_eq!(hits(&server, "/topic/t-1/articles").await, 0);
}
