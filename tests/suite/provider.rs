//! Chat-completion request tests

use glow::provider::{CompletionError, NO_RESPONSE_PLACEHOLDER, request_completion};
use glow::transcript::Transcript;

use crate::common::{
    mount_completion, mount_completion_failure, mount_completion_missing_content,
    start_completion_mock,
};

fn sample_transcript() -> Transcript {
    let mut transcript = Transcript::seed();
    transcript.append_user("Suggest a routine".try_into().expect("non-empty"));
    transcript
}

#[tokio::test]
async fn returns_assistant_content_on_success() {
    let server = start_completion_mock().await;
    mount_completion(&server, "Step 1: cleanse.").await;

    let client = reqwest::Client::new();
    let transcript = sample_transcript();
    let text = request_completion(&client, &server.uri(), transcript.snapshot())
        .await
        .expect("completion");

    assert_eq!(text, "Step 1: cleanse.");
}

#[tokio::test]
async fn sends_full_transcript_including_hidden_system_turn() {
    let server = start_completion_mock().await;
    mount_completion(&server, "ok").await;

    let client = reqwest::Client::new();
    let transcript = sample_transcript();
    request_completion(&client, &server.uri(), transcript.snapshot())
        .await
        .expect("completion");

    let requests = server.received_requests().await.expect("recorded requests");
    assert_eq!(requests.len(), 1);

    let body: serde_json::Value = requests[0].body_json().expect("json body");
    let messages = body["messages"].as_array().expect("messages array");
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0]["role"], "system");
    assert!(
        messages[0]["content"]
            .as_str()
            .expect("system content")
            .contains("skincare and beauty advisor")
    );
    assert_eq!(messages[1]["role"], "user");
    assert_eq!(messages[1]["content"], "Suggest a routine");
}

#[tokio::test]
async fn missing_content_field_yields_placeholder() {
    let server = start_completion_mock().await;
    mount_completion_missing_content(&server).await;

    let client = reqwest::Client::new();
    let transcript = sample_transcript();
    let text = request_completion(&client, &server.uri(), transcript.snapshot())
        .await
        .expect("completion");

    assert_eq!(text, NO_RESPONSE_PLACEHOLDER);
}

#[tokio::test]
async fn non_success_status_carries_error_body() {
    let server = start_completion_mock().await;
    mount_completion_failure(&server, 500, "worker exploded").await;

    let client = reqwest::Client::new();
    let transcript = sample_transcript();
    let err = request_completion(&client, &server.uri(), transcript.snapshot())
        .await
        .expect_err("should fail");

    match err {
        CompletionError::Status { status, body } => {
            assert_eq!(status.as_u16(), 500);
            assert_eq!(body, "worker exploded");
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test]
async fn unreachable_endpoint_is_a_transport_error() {
    let client = reqwest::Client::new();
    let transcript = sample_transcript();
    let err = request_completion(&client, "http://127.0.0.1:9", transcript.snapshot())
        .await
        .expect_err("should fail");

    assert!(matches!(err, CompletionError::Transport(_)));
}
