//! End-to-end exchange tests against a mock endpoint

use std::time::Duration;

use tempfile::tempdir;

use glow::app::{App, NoticeKind};
use glow::provider::NO_RESPONSE_PLACEHOLDER;
use glow::storage::STORAGE_KEY;

use crate::common::{
    mount_completion, mount_completion_failure, mount_completion_missing_content,
    start_completion_mock, test_config,
};

/// Drive the event loop until the in-flight exchange resolves.
async fn settle(app: &mut App) {
    for _ in 0..500 {
        app.process_exchange_events();
        if !app.is_pending() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("exchange never settled");
}

#[tokio::test]
async fn routine_exchange_appends_assistant_reply() {
    let server = start_completion_mock().await;
    mount_completion(&server, "1. Cleanse\n2. Moisturize").await;

    let dir = tempdir().expect("tempdir");
    let mut app = App::new(test_config(&server.uri(), dir.path()));

    app.toggle_product(1);
    app.toggle_product(4);
    app.generate_routine();
    assert!(app.is_pending());

    settle(&mut app).await;

    // seed + user request + assistant reply
    assert_eq!(app.transcript().len(), 3);
    assert_eq!(app.transcript().visible_count(), 2);
    let reply = app.transcript().snapshot().last().expect("reply");
    assert_eq!(reply.role_str(), "assistant");
    assert_eq!(reply.content(), "1. Cleanse\n2. Moisturize");
    assert!(app.notice().is_none());
}

#[tokio::test]
async fn request_body_projects_selection_without_ids_or_images() {
    let server = start_completion_mock().await;
    mount_completion(&server, "ok").await;

    let dir = tempdir().expect("tempdir");
    let mut app = App::new(test_config(&server.uri(), dir.path()));

    app.toggle_product(3);
    app.generate_routine();
    settle(&mut app).await;

    let requests = server.received_requests().await.expect("recorded requests");
    assert_eq!(requests.len(), 1);

    let body: serde_json::Value = requests[0].body_json().expect("json body");
    let user_content = body["messages"][1]["content"].as_str().expect("user turn");
    assert!(user_content.starts_with("Here are the products:"));
    assert!(user_content.contains("Vitamin C Serum"));
    assert!(user_content.contains("Brightening serum"));
    assert!(!user_content.contains("vitamin-c.png"));
    assert!(!user_content.contains("\"id\""));
}

#[tokio::test]
async fn empty_selection_shows_guard_notice_without_network() {
    let server = start_completion_mock().await;
    mount_completion(&server, "should never be called").await;

    let dir = tempdir().expect("tempdir");
    let mut app = App::new(test_config(&server.uri(), dir.path()));

    app.generate_routine();

    assert!(!app.is_pending());
    let notice = app.notice().expect("guard notice");
    assert_eq!(notice.kind, NoticeKind::Info);
    assert_eq!(notice.text, "Please select some products first!");

    let requests = server.received_requests().await.expect("recorded requests");
    assert!(requests.is_empty());
}

#[tokio::test]
async fn failed_exchange_keeps_user_turn_and_reports_error() {
    let server = start_completion_mock().await;
    mount_completion_failure(&server, 500, "upstream error").await;

    let dir = tempdir().expect("tempdir");
    let mut app = App::new(test_config(&server.uri(), dir.path()));

    app.toggle_product(2);
    app.generate_routine();
    settle(&mut app).await;

    // The user turn stays in the transcript; no assistant turn is added.
    assert_eq!(app.transcript().len(), 2);
    let last = app.transcript().snapshot().last().expect("user turn");
    assert_eq!(last.role_str(), "user");

    let notice = app.notice().expect("error notice");
    assert_eq!(notice.kind, NoticeKind::Error);
    assert_eq!(notice.text, "Failed to get AI response.");
}

#[tokio::test]
async fn missing_content_field_appends_placeholder_turn() {
    let server = start_completion_mock().await;
    mount_completion_missing_content(&server).await;

    let dir = tempdir().expect("tempdir");
    let mut app = App::new(test_config(&server.uri(), dir.path()));

    app.toggle_product(1);
    app.generate_routine();
    settle(&mut app).await;

    let reply = app.transcript().snapshot().last().expect("reply");
    assert_eq!(reply.role_str(), "assistant");
    assert_eq!(reply.content(), NO_RESPONSE_PLACEHOLDER);
}

#[tokio::test]
async fn follow_up_resends_whole_conversation() {
    let server = start_completion_mock().await;
    mount_completion(&server, "Sure!").await;

    let dir = tempdir().expect("tempdir");
    let mut app = App::new(test_config(&server.uri(), dir.path()));

    app.toggle_product(1);
    app.generate_routine();
    settle(&mut app).await;

    assert!(app.submit_question("Can I use the toner at night?"));
    settle(&mut app).await;

    let requests = server.received_requests().await.expect("recorded requests");
    assert_eq!(requests.len(), 2);

    // Second request carries the full history: system, user, assistant, user.
    let body: serde_json::Value = requests[1].body_json().expect("json body");
    let messages = body["messages"].as_array().expect("messages array");
    assert_eq!(messages.len(), 4);
    assert_eq!(messages[2]["role"], "assistant");
    assert_eq!(messages[3]["content"], "Can I use the toner at night?");
}

#[tokio::test]
async fn selection_is_persisted_after_an_exchange() {
    let server = start_completion_mock().await;
    mount_completion(&server, "done").await;

    let dir = tempdir().expect("tempdir");
    let config = test_config(&server.uri(), dir.path());
    let data_dir = config.data_dir.clone();
    let mut app = App::new(config);

    app.toggle_product(2);
    app.toggle_product(3);
    app.generate_routine();
    settle(&mut app).await;

    let raw = std::fs::read_to_string(data_dir.join(format!("{STORAGE_KEY}.json")))
        .expect("persisted selection");
    let ids: Vec<u32> = serde_json::from_str(&raw).expect("ids");
    assert_eq!(ids, [2, 3]);
}

#[tokio::test]
async fn selection_restored_on_startup_in_saved_order() {
    let server = start_completion_mock().await;

    let dir = tempdir().expect("tempdir");
    let config = test_config(&server.uri(), dir.path());
    let data_dir = config.data_dir.clone();

    {
        let mut app = App::new(config.clone());
        app.toggle_product(4);
        app.toggle_product(1);
    }

    let raw = std::fs::read_to_string(data_dir.join(format!("{STORAGE_KEY}.json")))
        .expect("persisted selection");
    assert_eq!(raw, "[4,1]");

    let app = App::new(config);
    let ids: Vec<u32> = app.selection().all().iter().map(|p| p.id).collect();
    assert_eq!(ids, [4, 1]);
    assert_eq!(app.selection().all()[0].name, "Cloud Cream");
}
