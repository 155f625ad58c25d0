use reqwest::{Client, StatusCode};
use serde_json::json;
use thiserror::Error;

use crate::transcript::Turn;

/// Substituted when a successful response lacks the expected content field.
pub const NO_RESPONSE_PLACEHOLDER: &str = "[No response]";

#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("endpoint returned {status}: {body}")]
    Status { status: StatusCode, body: String },
    #[error("malformed response body: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Send the full transcript to the completion endpoint and return the
/// assistant's message text.
///
/// The endpoint is stateless: every call carries the entire history. The body
/// is `{ "messages": [ {role, content}, ... ] }` with no auth header; the
/// expected response shape is `{ "choices": [ { "message": { "content" } } ] }`.
/// A well-formed response without that field degrades to
/// [`NO_RESPONSE_PLACEHOLDER`] rather than an error.
pub async fn request_completion(
    client: &Client,
    endpoint: &str,
    turns: &[Turn],
) -> Result<String, CompletionError> {
    let messages: Vec<serde_json::Value> = turns
        .iter()
        .map(|turn| {
            json!({
                "role": turn.role_str(),
                "content": turn.content(),
            })
        })
        .collect();

    let response = client
        .post(endpoint)
        .header("content-type", "application/json")
        .json(&json!({ "messages": messages }))
        .send()
        .await?;

    if !response.status().is_success() {
        let status = response.status();
        let body = match response.text().await {
            Ok(text) => text,
            Err(e) => format!("<failed to read error body: {e}>"),
        };
        return Err(CompletionError::Status { status, body });
    }

    let body = response.text().await?;
    let value: serde_json::Value = serde_json::from_str(&body)?;

    let content = value["choices"][0]["message"]["content"]
        .as_str()
        .unwrap_or(NO_RESPONSE_PLACEHOLDER);
    Ok(content.to_string())
}
