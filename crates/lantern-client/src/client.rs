use std::time::Duration;

use futures::StreamExt as _;
use tracing::debug;

use crate::decoder::EventStreamDecoder;
use crate::session::{SearchSession, SessionConsumer, SessionPhase};

/// Errors surfaced by the end-to-end client.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Invalid client configuration.
    #[error("config error: {0}")]
    Config(String),
    /// The submitted query was rejected by the server.
    #[error("query rejected: {0}")]
    QueryRejected(String),
    /// The server failed before the stream opened.
    #[error("server error: {0}")]
    Server(String),
    /// The request could not be sent or the stream could not be read.
    #[error("transport error: {0}")]
    Transport(String),
    /// The stream opened but ended without any usable session.
    #[error("stream failed: {0}")]
    StreamFailed(String),
}

#[derive(Debug, serde::Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: String,
}

/// End-to-end consumer: submits a query and reconstructs the session from the
/// multiplexed stream.
pub struct SearchChatClient {
    http: reqwest::Client,
    endpoint: String,
}

impl SearchChatClient {
    /// Creates a client for the given search-chat endpoint.
    pub fn new(endpoint: impl Into<String>) -> Result<Self, ClientError> {
        let endpoint = endpoint.into();
        if endpoint.trim().is_empty() {
            return Err(ClientError::Config("endpoint must not be empty".into()));
        }
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| ClientError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { http, endpoint })
    }

    /// Runs one query to completion and returns the finalized session.
    ///
    /// A connection drop after content started arriving degrades to a short
    /// answer rather than an error.
    pub async fn run_query(&self, query: &str) -> Result<SearchSession, ClientError> {
        let mut consumer = SessionConsumer::new();
        consumer
            .begin(query)
            .map_err(|e| ClientError::QueryRejected(e.to_string()))?;

        let response = self
            .http
            .post(&self.endpoint)
            .json(&serde_json::json!({ "query": query }))
            .send()
            .await
            .map_err(|e| ClientError::Transport(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_error_response(status, &body));
        }

        let mut decoder = EventStreamDecoder::default();
        let mut bytes = response.bytes_stream();
        while let Some(chunk) = bytes.next().await {
            match chunk {
                Ok(chunk) => {
                    for event in decoder.push_chunk(&chunk) {
                        consumer.apply(event);
                    }
                    if consumer.phase() == SessionPhase::Complete {
                        break;
                    }
                }
                Err(error) => {
                    debug!(%error, "stream read failed, keeping partial session");
                    break;
                }
            }
        }
        consumer.end_of_stream();

        if let Some(session) = consumer.take_session() {
            return Ok(session);
        }
        Err(ClientError::StreamFailed(
            consumer
                .last_error()
                .unwrap_or("stream ended before any content")
                .to_string(),
        ))
    }
}

/// Maps a non-2xx response to a typed error.
///
/// The server sends `{"error": "..."}` bodies; anything else falls back to
/// the bare status line. 400 means the query itself was rejected.
fn classify_error_response(status: reqwest::StatusCode, body: &str) -> ClientError {
    let message = serde_json::from_str::<ErrorBody>(body)
        .map(|b| b.error)
        .ok()
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| format!("status {status}"));
    if status.as_u16() == 400 {
        ClientError::QueryRejected(message)
    } else {
        ClientError::Server(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn bad_request_with_error_body_maps_to_query_rejected() {
        let error =
            classify_error_response(StatusCode::BAD_REQUEST, r#"{"error":"Query is required"}"#);
        assert!(matches!(
            error,
            ClientError::QueryRejected(message) if message == "Query is required"
        ));
    }

    #[test]
    fn server_fault_with_error_body_maps_to_server_error() {
        let error = classify_error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            r#"{"error":"config error: missing SEARXNG_URL for the search provider"}"#,
        );
        assert!(matches!(
            error,
            ClientError::Server(message) if message.contains("SEARXNG_URL")
        ));
    }

    #[test]
    fn non_json_body_falls_back_to_the_status_line() {
        let error = classify_error_response(StatusCode::BAD_GATEWAY, "<html>upstream down</html>");
        assert!(matches!(
            error,
            ClientError::Server(message) if message.contains("502")
        ));
    }

    #[test]
    fn empty_error_field_falls_back_to_the_status_line() {
        let error = classify_error_response(StatusCode::BAD_REQUEST, r#"{"error":""}"#);
        assert!(matches!(
            error,
            ClientError::QueryRejected(message) if message.contains("400")
        ));
    }
}
