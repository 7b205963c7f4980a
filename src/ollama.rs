//! Inference gateway: the Ollama chat API and the streamed relay.
//!
//! Issues one POST to the backend per inbound chat call and forwards the
//! streamed response body, chunk by chunk, through a bounded channel. All
//! failures (non-200 status, connect errors, mid-stream disconnects) are
//! reported in-band as a terminal [`RelayEvent::Failed`], never as a panic or
//! an error escaping the relay task: by the time the backend status is known
//! the response to the inbound caller is already committed to streaming.

use std::sync::Arc;

use bytes::Bytes;
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::config::Config;

/// One role/content pair of the backend conversation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Request body for POST /api/chat.
#[derive(Debug, Serialize)]
struct ChatPayload<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    options: DecodingOptions,
    stream: bool,
}

/// Fixed decoding options, named as the Ollama wire expects them.
#[derive(Debug, Serialize)]
struct DecodingOptions {
    num_predict: u32,
    num_ctx: usize,
    temperature: f64,
}

impl DecodingOptions {
    fn from_config(config: &Config) -> Self {
        Self {
            num_predict: config.backend.max_tokens,
            num_ctx: config.backend.context_size,
            temperature: config.backend.temperature,
        }
    }
}

/// One unit of relay output. `Failed` is always the last event on a channel:
/// the producer drops its sender immediately after sending it.
#[derive(Debug)]
pub enum RelayEvent {
    /// A verbatim chunk of the backend response body.
    Chunk(Bytes),
    /// Terminal failure description.
    Failed(String),
}

/// Open one backend chat request and relay its streamed body.
///
/// Returns immediately; the request itself runs on a spawned task that feeds
/// the receiver. The chunk sequence is finite (ends when the backend closes
/// its body) and not restartable: each call is one fresh backend request.
pub fn stream_chat(
    client: reqwest::Client,
    config: Arc<Config>,
    model: String,
    messages: Vec<ChatMessage>,
    request_id: String,
) -> mpsc::Receiver<RelayEvent> {
    let (tx, rx) = mpsc::channel(32);
    tokio::spawn(async move {
        relay(client, config, model, messages, request_id, tx).await;
    });
    rx
}

async fn relay(
    client: reqwest::Client,
    config: Arc<Config>,
    model: String,
    messages: Vec<ChatMessage>,
    request_id: String,
    tx: mpsc::Sender<RelayEvent>,
) {
    let url = config.backend_chat_url();
    let payload = ChatPayload {
        model: &model,
        messages: &messages,
        options: DecodingOptions::from_config(&config),
        stream: true,
    };

    debug!(
        request_id,
        url = %url,
        messages = messages.len(),
        "Opening backend chat stream"
    );

    let response = match client.post(&url).json(&payload).send().await {
        Ok(response) => response,
        Err(e) => {
            warn!(request_id, error = %e, "Backend request failed");
            let _ = tx
                .send(RelayEvent::Failed(format!("Unexpected error: {e}")))
                .await;
            return;
        }
    };

    let status = response.status();
    if status != reqwest::StatusCode::OK {
        warn!(
            request_id,
            status = status.as_u16(),
            "Backend chat API returned non-success status"
        );
        let _ = tx
            .send(RelayEvent::Failed(format!(
                "Ollama chat API failed with status code {}",
                status.as_u16()
            )))
            .await;
        return;
    }

    let mut stream = response.bytes_stream();
    let mut forwarded = 0usize;

    while let Some(chunk) = stream.next().await {
        match chunk {
            Ok(bytes) => {
                forwarded += bytes.len();
                if tx.send(RelayEvent::Chunk(bytes)).await.is_err() {
                    // Caller disconnected; dropping the response cancels the
                    // backend request and returns the connection to the pool.
                    debug!(request_id, "Caller gone, aborting backend stream");
                    return;
                }
            }
            Err(e) => {
                warn!(request_id, error = %e, "Backend stream failed mid-relay");
                let _ = tx
                    .send(RelayEvent::Failed(format!("Unexpected error: {e}")))
                    .await;
                return;
            }
        }
    }

    debug!(request_id, bytes = forwarded, "Backend stream complete");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_constructors() {
        let system = ChatMessage::system("You are a helpful assistant.");
        assert_eq!(system.role, "system");
        let user = ChatMessage::user("hello");
        assert_eq!(user.role, "user");
        assert_eq!(user.content, "hello");
    }

    #[test]
    fn test_payload_wire_shape() {
        let config = Config::default();
        let messages = vec![ChatMessage::system("sys"), ChatMessage::user("hi")];
        let payload = ChatPayload {
            model: "phi3",
            messages: &messages,
            options: DecodingOptions::from_config(&config),
            stream: true,
        };

        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["model"], "phi3");
        assert_eq!(value["stream"], true);
        assert_eq!(value["messages"][0]["role"], "system");
        assert_eq!(value["messages"][1]["content"], "hi");
        assert_eq!(value["options"]["num_predict"], 1024);
        assert_eq!(value["options"]["num_ctx"], 4096);
        assert_eq!(value["options"]["temperature"], 0.8);
    }
}
