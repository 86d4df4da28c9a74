use std::collections::VecDeque;
use std::pin::Pin;

use futures::StreamExt as _;
use futures::stream;
use tracing::debug;

use crate::errors::{CompletionError, PipelineError};
use crate::provider::{CompletionProvider, CompletionRequest, DeltaStream};

use super::config::OpenRouterConfig;
use super::transport::{LinePayload, SseLineDecoder, parse_stream_line};

type ByteStream =
    Pin<Box<dyn futures::Stream<Item = Result<bytes::Bytes, reqwest::Error>> + Send + 'static>>;

/// Completion provider for OpenRouter's chat-completions API.
pub struct OpenRouterClient {
    client: reqwest::Client,
    config: OpenRouterConfig,
}

impl OpenRouterClient {
    /// Creates a client from explicit configuration.
    pub fn new(config: OpenRouterConfig) -> Result<Self, PipelineError> {
        if config.api_key.trim().is_empty() {
            return Err(PipelineError::Config(
                "OpenRouter client config api_key must not be empty".into(),
            ));
        }
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| {
                PipelineError::Config(format!("failed to build OpenRouter client: {e}"))
            })?;
        Ok(Self { client, config })
    }

    /// Creates a client using `OPENROUTER_API_KEY`.
    pub fn from_env() -> Result<Self, PipelineError> {
        Self::new(OpenRouterConfig::from_env()?)
    }

    fn request_builder(&self, body: &serde_json::Value) -> reqwest::RequestBuilder {
        let mut builder = self
            .client
            .post(self.config.chat_completions_url())
            .bearer_auth(&self.config.api_key)
            .json(body);
        if let Some(referer) = self.config.referer.as_deref() {
            builder = builder.header("HTTP-Referer", referer);
        }
        if let Some(title) = self.config.app_title.as_deref() {
            builder = builder.header("X-Title", title);
        }
        builder
    }

    async fn send_checked(
        &self,
        body: &serde_json::Value,
    ) -> Result<reqwest::Response, CompletionError> {
        let response = self
            .request_builder(body)
            .send()
            .await
            .map_err(|e| CompletionError::transport(format!("OpenRouter request failed: {e}")))?;
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(CompletionError::provider(
                format!("OpenRouter request failed with status {status}: {body}"),
                Some(status.as_u16()),
            ));
        }
        Ok(response)
    }
}

pub(crate) fn build_request_body(
    config: &OpenRouterConfig,
    request: &CompletionRequest,
    stream: bool,
) -> serde_json::Value {
    serde_json::json!({
        "model": config.model,
        "messages": request.messages,
        "stream": stream,
        "temperature": request.temperature,
        "max_tokens": request.max_tokens,
    })
}

#[derive(Debug, serde::Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, serde::Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, serde::Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: String,
}

#[async_trait::async_trait]
impl CompletionProvider for OpenRouterClient {
    async fn start_stream(
        &self,
        request: CompletionRequest,
    ) -> Result<DeltaStream, CompletionError> {
        let body = build_request_body(&self.config, &request, true);
        debug!(model = %self.config.model, "starting OpenRouter completion stream");
        let response = self.send_checked(&body).await?;
        let bytes_stream: ByteStream = Box::pin(response.bytes_stream());
        Ok(Box::pin(delta_stream(bytes_stream)))
    }

    async fn complete(&self, request: CompletionRequest) -> Result<String, CompletionError> {
        let body = build_request_body(&self.config, &request, false);
        debug!(model = %self.config.model, "running OpenRouter completion");
        let response = self.send_checked(&body).await?;
        let payload: ChatCompletionResponse = response.json().await.map_err(|e| {
            CompletionError::protocol(format!("OpenRouter completion undecodable: {e}"))
        })?;
        let content = payload
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| CompletionError::protocol("OpenRouter completion had no choices"))?;
        Ok(content)
    }
}

fn delta_stream(
    bytes_stream: ByteStream,
) -> impl futures::Stream<Item = Result<String, CompletionError>> + Send {
    struct State {
        bytes_stream: ByteStream,
        decoder: SseLineDecoder,
        pending: VecDeque<String>,
        done: bool,
    }

    stream::try_unfold(
        State {
            bytes_stream,
            decoder: SseLineDecoder::default(),
            pending: VecDeque::new(),
            done: false,
        },
        |mut state| async move {
            loop {
                if let Some(delta) = state.pending.pop_front() {
                    return Ok(Some((delta, state)));
                }
                if state.done {
                    return Ok(None);
                }

                match state.bytes_stream.next().await {
                    Some(Ok(chunk)) => {
                        for line in state.decoder.push_chunk(&chunk) {
                            match parse_stream_line(&line) {
                                LinePayload::Delta(text) => state.pending.push_back(text),
                                LinePayload::Done => state.done = true,
                                LinePayload::Skip => {}
                            }
                        }
                    }
                    Some(Err(e)) => {
                        return Err(CompletionError::transport(format!(
                            "OpenRouter streaming read failed: {e}"
                        )));
                    }
                    None => {
                        state.done = true;
                    }
                }
            }
        },
    )
}
