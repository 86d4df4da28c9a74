use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::answer::AnswerStream;
use crate::errors::PipelineError;
use crate::event::StreamEvent;
use crate::prompt::synthesis_prompt;
use crate::provider::{ChatMessage, CompletionProvider, CompletionRequest};
use crate::related::generate_related_questions;
use crate::search::SearchProvider;

/// Behavior options for one pipeline instance.
#[derive(Clone, Debug)]
pub struct PipelineOptions {
    /// Bounded event buffer size between the pipeline task and the consumer.
    pub stream_buffer_capacity: usize,
    /// Sampling temperature for answer synthesis.
    pub answer_temperature: f32,
    /// Token budget for answer synthesis.
    pub answer_max_tokens: u32,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            stream_buffer_capacity: 128,
            answer_temperature: 0.3,
            answer_max_tokens: 2000,
        }
    }
}

/// The streaming retrieval-augmented answer pipeline.
///
/// One invocation turns a query into an ordered event stream: a `sources`
/// event (possibly empty), zero or more `content` deltas in generation order,
/// and a terminal `related_questions` event. Invocations are fully isolated;
/// nothing is shared between concurrent streams except the providers, which
/// hold no per-invocation state.
pub struct SearchChatPipeline {
    search: Arc<dyn SearchProvider>,
    completion: Arc<dyn CompletionProvider>,
    options: PipelineOptions,
}

impl SearchChatPipeline {
    /// Creates a pipeline over the given providers with default options.
    pub fn new(search: Arc<dyn SearchProvider>, completion: Arc<dyn CompletionProvider>) -> Self {
        Self {
            search,
            completion,
            options: PipelineOptions::default(),
        }
    }

    /// Overrides the pipeline options.
    pub fn with_options(mut self, options: PipelineOptions) -> Self {
        self.options = options;
        self
    }

    /// Validates the query and starts one streaming invocation.
    ///
    /// The returned stream yields events in emission order and is always
    /// properly terminated: the channel closes after the terminal
    /// `related_questions` or `error` event on every path.
    pub fn stream(&self, query: impl Into<String>) -> Result<PipelineStream, PipelineError> {
        let query = query.into();
        if query.trim().is_empty() {
            return Err(PipelineError::EmptyQuery);
        }
        let (tx, rx) = mpsc::channel(self.options.stream_buffer_capacity);
        tokio::spawn(pipeline_task(
            self.search.clone(),
            self.completion.clone(),
            self.options.clone(),
            query,
            tx,
        ));
        Ok(PipelineStream { rx })
    }
}

/// Ordered event stream for one pipeline invocation.
pub struct PipelineStream {
    rx: mpsc::Receiver<StreamEvent>,
}

impl PipelineStream {
    /// Waits for and returns the next event.
    ///
    /// Returns `None` after the stream has closed.
    pub async fn next_event(&mut self) -> Option<StreamEvent> {
        self.rx.recv().await
    }
}

impl futures::Stream for PipelineStream {
    type Item = StreamEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.rx.poll_recv(cx)
    }
}

async fn pipeline_task(
    search: Arc<dyn SearchProvider>,
    completion: Arc<dyn CompletionProvider>,
    options: PipelineOptions,
    query: String,
    tx: mpsc::Sender<StreamEvent>,
) {
    let invocation_id = uuid::Uuid::new_v4();
    debug!(%invocation_id, query_len = query.len(), "pipeline invocation started");

    // Search failures degrade to "no sources"; synthesis still runs.
    let sources = match search.search(&query).await {
        Ok(results) => results,
        Err(error) => {
            warn!(%invocation_id, %error, "search failed, continuing without sources");
            Vec::new()
        }
    };
    debug!(%invocation_id, source_count = sources.len(), "sources resolved");

    let prompt = synthesis_prompt(&query, &sources);
    if !send_event(&tx, StreamEvent::Sources { sources }).await {
        debug!(%invocation_id, "consumer dropped before sources were sent");
        return;
    }

    let request = CompletionRequest::new(vec![ChatMessage::user(prompt)])
        .temperature(options.answer_temperature)
        .max_tokens(options.answer_max_tokens);
    let deltas = match completion.start_stream(request).await {
        Ok(deltas) => deltas,
        Err(error) => {
            warn!(%invocation_id, %error, "answer stream could not be opened");
            let _ = send_event(
                &tx,
                StreamEvent::Error {
                    message: error.message().to_string(),
                },
            )
            .await;
            return;
        }
    };

    let mut answer = AnswerStream::new(deltas);
    while let Some(delta) = answer.next_delta().await {
        if !send_event(&tx, StreamEvent::Content { content: delta }).await {
            debug!(%invocation_id, "consumer dropped mid-answer, aborting invocation");
            return;
        }
    }
    debug!(
        %invocation_id,
        answer_len = answer.accumulated().len(),
        "answer stream complete"
    );

    let questions = generate_related_questions(completion.as_ref(), &query, answer.accumulated()).await;
    let _ = send_event(&tx, StreamEvent::RelatedQuestions { questions }).await;
    debug!(%invocation_id, "pipeline invocation finished");
}

async fn send_event(tx: &mpsc::Sender<StreamEvent>, event: StreamEvent) -> bool {
    tx.send(event).await.is_ok()
}
