//! Streaming retrieval-augmented answer pipeline.
//!
//! One query in; one ordered event stream out: normalized web search results,
//! an incrementally generated citation-annotated answer, and up to four
//! follow-up questions. Vendor-specific APIs are namespaced under
//! `vendors::*`.
//!
//! # Usage
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use lantern_pipeline::{
//!     PipelineError, SearchChatPipeline, SearxngClient, SearxngConfig, StreamEvent,
//! };
//! use lantern_pipeline::vendors::openrouter::OpenRouterClient;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), PipelineError> {
//! let pipeline = SearchChatPipeline::new(
//!     Arc::new(SearxngClient::new(SearxngConfig::new("https://searx.example.com"))?),
//!     Arc::new(OpenRouterClient::from_env()?),
//! );
//!
//! let mut stream = pipeline.stream("quantum computing")?;
//! while let Some(event) = stream.next_event().await {
//!     if let StreamEvent::Content { content } = event {
//!         print!("{content}");
//!     }
//! }
//! # Ok(())
//! # }
//! ```

/// Streaming answer accumulation.
pub mod answer;
/// Public error types used by the pipeline API.
pub mod errors;
/// Wire-level multiplexed stream events.
pub mod event;
/// The event multiplexer driving one invocation.
pub mod pipeline;
/// Deterministic prompt composition.
pub mod prompt;
/// Completion provider contracts used by vendor integrations.
pub mod provider;
/// Best-effort follow-up question generation.
pub mod related;
/// Search provider contract and the SearXNG client.
pub mod search;
/// Vendor-specific completion integrations.
pub mod vendors;

pub use answer::AnswerStream;
pub use errors::{CompletionError, PipelineError, SearchError};
pub use event::StreamEvent;
pub use pipeline::{PipelineOptions, PipelineStream, SearchChatPipeline};
pub use provider::{ChatMessage, ChatRole, CompletionProvider, CompletionRequest, DeltaStream};
pub use related::{MAX_RELATED_QUESTIONS, generate_related_questions};
pub use search::{SearchProvider, SearchResult, SearxngClient, SearxngConfig};
