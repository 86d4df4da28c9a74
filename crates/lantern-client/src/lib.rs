//! Client-side consumer for the lantern answer stream.
//!
//! Reads the multiplexed `data: <json>` event stream produced by the
//! pipeline, reassembles logical events across arbitrary chunk boundaries,
//! and drives an explicit session state machine
//! (`Idle → SourcesKnown → StreamingAnswer → Complete`).

/// End-to-end HTTP consumer.
pub mod client;
/// Incremental event decoding over arbitrary chunk boundaries.
pub mod decoder;
/// Session state machine and the finalized session record.
pub mod session;

pub use client::{ClientError, SearchChatClient};
pub use decoder::EventStreamDecoder;
pub use session::{ConsumerError, SearchSession, SessionConsumer, SessionPhase};
