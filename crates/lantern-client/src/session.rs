use chrono::{DateTime, Utc};

use lantern_pipeline::{SearchResult, StreamEvent};

/// Durable record of one completed query/answer round-trip.
///
/// Owned exclusively by the client; never sent back to the server.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SearchSession {
    pub query: String,
    pub answer: String,
    pub sources: Vec<SearchResult>,
    pub related_questions: Vec<String>,
    pub completed_at: DateTime<Utc>,
}

/// Observable phase of the consumer state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionPhase {
    /// No query in flight; submit is enabled.
    Idle,
    /// A query was submitted; waiting for or holding sources.
    SourcesKnown,
    /// Answer content is arriving.
    StreamingAnswer,
    /// The terminal event arrived and a session record was finalized.
    Complete,
}

/// Errors surfaced by the consumer API.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConsumerError {
    /// A new query was submitted while one is already in flight.
    #[error("a query is already in flight")]
    SubmitRejected,
    /// The stream reported a terminal error.
    #[error("stream failed: {0}")]
    StreamFailed(String),
}

/// Client-side state machine over the multiplexed answer stream.
///
/// Transitions mirror the producer: `Idle → SourcesKnown → StreamingAnswer →
/// Complete`. Submitting while a query is in flight is rejected so two
/// streams can never interleave into one accumulator. The answer accumulator
/// is append-only; it is cleared only when a session record is finalized.
pub struct SessionConsumer {
    phase: SessionPhase,
    query: String,
    answer: String,
    sources: Vec<SearchResult>,
    session: Option<SearchSession>,
    error: Option<String>,
}

impl SessionConsumer {
    /// Creates an idle consumer.
    pub fn new() -> Self {
        Self {
            phase: SessionPhase::Idle,
            query: String::new(),
            answer: String::new(),
            sources: Vec::new(),
            session: None,
            error: None,
        }
    }

    /// Returns the current phase.
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// True when a new query may be submitted.
    pub fn can_submit(&self) -> bool {
        matches!(self.phase, SessionPhase::Idle | SessionPhase::Complete)
    }

    /// Returns the live-growing answer text for in-flight rendering.
    pub fn answer_in_progress(&self) -> &str {
        &self.answer
    }

    /// Returns the sources known so far.
    pub fn sources(&self) -> &[SearchResult] {
        &self.sources
    }

    /// Returns the last stream failure message, if any.
    pub fn last_error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Starts consuming a new query's stream.
    ///
    /// Rejected while a query is in flight; accepting it would interleave two
    /// streams into one accumulator.
    pub fn begin(&mut self, query: impl Into<String>) -> Result<(), ConsumerError> {
        if !self.can_submit() {
            return Err(ConsumerError::SubmitRejected);
        }
        self.phase = SessionPhase::SourcesKnown;
        self.query = query.into();
        self.answer.clear();
        self.sources.clear();
        self.session = None;
        self.error = None;
        Ok(())
    }

    /// Applies one decoded stream event.
    pub fn apply(&mut self, event: StreamEvent) {
        match event {
            StreamEvent::Sources { sources } => {
                if self.phase == SessionPhase::Idle || self.phase == SessionPhase::Complete {
                    // Tolerated out-of-band event; nothing is in flight.
                    return;
                }
                self.sources = sources;
                self.phase = SessionPhase::SourcesKnown;
            }
            StreamEvent::Content { content } => {
                if self.phase == SessionPhase::Idle || self.phase == SessionPhase::Complete {
                    return;
                }
                self.answer.push_str(&content);
                self.phase = SessionPhase::StreamingAnswer;
            }
            StreamEvent::RelatedQuestions { questions } => {
                if self.phase == SessionPhase::Idle || self.phase == SessionPhase::Complete {
                    return;
                }
                self.finalize(questions);
            }
            StreamEvent::Error { message } => {
                // Whole-stream failure: surface it and re-enable input.
                self.error = Some(message);
                self.phase = SessionPhase::Idle;
                self.answer.clear();
                self.sources.clear();
            }
        }
    }

    /// Handles end-of-stream.
    ///
    /// A stream that ends while content was arriving is finalized with
    /// whatever arrived (accepted short answer); a stream that ends before
    /// any terminal event without content returns the consumer to idle.
    pub fn end_of_stream(&mut self) {
        match self.phase {
            SessionPhase::StreamingAnswer => self.finalize(Vec::new()),
            SessionPhase::SourcesKnown => {
                self.phase = SessionPhase::Idle;
                self.sources.clear();
            }
            SessionPhase::Idle | SessionPhase::Complete => {}
        }
    }

    /// Takes the finalized session record, leaving the consumer idle.
    pub fn take_session(&mut self) -> Option<SearchSession> {
        let session = self.session.take();
        if session.is_some() {
            self.phase = SessionPhase::Idle;
        }
        session
    }

    fn finalize(&mut self, related_questions: Vec<String>) {
        self.session = Some(SearchSession {
            query: std::mem::take(&mut self.query),
            answer: std::mem::take(&mut self.answer),
            sources: std::mem::take(&mut self.sources),
            related_questions,
            completed_at: Utc::now(),
        });
        self.phase = SessionPhase::Complete;
    }
}

impl Default for SessionConsumer {
    fn default() -> Self {
        Self::new()
    }
}
