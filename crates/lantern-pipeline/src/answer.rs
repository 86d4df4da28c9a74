use futures::StreamExt as _;
use tracing::warn;

use crate::provider::DeltaStream;

/// Streaming answer with a running accumulation of everything emitted so far.
///
/// The accumulated text is what the follow-up question generator consumes
/// once the stream ends. A transport failure after the stream has opened is
/// an accepted lossy degrade: the stream simply ends early and whatever text
/// arrived stands as the answer.
pub struct AnswerStream {
    deltas: DeltaStream,
    accumulated: String,
    ended: bool,
}

impl AnswerStream {
    /// Wraps a provider delta stream.
    pub fn new(deltas: DeltaStream) -> Self {
        Self {
            deltas,
            accumulated: String::new(),
            ended: false,
        }
    }

    /// Waits for and returns the next answer fragment.
    ///
    /// Returns `None` once the stream has ended, naturally or through a
    /// mid-stream transport failure.
    pub async fn next_delta(&mut self) -> Option<String> {
        if self.ended {
            return None;
        }
        loop {
            match self.deltas.next().await {
                Some(Ok(text)) => {
                    if text.is_empty() {
                        continue;
                    }
                    self.accumulated.push_str(&text);
                    return Some(text);
                }
                Some(Err(error)) => {
                    warn!(%error, "answer stream dropped mid-generation, keeping partial text");
                    self.ended = true;
                    return None;
                }
                None => {
                    self.ended = true;
                    return None;
                }
            }
        }
    }

    /// Returns the concatenation of every delta emitted so far.
    pub fn accumulated(&self) -> &str {
        &self.accumulated
    }

    /// Consumes the stream handle and returns the accumulated answer text.
    pub fn into_text(self) -> String {
        self.accumulated
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::CompletionError;
    use futures::stream;

    fn answer_stream(items: Vec<Result<String, CompletionError>>) -> AnswerStream {
        AnswerStream::new(Box::pin(stream::iter(items)))
    }

    #[tokio::test]
    async fn accumulates_deltas_in_emission_order() {
        let mut stream = answer_stream(vec![
            Ok("The ".into()),
            Ok("answer".into()),
            Ok(".".into()),
        ]);
        let mut collected = String::new();
        while let Some(delta) = stream.next_delta().await {
            collected.push_str(&delta);
        }
        assert_eq!(collected, "The answer.");
        assert_eq!(stream.into_text(), "The answer.");
    }

    #[tokio::test]
    async fn mid_stream_error_ends_early_with_partial_text() {
        let mut stream = answer_stream(vec![
            Ok("partial".into()),
            Err(CompletionError::transport("connection reset")),
            Ok("never seen".into()),
        ]);
        assert_eq!(stream.next_delta().await.as_deref(), Some("partial"));
        assert_eq!(stream.next_delta().await, None);
        assert_eq!(stream.next_delta().await, None);
        assert_eq!(stream.accumulated(), "partial");
    }

    #[tokio::test]
    async fn empty_deltas_are_dropped() {
        let mut stream = answer_stream(vec![Ok(String::new()), Ok("x".into())]);
        assert_eq!(stream.next_delta().await.as_deref(), Some("x"));
        assert_eq!(stream.next_delta().await, None);
    }
}
