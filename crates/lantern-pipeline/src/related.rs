use tracing::warn;

use crate::prompt::related_questions_messages;
use crate::provider::{CompletionProvider, CompletionRequest};

/// Maximum number of follow-up questions surfaced to the client.
pub const MAX_RELATED_QUESTIONS: usize = 4;

/// Generates follow-up questions from the original query and the accumulated
/// answer text.
///
/// Best-effort: any failure (network, malformed response, empty result)
/// yields an empty list and never blocks or fails the pipeline.
pub async fn generate_related_questions(
    provider: &dyn CompletionProvider,
    query: &str,
    answer: &str,
) -> Vec<String> {
    let request = CompletionRequest::new(related_questions_messages(query, answer))
        .temperature(0.7)
        .max_tokens(200);
    match provider.complete(request).await {
        Ok(raw) => parse_questions(&raw),
        Err(error) => {
            warn!(%error, "related question generation failed, continuing without");
            Vec::new()
        }
    }
}

fn parse_questions(raw: &str) -> Vec<String> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .take(MAX_RELATED_QUESTIONS)
        .map(ToOwned::to_owned)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::CompletionError;
    use crate::provider::DeltaStream;

    struct FixedCompletion(Result<String, CompletionError>);

    #[async_trait::async_trait]
    impl CompletionProvider for FixedCompletion {
        async fn start_stream(
            &self,
            _request: CompletionRequest,
        ) -> Result<DeltaStream, CompletionError> {
            unreachable!("related question generation never streams")
        }

        async fn complete(&self, _request: CompletionRequest) -> Result<String, CompletionError> {
            self.0.clone()
        }
    }

    #[tokio::test]
    async fn splits_trims_and_caps_questions() {
        let provider = FixedCompletion(Ok(
            "  What is X?  \n\nHow does Y work?\nWhy Z?\nWhere W?\nExtra question?".into(),
        ));
        let questions = generate_related_questions(&provider, "q", "answer").await;
        assert_eq!(
            questions,
            vec!["What is X?", "How does Y work?", "Why Z?", "Where W?"]
        );
    }

    #[tokio::test]
    async fn provider_failure_degrades_to_empty_list() {
        let provider = FixedCompletion(Err(CompletionError::transport("unreachable")));
        let questions = generate_related_questions(&provider, "q", "answer").await;
        assert!(questions.is_empty());
    }

    #[tokio::test]
    async fn blank_response_degrades_to_empty_list() {
        let provider = FixedCompletion(Ok("   \n \n".into()));
        let questions = generate_related_questions(&provider, "q", "answer").await;
        assert!(questions.is_empty());
    }
}
