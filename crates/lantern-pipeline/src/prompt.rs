//! Deterministic prompt composition.
//!
//! Identical inputs always produce byte-identical prompts (no randomness, no
//! timestamps), which is what makes the synthesis step snapshot-testable.

use crate::provider::{ChatMessage, ChatRole};
use crate::search::SearchResult;

/// Maximum number of answer characters carried into the follow-up prompt.
pub const ANSWER_CONTEXT_CHARS: usize = 1000;

/// Renders the single synthesis prompt for a query and its ordered sources.
///
/// Each result is rendered as `[index] title\ncontent\nURL: url` so the model
/// can cite by bracketed index; index + 1 matches the citation number shown
/// to the user.
pub fn synthesis_prompt(query: &str, results: &[SearchResult]) -> String {
    let context = results
        .iter()
        .enumerate()
        .map(|(index, result)| {
            format!(
                "[{}] {}\n{}\nURL: {}",
                index + 1,
                result.title,
                result.content,
                result.url
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        "You are an AI search assistant that provides comprehensive, accurate answers with proper citations.\n\
         \n\
         CRITICAL INSTRUCTIONS:\n\
         - Provide a detailed, well-structured answer using the search results\n\
         - Use numbered citations [1], [2], etc. throughout your response to reference sources\n\
         - Structure your answer with clear sections and headings when appropriate\n\
         - Be comprehensive but concise\n\
         - Maintain a professional, helpful tone\n\
         - Focus on accuracy and cite specific sources for claims\n\
         \n\
         Search Results:\n\
         {context}\n\
         \n\
         User Question: {query}\n\
         \n\
         Provide a comprehensive answer with proper citations:"
    )
}

/// Builds the message pair for the non-streaming follow-up question call.
///
/// The accumulated answer is truncated to its first [`ANSWER_CONTEXT_CHARS`]
/// characters to bound prompt size.
pub fn related_questions_messages(query: &str, answer: &str) -> Vec<ChatMessage> {
    let prefix: String = answer.chars().take(ANSWER_CONTEXT_CHARS).collect();
    vec![
        ChatMessage {
            role: ChatRole::System,
            content: "Generate 4 related follow-up questions based on the user's original query \
                      and the content provided. Return only the questions, one per line, without \
                      numbering or bullet points."
                .into(),
        },
        ChatMessage {
            role: ChatRole::User,
            content: format!("Original query: {query}\n\nContent: {prefix}"),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(n: usize) -> SearchResult {
        SearchResult {
            title: format!("title {n}"),
            url: format!("https://example.com/{n}"),
            content: format!("content {n}"),
            engine: "google".into(),
        }
    }

    #[test]
    fn synthesis_prompt_is_deterministic() {
        let results = vec![result(1), result(2)];
        let a = synthesis_prompt("quantum computing", &results);
        let b = synthesis_prompt("quantum computing", &results);
        assert_eq!(a, b);
    }

    #[test]
    fn synthesis_prompt_numbers_sources_in_order() {
        let results = vec![result(1), result(2), result(3)];
        let prompt = synthesis_prompt("q", &results);
        let one = prompt.find("[1] title 1").expect("first source");
        let two = prompt.find("[2] title 2").expect("second source");
        let three = prompt.find("[3] title 3").expect("third source");
        assert!(one < two && two < three);
        assert!(prompt.contains("URL: https://example.com/2"));
        assert!(prompt.contains("User Question: q"));
    }

    #[test]
    fn synthesis_prompt_with_no_sources_still_asks_the_question() {
        let prompt = synthesis_prompt("anything", &[]);
        assert!(prompt.contains("Search Results:\n\n"));
        assert!(prompt.contains("User Question: anything"));
    }

    #[test]
    fn related_messages_truncate_answer_prefix() {
        let long_answer = "x".repeat(5000);
        let messages = related_questions_messages("q", &long_answer);
        assert_eq!(messages.len(), 2);
        let user = &messages[1].content;
        let content_part = user.split("Content: ").nth(1).expect("content part");
        assert_eq!(content_part.chars().count(), ANSWER_CONTEXT_CHARS);
    }

    #[test]
    fn related_messages_truncation_respects_char_boundaries() {
        let long_answer = "é".repeat(2000);
        let messages = related_questions_messages("q", &long_answer);
        let content_part = messages[1]
            .content
            .split("Content: ")
            .nth(1)
            .expect("content part");
        assert_eq!(content_part.chars().count(), ANSWER_CONTEXT_CHARS);
    }
}
