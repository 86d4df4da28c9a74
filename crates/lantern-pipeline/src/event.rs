use crate::search::SearchResult;

/// Wire-level events multiplexed onto the outbound answer stream.
///
/// Within one invocation: a `sources` event, if present, precedes all
/// `content` events; `related_questions`, if present, is terminal; `content`
/// may repeat any number of times including zero; the non-content variants
/// appear at most once.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    /// The normalized search results, in citation order.
    Sources { sources: Vec<SearchResult> },
    /// An incremental fragment of answer text (append-only).
    Content { content: String },
    /// Terminal event carrying up to four follow-up questions.
    RelatedQuestions { questions: Vec<String> },
    /// Terminal failure notification.
    Error { message: String },
}

impl StreamEvent {
    /// Renders the event as a server-sent-event frame: `data: <json>\n\n`.
    pub fn encode_frame(&self) -> String {
        let json = serde_json::to_string(self)
            .expect("stream event serialization should be infallible");
        format!("data: {json}\n\n")
    }
}
