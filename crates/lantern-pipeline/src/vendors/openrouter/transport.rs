//! Incremental decoding of OpenRouter's line-oriented streaming protocol.
//!
//! The upstream body is a sequence of `data: <json>` lines terminated by a
//! `data: [DONE]` sentinel. Chunk boundaries are arbitrary, so complete lines
//! are carved out of a carry-over byte buffer and any trailing partial line
//! waits for the next chunk.

/// Splits arbitrary byte chunks into complete lines.
#[derive(Default)]
pub(crate) struct SseLineDecoder {
    buf: Vec<u8>,
}

impl SseLineDecoder {
    pub fn push_chunk(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buf.extend_from_slice(chunk);
        let mut lines = Vec::new();
        while let Some(idx) = self.buf.iter().position(|&b| b == b'\n') {
            let line_bytes: Vec<u8> = self.buf.drain(..=idx).collect();
            let line = String::from_utf8_lossy(&line_bytes);
            lines.push(line.trim_end_matches(['\n', '\r']).to_string());
        }
        lines
    }
}

/// Outcome of interpreting one complete stream line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum LinePayload {
    /// A non-empty answer text fragment.
    Delta(String),
    /// The end-of-stream sentinel.
    Done,
    /// Anything else: blank lines, comments, empty deltas, malformed JSON.
    Skip,
}

/// Interprets one line of the chat-completions stream.
///
/// Lines without the `data:` marker and lines whose payload fails to parse
/// as JSON are skipped, not fatal.
pub(crate) fn parse_stream_line(line: &str) -> LinePayload {
    let Some(payload) = line
        .strip_prefix("data: ")
        .or_else(|| line.strip_prefix("data:"))
    else {
        return LinePayload::Skip;
    };
    let payload = payload.trim();
    if payload == "[DONE]" {
        return LinePayload::Done;
    }
    let Ok(value) = serde_json::from_str::<serde_json::Value>(payload) else {
        return LinePayload::Skip;
    };
    match value
        .get("choices")
        .and_then(|v| v.get(0))
        .and_then(|v| v.get("delta"))
        .and_then(|v| v.get("content"))
        .and_then(|v| v.as_str())
    {
        Some(text) if !text.is_empty() => LinePayload::Delta(text.to_string()),
        _ => LinePayload::Skip,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn delta_line(text: &str) -> String {
        format!(r#"data: {{"choices":[{{"delta":{{"content":"{text}"}}}}]}}"#)
    }

    #[test]
    fn decoder_handles_partial_chunk_boundaries() {
        let mut decoder = SseLineDecoder::default();
        let lines = decoder.push_chunk(b"data: {\"typ");
        assert!(lines.is_empty());
        let lines = decoder.push_chunk(b"e\":\"x\"}\n\n");
        assert_eq!(lines, vec!["data: {\"type\":\"x\"}".to_string(), String::new()]);
    }

    #[test]
    fn decoder_splits_multiple_lines_in_one_chunk() {
        let mut decoder = SseLineDecoder::default();
        let chunk = format!("{}\n\n{}\n\n", delta_line("a"), delta_line("b"));
        let lines = decoder.push_chunk(chunk.as_bytes());
        assert_eq!(lines.len(), 4);
        assert_eq!(parse_stream_line(&lines[0]), LinePayload::Delta("a".into()));
        assert_eq!(parse_stream_line(&lines[2]), LinePayload::Delta("b".into()));
    }

    #[test]
    fn decoder_strips_carriage_returns() {
        let mut decoder = SseLineDecoder::default();
        let lines = decoder.push_chunk(b"data: [DONE]\r\n");
        assert_eq!(parse_stream_line(&lines[0]), LinePayload::Done);
    }

    #[test]
    fn decoder_does_not_corrupt_multibyte_sequences_split_across_chunks() {
        let mut decoder = SseLineDecoder::default();
        let line = delta_line("héllo");
        let bytes = line.as_bytes();
        // Split inside the two-byte encoding of 'é'.
        let split = line.find('é').expect("é present") + 1;
        assert!(decoder.push_chunk(&bytes[..split]).is_empty());
        let lines = decoder.push_chunk(&[&bytes[split..], b"\n"].concat());
        assert_eq!(
            parse_stream_line(&lines[0]),
            LinePayload::Delta("héllo".into())
        );
    }

    #[test]
    fn malformed_json_lines_are_skipped_not_fatal() {
        assert_eq!(parse_stream_line("data: {not json"), LinePayload::Skip);
        assert_eq!(parse_stream_line(": comment"), LinePayload::Skip);
        assert_eq!(parse_stream_line(""), LinePayload::Skip);
    }

    #[test]
    fn empty_delta_content_is_skipped() {
        assert_eq!(parse_stream_line(&delta_line("")), LinePayload::Skip);
        assert_eq!(
            parse_stream_line(r#"data: {"choices":[{"delta":{}}]}"#),
            LinePayload::Skip
        );
    }

    #[test]
    fn data_prefix_without_space_is_accepted() {
        let line = r#"data:{"choices":[{"delta":{"content":"x"}}]}"#;
        assert_eq!(parse_stream_line(line), LinePayload::Delta("x".into()));
    }
}
