//! Incremental decoding of the multiplexed answer stream.
//!
//! Chunk boundaries on the wire are arbitrary: a logical `data: <json>` line
//! can arrive split across any number of reads. Incoming bytes are appended
//! to a rolling buffer, only complete lines are parsed, and any trailing
//! partial line is retained for the next chunk. Lines that do not carry the
//! `data:` marker or whose payload fails to parse are skipped, not fatal.

use tracing::debug;

use lantern_pipeline::StreamEvent;

/// Reassembles logical stream events from arbitrary byte chunks.
#[derive(Default)]
pub struct EventStreamDecoder {
    buf: Vec<u8>,
}

impl EventStreamDecoder {
    /// Appends a chunk and returns every event completed by it.
    pub fn push_chunk(&mut self, chunk: &[u8]) -> Vec<StreamEvent> {
        self.buf.extend_from_slice(chunk);
        let mut events = Vec::new();
        while let Some(idx) = self.buf.iter().position(|&b| b == b'\n') {
            let line_bytes: Vec<u8> = self.buf.drain(..=idx).collect();
            let line = String::from_utf8_lossy(&line_bytes);
            if let Some(event) = parse_event_line(line.trim_end_matches(['\n', '\r'])) {
                events.push(event);
            }
        }
        events
    }

    /// True when no partial line is pending.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }
}

fn parse_event_line(line: &str) -> Option<StreamEvent> {
    let payload = line
        .strip_prefix("data: ")
        .or_else(|| line.strip_prefix("data:"))?;
    match serde_json::from_str(payload.trim()) {
        Ok(event) => Some(event),
        Err(error) => {
            debug!(%error, "skipping unparseable stream line");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn complete_frame_decodes_to_one_event() {
        let mut decoder = EventStreamDecoder::default();
        let events = decoder.push_chunk(b"data: {\"type\":\"content\",\"content\":\"hi\"}\n\n");
        assert_eq!(
            events,
            vec![StreamEvent::Content {
                content: "hi".into()
            }]
        );
        assert!(decoder.is_empty());
    }

    #[test]
    fn frame_split_mid_line_reconstructs_one_event_not_two() {
        let mut decoder = EventStreamDecoder::default();
        let first = decoder.push_chunk(b"data: {\"typ");
        assert!(first.is_empty());
        let second = decoder.push_chunk(b"e\":\"content\",\"content\":\"joined\"}\n\n");
        assert_eq!(
            second,
            vec![StreamEvent::Content {
                content: "joined".into()
            }]
        );
    }

    #[test]
    fn unparseable_lines_are_skipped_without_losing_later_events() {
        let mut decoder = EventStreamDecoder::default();
        let events = decoder.push_chunk(
            b"data: {garbage\n\ndata: {\"type\":\"content\",\"content\":\"ok\"}\n\n",
        );
        assert_eq!(
            events,
            vec![StreamEvent::Content {
                content: "ok".into()
            }]
        );
    }

    #[test]
    fn non_data_lines_are_ignored() {
        let mut decoder = EventStreamDecoder::default();
        let events =
            decoder.push_chunk(b": keep-alive\n\ndata: {\"type\":\"related_questions\",\"questions\":[]}\n\n");
        assert_eq!(
            events,
            vec![StreamEvent::RelatedQuestions {
                questions: Vec::new()
            }]
        );
    }

    #[test]
    fn multiple_events_in_one_chunk_decode_in_order() {
        let mut decoder = EventStreamDecoder::default();
        let events = decoder.push_chunk(
            b"data: {\"type\":\"sources\",\"sources\":[]}\n\n\
              data: {\"type\":\"content\",\"content\":\"a\"}\n\n\
              data: {\"type\":\"content\",\"content\":\"b\"}\n\n",
        );
        assert_eq!(events.len(), 3);
        assert!(matches!(events[0], StreamEvent::Sources { .. }));
        assert_eq!(
            events[2],
            StreamEvent::Content {
                content: "b".into()
            }
        );
    }

    #[test]
    fn malformed_line_removal_yields_same_answer() {
        let with_garbage: &[u8] = b"data: {\"type\":\"content\",\"content\":\"x\"}\n\
                                    data: {bad\n\
                                    data: {\"type\":\"content\",\"content\":\"y\"}\n";
        let without_garbage: &[u8] = b"data: {\"type\":\"content\",\"content\":\"x\"}\n\
                                       data: {\"type\":\"content\",\"content\":\"y\"}\n";

        let answer = |input: &[u8]| {
            let mut decoder = EventStreamDecoder::default();
            decoder
                .push_chunk(input)
                .into_iter()
                .filter_map(|event| match event {
                    StreamEvent::Content { content } => Some(content),
                    _ => None,
                })
                .collect::<String>()
        };
        assert_eq!(answer(with_garbage), answer(without_garbage));
    }

    #[test]
    fn multibyte_character_split_across_chunks_survives() {
        let frame = "data: {\"type\":\"content\",\"content\":\"caffè\"}\n";
        let bytes = frame.as_bytes();
        let split = frame.find('è').expect("è present") + 1;

        let mut decoder = EventStreamDecoder::default();
        assert!(decoder.push_chunk(&bytes[..split]).is_empty());
        let events = decoder.push_chunk(&bytes[split..]);
        assert_eq!(
            events,
            vec![StreamEvent::Content {
                content: "caffè".into()
            }]
        );
    }
}
