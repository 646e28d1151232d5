//! # Stream Line Protocol
//!
//! The completion endpoint answers with server-sent events, one JSON chunk per
//! `data:` line, terminated by `data: [DONE]`.
//!
//! Network reads don't respect line (or even UTF-8) boundaries, so raw bytes go
//! through [`SseLineBuffer`] first and only complete lines are parsed.
//!
//! ```text
//! bytes ──► SseLineBuffer ──► lines ──► parse_line() ──► SseLine
//! ```
//!
//! A chunk that fails to parse is reported as [`SseLine::Malformed`] so the
//! caller can skip it. One bad chunk never ends an otherwise good stream.

use serde::Deserialize;

/// End-of-stream sentinel sent by OpenAI-compatible APIs.
pub const DONE_MARKER: &str = "[DONE]";

/// What a single line of the event stream means to the consumer.
#[derive(Debug, Clone, PartialEq)]
pub enum SseLine {
    /// A text fragment to append to the response.
    Fragment(String),
    /// A well-formed chunk with no text (role announcements, finish reasons).
    NoContent,
    /// The `[DONE]` sentinel. The stream ends normally.
    Done,
    /// A `data:` payload that isn't valid chunk JSON. Skipped.
    Malformed(String),
    /// Blank lines, comments, `event:`/`id:` fields.
    Ignored,
}

#[derive(Deserialize, Debug)]
struct ChunkEvent {
    #[serde(default)]
    choices: Vec<ChunkChoice>,
}

#[derive(Deserialize, Debug)]
struct ChunkChoice {
    #[serde(default)]
    delta: ChunkDelta,
}

#[derive(Deserialize, Debug, Default)]
struct ChunkDelta {
    #[serde(default)]
    content: Option<String>,
}

/// Classifies one complete line of the event stream.
pub fn parse_line(line: &str) -> SseLine {
    let line = line.trim_end_matches('\r');
    let Some(data) = line.strip_prefix("data:") else {
        return SseLine::Ignored;
    };
    let data = data.trim_start();

    if data == DONE_MARKER {
        return SseLine::Done;
    }

    match serde_json::from_str::<ChunkEvent>(data) {
        Ok(event) => match event
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.delta.content)
        {
            Some(content) if !content.is_empty() => SseLine::Fragment(content),
            _ => SseLine::NoContent,
        },
        Err(e) => SseLine::Malformed(e.to_string()),
    }
}

/// Accumulates raw bytes and hands out complete lines.
#[derive(Debug, Default)]
pub struct SseLineBuffer {
    pending: Vec<u8>,
}

impl SseLineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `bytes` and drains every complete (`\n`-terminated) line.
    /// The trailing partial line stays buffered for the next call.
    pub fn push(&mut self, bytes: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(bytes);

        let mut lines = Vec::new();
        while let Some(pos) = self.pending.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.pending.drain(..=pos).collect();
            let text = String::from_utf8_lossy(&line[..line.len() - 1]);
            lines.push(text.trim_end_matches('\r').to_string());
        }
        lines
    }

    /// Returns whatever is left once the body has ended without a final newline.
    pub fn finish(self) -> Option<String> {
        if self.pending.is_empty() {
            return None;
        }
        let text = String::from_utf8_lossy(&self.pending);
        let text = text.trim_end_matches('\r');
        if text.is_empty() {
            None
        } else {
            Some(text.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_content_fragment() {
        let line = r#"data: {"choices":[{"index":0,"delta":{"content":"Hello"}}]}"#;
        assert_eq!(parse_line(line), SseLine::Fragment("Hello".to_string()));
    }

    #[test]
    fn test_parse_done_marker() {
        assert_eq!(parse_line("data: [DONE]"), SseLine::Done);
        assert_eq!(parse_line("data:[DONE]"), SseLine::Done);
    }

    #[test]
    fn test_parse_chunk_without_content() {
        let role_only = r#"data: {"choices":[{"delta":{"role":"assistant"}}]}"#;
        assert_eq!(parse_line(role_only), SseLine::NoContent);

        let null_content = r#"data: {"choices":[{"delta":{"content":null},"finish_reason":"stop"}]}"#;
        assert_eq!(parse_line(null_content), SseLine::NoContent);

        let empty_content = r#"data: {"choices":[{"delta":{"content":""}}]}"#;
        assert_eq!(parse_line(empty_content), SseLine::NoContent);

        let no_choices = r#"data: {"x_groq":{"usage":{}}}"#;
        assert_eq!(parse_line(no_choices), SseLine::NoContent);
    }

    #[test]
    fn test_parse_malformed_chunk() {
        assert!(matches!(
            parse_line("data: {\"choices\":[{\"delta\""),
            SseLine::Malformed(_)
        ));
    }

    #[test]
    fn test_parse_non_data_lines_are_ignored() {
        assert_eq!(parse_line(""), SseLine::Ignored);
        assert_eq!(parse_line(": keep-alive"), SseLine::Ignored);
        assert_eq!(parse_line("event: message"), SseLine::Ignored);
    }

    #[test]
    fn test_parse_strips_carriage_return() {
        assert_eq!(parse_line("data: [DONE]\r"), SseLine::Done);
    }

    #[test]
    fn test_line_buffer_holds_partial_lines() {
        let mut buffer = SseLineBuffer::new();
        assert!(buffer.push(b"data: {\"cho").is_empty());
        let lines = buffer.push(b"ices\":[]}\n\ndata: [DO");
        assert_eq!(lines, vec!["data: {\"choices\":[]}".to_string(), String::new()]);
        let lines = buffer.push(b"NE]\n");
        assert_eq!(lines, vec!["data: [DONE]".to_string()]);
        assert_eq!(buffer.finish(), None);
    }

    #[test]
    fn test_line_buffer_joins_split_utf8() {
        let mut buffer = SseLineBuffer::new();
        let text = "data: café\n".as_bytes();
        // Split inside the two-byte 'é'
        let split = text.iter().position(|&b| b == 0xC3).unwrap() + 1;
        assert!(buffer.push(&text[..split]).is_empty());
        assert_eq!(buffer.push(&text[split..]), vec!["data: café".to_string()]);
    }

    #[test]
    fn test_line_buffer_handles_crlf() {
        let mut buffer = SseLineBuffer::new();
        assert_eq!(
            buffer.push(b"data: [DONE]\r\n"),
            vec!["data: [DONE]".to_string()]
        );
    }

    #[test]
    fn test_line_buffer_finish_returns_unterminated_tail() {
        let mut buffer = SseLineBuffer::new();
        buffer.push(b"data: [DONE]");
        assert_eq!(buffer.finish(), Some("data: [DONE]".to_string()));
    }
}
