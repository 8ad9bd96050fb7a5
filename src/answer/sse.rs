//! Incremental Server-Sent Events parser for chat-completion streams.
//!
//! Bytes are buffered until a full line is available, so UTF-8 sequences
//! split across network chunks decode correctly.

/// One dispatched SSE event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseEvent {
    /// `event:` field, if any
    pub event_type: Option<String>,
    /// `data:` lines joined with `\n`
    pub data: String,
}

impl SseEvent {
    /// Whether this is the OpenAI `[DONE]` sentinel
    pub fn is_done(&self) -> bool {
        self.data.trim() == "[DONE]"
    }
}

/// Feeds raw bytes in, yields complete events out
#[derive(Debug, Default)]
pub struct SseLineParser {
    buffer: Vec<u8>,
    event_type: Option<String>,
    data_lines: Vec<String>,
}

impl SseLineParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a chunk of bytes, returning every event it completes
    pub fn push(&mut self, chunk: &[u8]) -> Vec<SseEvent> {
        self.buffer.extend_from_slice(chunk);
        let mut events = Vec::new();

        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let raw: Vec<u8> = self.buffer.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&raw[..raw.len() - 1]);
            let line = line.strip_suffix('\r').unwrap_or(&line);
            if let Some(event) = self.process_line(line) {
                events.push(event);
            }
        }

        events
    }

    /// Emit whatever is left once the byte stream has ended
    pub fn flush(&mut self) -> Option<SseEvent> {
        if !self.buffer.is_empty() {
            let raw = std::mem::take(&mut self.buffer);
            let line = String::from_utf8_lossy(&raw);
            let line = line.strip_suffix('\r').unwrap_or(&line);
            self.process_line(line);
        }
        self.take_event()
    }

    fn process_line(&mut self, line: &str) -> Option<SseEvent> {
        if line.is_empty() {
            return self.take_event();
        }
        // comment
        if line.starts_with(':') {
            return None;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };

        match field {
            "data" => self.data_lines.push(value.to_string()),
            "event" => self.event_type = Some(value.to_string()),
            _ => {}
        }
        None
    }

    fn take_event(&mut self) -> Option<SseEvent> {
        if self.data_lines.is_empty() {
            self.event_type = None;
            return None;
        }
        Some(SseEvent {
            event_type: self.event_type.take(),
            data: std::mem::take(&mut self.data_lines).join("\n"),
        })
    }
}
