//! Incremental decoder for `text/event-stream` bodies.
//!
//! Bytes arrive in arbitrary chunks; [`SseDecoder::feed`] buffers partial
//! lines and returns every event completed by the new bytes. Field handling
//! matches what browsers do for `EventSource`: lines end in CR, LF or CRLF,
//! one leading space is removed from values, `data` lines are joined with
//! `\n`, comments are skipped and an event is dispatched on a blank line.

use memchr::memchr2;

use crate::api::DEFAULT_EVENT_TYPE;

const BOM: char = '\u{feff}';

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseEvent {
    pub event_type: String,
    pub data: String,
    pub last_event_id: Option<String>,
}

impl SseEvent {
    /// True for events an `onmessage` listener would see.
    pub fn is_message(&self) -> bool {
        self.event_type == DEFAULT_EVENT_TYPE
    }
}

#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
    data: String,
    has_data: bool,
    event_type: Option<String>,
    last_event_id: Option<String>,
    seen_first_line: bool,
    after_cr: bool,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn feed(&mut self, chunk: &[u8]) -> Vec<SseEvent> {
        let mut chunk = chunk;
        if self.after_cr && !chunk.is_empty() {
            self.after_cr = false;
            chunk = chunk.strip_prefix(b"\n").unwrap_or(chunk);
        }
        self.buffer.extend_from_slice(chunk);

        let mut events = Vec::new();
        let mut consumed = 0;
        while let Some(offset) = memchr2(b'\r', b'\n', &self.buffer[consumed..]) {
            let end = consumed + offset;
            let line = String::from_utf8_lossy(&self.buffer[consumed..end]).into_owned();
            consumed = end + 1;

            // A CR may be the first half of a CRLF split across reads.
            if self.buffer[end] == b'\r' {
                match self.buffer.get(consumed) {
                    Some(b'\n') => consumed += 1,
                    Some(_) => {}
                    None => self.after_cr = true,
                }
            }

            if let Some(event) = self.process_line(&line) {
                events.push(event);
            }
        }
        self.buffer.drain(..consumed);
        events
    }

    /// Bytes still waiting for a line terminator.
    pub fn pending_bytes(&self) -> usize {
        self.buffer.len()
    }

    pub fn last_event_id(&self) -> Option<&str> {
        self.last_event_id.as_deref()
    }

    fn process_line(&mut self, line: &str) -> Option<SseEvent> {
        let line = if self.seen_first_line {
            line
        } else {
            self.seen_first_line = true;
            line.strip_prefix(BOM).unwrap_or(line)
        };

        if line.is_empty() {
            return self.dispatch();
        }
        if line.starts_with(':') {
            return None;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };

        match field {
            "data" => {
                self.data.push_str(value);
                self.data.push('\n');
                self.has_data = true;
            }
            "event" => self.event_type = Some(value.to_string()),
            "id" => {
                if !value.contains('\0') {
                    self.last_event_id = Some(value.to_string());
                }
            }
            // Reconnection is never attempted, so the delay is irrelevant.
            "retry" => {}
            _ => {}
        }
        None
    }

    fn dispatch(&mut self) -> Option<SseEvent> {
        let event_type = self.event_type.take();
        if !self.has_data {
            self.data.clear();
            return None;
        }

        let mut data = std::mem::take(&mut self.data);
        self.has_data = false;
        if data.ends_with('\n') {
            data.pop();
        }

        Some(SseEvent {
            event_type: event_type
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| DEFAULT_EVENT_TYPE.to_string()),
            data,
            last_event_id: self.last_event_id.clone(),
        })
    }
}
