//! Incremental server-sent events decoding
//!
//! The removal service answers a POST with an event stream. Chunks arrive
//! at arbitrary byte boundaries; the decoder buffers partial lines and
//! dispatches an event on every blank line.

/// Fallback text for an error event that carries no message
pub const CONNECTION_ERROR: &str = "Connection error";

/// One dispatched event: its name and joined data lines
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseEvent {
    pub event: String,
    pub data: String,
}

/// Line-oriented event stream decoder
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
    event: Option<String>,
    data: Vec<String>,
}

impl SseDecoder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk and collect every event it completes
    pub fn push(&mut self, chunk: &[u8]) -> Vec<SseEvent> {
        self.buffer.extend_from_slice(chunk);
        let mut events = Vec::new();
        while let Some(newline) = self.buffer.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=newline).collect();
            let text = String::from_utf8_lossy(&line);
            let text = text.trim_end_matches('\n').trim_end_matches('\r');
            if let Some(event) = self.process_line(text) {
                events.push(event);
            }
        }
        events
    }

    /// Flush a trailing unterminated line and any pending event at end of stream
    pub fn finish(&mut self) -> Option<SseEvent> {
        if !self.buffer.is_empty() {
            let line = std::mem::take(&mut self.buffer);
            let text = String::from_utf8_lossy(&line).trim_end_matches('\r').to_string();
            if let Some(event) = self.process_line(&text) {
                return Some(event);
            }
        }
        self.dispatch()
    }

    fn process_line(&mut self, line: &str) -> Option<SseEvent> {
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
            "event" => self.event = Some(value.to_string()),
            "data" => self.data.push(value.to_string()),
            // id and retry carry nothing the exchange uses
            _ => {},
        }
        None
    }

    fn dispatch(&mut self) -> Option<SseEvent> {
        let event = self.event.take();
        if self.data.is_empty() && event.is_none() {
            return None;
        }
        let data = std::mem::take(&mut self.data).join("\n");
        Some(SseEvent {
            event: event.unwrap_or_else(|| "message".to_string()),
            data,
        })
    }
}

/// Events the removal service emits
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceEvent {
    /// Refined mask as a data URL
    Mask(String),
    /// Final processed image as a data URL
    Image(String),
    /// Terminal failure message
    Error(String),
}

/// Unwrap a JSON string literal payload; anything else passes through
fn unquote(data: &str) -> String {
    if data.starts_with('"') {
        if let Ok(inner) = serde_json::from_str::<String>(data) {
            return inner;
        }
    }
    data.to_string()
}

impl ServiceEvent {
    /// Map a raw event onto the service vocabulary; unknown names yield `None`
    #[must_use]
    pub fn from_sse(event: &SseEvent) -> Option<Self> {
        match event.event.as_str() {
            "mask" => Some(Self::Mask(unquote(&event.data))),
            "image" => Some(Self::Image(unquote(&event.data))),
            "error" => {
                let message = unquote(&event.data);
                Some(Self::Error(if message.trim().is_empty() {
                    CONNECTION_ERROR.to_string()
                } else {
                    message
                }))
            },
            _ => None,
        }
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Mask(_) => "mask",
            Self::Image(_) => "image",
            Self::Error(_) => "error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_event() {
        let mut decoder = SseDecoder::new();
        let events = decoder.push(b"event: mask\ndata: data:image/png;base64,AAAA\n\n");
        assert_eq!(
            events,
            vec![SseEvent {
                event: "mask".to_string(),
                data: "data:image/png;base64,AAAA".to_string(),
            }]
        );
    }

    #[test]
    fn test_split_chunks_and_crlf() {
        let mut decoder = SseDecoder::new();
        assert!(decoder.push(b"event: ima").is_empty());
        assert!(decoder.push(b"ge\r\ndata: \"abc").is_empty());
        let events = decoder.push(b"\"\r\n\r\n");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event, "image");
        assert_eq!(events[0].data, "\"abc\"");
    }

    #[test]
    fn test_multiline_data_and_comments() {
        let mut decoder = SseDecoder::new();
        let events = decoder.push(b": keep-alive\ndata: one\ndata:two\nid: 7\n\n");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event, "message");
        assert_eq!(events[0].data, "one\ntwo");
    }

    #[test]
    fn test_finish_flushes_pending_event() {
        let mut decoder = SseDecoder::new();
        assert!(decoder.push(b"event: error\ndata: boom").is_empty());
        let event = decoder.finish().unwrap();
        assert_eq!(event.event, "error");
        assert_eq!(event.data, "boom");
        assert!(decoder.finish().is_none());
    }

    #[test]
    fn test_service_event_mapping() {
        let quoted = SseEvent {
            event: "image".to_string(),
            data: "\"data:image/png;base64,QQ==\"".to_string(),
        };
        assert_eq!(
            ServiceEvent::from_sse(&quoted),
            Some(ServiceEvent::Image("data:image/png;base64,QQ==".to_string()))
        );

        let empty_error = SseEvent {
            event: "error".to_string(),
            data: String::new(),
        };
        assert_eq!(
            ServiceEvent::from_sse(&empty_error),
            Some(ServiceEvent::Error(CONNECTION_ERROR.to_string()))
        );

        let unknown = SseEvent {
            event: "progress".to_string(),
            data: "50".to_string(),
        };
        assert!(ServiceEvent::from_sse(&unknown).is_none());
    }
}
