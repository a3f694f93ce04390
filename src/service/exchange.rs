//! State machine of one background-removal exchange
//!
//! `Pending → MaskReceived → Completed`, with `Failed` reachable from either
//! live state and `Closed` for an exchange abandoned by its owner. The
//! exchange owns the response stream and drops it exactly once, when it
//! ends or on the first transition into a terminal state.

use super::client::ByteStream;
use super::sse::{ServiceEvent, SseDecoder};
use futures::StreamExt;
use std::collections::VecDeque;
use tracing::debug;

/// Message used when the stream ends before a result arrived
pub const STREAM_ENDED_EARLY: &str = "Connection closed before the result arrived";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExchangeState {
    /// Request sent, nothing received yet
    Pending,
    /// Refined mask received, result outstanding
    MaskReceived,
    /// Result received
    Completed,
    /// Error event or transport failure
    Failed,
    /// Closed by the owner before reaching a result
    Closed,
}

impl ExchangeState {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Closed)
    }

    /// State after `event`, or `None` when a terminal state ignores it
    #[must_use]
    pub fn advance(self, event: &ServiceEvent) -> Option<Self> {
        if self.is_terminal() {
            return None;
        }
        Some(match event {
            ServiceEvent::Mask(_) => Self::MaskReceived,
            ServiceEvent::Image(_) => Self::Completed,
            ServiceEvent::Error(_) => Self::Failed,
        })
    }
}

/// A live exchange over a response byte stream
pub struct ServiceExchange {
    stream: Option<ByteStream>,
    decoder: SseDecoder,
    queued: VecDeque<ServiceEvent>,
    state: ExchangeState,
}

impl std::fmt::Debug for ServiceExchange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceExchange")
            .field("state", &self.state)
            .field("queued", &self.queued.len())
            .field("open", &self.stream.is_some())
            .finish()
    }
}

impl ServiceExchange {
    #[must_use]
    pub fn new(stream: ByteStream) -> Self {
        Self {
            stream: Some(stream),
            decoder: SseDecoder::new(),
            queued: VecDeque::new(),
            state: ExchangeState::Pending,
        }
    }

    #[must_use]
    pub fn state(&self) -> ExchangeState {
        self.state
    }

    /// Whether the response stream is still held
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.stream.is_some()
    }

    /// Next service event, or `None` once the exchange is terminal
    ///
    /// Transport failures and a stream ending early surface as
    /// [`ServiceEvent::Error`]. Unknown event names are skipped.
    pub async fn next_event(&mut self) -> Option<ServiceEvent> {
        loop {
            if self.state.is_terminal() {
                return None;
            }
            if let Some(event) = self.queued.pop_front() {
                return Some(self.accept(event));
            }

            let Some(stream) = self.stream.as_mut() else {
                return Some(self.accept(ServiceEvent::Error(STREAM_ENDED_EARLY.to_string())));
            };
            match stream.next().await {
                Some(Ok(chunk)) => {
                    let events = self.decoder.push(&chunk);
                    self.enqueue(events);
                },
                Some(Err(e)) => {
                    return Some(self.accept(ServiceEvent::Error(e.user_message())));
                },
                None => {
                    // Finished streams are never polled again
                    self.stream = None;
                    let trailing: Vec<_> = self.decoder.finish().into_iter().collect();
                    self.enqueue(trailing);
                },
            }
        }
    }

    fn enqueue(&mut self, events: Vec<super::sse::SseEvent>) {
        for raw in events {
            match ServiceEvent::from_sse(&raw) {
                Some(event) => self.queued.push_back(event),
                None => debug!(event = %raw.event, "unknown service event skipped"),
            }
        }
    }

    fn accept(&mut self, event: ServiceEvent) -> ServiceEvent {
        if let Some(next) = self.state.advance(&event) {
            debug!(from = ?self.state, to = ?next, event = event.name(), "exchange advanced");
            self.state = next;
            if next.is_terminal() {
                self.release_stream();
            }
        }
        event
    }

    fn release_stream(&mut self) {
        if self.stream.take().is_some() {
            self.queued.clear();
            debug!(state = ?self.state, "exchange stream closed");
        }
    }

    /// Abandon the exchange; idempotent
    pub fn close(&mut self) {
        if !self.state.is_terminal() {
            self.state = ExchangeState::Closed;
        }
        self.release_stream();
    }
}
