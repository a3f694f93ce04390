//! Background-removal service boundary
//!
//! The service receives the original image and the selection mask, then
//! streams back a refined mask and a result image as server-sent events.

pub mod client;
pub mod exchange;
pub mod sse;
pub mod submit;

pub use client::{ByteStream, HttpRemovalService, RemovalService, SubmissionRequest};
pub use exchange::{ExchangeState, ServiceExchange};
pub use sse::{ServiceEvent, SseDecoder, SseEvent};
pub use submit::submit;
