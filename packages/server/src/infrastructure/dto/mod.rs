//! Data Transfer Objects (DTOs).
//!
//! DTOs are organized by protocol:
//! - `websocket`: WebSocket envelopes and payloads
//! - `http`: HTTP API response DTOs
//! - `conversion`: domain → DTO mapping and event encoding

pub mod conversion;
pub mod http;
pub mod websocket;

pub use conversion::{encode_event, encode_json};
