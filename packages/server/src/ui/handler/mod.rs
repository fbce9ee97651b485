//! HTTP and WebSocket handlers.

mod http;
pub mod router;
mod websocket;

pub use http::{get_room_detail, get_rooms, get_script, get_scripts, health_check};
pub use websocket::websocket_handler;
