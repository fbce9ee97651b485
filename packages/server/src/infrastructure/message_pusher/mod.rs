//! メッセージ送信（通知）の実装
//!
//! - `websocket`: WebSocket の writer タスクへチャンネル経由で送る実装

pub mod websocket;

pub use websocket::WebSocketMessagePusher;
