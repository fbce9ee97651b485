//! Axum UI layer: routes, WebSocket connection loop, message router and heartbeat.

mod handler;
mod heartbeat;
mod server;
mod signal;
pub mod state; // UseCase の組み立てを bin と tests から行うため public

pub use handler::router::{ClientMessage, route_message};
pub use server::Server;
pub use signal::shutdown_signal;
