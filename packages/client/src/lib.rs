//! Client library and interactive CLI for the Jubensha room server.

pub mod command;
pub mod error;
pub mod formatter;
pub mod phase;
mod runner;
pub mod session;

pub use error::ClientError;
pub use phase::PhaseCursor;
pub use runner::{SessionView, run_client};
pub use session::{EventStream, GameClient, PushedEvent};
