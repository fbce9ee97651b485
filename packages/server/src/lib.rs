//! Room and session coordinator for a scripted party game.
//!
//! Players connect over WebSocket, one of them creates a room bound to a
//! script, others join by a 6-digit code, and the server keeps membership,
//! host authority, phase and character assignment in sync by broadcasting a
//! full room snapshot on every change.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

pub mod config;
