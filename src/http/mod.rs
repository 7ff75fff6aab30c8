//! HTTP API server for external control (kitchen display frontend)
//!
//! This module provides a REST API over the running session:
//! - GET /health - Health check
//! - GET /session/status - Current session snapshot
//! - POST /session/locale - Switch the assistant voice
//! - GET /completions - Stored completed sessions

mod handlers;
mod routes;
mod state;

pub use routes::create_router;
pub use state::AppState;
