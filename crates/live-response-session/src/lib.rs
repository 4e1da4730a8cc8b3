//! Keep-alive session management for live response endpoints.
//!
//! Provides:
//! - `SessionManager` - Establish a session, keep it alive, gate commands
//! - `SessionConfig` - Intervals, readiness timeout, failure policy

pub mod config;
pub mod manager;

pub use config::{KeepAliveFailure, SessionConfig};
pub use manager::{SessionError, SessionManager};
