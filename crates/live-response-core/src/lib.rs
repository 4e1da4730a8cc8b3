//! Core abstractions for live response session management.
//!
//! This crate provides the fundamental building blocks:
//! - Session and command wire types
//! - `LiveResponseClient` - Trait boundary to the remote service
//! - `RemoteError` - Error surfaced by the remote service

pub mod client;
pub mod types;

pub use client::{LiveResponseClient, RemoteError};
pub use types::{
    CommandAck, CommandId, CommandName, CommandRequest, ProcessRecord, SensorId, SessionHandle,
    SessionId, SessionStatus,
};
