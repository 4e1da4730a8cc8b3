//! Trait boundary to the remote live response service.

use async_trait::async_trait;
use bytes::Bytes;
use serde_json::Value;
use thiserror::Error;

use crate::types::{CommandId, CommandRequest, SensorId, SessionHandle, SessionStatus};

/// Error surfaced by the remote service.
///
/// Failures propagate unmodified to the caller; no retries happen at
/// this layer.
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("Remote service error: {0}")]
    Service(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Trait for the remote live response API.
///
/// Implement this trait to bind the session manager to a concrete
/// transport; the manager provides the session lifecycle, your client
/// implements the wire calls.
#[async_trait]
pub trait LiveResponseClient: Send + Sync {
    /// Request session creation against a target sensor.
    async fn create_session(&self, sensor_id: SensorId) -> Result<SessionHandle, RemoteError>;

    /// Query the current status of a session.
    async fn session_status(&self, session_id: &str) -> Result<SessionStatus, RemoteError>;

    /// Signal the remote service to keep the session from expiring.
    async fn keep_alive(&self, session_id: &str) -> Result<(), RemoteError>;

    /// Submit a command; returns the assigned command identifier.
    async fn submit_command(
        &self,
        session_id: &str,
        request: CommandRequest,
    ) -> Result<CommandId, RemoteError>;

    /// Block until a submitted command reaches a terminal state and
    /// return its result. The result shape depends on the command.
    async fn wait_for_command(
        &self,
        session_id: &str,
        command_id: &str,
    ) -> Result<Value, RemoteError>;

    /// Retrieve file content previously staged by a `get file` command.
    async fn fetch_file(&self, session_id: &str, file_id: u64) -> Result<Bytes, RemoteError>;
}
