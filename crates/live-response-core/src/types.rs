//! Session and command wire types.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Session identifier, assigned by the remote service.
pub type SessionId = String;

/// Command identifier, assigned by the remote service on submission.
pub type CommandId = String;

/// Target host (sensor) identifier.
pub type SensorId = u64;

/// Session status as reported by the remote service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// Session is queued on the remote side but not yet usable.
    Pending,
    /// Session is established; commands may be issued.
    Active,
    /// Session has been torn down remotely.
    Terminated,
}

/// Handle returned by session creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionHandle {
    /// Unique session identifier.
    pub id: SessionId,
    /// Initial status.
    pub status: SessionStatus,
}

/// Named remote operation submitted against an active session.
///
/// Wire names carry embedded spaces (`"process list"`, `"get file"`),
/// matching the remote service's command vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommandName {
    #[serde(rename = "process list")]
    ProcessList,
    #[serde(rename = "kill")]
    Kill,
    #[serde(rename = "get file")]
    GetFile,
}

impl CommandName {
    /// Wire name of the command.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ProcessList => "process list",
            Self::Kill => "kill",
            Self::GetFile => "get file",
        }
    }
}

impl std::fmt::Display for CommandName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Command submission payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandRequest {
    /// Command to run.
    pub name: CommandName,
    /// Command argument (pid for `kill`, path for `get file`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object: Option<Value>,
}

impl CommandRequest {
    /// Create a request with no argument.
    #[must_use]
    pub const fn new(name: CommandName) -> Self {
        Self { name, object: None }
    }

    /// Create a request with an argument.
    #[must_use]
    pub fn with_object(name: CommandName, object: impl Into<Value>) -> Self {
        Self {
            name,
            object: Some(object.into()),
        }
    }
}

/// One entry of a `process list` result.
///
/// The remote service omits fields freely; everything but the pid is
/// defaulted on deserialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessRecord {
    /// Process identifier.
    pub pid: u32,
    /// Executable path.
    #[serde(default)]
    pub path: String,
    /// Full command line.
    #[serde(default)]
    pub command_line: String,
    /// Owning user, if reported.
    #[serde(default)]
    pub username: Option<String>,
    /// Parent process identifier, if reported.
    #[serde(default)]
    pub parent: Option<u32>,
}

/// Terminal command object returned by the remote service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandAck {
    /// Command identifier.
    pub id: CommandId,
    /// Command that was run.
    pub name: CommandName,
    /// Terminal status string (e.g. `"complete"`).
    pub status: String,
    /// Echoed command argument.
    #[serde(default)]
    pub object: Option<Value>,
}
