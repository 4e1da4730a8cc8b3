//! Example session run against a scripted in-process client.
//!
//! Run with: cargo run -p process-list-demo
//!
//! The client simulates a sensor whose session reports pending once
//! before going active, then answers a process list and a file fetch.

use std::{
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use bytes::Bytes;
use live_response_core::{
    CommandId, CommandName, CommandRequest, LiveResponseClient, RemoteError, SensorId,
    SessionHandle, SessionStatus,
};
use live_response_session::{SessionConfig, SessionManager};
use serde_json::{Value, json};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Loopback client standing in for a live response endpoint.
struct DemoClient {
    status_polls: AtomicU64,
    next_command: AtomicU64,
}

impl DemoClient {
    fn new() -> Self {
        Self {
            status_polls: AtomicU64::new(0),
            next_command: AtomicU64::new(1),
        }
    }
}

#[async_trait]
impl LiveResponseClient for DemoClient {
    async fn create_session(&self, sensor_id: SensorId) -> Result<SessionHandle, RemoteError> {
        tracing::info!(sensor_id, "Opening session");
        Ok(SessionHandle {
            id: format!("demo-session-{sensor_id}"),
            status: SessionStatus::Pending,
        })
    }

    async fn session_status(&self, _session_id: &str) -> Result<SessionStatus, RemoteError> {
        if self.status_polls.fetch_add(1, Ordering::SeqCst) == 0 {
            Ok(SessionStatus::Pending)
        } else {
            Ok(SessionStatus::Active)
        }
    }

    async fn keep_alive(&self, session_id: &str) -> Result<(), RemoteError> {
        tracing::debug!(session_id, "keep-alive");
        Ok(())
    }

    async fn submit_command(
        &self,
        _session_id: &str,
        request: CommandRequest,
    ) -> Result<CommandId, RemoteError> {
        tracing::info!(command = %request.name, "Command submitted");
        Ok(format!(
            "cmd-{}",
            self.next_command.fetch_add(1, Ordering::SeqCst)
        ))
    }

    async fn wait_for_command(
        &self,
        _session_id: &str,
        command_id: &str,
    ) -> Result<Value, RemoteError> {
        // The demo only ever submits a process list and a get file.
        if command_id == "cmd-1" {
            Ok(json!({
                "id": command_id,
                "name": CommandName::ProcessList,
                "status": "complete",
                "processes": [
                    {"pid": 4, "path": "c:\\windows\\system32\\smss.exe", "username": "SYSTEM"},
                    {"pid": 812, "path": "c:\\windows\\system32\\svchost.exe", "parent": 4},
                ],
            }))
        } else {
            Ok(json!({
                "id": command_id,
                "name": CommandName::GetFile,
                "status": "complete",
                "file_id": 1,
            }))
        }
    }

    async fn fetch_file(&self, _session_id: &str, _file_id: u64) -> Result<Bytes, RemoteError> {
        Ok(Bytes::from_static(b"# hosts file contents\n"))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let config = SessionConfig::new(17)
        .poll_interval(Duration::from_millis(200))
        .keep_alive_interval(Duration::from_secs(5));
    let manager = SessionManager::new(Arc::new(DemoClient::new()), config);
    manager.start()?;

    let processes = manager.process_list().await?;
    for p in &processes {
        tracing::info!(pid = p.pid, path = %p.path, "process");
    }

    let content = manager.get_file("c:\\windows\\system32\\drivers\\etc\\hosts").await?;
    tracing::info!(bytes = content.len(), "Fetched file");

    manager.stop(true).await;
    Ok(())
}
