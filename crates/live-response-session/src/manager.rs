//! Session manager for live response endpoints.

use std::sync::{
    Arc, Mutex, RwLock,
    atomic::{AtomicBool, Ordering},
};

use bytes::Bytes;
use live_response_core::{
    CommandAck, CommandName, CommandRequest, LiveResponseClient, ProcessRecord, RemoteError,
    SessionId, SessionStatus,
};
use serde_json::Value;
use tokio::{sync::watch, task::JoinHandle};

use crate::config::{KeepAliveFailure, SessionConfig};

/// Session manager error.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Remote error: {0}")]
    Remote(#[from] RemoteError),
    #[error("Malformed command result: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("Command result carries no file id")]
    MissingFileId,
    #[error("Session is terminated")]
    Terminated,
    #[error("Timed out waiting for session readiness")]
    ReadyTimeout,
    #[error("Manager already started")]
    AlreadyStarted,
}

/// Session state shared between the worker task and command callers.
struct SessionState {
    session_id: Option<SessionId>,
    status: SessionStatus,
}

struct Shared {
    client: Arc<dyn LiveResponseClient>,
    config: SessionConfig,
    state: RwLock<SessionState>,
    running: AtomicBool,
    ready_tx: watch::Sender<bool>,
}

impl Shared {
    fn session_id(&self) -> Option<SessionId> {
        self.state.read().unwrap().session_id.clone()
    }

    fn status(&self) -> SessionStatus {
        self.state.read().unwrap().status
    }

    fn set_status(&self, status: SessionStatus) {
        self.state.write().unwrap().status = status;
    }
}

/// Manager for one live response session.
///
/// `start` spawns a single background task that establishes the session
/// and keeps it alive; the command methods block on a readiness gate
/// until the session leaves `pending`, then call the remote service on
/// the caller's task. Concurrent callers are not serialized against
/// each other.
pub struct SessionManager {
    shared: Arc<Shared>,
    ready_rx: watch::Receiver<bool>,
    shutdown_tx: watch::Sender<bool>,
    started: AtomicBool,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl SessionManager {
    /// Create a manager bound to a remote client.
    #[must_use]
    pub fn new(client: Arc<dyn LiveResponseClient>, config: SessionConfig) -> Self {
        let (ready_tx, ready_rx) = watch::channel(false);
        let (shutdown_tx, _) = watch::channel(false);
        Self {
            shared: Arc::new(Shared {
                client,
                config,
                state: RwLock::new(SessionState {
                    session_id: None,
                    status: SessionStatus::Pending,
                }),
                running: AtomicBool::new(false),
                ready_tx,
            }),
            ready_rx,
            shutdown_tx,
            started: AtomicBool::new(false),
            worker: Mutex::new(None),
        }
    }

    /// Spawn the establishment + keep-alive worker. Non-blocking.
    ///
    /// # Errors
    /// Returns `AlreadyStarted` if the worker was ever started; a
    /// manager owns exactly one session lifecycle.
    pub fn start(&self) -> Result<(), SessionError> {
        if self.started.swap(true, Ordering::SeqCst) {
            return Err(SessionError::AlreadyStarted);
        }
        self.shared.running.store(true, Ordering::SeqCst);

        let shared = Arc::clone(&self.shared);
        let shutdown = self.shutdown_tx.subscribe();
        let handle = tokio::spawn(run(shared, shutdown));
        *self.worker.lock().unwrap() = Some(handle);
        Ok(())
    }

    /// Signal the worker to shut down; if `wait`, block until it has
    /// fully exited. Idempotent.
    pub async fn stop(&self, wait: bool) {
        let _ = self.shutdown_tx.send(true);
        if wait {
            let handle = self.worker.lock().unwrap().take();
            if let Some(handle) = handle {
                let _ = handle.await;
            }
        }
    }

    /// Whether the worker task is currently running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.shared.running.load(Ordering::SeqCst)
    }

    /// Last-known session status.
    #[must_use]
    pub fn status(&self) -> SessionStatus {
        self.shared.status()
    }

    /// List processes on the target host.
    ///
    /// Blocks until the session is usable. A result without a
    /// `processes` array yields an empty list.
    ///
    /// # Errors
    /// Returns error if the session is terminated or the remote call fails.
    pub async fn process_list(&self) -> Result<Vec<ProcessRecord>, SessionError> {
        let result = self
            .dispatch(CommandRequest::new(CommandName::ProcessList))
            .await?;
        match result.get("processes") {
            Some(processes) => Ok(serde_json::from_value(processes.clone())?),
            None => Ok(Vec::new()),
        }
    }

    /// Kill a process on the target host, returning the service's
    /// acknowledgement.
    ///
    /// # Errors
    /// Returns error if the session is terminated or the remote call fails.
    pub async fn kill_process(&self, pid: u32) -> Result<CommandAck, SessionError> {
        let result = self
            .dispatch(CommandRequest::with_object(CommandName::Kill, pid))
            .await?;
        Ok(serde_json::from_value(result)?)
    }

    /// Fetch a file from the target host.
    ///
    /// Issues `get file`, reads the staged file id from the result,
    /// then retrieves the content in a second remote call.
    ///
    /// # Errors
    /// Returns `MissingFileId` if the command result carries no file id
    /// (no fetch is attempted), or error if a remote call fails.
    pub async fn get_file(&self, path: &str) -> Result<Bytes, SessionError> {
        let result = self
            .dispatch(CommandRequest::with_object(CommandName::GetFile, path))
            .await?;
        let file_id = result
            .get("file_id")
            .and_then(Value::as_u64)
            .ok_or(SessionError::MissingFileId)?;
        let session_id = self.shared.session_id().ok_or(SessionError::Terminated)?;
        Ok(self.shared.client.fetch_file(&session_id, file_id).await?)
    }

    /// Submit a command once the session is usable and wait for its
    /// terminal result. No retries; remote failures propagate.
    async fn dispatch(&self, request: CommandRequest) -> Result<Value, SessionError> {
        self.wait_ready().await?;

        let session_id = {
            let state = self.shared.state.read().unwrap();
            if state.status == SessionStatus::Terminated {
                return Err(SessionError::Terminated);
            }
            state.session_id.clone().ok_or(SessionError::Terminated)?
        };

        let command_id = self
            .shared
            .client
            .submit_command(&session_id, request)
            .await?;
        Ok(self
            .shared
            .client
            .wait_for_command(&session_id, &command_id)
            .await?)
    }

    /// Block until the worker releases the readiness gate.
    async fn wait_ready(&self) -> Result<(), SessionError> {
        let mut ready = self.ready_rx.clone();
        let gate = async move {
            // The sender lives in Shared for the manager's lifetime.
            let _ = ready.wait_for(|released| *released).await;
        };
        match self.shared.config.ready_timeout {
            Some(limit) => tokio::time::timeout(limit, gate)
                .await
                .map_err(|_| SessionError::ReadyTimeout),
            None => {
                gate.await;
                Ok(())
            }
        }
    }
}

/// Worker body: establish, release the gate, keep alive until shutdown.
async fn run(shared: Arc<Shared>, mut shutdown: watch::Receiver<bool>) {
    establish(&shared, &mut shutdown).await;

    // Released exactly once, whether establishment ended active,
    // terminated, or interrupted by shutdown. Blocked callers fail fast
    // on a terminated session instead of hanging.
    let _ = shared.ready_tx.send(true);

    keep_alive_loop(&shared, &mut shutdown).await;

    shared.running.store(false, Ordering::SeqCst);
    tracing::info!("Session worker exited");
}

/// Create the session and poll until it leaves `pending`, a remote
/// failure marks it terminated, or shutdown is signaled.
async fn establish(shared: &Shared, shutdown: &mut watch::Receiver<bool>) {
    let handle = match shared.client.create_session(shared.config.sensor_id).await {
        Ok(handle) => handle,
        Err(e) => {
            tracing::error!("Session creation failed: {e}");
            shared.set_status(SessionStatus::Terminated);
            return;
        }
    };
    tracing::info!(session_id = %handle.id, status = ?handle.status, "Created session");

    let session_id = handle.id.clone();
    {
        let mut state = shared.state.write().unwrap();
        state.session_id = Some(handle.id);
        state.status = handle.status;
    }

    while shared.status() == SessionStatus::Pending && !*shutdown.borrow() {
        tokio::select! {
            () = tokio::time::sleep(shared.config.poll_interval) => {}
            _ = shutdown.changed() => break,
        }
        match shared.client.session_status(&session_id).await {
            Ok(status) => {
                tracing::debug!(session_id = %session_id, ?status, "Polled session status");
                shared.set_status(status);
            }
            Err(e) => {
                tracing::error!("Session status poll failed: {e}");
                shared.set_status(SessionStatus::Terminated);
                return;
            }
        }
    }

    if shared.status() == SessionStatus::Active {
        tracing::info!(session_id = %session_id, "Session active");
    }
}

/// Keep-alive cadence until shutdown or the session dies.
async fn keep_alive_loop(shared: &Shared, shutdown: &mut watch::Receiver<bool>) {
    let mut failures = 0u32;
    while !*shutdown.borrow() && shared.status() != SessionStatus::Terminated {
        let Some(session_id) = shared.session_id() else {
            break;
        };
        match shared.client.keep_alive(&session_id).await {
            Ok(()) => {
                failures = 0;
                tracing::debug!(session_id = %session_id, "Sent keep-alive");
            }
            Err(e) => {
                failures += 1;
                tracing::warn!(session_id = %session_id, failures, "Keep-alive failed: {e}");
                let exhausted = match shared.config.keep_alive_failure {
                    KeepAliveFailure::Stop => true,
                    KeepAliveFailure::Retry { attempts } => failures >= attempts,
                };
                if exhausted {
                    tracing::error!(session_id = %session_id, "Keep-alive exhausted, terminating");
                    shared.set_status(SessionStatus::Terminated);
                    break;
                }
            }
        }
        tokio::select! {
            () = tokio::time::sleep(shared.config.keep_alive_interval) => {}
            changed = shutdown.changed() => {
                // A closed channel means the manager was dropped without
                // stop(); treat it as a shutdown signal.
                if changed.is_err() {
                    break;
                }
            }
        }
    }
}
