//! Snapshot transport abstraction
//!
//! The watcher does not care where snapshots come from. The production
//! transport wraps an HTTP client against the dashboard endpoint; tests
//! and embedded deployments plug in an in-process source.

use async_trait::async_trait;
use thiserror::Error;

use crate::snapshot::DashboardSnapshot;

/// Transport errors
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },
    #[error("Connection error: {0}")]
    Connection(String),
    #[error("Malformed snapshot: {0}")]
    Decode(String),
}

/// A source of dashboard snapshots
#[async_trait]
pub trait SnapshotTransport: Send + Sync {
    /// Fetch the current snapshot
    async fn fetch(&self) -> Result<DashboardSnapshot, TransportError>;
}

/// In-process transport backed by a queue of scripted responses
///
/// Each fetch pops the next response; when the script runs dry the last
/// scripted snapshot repeats. Used in tests and demos.
pub struct ScriptedTransport {
    responses: parking_lot::Mutex<std::collections::VecDeque<Result<DashboardSnapshot, String>>>,
    last: parking_lot::Mutex<Option<DashboardSnapshot>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self {
            responses: parking_lot::Mutex::new(std::collections::VecDeque::new()),
            last: parking_lot::Mutex::new(None),
        }
    }

    pub fn push_ok(&self, snapshot: DashboardSnapshot) {
        self.responses.lock().push_back(Ok(snapshot));
    }

    pub fn push_err(&self, message: impl Into<String>) {
        self.responses.lock().push_back(Err(message.into()));
    }
}

impl Default for ScriptedTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SnapshotTransport for ScriptedTransport {
    async fn fetch(&self) -> Result<DashboardSnapshot, TransportError> {
        let next = self.responses.lock().pop_front();
        match next {
            Some(Ok(snapshot)) => {
                *self.last.lock() = Some(snapshot.clone());
                Ok(snapshot)
            }
            Some(Err(message)) => Err(TransportError::Connection(message)),
            None => self
                .last
                .lock()
                .clone()
                .ok_or_else(|| TransportError::Connection("no scripted response".into())),
        }
    }
}
