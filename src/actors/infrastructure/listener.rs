use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::{CancellationToken, DropGuard};

use crate::actors::core::Actor;
use crate::actors::ActorError;

// ============================================================================
// Listener Actor
// ============================================================================
//
// Runs a network server (HTTP or gRPC accept loop) inside a group.
//
// Shutdown is two-staged:
//   graceful ──► stop accepting, drain in-flight requests
//   force    ──► deadline passed, drop remaining connections
//
// A missed deadline is logged by the actor. It never replaces the group's
// termination record, which is fixed before any interrupt runs.
//
// ============================================================================

/// A server that can be run to completion and stopped from elsewhere
#[async_trait]
pub trait Listener: Send + Sync + 'static {
    fn name(&self) -> &str;

    /// Serves until the listener is closed. `Ok` on a graceful stop.
    async fn serve(&self) -> anyhow::Result<()>;

    /// Drains, then force-closes once `deadline` has passed.
    async fn shutdown(&self, deadline: Duration) -> Result<(), ActorError>;
}

/// Shared stop state between a listener's `serve` and `shutdown`
#[derive(Debug, Clone)]
pub struct ShutdownTrigger {
    name: String,
    graceful: CancellationToken,
    force: CancellationToken,
    stopped: CancellationToken,
}

impl ShutdownTrigger {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            graceful: CancellationToken::new(),
            force: CancellationToken::new(),
            stopped: CancellationToken::new(),
        }
    }

    /// Cancelled when a graceful stop has been requested
    pub fn graceful(&self) -> CancellationToken {
        self.graceful.clone()
    }

    /// Cancelled when the deadline passed and connections must be dropped
    pub fn force(&self) -> CancellationToken {
        self.force.clone()
    }

    /// Marks the listener stopped when dropped. Hold it for the whole of `serve`.
    pub fn stopped_guard(&self) -> DropGuard {
        self.stopped.clone().drop_guard()
    }

    /// Drives `serving` until it completes or a forced stop is requested.
    pub async fn serve_until_forced<F>(&self, serving: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = anyhow::Result<()>>,
    {
        tokio::select! {
            result = serving => result,
            _ = self.force.cancelled() => {
                tracing::warn!(listener = %self.name, "Listener force-closed");
                Ok(())
            }
        }
    }

    /// Requests a graceful stop and escalates to a forced one after `deadline`.
    pub async fn shutdown(&self, deadline: Duration) -> Result<(), ActorError> {
        self.graceful.cancel();

        if tokio::time::timeout(deadline, self.stopped.cancelled())
            .await
            .is_ok()
        {
            return Ok(());
        }

        self.force.cancel();
        Err(ActorError::ShutdownTimeout {
            listener: self.name.clone(),
            deadline,
        })
    }
}

pub struct ListenerActor<L> {
    listener: Arc<L>,
    deadline: Duration,
}

impl<L: Listener> ListenerActor<L> {
    pub fn new(listener: L, deadline: Duration) -> Self {
        Self {
            listener: Arc::new(listener),
            deadline,
        }
    }
}

#[async_trait]
impl<L: Listener> Actor for ListenerActor<L> {
    fn name(&self) -> &str {
        self.listener.name()
    }

    async fn execute(&self) -> anyhow::Result<()> {
        tracing::info!(listener = %self.listener.name(), "Starting listener");
        self.listener.serve().await
    }

    fn interrupt(&self, _cause: Option<&anyhow::Error>) {
        let listener = Arc::clone(&self.listener);
        let deadline = self.deadline;

        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::error!(
                listener = %listener.name(),
                "No runtime available to shut down listener"
            );
            return;
        };

        runtime.spawn(async move {
            tracing::debug!(listener = %listener.name(), "Shutting down listener");
            match listener.shutdown(deadline).await {
                Ok(()) => tracing::debug!(listener = %listener.name(), "Listener stopped"),
                Err(e) => tracing::error!(
                    listener = %listener.name(),
                    error = %e,
                    "Failed to shut down listener gracefully"
                ),
            }
        });
    }
}
