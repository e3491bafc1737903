use async_trait::async_trait;
use std::fmt;
use tokio::sync::{mpsc, Mutex};
use tokio_util::sync::CancellationToken;

use crate::actors::core::Actor;
use crate::actors::ActorError;

// ============================================================================
// Signal Watcher Actor
// ============================================================================
//
// Ends the group when the process is asked to terminate.
//
// The signal source is injected so the watcher never touches process-wide
// signal state directly; `OsSignals` is the production source and any
// `mpsc::UnboundedReceiver<Signal>` works as a scripted one.
//
// ============================================================================

/// Termination signals the watcher reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    Interrupt,
    Terminate,
    Quit,
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Signal::Interrupt => write!(f, "interrupt"),
            Signal::Terminate => write!(f, "terminated"),
            Signal::Quit => write!(f, "quit"),
        }
    }
}

/// Yields one value per received termination signal
#[async_trait]
pub trait SignalSource: Send + 'static {
    /// Waits for the next signal. `None` means the source will never yield again.
    async fn recv(&mut self) -> Option<Signal>;
}

#[async_trait]
impl SignalSource for mpsc::UnboundedReceiver<Signal> {
    async fn recv(&mut self) -> Option<Signal> {
        mpsc::UnboundedReceiver::recv(self).await
    }
}

/// Process signals: SIGINT, SIGTERM and SIGQUIT on unix, Ctrl-C elsewhere
#[cfg(unix)]
pub struct OsSignals {
    interrupt: tokio::signal::unix::Signal,
    terminate: tokio::signal::unix::Signal,
    quit: tokio::signal::unix::Signal,
}

#[cfg(unix)]
impl OsSignals {
    /// Registers the handlers. Must be called from within a tokio runtime.
    pub fn new() -> std::io::Result<Self> {
        use tokio::signal::unix::{signal, SignalKind};

        Ok(Self {
            interrupt: signal(SignalKind::interrupt())?,
            terminate: signal(SignalKind::terminate())?,
            quit: signal(SignalKind::quit())?,
        })
    }
}

#[cfg(unix)]
#[async_trait]
impl SignalSource for OsSignals {
    async fn recv(&mut self) -> Option<Signal> {
        tokio::select! {
            Some(()) = self.interrupt.recv() => Some(Signal::Interrupt),
            Some(()) = self.terminate.recv() => Some(Signal::Terminate),
            Some(()) = self.quit.recv() => Some(Signal::Quit),
            else => None,
        }
    }
}

#[cfg(not(unix))]
pub struct OsSignals;

#[cfg(not(unix))]
impl OsSignals {
    pub fn new() -> std::io::Result<Self> {
        Ok(Self)
    }
}

#[cfg(not(unix))]
#[async_trait]
impl SignalSource for OsSignals {
    async fn recv(&mut self) -> Option<Signal> {
        tokio::signal::ctrl_c().await.ok().map(|()| Signal::Interrupt)
    }
}

pub struct SignalWatcher<S> {
    source: Mutex<S>,
    done: CancellationToken,
}

impl<S: SignalSource> SignalWatcher<S> {
    pub fn new(source: S) -> Self {
        Self {
            source: Mutex::new(source),
            done: CancellationToken::new(),
        }
    }
}

#[async_trait]
impl<S: SignalSource> Actor for SignalWatcher<S> {
    fn name(&self) -> &str {
        "signal_watcher"
    }

    async fn execute(&self) -> anyhow::Result<()> {
        let mut source = self.source.lock().await;

        tokio::select! {
            biased;
            _ = self.done.cancelled() => {
                tracing::debug!("Signal watcher stopped");
                Ok(())
            }
            received = source.recv() => match received {
                Some(signal) => {
                    tracing::debug!(signal = %signal, "Caught signal");
                    Err(ActorError::Signal(signal).into())
                }
                None => {
                    // No more signals can arrive; stay up until the group stops.
                    self.done.cancelled().await;
                    tracing::debug!("Signal watcher stopped");
                    Ok(())
                }
            },
        }
    }

    fn interrupt(&self, _cause: Option<&anyhow::Error>) {
        self.done.cancel();
    }
}
