use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::{mpsc, Mutex};
use tokio_util::sync::CancellationToken;

use crate::actors::core::Actor;

// ============================================================================
// Error Sink Actor
// ============================================================================
//
// Logs errors other actors hand over instead of failing on them.
//
// The channel closes only when the last `ErrorSender` is dropped, and each
// writer drops its sender when its own `execute` returns. `interrupt` just
// marks the sink as draining, so an error reported while the group is
// stopping still gets logged.
//
// ============================================================================

/// Creates a connected sender / sink pair holding up to `capacity` errors.
pub fn error_channel(capacity: usize) -> (ErrorSender, ErrorSink) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (
        ErrorSender { tx },
        ErrorSink {
            rx: Mutex::new(rx),
            draining: CancellationToken::new(),
            logged: AtomicU64::new(0),
        },
    )
}

#[derive(Debug, Clone)]
pub struct ErrorSender {
    tx: mpsc::Sender<anyhow::Error>,
}

impl ErrorSender {
    /// Hands `error` to the sink, waiting for room if the buffer is full.
    pub async fn report(&self, error: anyhow::Error) {
        // Only fails once the sink itself has been dropped.
        if let Err(mpsc::error::SendError(error)) = self.tx.send(error).await {
            tracing::warn!(
                error = %format!("{error:#}"),
                "Error sink gone, dropping error"
            );
        }
    }
}

pub struct ErrorSink {
    rx: Mutex<mpsc::Receiver<anyhow::Error>>,
    draining: CancellationToken,
    logged: AtomicU64,
}

impl ErrorSink {
    /// Number of errors logged so far
    pub fn logged(&self) -> u64 {
        self.logged.load(Ordering::Relaxed)
    }

    fn log(&self, error: anyhow::Error) {
        self.logged.fetch_add(1, Ordering::Relaxed);
        tracing::error!(error = %format!("{error:#}"), "Error");
    }
}

#[async_trait]
impl Actor for ErrorSink {
    fn name(&self) -> &str {
        "error_sink"
    }

    async fn execute(&self) -> anyhow::Result<()> {
        let mut rx = self.rx.lock().await;
        tracing::debug!("Started error sink");

        let mut draining = false;
        loop {
            tokio::select! {
                biased;
                received = rx.recv() => match received {
                    Some(error) => self.log(error),
                    None => break,
                },
                _ = self.draining.cancelled(), if !draining => {
                    draining = true;
                    tracing::debug!(
                        pending = rx.len(),
                        "Error sink draining until writers finish"
                    );
                }
            }
        }

        tracing::debug!(logged = self.logged(), "Error sink stopped");
        Ok(())
    }

    fn interrupt(&self, _cause: Option<&anyhow::Error>) {
        self.draining.cancel();
    }
}
