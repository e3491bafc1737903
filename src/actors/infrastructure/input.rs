use async_trait::async_trait;
use std::io::{self, BufRead};
use std::sync::Arc;
use tokio::io::{AsyncBufRead, Lines};
use tokio::sync::{mpsc, Mutex};
use tokio_util::sync::CancellationToken;

use super::ErrorSender;
use crate::actors::core::Actor;
use crate::actors::ActorError;

// ============================================================================
// Input Actor
// ============================================================================
//
// Reads lines from an interactive source and sends each one out.
//
// - A failed send is forwarded to the error sink; the loop keeps going
// - A failed read ends the actor with `ActorError::Input`
// - End of input, or a cancelled read, ends the actor cleanly
// - The error sender is dropped when `execute` returns, which is what lets
//   the sink finish draining
//
// Terminal reads cannot be aborted from another thread, so `StdinLines`
// reads on its own thread and hands lines over a channel. Cancelling only
// has to stop waiting on that channel.
//
// ============================================================================

/// A blocking source of newline-delimited input
#[async_trait]
pub trait LineSource: Send + 'static {
    /// Next line without its terminator, or `None` at end of input.
    async fn next_line(&mut self) -> io::Result<Option<String>>;
}

#[async_trait]
impl<R> LineSource for Lines<R>
where
    R: AsyncBufRead + Unpin + Send + 'static,
{
    async fn next_line(&mut self) -> io::Result<Option<String>> {
        Lines::next_line(self).await
    }
}

/// Standard input, read line by line on a dedicated thread
pub struct StdinLines {
    lines: mpsc::Receiver<io::Result<String>>,
}

impl StdinLines {
    pub fn spawn() -> io::Result<Self> {
        let (tx, rx) = mpsc::channel(16);

        std::thread::Builder::new()
            .name("stdin-reader".to_string())
            .spawn(move || {
                for line in io::stdin().lock().lines() {
                    let failed = line.is_err();
                    if tx.blocking_send(line).is_err() || failed {
                        break;
                    }
                }
            })?;

        Ok(Self { lines: rx })
    }
}

#[async_trait]
impl LineSource for StdinLines {
    async fn next_line(&mut self) -> io::Result<Option<String>> {
        self.lines.recv().await.transpose()
    }
}

/// Outcome of a single cancellable read
#[derive(Debug, PartialEq, Eq)]
pub enum Line {
    Read(String),
    Exhausted,
    Canceled,
}

/// Wraps a [`LineSource`] so a pending read can be abandoned from elsewhere
pub struct CancellableReader<S> {
    source: Mutex<S>,
    cancel: CancellationToken,
}

impl<S: LineSource> CancellableReader<S> {
    pub fn new(source: S) -> Self {
        Self {
            source: Mutex::new(source),
            cancel: CancellationToken::new(),
        }
    }

    pub async fn read_line(&self) -> io::Result<Line> {
        let mut source = self.source.lock().await;

        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Ok(Line::Canceled),
            line = source.next_line() => Ok(match line? {
                Some(line) => Line::Read(line),
                None => Line::Exhausted,
            }),
        }
    }

    /// Unblocks any pending or future `read_line`. Safe to call repeatedly.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }
}

/// Where each input line goes
#[async_trait]
pub trait Outbound: Send + Sync + 'static {
    async fn send(&self, line: &str) -> anyhow::Result<()>;
}

pub struct InputActor<S, O> {
    reader: CancellableReader<S>,
    outbound: Arc<O>,
    errors: Mutex<Option<ErrorSender>>,
}

impl<S: LineSource, O: Outbound> InputActor<S, O> {
    pub fn new(reader: CancellableReader<S>, outbound: Arc<O>, errors: ErrorSender) -> Self {
        Self {
            reader,
            outbound,
            errors: Mutex::new(Some(errors)),
        }
    }
}

#[async_trait]
impl<S: LineSource, O: Outbound> Actor for InputActor<S, O> {
    fn name(&self) -> &str {
        "input"
    }

    async fn execute(&self) -> anyhow::Result<()> {
        let Some(errors) = self.errors.lock().await.take() else {
            return Err(ActorError::AlreadyServed(self.name().to_string()).into());
        };
        tracing::info!("Enter message to send");

        loop {
            match self.reader.read_line().await.map_err(ActorError::Input)? {
                Line::Read(line) => {
                    if let Err(e) = self.outbound.send(&line).await {
                        errors
                            .report(e.context("failed to send message"))
                            .await;
                    }
                }
                Line::Exhausted => {
                    tracing::debug!("Input exhausted");
                    return Ok(());
                }
                Line::Canceled => {
                    tracing::debug!("Input reader cancelled");
                    return Ok(());
                }
            }
        }
    }

    fn interrupt(&self, _cause: Option<&anyhow::Error>) {
        tracing::debug!("Closing input reader");
        self.reader.cancel();
    }
}
