use actix_web::HttpServer;
use anyhow::Context;
use async_trait::async_trait;
use std::net::{SocketAddr, TcpListener};
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::oneshot;

use super::{app, ApiState};
use crate::actors::{ActorError, Listener, ShutdownTrigger};

// ============================================================================
// HTTP Listener
// ============================================================================
//
// actix-web runs its own single-threaded system, so the server lives on a
// dedicated thread and is steered through its `ServerHandle`:
//
//   graceful ──► handle.stop(true)   (drain in-flight requests)
//   force    ──► handle.stop(false)
//
// The socket is bound up front so address errors surface before the group
// starts.
//
// ============================================================================

pub struct HttpListener {
    socket: Mutex<Option<TcpListener>>,
    local_addr: SocketAddr,
    state: ApiState,
    workers: usize,
    drain_timeout: Duration,
    trigger: ShutdownTrigger,
}

impl HttpListener {
    pub fn bind(addr: &str, state: ApiState) -> anyhow::Result<Self> {
        let socket = TcpListener::bind(addr)
            .with_context(|| format!("failed to bind http listener on {addr}"))?;
        socket.set_nonblocking(true)?;
        let local_addr = socket.local_addr()?;

        Ok(Self {
            socket: Mutex::new(Some(socket)),
            local_addr,
            state,
            workers: 2,
            drain_timeout: Duration::from_secs(2),
            trigger: ShutdownTrigger::new("http"),
        })
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// How long actix itself lets workers drain before dropping connections
    pub fn with_drain_timeout(mut self, timeout: Duration) -> Self {
        self.drain_timeout = timeout;
        self
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    fn take_socket(&self) -> anyhow::Result<TcpListener> {
        self.socket
            .lock()
            .map_err(|_| anyhow::anyhow!("http listener state poisoned"))?
            .take()
            .ok_or_else(|| ActorError::AlreadyServed(self.name().to_string()).into())
    }
}

#[async_trait]
impl Listener for HttpListener {
    fn name(&self) -> &str {
        "http"
    }

    async fn serve(&self) -> anyhow::Result<()> {
        let socket = self.take_socket()?;
        let _stopped = self.trigger.stopped_guard();
        let state = self.state.clone();
        let workers = self.workers;
        let drain_secs = self.drain_timeout.as_secs().max(1);

        let (handle_tx, handle_rx) = oneshot::channel::<actix_web::dev::ServerHandle>();
        let (done_tx, mut done_rx) = oneshot::channel::<std::io::Result<()>>();

        std::thread::Builder::new()
            .name("http-server".to_string())
            .spawn(move || {
                let result = actix_web::rt::System::new().block_on(async move {
                    let server = HttpServer::new(move || app(state.clone()))
                        .workers(workers)
                        .disable_signals()
                        .shutdown_timeout(drain_secs)
                        .listen(socket)?
                        .run();
                    let _ = handle_tx.send(server.handle());
                    server.await
                });
                let _ = done_tx.send(result);
            })
            .context("failed to spawn http server thread")?;

        let Ok(handle) = handle_rx.await else {
            return match done_rx.await {
                Ok(Err(e)) => Err(e).context("failed to start http server"),
                _ => Err(anyhow::anyhow!("http server exited before it started")),
            };
        };
        tracing::info!(address = %self.local_addr, "HTTP server listening");

        let graceful = self.trigger.graceful();
        let server = handle.clone();
        let result = self
            .trigger
            .serve_until_forced(async move {
                tokio::select! {
                    finished = &mut done_rx => return server_outcome(finished),
                    _ = graceful.cancelled() => {}
                }
                tracing::debug!("Draining http connections");
                let _ = server.stop(true);
                server_outcome(done_rx.await)
            })
            .await;

        if self.trigger.force().is_cancelled() {
            let _ = handle.stop(false);
        }
        result
    }

    async fn shutdown(&self, deadline: Duration) -> Result<(), ActorError> {
        self.trigger.shutdown(deadline).await
    }
}

fn server_outcome(
    finished: Result<std::io::Result<()>, oneshot::error::RecvError>,
) -> anyhow::Result<()> {
    finished
        .map_err(|_| anyhow::anyhow!("http server thread exited unexpectedly"))?
        .context("http server failed")
}
