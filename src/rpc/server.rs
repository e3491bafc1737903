use anyhow::Context;
use async_trait::async_trait;
use std::net::SocketAddr;
use std::sync::Mutex;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio_stream::wrappers::TcpListenerStream;
use tonic::transport::Server;

use super::proto::AppServerServer;
use super::NamesRpc;
use crate::actors::{ActorError, Listener, ShutdownTrigger};

// ============================================================================
// gRPC Listener
// ============================================================================
//
// Serves `names.v1.AppServer` plus the standard `grpc.health.v1` service on
// a socket bound ahead of time. A graceful stop lets in-flight calls finish;
// a forced stop drops the server future and with it every connection.
//
// ============================================================================

pub struct GrpcListener {
    socket: Mutex<Option<TcpListener>>,
    local_addr: SocketAddr,
    service: NamesRpc,
    trigger: ShutdownTrigger,
}

impl GrpcListener {
    pub async fn bind(addr: &str, service: NamesRpc) -> anyhow::Result<Self> {
        let socket = TcpListener::bind(addr)
            .await
            .with_context(|| format!("failed to bind grpc listener on {addr}"))?;
        let local_addr = socket.local_addr()?;

        Ok(Self {
            socket: Mutex::new(Some(socket)),
            local_addr,
            service,
            trigger: ShutdownTrigger::new("grpc"),
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }
}

#[async_trait]
impl Listener for GrpcListener {
    fn name(&self) -> &str {
        "grpc"
    }

    async fn serve(&self) -> anyhow::Result<()> {
        let socket = self
            .socket
            .lock()
            .map_err(|_| anyhow::anyhow!("grpc listener state poisoned"))?
            .take()
            .ok_or_else(|| ActorError::AlreadyServed(self.name().to_string()))?;
        let _stopped = self.trigger.stopped_guard();

        let (health_reporter, health_service) = tonic_health::server::health_reporter();
        health_reporter
            .set_serving::<AppServerServer<NamesRpc>>()
            .await;

        tracing::info!(address = %self.local_addr, "gRPC server listening");

        let router = Server::builder()
            .add_service(health_service)
            .add_service(AppServerServer::new(self.service.clone()));
        let graceful = self.trigger.graceful();

        self.trigger
            .serve_until_forced(async move {
                router
                    .serve_with_incoming_shutdown(
                        TcpListenerStream::new(socket),
                        graceful.cancelled_owned(),
                    )
                    .await
                    .context("grpc server failed")
            })
            .await
    }

    async fn shutdown(&self, deadline: Duration) -> Result<(), ActorError> {
        self.trigger.shutdown(deadline).await
    }
}
