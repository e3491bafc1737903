use anyhow::Context;
use async_trait::async_trait;
use std::time::Duration;
use tonic::transport::Endpoint;
use uuid::Uuid;

use super::proto::{AppServerClient, SendRequest};
use super::REQUEST_ID_HEADER;
use crate::actors::Outbound;

// ============================================================================
// RPC Outbound
// ============================================================================
//
// Sends each input line with `AppServer/Send`. The channel connects lazily,
// so an unreachable server shows up as a failed send rather than a startup
// error.
//
// ============================================================================

#[derive(Debug, Clone)]
pub struct RpcOutbound {
    client: AppServerClient,
    timeout: Duration,
}

impl RpcOutbound {
    pub fn connect_lazy(addr: &str, timeout: Duration) -> anyhow::Result<Self> {
        let endpoint = Endpoint::from_shared(format!("http://{addr}"))
            .with_context(|| format!("invalid grpc server address {addr}"))?
            .connect_timeout(timeout);

        Ok(Self {
            client: AppServerClient::new(endpoint.connect_lazy()),
            timeout,
        })
    }
}

#[async_trait]
impl Outbound for RpcOutbound {
    async fn send(&self, line: &str) -> anyhow::Result<()> {
        let request_id = Uuid::new_v4().to_string();
        let mut request = tonic::Request::new(SendRequest {
            message: line.to_string(),
        });
        request.set_timeout(self.timeout);
        request
            .metadata_mut()
            .insert(REQUEST_ID_HEADER, request_id.parse()?);

        let mut client = self.client.clone();
        let response = tokio::time::timeout(self.timeout, client.send(request))
            .await
            .with_context(|| format!("request {request_id} timed out after {:?}", self.timeout))?
            .with_context(|| format!("request {request_id} failed"))?;

        tracing::info!(
            request_id = %request_id,
            status = response.get_ref().status,
            "Message sent"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actors::Listener;
    use crate::domain::names::NamesTable;
    use crate::metrics::Metrics;
    use crate::rpc::{GrpcListener, NamesRpc};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_send_reaches_server() {
        let service = NamesRpc::new(
            Arc::new(NamesTable::default()),
            Arc::new(Metrics::new().unwrap()),
        );
        let listener = Arc::new(GrpcListener::bind("127.0.0.1:0", service).await.unwrap());
        let serving = tokio::spawn({
            let listener = listener.clone();
            async move { listener.serve().await }
        });

        let outbound =
            RpcOutbound::connect_lazy(&listener.local_addr().to_string(), Duration::from_secs(5))
                .unwrap();
        outbound.send("hello").await.unwrap();

        drop(outbound);
        listener.shutdown(Duration::from_secs(5)).await.unwrap();
        assert!(serving.await.unwrap().is_ok());
    }

    #[tokio::test]
    async fn test_unreachable_server_fails_the_send() {
        // Bind then drop to get a port with nothing behind it.
        let addr = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap();

        let outbound =
            RpcOutbound::connect_lazy(&addr.to_string(), Duration::from_millis(500)).unwrap();
        let err = outbound.send("hello").await.unwrap_err();
        assert!(err.to_string().starts_with("request "));
    }

    #[test]
    fn test_invalid_address_is_rejected() {
        let err = RpcOutbound::connect_lazy("not a host", Duration::from_secs(1)).unwrap_err();
        assert!(err.to_string().contains("not a host"));
    }
}
