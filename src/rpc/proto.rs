use async_trait::async_trait;
use std::convert::Infallible;
use std::sync::Arc;
use std::task::{Context, Poll};
use tonic::codegen::{http, Body, BoxFuture, StdError};
use tonic::transport::Channel;
use tonic_prost::ProstCodec;

// ============================================================================
// names.v1 Wire Types
// ============================================================================
//
//   service AppServer {
//     rpc Send(SendRequest) returns (SendResponse);
//     rpc GetName(GetNameRequest) returns (GetNameResponse);
//     rpc ListNames(ListNamesRequest) returns (ListNamesResponse);
//   }
//
// Messages derive `prost::Message` directly; the service and client are
// written against tonic's server/client building blocks.
//
// ============================================================================

pub const SERVICE_NAME: &str = "names.v1.AppServer";

const SEND_PATH: &str = "/names.v1.AppServer/Send";
const GET_NAME_PATH: &str = "/names.v1.AppServer/GetName";
const LIST_NAMES_PATH: &str = "/names.v1.AppServer/ListNames";

#[derive(Clone, PartialEq, prost::Message)]
pub struct SendRequest {
    #[prost(string, tag = "1")]
    pub message: String,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct SendResponse {
    #[prost(int64, tag = "1")]
    pub status: i64,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct GetNameRequest {
    #[prost(int64, tag = "1")]
    pub id: i64,
    #[prost(int64, optional, tag = "2")]
    pub year: Option<i64>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct GetNameResponse {
    #[prost(string, tag = "1")]
    pub name: String,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct ListNamesRequest {
    #[prost(int64, optional, tag = "1")]
    pub year: Option<i64>,
    #[prost(int64, optional, tag = "2")]
    pub page: Option<i64>,
    #[prost(int64, optional, tag = "3")]
    pub limit: Option<i64>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct NameEntry {
    #[prost(int64, tag = "1")]
    pub id: i64,
    #[prost(string, tag = "2")]
    pub name: String,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct ListNamesResponse {
    #[prost(int64, tag = "1")]
    pub limit: i64,
    #[prost(message, repeated, tag = "2")]
    pub names: Vec<NameEntry>,
    #[prost(int64, tag = "3")]
    pub page: i64,
    #[prost(int64, tag = "4")]
    pub total: i64,
    #[prost(int64, tag = "5")]
    pub year: i64,
}

/// Server-side handlers for `names.v1.AppServer`
#[async_trait]
pub trait AppServer: Send + Sync + 'static {
    async fn send(
        &self,
        request: tonic::Request<SendRequest>,
    ) -> Result<tonic::Response<SendResponse>, tonic::Status>;

    async fn get_name(
        &self,
        request: tonic::Request<GetNameRequest>,
    ) -> Result<tonic::Response<GetNameResponse>, tonic::Status>;

    async fn list_names(
        &self,
        request: tonic::Request<ListNamesRequest>,
    ) -> Result<tonic::Response<ListNamesResponse>, tonic::Status>;
}

// ----------------------------------------------------------------------------
// Server
// ----------------------------------------------------------------------------

#[derive(Debug)]
pub struct AppServerServer<T> {
    inner: Arc<T>,
}

impl<T: AppServer> AppServerServer<T> {
    pub fn new(inner: T) -> Self {
        Self::from_arc(Arc::new(inner))
    }

    pub fn from_arc(inner: Arc<T>) -> Self {
        Self { inner }
    }
}

impl<T> Clone for AppServerServer<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> tonic::server::NamedService for AppServerServer<T> {
    const NAME: &'static str = SERVICE_NAME;
}

struct SendSvc<T>(Arc<T>);

impl<T: AppServer> tonic::server::UnaryService<SendRequest> for SendSvc<T> {
    type Response = SendResponse;
    type Future = BoxFuture<tonic::Response<SendResponse>, tonic::Status>;

    fn call(&mut self, request: tonic::Request<SendRequest>) -> Self::Future {
        let inner = Arc::clone(&self.0);
        Box::pin(async move { inner.send(request).await })
    }
}

struct GetNameSvc<T>(Arc<T>);

impl<T: AppServer> tonic::server::UnaryService<GetNameRequest> for GetNameSvc<T> {
    type Response = GetNameResponse;
    type Future = BoxFuture<tonic::Response<GetNameResponse>, tonic::Status>;

    fn call(&mut self, request: tonic::Request<GetNameRequest>) -> Self::Future {
        let inner = Arc::clone(&self.0);
        Box::pin(async move { inner.get_name(request).await })
    }
}

struct ListNamesSvc<T>(Arc<T>);

impl<T: AppServer> tonic::server::UnaryService<ListNamesRequest> for ListNamesSvc<T> {
    type Response = ListNamesResponse;
    type Future = BoxFuture<tonic::Response<ListNamesResponse>, tonic::Status>;

    fn call(&mut self, request: tonic::Request<ListNamesRequest>) -> Self::Future {
        let inner = Arc::clone(&self.0);
        Box::pin(async move { inner.list_names(request).await })
    }
}

impl<T, B> tonic::codegen::Service<http::Request<B>> for AppServerServer<T>
where
    T: AppServer,
    B: Body + Send + 'static,
    B::Error: Into<StdError> + Send + 'static,
{
    type Response = http::Response<tonic::body::Body>;
    type Error = Infallible;
    type Future = BoxFuture<Self::Response, Self::Error>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: http::Request<B>) -> Self::Future {
        let inner = Arc::clone(&self.inner);

        match req.uri().path() {
            SEND_PATH => Box::pin(async move {
                let mut grpc = tonic::server::Grpc::new(ProstCodec::default());
                Ok(grpc.unary(SendSvc(inner), req).await)
            }),
            GET_NAME_PATH => Box::pin(async move {
                let mut grpc = tonic::server::Grpc::new(ProstCodec::default());
                Ok(grpc.unary(GetNameSvc(inner), req).await)
            }),
            LIST_NAMES_PATH => Box::pin(async move {
                let mut grpc = tonic::server::Grpc::new(ProstCodec::default());
                Ok(grpc.unary(ListNamesSvc(inner), req).await)
            }),
            path => {
                let status = tonic::Status::unimplemented(format!("unknown method {path}"));
                Box::pin(async move { Ok(status.into_http()) })
            }
        }
    }
}

// ----------------------------------------------------------------------------
// Client
// ----------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct AppServerClient {
    inner: tonic::client::Grpc<Channel>,
}

impl AppServerClient {
    pub fn new(channel: Channel) -> Self {
        Self {
            inner: tonic::client::Grpc::new(channel),
        }
    }

    pub async fn send(
        &mut self,
        request: impl tonic::IntoRequest<SendRequest>,
    ) -> Result<tonic::Response<SendResponse>, tonic::Status> {
        self.unary(request.into_request(), SEND_PATH).await
    }

    #[cfg(test)]
    pub async fn get_name(
        &mut self,
        request: impl tonic::IntoRequest<GetNameRequest>,
    ) -> Result<tonic::Response<GetNameResponse>, tonic::Status> {
        self.unary(request.into_request(), GET_NAME_PATH).await
    }

    #[cfg(test)]
    pub async fn list_names(
        &mut self,
        request: impl tonic::IntoRequest<ListNamesRequest>,
    ) -> Result<tonic::Response<ListNamesResponse>, tonic::Status> {
        self.unary(request.into_request(), LIST_NAMES_PATH).await
    }

    async fn unary<Req, Resp>(
        &mut self,
        request: tonic::Request<Req>,
        path: &'static str,
    ) -> Result<tonic::Response<Resp>, tonic::Status>
    where
        Req: prost::Message + Send + Sync + 'static,
        Resp: prost::Message + Default + Send + Sync + 'static,
    {
        self.inner
            .ready()
            .await
            .map_err(|e| tonic::Status::unavailable(format!("service was not ready: {e}")))?;

        let path = http::uri::PathAndQuery::from_static(path);
        self.inner
            .unary(request, path, ProstCodec::<Req, Resp>::default())
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prost::Message;

    #[test]
    fn test_optional_fields_survive_encoding() {
        let request = ListNamesRequest {
            year: Some(0),
            page: None,
            limit: Some(5),
        };

        let decoded = ListNamesRequest::decode(request.encode_to_vec().as_slice()).unwrap();
        assert_eq!(decoded.year, Some(0));
        assert_eq!(decoded.page, None);
        assert_eq!(decoded.limit, Some(5));
    }

    #[test]
    fn test_paths_match_service_name() {
        for path in [SEND_PATH, GET_NAME_PATH, LIST_NAMES_PATH] {
            assert!(path.starts_with(&format!("/{SERVICE_NAME}/")));
        }
    }
}
