use async_trait::async_trait;
use std::sync::Arc;
use tonic::{Request, Response, Status};

use super::proto::{
    AppServer, GetNameRequest, GetNameResponse, ListNamesRequest, ListNamesResponse, NameEntry,
    SendRequest, SendResponse,
};
use crate::domain::names::{self, ListParams, NamesTable, QueryError};
use crate::metrics::Metrics;

// ============================================================================
// AppServer Implementation
// ============================================================================

pub const REQUEST_ID_HEADER: &str = "x-request-id";

#[derive(Clone)]
pub struct NamesRpc {
    table: Arc<NamesTable>,
    metrics: Arc<Metrics>,
    current_year: fn() -> i64,
}

impl NamesRpc {
    pub fn new(table: Arc<NamesTable>, metrics: Arc<Metrics>) -> Self {
        Self {
            table,
            metrics,
            current_year: names::current_year,
        }
    }

    #[cfg(test)]
    pub fn with_current_year(mut self, current_year: fn() -> i64) -> Self {
        self.current_year = current_year;
        self
    }

    fn finish<T>(&self, method: &str, result: Result<T, Status>) -> Result<Response<T>, Status> {
        let code = match &result {
            Ok(_) => tonic::Code::Ok,
            Err(status) => status.code(),
        };
        self.metrics.record_rpc_request(method, code);
        result.map(Response::new)
    }
}

fn request_id<T>(request: &Request<T>) -> &str {
    request
        .metadata()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-")
}

fn to_status(err: QueryError) -> Status {
    if err.is_invalid() {
        Status::invalid_argument(err.to_string())
    } else if err.is_not_found() {
        Status::not_found(err.to_string())
    } else {
        tracing::error!(error = %err, "RPC request failed");
        Status::internal(err.to_string())
    }
}

#[async_trait]
impl AppServer for NamesRpc {
    async fn send(&self, request: Request<SendRequest>) -> Result<Response<SendResponse>, Status> {
        tracing::debug!(
            request_id = %request_id(&request),
            message = %request.get_ref().message,
            "Received Send request"
        );
        self.finish("Send", Ok(SendResponse { status: 200 }))
    }

    async fn get_name(
        &self,
        request: Request<GetNameRequest>,
    ) -> Result<Response<GetNameResponse>, Status> {
        tracing::debug!(request_id = %request_id(&request), "Received GetName request");
        let GetNameRequest { id, year } = request.into_inner();

        let result = names::get_name(&self.table, id, year, (self.current_year)())
            .map(|record| GetNameResponse { name: record.name })
            .map_err(to_status);
        self.finish("GetName", result)
    }

    async fn list_names(
        &self,
        request: Request<ListNamesRequest>,
    ) -> Result<Response<ListNamesResponse>, Status> {
        tracing::debug!(request_id = %request_id(&request), "Received ListNames request");
        let ListNamesRequest { year, page, limit } = request.into_inner();
        let params = ListParams { year, page, limit };

        let result = names::list_names(&self.table, params, (self.current_year)())
            .map(|page| ListNamesResponse {
                limit: page.limit as i64,
                names: page
                    .records
                    .into_iter()
                    .map(|r| NameEntry {
                        id: r.id,
                        name: r.name,
                    })
                    .collect(),
                page: page.page as i64,
                total: page.total as i64,
                year: page.year,
            })
            .map_err(to_status);
        self.finish("ListNames", result)
    }
}
