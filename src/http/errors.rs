use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};

use crate::domain::names::QueryError;

// ============================================================================
// HTTP API Errors
// ============================================================================
//
// Every error body is `{"message": "..."}`. Internal failures only carry
// their detail when the server runs with `--http-debug`.
//
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{message}")]
    Internal { message: String, debug: bool },
}

impl ApiError {
    pub fn from_query(err: QueryError, debug: bool) -> Self {
        if err.is_invalid() {
            ApiError::BadRequest(err.to_string())
        } else if err.is_not_found() {
            ApiError::NotFound(err.to_string())
        } else {
            ApiError::internal(err, debug)
        }
    }

    pub fn internal(err: impl std::fmt::Display, debug: bool) -> Self {
        let message = err.to_string();
        tracing::error!(error = %message, "Request failed");
        ApiError::Internal { message, debug }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            ApiError::Internal { debug: false, .. } => "Internal Server Error".to_string(),
            other => other.to_string(),
        };

        HttpResponse::build(self.status_code()).json(serde_json::json!({ "message": message }))
    }
}
