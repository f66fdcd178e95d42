use actix_web::{HttpRequest, HttpResponse, ResponseError, http::StatusCode};
use derive_more::Display;
use serde_json::json;

use crate::store::StoreError;

/// Error surfaced to API callers. Store failures are logged and reported
/// with a generic message.
#[derive(Debug, Display)]
pub enum ServiceError {
    #[display(fmt = "{}", _0)]
    Validation(String),

    #[display(fmt = "{} not found", _0)]
    NotFound(String),

    #[display(fmt = "Internal Server Error")]
    Store(StoreError),
}

impl From<StoreError> for ServiceError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::UnknownWorker(id) => ServiceError::NotFound(format!("Worker {id}")),
            other => ServiceError::Store(other),
        }
    }
}

impl ResponseError for ServiceError {
    fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::Validation(_) => StatusCode::BAD_REQUEST,
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let ServiceError::Store(e) = self {
            tracing::error!(error = %e, "Store operation failed");
        }
        HttpResponse::build(self.status_code()).json(json!({
            "message": self.to_string()
        }))
    }
}

/// Extractor error handler for `JsonConfig`, `QueryConfig` and `PathConfig`,
/// so malformed input gets the same `{"message"}` body as other errors.
pub fn bad_input<E: std::fmt::Display>(err: E, _req: &HttpRequest) -> actix_web::Error {
    ServiceError::Validation(err.to_string()).into()
}
