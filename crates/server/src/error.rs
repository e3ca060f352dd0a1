use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::error;
use utoipa::ToSchema;
use vitrine_core::errors::DomainError;
use vitrine_db::repositories::RepositoryError;

/// `{ "error": ... }` body used for validation and store failures.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
}

/// `{ "message": ... }` body used for confirmations and not-found answers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct MessageBody {
    pub message: String,
}

impl MessageBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("not found: {0}")]
    NotFound(&'static str),
    #[error(transparent)]
    Store(#[from] RepositoryError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<DomainError> for ApiError {
    fn from(value: DomainError) -> Self {
        Self::Validation(value.user_message())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            Self::Validation(message) => {
                (status, Json(ErrorBody { error: message })).into_response()
            }
            Self::NotFound(message) => (status, Json(MessageBody::new(message))).into_response(),
            Self::Store(source) => {
                error!(
                    event_name = "product.store_error",
                    error = %source,
                    "product store operation failed"
                );
                (status, Json(ErrorBody { error: source.to_string() })).into_response()
            }
        }
    }
}
