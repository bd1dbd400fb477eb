use std::sync::Arc;

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

/// Shared handler result type.
pub type ApiResult<T> = Result<T, ApiError>;

/// Every failure a caller can observe. Internal detail never leaves the process.
#[derive(Debug, Error, Clone)]
pub enum ApiError {
    #[error("{message}")]
    Validation {
        field: &'static str,
        message: String,
    },
    #[error("{message}")]
    ReferenceNotFound {
        field: &'static str,
        message: String,
    },
    #[error("{0}")]
    InUse(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    BusinessRule(String),
    #[error("operation failed")]
    Internal(Arc<anyhow::Error>),
}

impl ApiError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    pub fn reference(field: &'static str, message: impl Into<String>) -> Self {
        Self::ReferenceNotFound {
            field,
            message: message.into(),
        }
    }

    pub fn internal(err: impl Into<anyhow::Error>) -> Self {
        Self::Internal(Arc::new(err.into()))
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Validation { .. } => "VALIDATION_ERROR",
            ApiError::ReferenceNotFound { .. } => "REFERENCE_NOT_FOUND",
            ApiError::InUse(_) => "IN_USE",
            ApiError::Conflict(_) => "CONFLICT",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::BusinessRule(_) => "BUSINESS_RULE",
            ApiError::Internal(_) => "INTERNAL",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation { .. }
            | ApiError::ReferenceNotFound { .. }
            | ApiError::InUse(_)
            | ApiError::BusinessRule(_) => StatusCode::BAD_REQUEST,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn field(&self) -> Option<&'static str> {
        match self {
            ApiError::Validation { field, .. } | ApiError::ReferenceNotFound { field, .. } => {
                Some(*field)
            }
            _ => None,
        }
    }
}

/// Errors compare by what a caller would see.
impl PartialEq for ApiError {
    fn eq(&self, other: &Self) -> bool {
        self.code() == other.code()
            && self.field() == other.field()
            && self.to_string() == other.to_string()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(value: anyhow::Error) -> Self {
        Self::Internal(Arc::new(value))
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::validation("body", rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::validation("id", rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::validation("query", rejection.body_text())
    }
}

/// JSON error body: `{"error": .., "code": .., "field": ..}`.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub code: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<&'static str>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            ApiError::Internal(err) => error!(error = ?err, "request failed"),
            other => warn!(code = other.code(), error = %other, "request rejected"),
        }
        let body = ErrorBody {
            error: self.to_string(),
            code: self.code(),
            field: self.field(),
        };
        (status, Json(body)).into_response()
    }
}
