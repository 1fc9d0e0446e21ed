use std::collections::BTreeMap;
use std::fmt;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use sprunje_backend::BackendError;
use sprunje_core::{LoaderError, SchemaError};

/// Errors returned by `crud6` HTTP endpoints (§7).
///
/// Every variant maps to exactly one of the HTTP surface's status codes;
/// `Internal` and `Timeout` are logged with full context before being
/// converted to a generic envelope so nothing sensitive reaches the client.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum ApiError {
    NotFound { message: String },
    BadRequest { message: String },
    Validation { errors: BTreeMap<String, Vec<String>> },
    Forbidden { permission: String },
    Unauthenticated,
    Conflict { reason: String },
    Readonly { field: String },
    Internal { message: String },
    Timeout,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound { message } => write!(f, "{message}"),
            Self::BadRequest { message } => write!(f, "{message}"),
            Self::Validation { .. } => write!(f, "validation failed"),
            Self::Forbidden { permission } => write!(f, "missing required permission '{permission}'"),
            Self::Unauthenticated => write!(f, "authentication required"),
            Self::Conflict { reason } => write!(f, "conflict: {reason}"),
            Self::Readonly { field } => write!(f, "field '{field}' is readonly"),
            Self::Internal { .. } => write!(f, "internal server error"),
            Self::Timeout => write!(f, "the request timed out"),
        }
    }
}

impl std::error::Error for ApiError {}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::BadRequest { .. } | Self::Validation { .. } | Self::Readonly { .. } => {
                StatusCode::BAD_REQUEST
            }
            Self::Forbidden { .. } => StatusCode::FORBIDDEN,
            Self::Unauthenticated => StatusCode::UNAUTHORIZED,
            Self::Conflict { .. } => StatusCode::CONFLICT,
            Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Timeout => StatusCode::GATEWAY_TIMEOUT,
        }
    }

    fn title(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "Not Found",
            Self::BadRequest { .. } => "Bad Request",
            Self::Validation { .. } => "Validation Failed",
            Self::Forbidden { .. } => "Forbidden",
            Self::Unauthenticated => "Unauthenticated",
            Self::Conflict { .. } => "Conflict",
            Self::Readonly { .. } => "Field is Readonly",
            Self::Internal { .. } => "Internal Server Error",
            Self::Timeout => "Gateway Timeout",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if matches!(self, Self::Internal { .. } | Self::Timeout) {
            tracing::error!(error = %self, "request failed");
        }

        let status = self.status_code();
        let mut body = serde_json::json!({
            "title": self.title(),
            "description": self.to_string(),
        });
        if let Self::Validation { errors } = &self {
            body["errors"] = serde_json::to_value(errors).unwrap_or_default();
        }
        (status, Json(body)).into_response()
    }
}

impl From<BackendError> for ApiError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::RecordNotFound { model, pk } => Self::NotFound {
                message: format!("record '{pk}' not found in model '{model}'"),
            },
            BackendError::RelationNotFound { model, relation } => Self::NotFound {
                message: format!("model '{model}' has no relation named '{relation}'"),
            },
            BackendError::Conflict { reason } => Self::Conflict { reason },
            BackendError::ReadOnly { field } => Self::Readonly { field },
            BackendError::Timeout => Self::Timeout,
            BackendError::ConnectionError { message } => Self::Internal { message },
            BackendError::QueryError { message } => Self::Internal { message },
            BackendError::Internal { message } => Self::Internal { message },
            other => Self::Internal { message: other.to_string() },
        }
    }
}

impl From<LoaderError> for ApiError {
    fn from(err: LoaderError) -> Self {
        match err {
            LoaderError::NotFound(model) => Self::NotFound {
                message: format!("no schema registered for model '{model}'"),
            },
            other => Self::Internal { message: other.to_string() },
        }
    }
}

impl From<SchemaError> for ApiError {
    fn from(err: SchemaError) -> Self {
        Self::BadRequest { message: err.to_string() }
    }
}
