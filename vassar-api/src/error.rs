//! HTTP 错误映射：统一转换为状态码与 `{"error": ...}` 响应体

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use vassar_application::error::AppError;
use vassar_domain::error::DomainError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    App(#[from] AppError),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("not found: {0}")]
    NotFound(String),
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        ApiError::App(AppError::from_domain(err))
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::App(AppError::NotImplemented(_)) => StatusCode::NOT_IMPLEMENTED,
            ApiError::App(AppError::Domain(err)) => domain_status(err),
            ApiError::App(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

fn domain_status(err: &DomainError) -> StatusCode {
    match err {
        DomainError::DuplicateRecord { .. }
        | DomainError::AmbiguousMatch { .. }
        | DomainError::SpouseConflict { .. }
        | DomainError::InvalidState { .. } => StatusCode::CONFLICT,
        DomainError::InvalidValue { .. } | DomainError::Parse { .. } => StatusCode::BAD_REQUEST,
        DomainError::ReferenceNotFound { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        DomainError::NotImplemented { .. } => StatusCode::NOT_IMPLEMENTED,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() && status != StatusCode::NOT_IMPLEMENTED {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, %status, "request rejected");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_errors_map_to_statuses() {
        let cases = [
            (
                DomainError::DuplicateRecord { key: "k".into() },
                StatusCode::CONFLICT,
            ),
            (
                DomainError::InvalidValue { reason: "r".into() },
                StatusCode::BAD_REQUEST,
            ),
            (
                DomainError::ReferenceNotFound { id: "x".into() },
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                DomainError::NotImplemented { operation: "op" },
                StatusCode::NOT_IMPLEMENTED,
            ),
            (
                DomainError::Database { reason: "down".into() },
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status(), status);
        }
    }

    #[test]
    fn not_implemented_is_lifted_out_of_domain() {
        let err = ApiError::from(DomainError::NotImplemented { operation: "tree" });
        assert!(matches!(err, ApiError::App(AppError::NotImplemented("tree"))));
    }
}
