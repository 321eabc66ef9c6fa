// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::decryption::SessionError;
use crate::registry::RegistryError;
use crate::storage::LedgerError;

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::SERVICE_UNAVAILABLE, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::Unavailable(_) | LedgerError::Contended { .. } => {
                tracing::warn!(error = %err, "Ledger unavailable");
                Self::unavailable(err.to_string())
            }
            LedgerError::Serialization(_) | LedgerError::Backend(_) => {
                tracing::error!(error = %err, "Ledger failure");
                Self::internal("Ledger failure")
            }
        }
    }
}

impl From<RegistryError> for ApiError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::Validation(message) => Self::bad_request(message),
            RegistryError::Ledger(err) => err.into(),
        }
    }
}

impl From<SessionError> for ApiError {
    fn from(err: SessionError) -> Self {
        let status = match &err {
            SessionError::SignatureRejected(_) => StatusCode::FORBIDDEN,
            SessionError::TimedOut(_) => StatusCode::GATEWAY_TIMEOUT,
            SessionError::WindowExpired { .. } => StatusCode::GONE,
            SessionError::Cancelled => StatusCode::SERVICE_UNAVAILABLE,
            SessionError::Decode(_) => StatusCode::UNPROCESSABLE_ENTITY,
            SessionError::InvalidTransition { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self::new(status, err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorBody {
            error: self.message,
        });
        (self.status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[test]
    fn constructors_set_status_and_message() {
        let nf = ApiError::not_found("missing");
        assert_eq!(nf.status, StatusCode::NOT_FOUND);
        assert_eq!(nf.message, "missing");

        let bad = ApiError::bad_request("bad");
        assert_eq!(bad.status, StatusCode::BAD_REQUEST);

        let down = ApiError::unavailable("down");
        assert_eq!(down.status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn registry_errors_map_to_status() {
        let validation: ApiError = RegistryError::Validation("projectName must not be empty".into()).into();
        assert_eq!(validation.status, StatusCode::BAD_REQUEST);
        assert_eq!(validation.message, "projectName must not be empty");

        let outage: ApiError = RegistryError::Ledger(LedgerError::Unavailable("offline".into())).into();
        assert_eq!(outage.status, StatusCode::SERVICE_UNAVAILABLE);

        let backend: ApiError = RegistryError::Ledger(LedgerError::Backend("disk".into())).into();
        assert_eq!(backend.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(backend.message, "Ledger failure");
    }

    #[test]
    fn session_errors_map_to_status() {
        let rejected: ApiError = SessionError::SignatureRejected("no".into()).into();
        assert_eq!(rejected.status, StatusCode::FORBIDDEN);

        let expired: ApiError = SessionError::WindowExpired { ended_at: 0 }.into();
        assert_eq!(expired.status, StatusCode::GONE);
    }

    #[tokio::test]
    async fn into_response_returns_json_body() {
        let response = ApiError::bad_request("bad data").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body_bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = String::from_utf8(body_bytes.to_vec()).unwrap();
        assert_eq!(body, r#"{"error":"bad data"}"#);
    }
}
