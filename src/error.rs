/*
 * Responsibility
 * - the application-wide AppError
 * - IntoResponse: HTTP status + `{ "status": false, "message": ... }`
 * - messages are localized when the error is built (see Lang), so the
 *   response side never needs the request again
 */
use std::fmt;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::i18n::{Lang, MessageKey};

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub status: bool,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("payload too large: {0}")]
    PayloadTooLarge(String),
    #[error("too many requests: {0}")]
    TooManyRequests(String),
    #[error("internal server error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn bad_request(lang: &Lang, key: MessageKey) -> Self {
        Self::BadRequest(lang.t(key))
    }

    pub fn unauthorized(lang: &Lang, key: MessageKey) -> Self {
        Self::Unauthorized(lang.t(key))
    }

    pub fn not_found(lang: &Lang, key: MessageKey) -> Self {
        Self::NotFound(lang.t(key))
    }

    pub fn conflict(lang: &Lang, key: MessageKey) -> Self {
        Self::Conflict(lang.t(key))
    }

    pub fn payload_too_large(lang: &Lang, key: MessageKey) -> Self {
        Self::PayloadTooLarge(lang.t(key))
    }

    pub fn too_many_requests(lang: &Lang, key: MessageKey) -> Self {
        Self::TooManyRequests(lang.t(key))
    }

    /// Logs `err` and hides it behind the generic localized message.
    pub fn internal(lang: &Lang, err: impl fmt::Display) -> Self {
        tracing::error!(error = %err, "request failed");
        Self::Internal(lang.t(MessageKey::ServerErr).trim_end().to_string())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::TooManyRequests(_) => StatusCode::TOO_MANY_REQUESTS,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            AppError::BadRequest(m)
            | AppError::Unauthorized(m)
            | AppError::NotFound(m)
            | AppError::Conflict(m)
            | AppError::PayloadTooLarge(m)
            | AppError::TooManyRequests(m)
            | AppError::Internal(m) => m,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            status: false,
            message: self.message().to_string(),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::to_bytes;

    use super::*;
    use crate::i18n::Catalog;

    fn lang(header: &str) -> Lang {
        Lang::new(Arc::new(Catalog::builtin("en").unwrap()), Some(header))
    }

    async fn body(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn not_found_renders_localized_envelope() {
        let response = AppError::not_found(&lang("fr"), MessageKey::UserNotFound).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = body(response).await;
        assert_eq!(body["status"], false);
        assert_eq!(body["message"], "Utilisateur introuvable.");
    }

    #[tokio::test]
    async fn internal_hides_the_cause() {
        let response = AppError::internal(&lang("en"), "connection refused").into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body(response).await;
        assert_eq!(body["message"], "Internal server error.");
    }

    #[test]
    fn status_codes() {
        let lang = lang("en");
        assert_eq!(
            AppError::conflict(&lang, MessageKey::EmailAlreadyExists).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::payload_too_large(&lang, MessageKey::FileTooLarge).status_code(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
        assert_eq!(
            AppError::too_many_requests(&lang, MessageKey::OtpAttemptsExceeded).status_code(),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            AppError::unauthorized(&lang, MessageKey::InvalidCredentials).status_code(),
            StatusCode::UNAUTHORIZED
        );
    }
}
