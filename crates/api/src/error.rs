//! Mapping of domain errors onto HTTP responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tally_core::banking::BankingError;
use tally_core::treasury::TreasuryError;
use tally_shared::AppError;

/// Result type for handlers.
pub type ApiResult<T> = Result<T, ApiError>;

/// A failed request, rendered as `{ "error", "message" }`.
///
/// The status comes from the error's kind; the code is the most specific
/// one the domain error offers.
#[derive(Debug)]
pub struct ApiError {
    kind: AppError,
    code: &'static str,
    message: String,
}

impl ApiError {
    /// Rejects a malformed request.
    pub fn validation(message: impl Into<String>) -> Self {
        let message = message.into();
        Self::from(AppError::Validation(message))
    }

    /// Returns the HTTP status of the response.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.kind.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Returns the machine-readable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        self.code
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        let message = match &err {
            AppError::NotFound(m)
            | AppError::Validation(m)
            | AppError::BusinessRule(m)
            | AppError::Conflict(m)
            | AppError::InsufficientFunds(m)
            | AppError::Database(m)
            | AppError::Internal(m) => m.clone(),
        };
        Self {
            code: err.error_code(),
            kind: err,
            message,
        }
    }
}

impl From<BankingError> for ApiError {
    fn from(err: BankingError) -> Self {
        Self {
            code: err.error_code(),
            message: err.to_string(),
            kind: err.into(),
        }
    }
}

impl From<TreasuryError> for ApiError {
    fn from(err: TreasuryError) -> Self {
        Self {
            code: err.error_code(),
            message: err.to_string(),
            kind: err.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.kind.is_server_error() {
            tracing::error!(error = %self.kind, code = self.code, "Request failed");
        } else {
            tracing::debug!(error = %self.kind, code = self.code, "Request rejected");
        }

        (
            self.status(),
            Json(json!({
                "error": self.code,
                "message": self.message,
            })),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use tally_shared::types::AccountId;

    #[rstest]
    #[case(AppError::NotFound("account".into()), StatusCode::NOT_FOUND)]
    #[case(AppError::Validation("amount".into()), StatusCode::BAD_REQUEST)]
    #[case(AppError::InsufficientFunds("low".into()), StatusCode::UNPROCESSABLE_ENTITY)]
    #[case(AppError::Conflict("stale".into()), StatusCode::CONFLICT)]
    #[case(AppError::Database("down".into()), StatusCode::INTERNAL_SERVER_ERROR)]
    fn test_status_follows_error(#[case] error: AppError, #[case] expected: StatusCode) {
        assert_eq!(ApiError::from(error).into_response().status(), expected);
    }

    #[test]
    fn test_domain_code_is_kept() {
        let err = ApiError::from(BankingError::AccountClosed(AccountId::new()));

        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.code(), "ACCOUNT_CLOSED");
    }
}
