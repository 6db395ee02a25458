//! Treasury error types.

use chrono::NaiveDate;
use tally_shared::AppError;
use tally_shared::types::{MinorUnits, TaxFilingId, TaxRateId};
use thiserror::Error;

use crate::error::{ErrorKind, RepositoryError, to_app_error};
use crate::treasury::types::{FilingStatus, PaymentStatus, TaxRateStatus};

/// Errors that can occur during treasury operations.
#[derive(Debug, Error)]
pub enum TreasuryError {
    /// Rate outside 0.0 to 1.0.
    #[error("Invalid tax rate {0}: must be between 0 and 1")]
    InvalidTaxRate(f64),

    /// Progressive band with max not above min.
    #[error("Invalid bracket: max amount {max} must exceed min amount {min}")]
    InvalidBracket {
        /// Lower bound.
        min: MinorUnits,
        /// Upper bound.
        max: MinorUnits,
    },

    /// Tax rate transition not allowed from the current status.
    #[error("Cannot {action} tax rate {id} in status {status}")]
    InvalidTaxRateStatus {
        /// The rate.
        id: TaxRateId,
        /// Its current status.
        status: TaxRateStatus,
        /// The attempted action.
        action: &'static str,
    },

    /// Period end not after period start.
    #[error("Invalid filing period: {start} to {end}")]
    InvalidFilingPeriod {
        /// First day.
        start: NaiveDate,
        /// Last day.
        end: NaiveDate,
    },

    /// Filing transition or edit not allowed from the current status.
    #[error("Cannot {action} filing {id} in status {status}")]
    InvalidFilingStatus {
        /// The filing.
        id: TaxFilingId,
        /// Its current status.
        status: FilingStatus,
        /// The attempted action.
        action: &'static str,
    },

    /// Payment amounts must be strictly positive.
    #[error("Invalid payment amount {0}: must be positive")]
    InvalidPaymentAmount(MinorUnits),

    /// Payment transition not allowed from the current status.
    #[error("Cannot {action} payment {confirmation_code} in status {status}")]
    InvalidPaymentStatus {
        /// Confirmation code of the payment.
        confirmation_code: String,
        /// Its current status.
        status: PaymentStatus,
        /// The attempted action.
        action: &'static str,
    },

    /// Deduction, credit or reported amount out of range.
    #[error("Invalid amount {0}")]
    InvalidAmount(MinorUnits),

    /// Another taxpayer already uses the identifier.
    #[error("Taxpayer with identifier '{0}' already exists")]
    TaxpayerExists(String),

    /// Malformed request.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Persistence failure.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl TreasuryError {
    /// Returns the error kind.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidTaxRate(_)
            | Self::InvalidBracket { .. }
            | Self::InvalidFilingPeriod { .. }
            | Self::InvalidPaymentAmount(_)
            | Self::InvalidAmount(_)
            | Self::InvalidInput(_) => ErrorKind::InvalidInput,
            Self::InvalidTaxRateStatus { .. }
            | Self::InvalidFilingStatus { .. }
            | Self::InvalidPaymentStatus { .. } => ErrorKind::InvalidState,
            Self::TaxpayerExists(_) => ErrorKind::AlreadyExists,
            Self::Repository(err) => err.kind(),
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidTaxRate(_) => "INVALID_TAX_RATE",
            Self::InvalidBracket { .. } => "INVALID_BRACKET",
            Self::InvalidTaxRateStatus { .. } => "INVALID_TAX_RATE_STATUS",
            Self::InvalidFilingPeriod { .. } => "INVALID_FILING_PERIOD",
            Self::InvalidFilingStatus { .. } => "INVALID_FILING_STATUS",
            Self::InvalidPaymentAmount(_) => "INVALID_PAYMENT_AMOUNT",
            Self::InvalidPaymentStatus { .. } => "INVALID_PAYMENT_STATUS",
            Self::InvalidAmount(_) => "INVALID_AMOUNT",
            Self::TaxpayerExists(_) => "TAXPAYER_EXISTS",
            Self::InvalidInput(_) => "INVALID_INPUT",
            Self::Repository(RepositoryError::NotFound { .. }) => "NOT_FOUND",
            Self::Repository(RepositoryError::Duplicate { .. }) => "ALREADY_EXISTS",
            Self::Repository(RepositoryError::Conflict { .. }) => "CONCURRENT_MODIFICATION",
            Self::Repository(RepositoryError::Storage(_)) => "DATABASE_ERROR",
        }
    }
}

impl From<TreasuryError> for AppError {
    fn from(err: TreasuryError) -> Self {
        to_app_error(err.kind(), err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_filing_status_error() {
        let err = TreasuryError::InvalidFilingStatus {
            id: TaxFilingId::new(),
            status: FilingStatus::Submitted,
            action: "submit",
        };
        assert_eq!(err.kind(), ErrorKind::InvalidState);
        assert_eq!(err.error_code(), "INVALID_FILING_STATUS");
        assert!(err.to_string().contains("submitted"));

        let app: AppError = err.into();
        assert_eq!(app.status_code(), 422);
    }

    #[test]
    fn test_input_errors_map_to_validation() {
        let app: AppError = TreasuryError::InvalidTaxRate(1.5).into();
        assert_eq!(app.status_code(), 400);
        assert_eq!(
            app.to_string(),
            "Validation error: Invalid tax rate 1.5: must be between 0 and 1"
        );
    }

    #[test]
    fn test_taxpayer_exists_is_conflict() {
        let err = TreasuryError::TaxpayerExists("123-45-6789".into());
        assert_eq!(err.kind(), ErrorKind::AlreadyExists);
        let app: AppError = err.into();
        assert_eq!(app.status_code(), 409);
    }
}
