//! Banking error types.

use tally_shared::AppError;
use tally_shared::types::{AccountId, Currency, CustomerId, MinorUnits};
use thiserror::Error;

use crate::banking::types::{AccountStatus, TransactionStatus};
use crate::error::{ErrorKind, RepositoryError, to_app_error};

/// Errors that can occur during banking operations.
#[derive(Debug, Error)]
pub enum BankingError {
    /// The account is not active (inactive or closed).
    #[error("Account {0} is closed or inactive")]
    AccountClosed(AccountId),

    /// Withdrawal larger than the available balance.
    #[error("Insufficient funds in account {account_id}: balance {balance}, requested {requested}")]
    InsufficientFunds {
        /// The debited account.
        account_id: AccountId,
        /// Balance before the attempted withdrawal.
        balance: MinorUnits,
        /// Requested amount.
        requested: MinorUnits,
    },

    /// Amounts must be strictly positive.
    #[error("Amount must be positive, got {0}")]
    InvalidAmount(MinorUnits),

    /// The deposit would overflow the balance.
    #[error("Balance overflow on account {0}")]
    BalanceOverflow(AccountId),

    /// Transfer source and target are the same account.
    #[error("Cannot transfer to the same account")]
    SameAccount,

    /// Transfer between accounts of different currencies.
    #[error("Currency mismatch: {from_currency} vs {to_currency}")]
    CurrencyMismatch {
        /// Currency of the source account.
        from_currency: Currency,
        /// Currency of the target account.
        to_currency: Currency,
    },

    /// Lifecycle transition not allowed from the current account status.
    #[error("Cannot {action} account {id} in status {status}")]
    InvalidAccountStatus {
        /// The account.
        id: AccountId,
        /// Its current status.
        status: AccountStatus,
        /// The attempted action.
        action: &'static str,
    },

    /// Transaction is no longer pending.
    #[error("Transaction {reference} is {status}, expected pending")]
    InvalidTransactionStatus {
        /// Reference code of the transaction.
        reference: String,
        /// Its current status.
        status: TransactionStatus,
    },

    /// The owning customer cannot open accounts.
    #[error("Customer {0} is not active")]
    CustomerInactive(CustomerId),

    /// Another customer already uses the email.
    #[error("Customer with email '{0}' already exists")]
    CustomerExists(String),

    /// Malformed request.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Persistence failure.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl BankingError {
    /// Returns the error kind.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::AccountClosed(_)
            | Self::InvalidAccountStatus { .. }
            | Self::InvalidTransactionStatus { .. }
            | Self::CustomerInactive(_) => ErrorKind::InvalidState,
            Self::InsufficientFunds { .. } => ErrorKind::InsufficientResource,
            Self::InvalidAmount(_)
            | Self::BalanceOverflow(_)
            | Self::SameAccount
            | Self::CurrencyMismatch { .. }
            | Self::InvalidInput(_) => ErrorKind::InvalidInput,
            Self::CustomerExists(_) => ErrorKind::AlreadyExists,
            Self::Repository(err) => err.kind(),
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::AccountClosed(_) => "ACCOUNT_CLOSED",
            Self::InsufficientFunds { .. } => "INSUFFICIENT_FUNDS",
            Self::InvalidAmount(_) => "INVALID_AMOUNT",
            Self::BalanceOverflow(_) => "BALANCE_OVERFLOW",
            Self::SameAccount => "SAME_ACCOUNT",
            Self::CurrencyMismatch { .. } => "CURRENCY_MISMATCH",
            Self::InvalidAccountStatus { .. } => "INVALID_ACCOUNT_STATUS",
            Self::InvalidTransactionStatus { .. } => "INVALID_TRANSACTION_STATUS",
            Self::CustomerInactive(_) => "CUSTOMER_INACTIVE",
            Self::CustomerExists(_) => "CUSTOMER_EXISTS",
            Self::InvalidInput(_) => "INVALID_INPUT",
            Self::Repository(RepositoryError::NotFound { .. }) => "NOT_FOUND",
            Self::Repository(RepositoryError::Duplicate { .. }) => "ALREADY_EXISTS",
            Self::Repository(RepositoryError::Conflict { .. }) => "CONCURRENT_MODIFICATION",
            Self::Repository(RepositoryError::Storage(_)) => "DATABASE_ERROR",
        }
    }
}

impl From<BankingError> for AppError {
    fn from(err: BankingError) -> Self {
        to_app_error(err.kind(), err.to_string())
    }
}
