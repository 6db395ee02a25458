//! Banking enums and service inputs.

use tally_shared::types::{Address, Currency, CustomerId};

tally_shared::string_enum! {
    /// Kind of bank account.
    pub enum AccountType {
        /// Savings account.
        Savings => "savings",
        /// Checking account.
        Checking => "checking",
        /// Credit card account.
        CreditCard => "credit_card",
    }
}

tally_shared::string_enum! {
    /// Account lifecycle status.
    ///
    /// Valid transitions:
    /// - Active → Inactive (deactivate)
    /// - Inactive → Active (reactivate)
    /// - Active → Closed (close, terminal)
    pub enum AccountStatus {
        /// Accepts deposits and withdrawals.
        Active => "active",
        /// Temporarily frozen.
        Inactive => "inactive",
        /// Permanently closed.
        Closed => "closed",
    }
}

tally_shared::string_enum! {
    /// Kind of money movement.
    pub enum TransactionType {
        /// Money in.
        Deposit => "deposit",
        /// Money out.
        Withdrawal => "withdrawal",
        /// Money moved between two accounts.
        Transfer => "transfer",
        /// Charge levied by the bank.
        Fee => "fee",
        /// Interest credited by the bank.
        Interest => "interest",
    }
}

tally_shared::string_enum! {
    /// Transaction lifecycle status.
    ///
    /// A transaction starts pending and moves exactly once to a terminal state.
    pub enum TransactionStatus {
        /// Recorded but not yet applied.
        Pending => "pending",
        /// Applied to the account balances.
        Completed => "completed",
        /// Could not be applied.
        Failed => "failed",
        /// Cancelled before being applied.
        Reversed => "reversed",
    }
}

impl TransactionStatus {
    /// Returns true once the transaction can no longer change.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

tally_shared::string_enum! {
    /// Customer status.
    pub enum CustomerStatus {
        /// May open accounts.
        Active => "active",
        /// Dormant.
        Inactive => "inactive",
        /// Barred by the bank.
        Blocked => "blocked",
    }
}

/// Input for registering a customer.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct NewCustomer {
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Contact email, unique across customers.
    pub email: String,
    /// Contact phone number.
    #[serde(default)]
    pub phone_number: String,
    /// Postal address.
    #[serde(default)]
    pub address: Address,
}

/// Input for opening an account.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct NewAccount {
    /// Owning customer.
    pub customer_id: CustomerId,
    /// Kind of account.
    pub account_type: AccountType,
    /// Display name.
    pub name: String,
    /// Account currency.
    pub currency: Currency,
}
