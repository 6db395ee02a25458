//! Account entity and its balance invariants.
//!
//! The balance is an integer count of minor units and never goes negative.
//! Every balance change goes through [`Account::deposit`] or
//! [`Account::withdraw`]; both refuse to touch an account that is not active.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tally_shared::types::{AccountId, Currency, CustomerId, MinorUnits, Money};

use crate::banking::error::BankingError;
use crate::banking::types::{AccountStatus, AccountType, NewAccount};
use crate::codes::short_code;

/// A customer's account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Identifier.
    pub id: AccountId,
    /// Owning customer.
    pub customer_id: CustomerId,
    /// Kind of account.
    pub account_type: AccountType,
    /// Lifecycle status.
    pub status: AccountStatus,
    /// Balance in minor units, never negative.
    pub balance: MinorUnits,
    /// Account currency.
    pub currency: Currency,
    /// Display name.
    pub name: String,
    /// Eight character account number (unique).
    pub number: String,
    /// Optimistic concurrency token, bumped by every stored update.
    pub version: i64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
    /// Set when the account is closed.
    pub closed_at: Option<DateTime<Utc>>,
}

impl Account {
    /// Opens a new active account with a zero balance.
    #[must_use]
    pub fn new(input: NewAccount) -> Self {
        let now = Utc::now();
        Self {
            id: AccountId::new(),
            customer_id: input.customer_id,
            account_type: input.account_type,
            status: AccountStatus::Active,
            balance: 0,
            currency: input.currency,
            name: input.name,
            number: short_code(),
            version: 1,
            created_at: now,
            updated_at: now,
            closed_at: None,
        }
    }

    /// Returns true if the account accepts movements.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == AccountStatus::Active
    }

    /// Balance as a [`Money`] value.
    #[must_use]
    pub const fn money(&self) -> Money {
        Money::new(self.balance, self.currency)
    }

    /// Credits `amount` to the balance.
    pub fn deposit(&mut self, amount: MinorUnits) -> Result<(), BankingError> {
        self.ensure_active()?;
        ensure_positive(amount)?;

        self.balance = self
            .balance
            .checked_add(amount)
            .ok_or(BankingError::BalanceOverflow(self.id))?;
        self.touch();
        Ok(())
    }

    /// Debits `amount` from the balance.
    ///
    /// Fails with `InsufficientFunds` iff `amount` exceeds the balance; the
    /// balance is left untouched on any failure.
    pub fn withdraw(&mut self, amount: MinorUnits) -> Result<(), BankingError> {
        self.ensure_active()?;
        ensure_positive(amount)?;

        if self.balance < amount {
            return Err(BankingError::InsufficientFunds {
                account_id: self.id,
                balance: self.balance,
                requested: amount,
            });
        }

        self.balance -= amount;
        self.touch();
        Ok(())
    }

    /// Closes the account. Only an active account can be closed.
    pub fn close(&mut self) -> Result<(), BankingError> {
        match self.status {
            AccountStatus::Active => {
                let now = Utc::now();
                self.status = AccountStatus::Closed;
                self.closed_at = Some(now);
                self.updated_at = now;
                Ok(())
            }
            AccountStatus::Closed => Err(BankingError::AccountClosed(self.id)),
            AccountStatus::Inactive => Err(self.invalid_status("close")),
        }
    }

    /// Freezes an active account.
    pub fn deactivate(&mut self) -> Result<(), BankingError> {
        if self.status != AccountStatus::Active {
            return Err(self.invalid_status("deactivate"));
        }
        self.status = AccountStatus::Inactive;
        self.touch();
        Ok(())
    }

    /// Unfreezes an inactive account.
    pub fn reactivate(&mut self) -> Result<(), BankingError> {
        if self.status != AccountStatus::Inactive {
            return Err(self.invalid_status("reactivate"));
        }
        self.status = AccountStatus::Active;
        self.touch();
        Ok(())
    }

    /// Changes the display name of an active account.
    pub fn rename(&mut self, name: &str) -> Result<(), BankingError> {
        self.ensure_active()?;
        let name = name.trim();
        if name.is_empty() {
            return Err(BankingError::InvalidInput(
                "account name must not be empty".into(),
            ));
        }
        self.name = name.to_string();
        self.touch();
        Ok(())
    }

    fn ensure_active(&self) -> Result<(), BankingError> {
        if self.is_active() {
            Ok(())
        } else {
            Err(BankingError::AccountClosed(self.id))
        }
    }

    fn invalid_status(&self, action: &'static str) -> BankingError {
        BankingError::InvalidAccountStatus {
            id: self.id,
            status: self.status,
            action,
        }
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Rejects zero and negative amounts.
pub(crate) fn ensure_positive(amount: MinorUnits) -> Result<(), BankingError> {
    if amount > 0 {
        Ok(())
    } else {
        Err(BankingError::InvalidAmount(amount))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use rstest::rstest;

    fn account_with_balance(balance: MinorUnits) -> Account {
        let mut account = Account::new(NewAccount {
            customer_id: CustomerId::new(),
            account_type: AccountType::Checking,
            name: "Everyday".into(),
            currency: Currency::Usd,
        });
        account.balance = balance;
        account
    }

    #[test]
    fn test_new_account_defaults() {
        let account = account_with_balance(0);
        assert!(account.is_active());
        assert_eq!(account.balance, 0);
        assert_eq!(account.version, 1);
        assert_eq!(account.number.len(), 8);
        assert!(account.closed_at.is_none());
        assert_eq!(account.money(), Money::zero(Currency::Usd));
    }

    #[test]
    fn test_deposit_increases_balance() {
        let mut account = account_with_balance(100);
        account.deposit(50).unwrap();
        assert_eq!(account.balance, 150);
    }

    #[rstest]
    #[case(0)]
    #[case(-5)]
    fn test_deposit_rejects_non_positive(#[case] amount: MinorUnits) {
        let mut account = account_with_balance(100);
        let err = account.deposit(amount).unwrap_err();
        assert!(matches!(err, BankingError::InvalidAmount(a) if a == amount));
        assert_eq!(account.balance, 100);
    }

    #[test]
    fn test_deposit_overflow() {
        let mut account = account_with_balance(i64::MAX);
        let err = account.deposit(1).unwrap_err();
        assert!(matches!(err, BankingError::BalanceOverflow(_)));
        assert_eq!(account.balance, i64::MAX);
    }

    #[rstest]
    #[case(100, 40, Some(60))]
    #[case(100, 100, Some(0))]
    #[case(100, 101, None)]
    fn test_withdraw(
        #[case] balance: MinorUnits,
        #[case] amount: MinorUnits,
        #[case] expected: Option<MinorUnits>,
    ) {
        let mut account = account_with_balance(balance);
        let result = account.withdraw(amount);
        match expected {
            Some(remaining) => {
                result.unwrap();
                assert_eq!(account.balance, remaining);
            }
            None => {
                let err = result.unwrap_err();
                assert_eq!(err.kind(), ErrorKind::InsufficientResource);
                assert_eq!(account.balance, balance);
            }
        }
    }

    #[test]
    fn test_movements_on_inactive_account_fail() {
        let mut account = account_with_balance(100);
        account.deactivate().unwrap();

        assert!(matches!(
            account.deposit(10),
            Err(BankingError::AccountClosed(_))
        ));
        assert!(matches!(
            account.withdraw(10),
            Err(BankingError::AccountClosed(_))
        ));
        assert_eq!(account.balance, 100);
    }

    #[test]
    fn test_close_sets_closed_at() {
        let mut account = account_with_balance(0);
        account.close().unwrap();
        assert_eq!(account.status, AccountStatus::Closed);
        assert!(account.closed_at.is_some());
    }

    #[test]
    fn test_close_twice_fails_with_invalid_state() {
        let mut account = account_with_balance(0);
        account.close().unwrap();
        let closed_at = account.closed_at;

        let err = account.close().unwrap_err();
        assert!(matches!(err, BankingError::AccountClosed(_)));
        assert_eq!(err.kind(), ErrorKind::InvalidState);
        assert_eq!(account.closed_at, closed_at);
    }

    #[test]
    fn test_close_inactive_account_fails() {
        let mut account = account_with_balance(0);
        account.deactivate().unwrap();
        let err = account.close().unwrap_err();
        assert!(matches!(
            err,
            BankingError::InvalidAccountStatus {
                action: "close",
                ..
            }
        ));
    }

    #[test]
    fn test_deactivate_reactivate_round_trip() {
        let mut account = account_with_balance(0);
        account.deactivate().unwrap();
        assert_eq!(account.status, AccountStatus::Inactive);
        assert!(account.deactivate().is_err());

        account.reactivate().unwrap();
        assert!(account.is_active());
        assert!(account.reactivate().is_err());
    }

    #[test]
    fn test_closed_is_terminal() {
        let mut account = account_with_balance(0);
        account.close().unwrap();
        assert!(account.reactivate().is_err());
        assert!(account.deactivate().is_err());
        assert!(account.rename("New").is_err());
    }

    #[test]
    fn test_rename() {
        let mut account = account_with_balance(0);
        account.rename("  Rainy day  ").unwrap();
        assert_eq!(account.name, "Rainy day");
        assert!(matches!(
            account.rename("   "),
            Err(BankingError::InvalidInput(_))
        ));
    }
}
