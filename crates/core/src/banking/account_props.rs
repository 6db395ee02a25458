//! Property-based tests for account balances.

use proptest::prelude::*;
use tally_shared::types::{Currency, CustomerId, MinorUnits};

use crate::banking::account::Account;
use crate::banking::error::BankingError;
use crate::banking::types::{AccountType, NewAccount};

#[derive(Debug, Clone)]
enum Op {
    Deposit(MinorUnits),
    Withdraw(MinorUnits),
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (-10i64..10_000i64).prop_map(Op::Deposit),
        (-10i64..10_000i64).prop_map(Op::Withdraw),
    ]
}

fn fresh_account() -> Account {
    Account::new(NewAccount {
        customer_id: CustomerId::new(),
        account_type: AccountType::Checking,
        name: "prop".into(),
        currency: Currency::Usd,
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Balance never goes negative, whatever sequence of calls is attempted.
    #[test]
    fn prop_balance_never_negative(ops in prop::collection::vec(arb_op(), 0..50)) {
        let mut account = fresh_account();
        for op in ops {
            let _ = match op {
                Op::Deposit(amount) => account.deposit(amount),
                Op::Withdraw(amount) => account.withdraw(amount),
            };
            prop_assert!(account.balance >= 0);
        }
    }

    /// Withdraw fails with InsufficientFunds iff amount > balance, and a
    /// failed withdraw never changes the balance.
    #[test]
    fn prop_withdraw_insufficient_iff_amount_exceeds_balance(
        balance in 0i64..1_000_000i64,
        amount in 1i64..2_000_000i64,
    ) {
        let mut account = fresh_account();
        account.balance = balance;

        match account.withdraw(amount) {
            Ok(()) => {
                prop_assert!(amount <= balance);
                prop_assert_eq!(account.balance, balance - amount);
            }
            Err(BankingError::InsufficientFunds { requested, .. }) => {
                prop_assert!(amount > balance);
                prop_assert_eq!(requested, amount);
                prop_assert_eq!(account.balance, balance);
            }
            Err(other) => prop_assert!(false, "unexpected error: {other}"),
        }
    }

    /// Deposit followed by withdraw of the same amount restores the balance.
    #[test]
    fn prop_deposit_withdraw_cancel(
        balance in 0i64..1_000_000i64,
        amount in 1i64..1_000_000i64,
    ) {
        let mut account = fresh_account();
        account.balance = balance;
        account.deposit(amount).unwrap();
        account.withdraw(amount).unwrap();
        prop_assert_eq!(account.balance, balance);
    }
}
