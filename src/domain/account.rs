use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Ledger-service aggregate. At most one account exists per user; the balance
/// never goes negative. Mutations are pure in-memory operations — persisting
/// the aggregate and invalidating its cache entry is the caller's job.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Account {
    pub id: Uuid,
    pub user_id: Uuid,
    pub balance: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum AccountError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(Decimal),
    #[error("Insufficient funds: available {available}, requested {requested}")]
    InsufficientFunds {
        available: Decimal,
        requested: Decimal,
    },
}

impl Account {
    pub fn open(user_id: Uuid) -> Self {
        let now = Utc::now();
        Account {
            id: Uuid::new_v4(),
            user_id,
            balance: Decimal::ZERO,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn deposit(&mut self, amount: Decimal) -> Result<(), AccountError> {
        if amount <= Decimal::ZERO {
            return Err(AccountError::InvalidAmount(amount));
        }
        self.balance += amount;
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn withdraw(&mut self, amount: Decimal) -> Result<(), AccountError> {
        if self.balance < amount {
            return Err(AccountError::InsufficientFunds {
                available: self.balance,
                requested: amount,
            });
        }
        self.balance -= amount;
        self.updated_at = Utc::now();
        Ok(())
    }
}

/// Read projection cached under `account:<userId>` and returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AccountView {
    pub id: Uuid,
    pub user_id: Uuid,
    pub balance: Decimal,
}

impl From<&Account> for AccountView {
    fn from(account: &Account) -> Self {
        AccountView {
            id: account.id,
            user_id: account.user_id,
            balance: account.balance,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn open_starts_with_zero_balance() {
        let account = Account::open(Uuid::new_v4());
        assert_eq!(account.balance, Decimal::ZERO);
    }

    #[test]
    fn deposit_increases_balance() {
        let mut account = Account::open(Uuid::new_v4());
        account.deposit(dec!(100)).unwrap();
        account.deposit(dec!(50)).unwrap();
        assert_eq!(account.balance, dec!(150));
    }

    #[test]
    fn deposit_rejects_zero_and_negative_amounts() {
        let mut account = Account::open(Uuid::new_v4());
        assert_eq!(
            account.deposit(Decimal::ZERO),
            Err(AccountError::InvalidAmount(Decimal::ZERO))
        );
        assert_eq!(
            account.deposit(dec!(-5)),
            Err(AccountError::InvalidAmount(dec!(-5)))
        );
        assert_eq!(account.balance, Decimal::ZERO);
    }

    #[test]
    fn withdraw_rejects_more_than_balance_and_leaves_it_unchanged() {
        let mut account = Account::open(Uuid::new_v4());
        account.deposit(dec!(150)).unwrap();

        let err = account.withdraw(dec!(200)).unwrap_err();
        assert_eq!(
            err,
            AccountError::InsufficientFunds {
                available: dec!(150),
                requested: dec!(200),
            }
        );
        assert_eq!(account.balance, dec!(150));
    }

    #[test]
    fn balance_stays_non_negative_across_mixed_operations() {
        let mut account = Account::open(Uuid::new_v4());
        account.deposit(dec!(100)).unwrap();
        account.withdraw(dec!(40)).unwrap();
        account.withdraw(dec!(60)).unwrap();
        assert_eq!(account.balance, Decimal::ZERO);
        assert!(account.withdraw(dec!(1)).is_err());
        assert!(account.balance >= Decimal::ZERO);
    }
}
