use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::application::errors::ServiceError;
use crate::application::publishers::LedgerEventPublisher;
use crate::domain::{Account, AccountView, UserView};
use crate::infrastructure::cache::account_key;
use crate::infrastructure::{AccountStore, ProjectionCache, StoreError};

/// Ledger-service facade. Loads the aggregate, applies the in-memory
/// mutation, re-persists it, and invalidates the cached projection before
/// returning.
pub struct LedgerService {
    accounts: Arc<dyn AccountStore>,
    cache: ProjectionCache,
    publisher: LedgerEventPublisher,
}

impl LedgerService {
    pub fn new(
        accounts: Arc<dyn AccountStore>,
        cache: ProjectionCache,
        publisher: LedgerEventPublisher,
    ) -> Self {
        Self {
            accounts,
            cache,
            publisher,
        }
    }

    /// Opens the single account a user may hold. The existence check avoids a
    /// pointless insert; the store's uniqueness constraint on the owner id is
    /// what actually guarantees at-most-one under concurrent deliveries.
    pub async fn open_account(&self, user: &UserView) -> Result<AccountView, ServiceError> {
        if self.accounts.find_by_user_id(user.id).await?.is_some() {
            warn!("Account already exists for user {}", user.id);
            return Err(ServiceError::AccountAlreadyExists);
        }

        let account = Account::open(user.id);
        self.accounts.create(&account).await.map_err(|e| match e {
            StoreError::UniqueViolation(_) => ServiceError::AccountAlreadyExists,
            other => ServiceError::from(other),
        })?;

        info!("Account successfully created for user {}", user.id);
        self.publisher.publish_account_created(user).await;

        Ok(AccountView::from(&account))
    }

    /// Cache-aside read keyed by the owning user.
    pub async fn get_account(&self, user_id: Uuid) -> Result<AccountView, ServiceError> {
        let key = account_key(user_id);
        if let Some(view) = self.cache.get::<AccountView>(&key).await {
            return Ok(view);
        }

        let account = self
            .accounts
            .find_by_user_id(user_id)
            .await?
            .ok_or(ServiceError::AccountNotFound)?;

        let view = AccountView::from(&account);
        self.cache.set(&key, &view).await;
        Ok(view)
    }

    pub async fn deposit(&self, user_id: Uuid, amount: Decimal) -> Result<AccountView, ServiceError> {
        let mut account = self
            .accounts
            .find_by_user_id(user_id)
            .await?
            .ok_or(ServiceError::AccountNotFound)?;

        account.deposit(amount)?;
        self.accounts.update(&account).await?;
        self.cache.invalidate(&account_key(user_id)).await;

        info!("Deposited {} to account of user {}", amount, user_id);
        Ok(AccountView::from(&account))
    }

    pub async fn withdraw(
        &self,
        user_id: Uuid,
        amount: Decimal,
    ) -> Result<AccountView, ServiceError> {
        let mut account = self
            .accounts
            .find_by_user_id(user_id)
            .await?
            .ok_or(ServiceError::AccountNotFound)?;

        account.withdraw(amount)?;
        self.accounts.update(&account).await?;
        self.cache.invalidate(&account_key(user_id)).await;

        info!("Withdrew {} from account of user {}", amount, user_id);
        Ok(AccountView::from(&account))
    }
}
