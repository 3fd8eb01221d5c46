use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use uuid::Uuid;

use microbank::application::{
    EmailSender, IdentityEventPublisher, IdentityService, LedgerConsumer, LedgerEventPublisher,
    LedgerScope, LedgerService, NotificationConsumer, NotificationScope,
};
use microbank::domain::{Account, User};
use microbank::infrastructure::auth::AuthConfig;
use microbank::infrastructure::broker::{
    BrokerError, HandlerError, MessageBroker, MessageHandler,
};
use microbank::infrastructure::cache::{CacheClient, CacheError, ProjectionCache, PROJECTION_TTL};
use microbank::infrastructure::store::StoreError;
use microbank::infrastructure::{AccountStore, UserStore};

/// Broker double that delivers published messages straight to the registered
/// handler, applying the same ack/requeue policy as the real client. Requeued
/// messages are redelivered a bounded number of times.
#[derive(Default)]
pub struct InMemoryBroker {
    handlers: Mutex<std::collections::HashMap<String, MessageHandler>>,
    pub published: Mutex<Vec<(String, Vec<u8>)>>,
}

#[async_trait]
impl MessageBroker for InMemoryBroker {
    async fn publish(&self, queue: &str, payload: &[u8]) -> Result<(), BrokerError> {
        self.published
            .lock()
            .unwrap()
            .push((queue.to_string(), payload.to_vec()));

        let handler = self.handlers.lock().unwrap().get(queue).cloned();
        if let Some(handler) = handler {
            let mut attempts = 0;
            loop {
                attempts += 1;
                match handler(payload.to_vec()).await {
                    Ok(()) | Err(HandlerError::Discard(_)) => break,
                    Err(HandlerError::Requeue(_)) if attempts < 3 => continue,
                    Err(HandlerError::Requeue(_)) => break,
                }
            }
        }
        Ok(())
    }

    async fn consume(&self, queue: &str, handler: MessageHandler) -> Result<(), BrokerError> {
        self.handlers
            .lock()
            .unwrap()
            .insert(queue.to_string(), handler);
        Ok(())
    }
}

/// Broker double whose publishes always fail, for asserting the best-effort
/// policy of the publishers.
pub struct FailingBroker;

#[async_trait]
impl MessageBroker for FailingBroker {
    async fn publish(&self, _queue: &str, _payload: &[u8]) -> Result<(), BrokerError> {
        Err(BrokerError::Connection("broker is down".to_string()))
    }

    async fn consume(&self, _queue: &str, _handler: MessageHandler) -> Result<(), BrokerError> {
        Err(BrokerError::Connection("broker is down".to_string()))
    }
}

#[derive(Default)]
pub struct InMemoryUserStore {
    users: DashMap<Uuid, User>,
    pub fetches: AtomicUsize,
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        self.fetches.fetch_add(1, Ordering::Relaxed);
        Ok(self.users.get(&id).map(|u| u.clone()))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        self.fetches.fetch_add(1, Ordering::Relaxed);
        Ok(self
            .users
            .iter()
            .find(|u| u.email == email)
            .map(|u| u.clone()))
    }

    async fn create(&self, user: &User) -> Result<(), StoreError> {
        if self.users.iter().any(|u| u.email == user.email) {
            return Err(StoreError::UniqueViolation("users_email_key".to_string()));
        }
        self.users.insert(user.id, user.clone());
        Ok(())
    }

    async fn update(&self, user: &User) -> Result<(), StoreError> {
        if !self.users.contains_key(&user.id) {
            return Err(StoreError::NotFound);
        }
        self.users.insert(user.id, user.clone());
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryAccountStore {
    accounts: DashMap<Uuid, Account>,
    pub fetches: AtomicUsize,
}

impl InMemoryAccountStore {
    pub fn count(&self) -> usize {
        self.accounts.len()
    }
}

#[async_trait]
impl AccountStore for InMemoryAccountStore {
    async fn find_by_user_id(&self, user_id: Uuid) -> Result<Option<Account>, StoreError> {
        self.fetches.fetch_add(1, Ordering::Relaxed);
        Ok(self
            .accounts
            .iter()
            .find(|a| a.user_id == user_id)
            .map(|a| a.clone()))
    }

    async fn create(&self, account: &Account) -> Result<(), StoreError> {
        if self.accounts.iter().any(|a| a.user_id == account.user_id) {
            return Err(StoreError::UniqueViolation(
                "accounts_user_id_key".to_string(),
            ));
        }
        self.accounts.insert(account.id, account.clone());
        Ok(())
    }

    async fn update(&self, account: &Account) -> Result<(), StoreError> {
        if !self.accounts.contains_key(&account.id) {
            return Err(StoreError::NotFound);
        }
        self.accounts.insert(account.id, account.clone());
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryCache {
    entries: DashMap<String, String>,
}

#[async_trait]
impl CacheClient for InMemoryCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        Ok(self.entries.get(key).map(|v| v.clone()))
    }

    async fn set_ex(&self, key: &str, value: &str, _ttl: Duration) -> Result<(), CacheError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn del(&self, key: &str) -> Result<(), CacheError> {
        self.entries.remove(key);
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingMailer {
    pub sent: Mutex<Vec<(String, String, String)>>,
}

#[async_trait]
impl EmailSender for RecordingMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> anyhow::Result<()> {
        self.sent
            .lock()
            .unwrap()
            .push((to.to_string(), subject.to_string(), body.to_string()));
        Ok(())
    }
}

pub fn test_auth_config() -> AuthConfig {
    AuthConfig {
        jwt_secret: "integration-test-secret".to_string(),
        token_expiry_secs: 3600,
    }
}

/// All three services wired through one in-memory broker, mirroring the
/// deployed topology: identity publishes, ledger consumes confirmations,
/// notification consumes sign-ups and account openings.
pub struct TestSystem {
    pub broker: Arc<InMemoryBroker>,
    pub users: Arc<InMemoryUserStore>,
    pub accounts: Arc<InMemoryAccountStore>,
    pub mailer: Arc<RecordingMailer>,
    pub identity: IdentityService,
    pub ledger: LedgerService,
}

pub async fn start_system() -> TestSystem {
    let broker = Arc::new(InMemoryBroker::default());
    let users = Arc::new(InMemoryUserStore::default());
    let accounts = Arc::new(InMemoryAccountStore::default());
    let mailer = Arc::new(RecordingMailer::default());

    let identity_cache = ProjectionCache::new(Arc::new(InMemoryCache::default()), PROJECTION_TTL);
    let ledger_cache = ProjectionCache::new(Arc::new(InMemoryCache::default()), PROJECTION_TTL);

    let identity = IdentityService::new(
        users.clone(),
        identity_cache,
        IdentityEventPublisher::new(broker.clone()),
        test_auth_config(),
    );

    let ledger_publisher = LedgerEventPublisher::new(broker.clone());
    let ledger = LedgerService::new(
        accounts.clone(),
        ledger_cache.clone(),
        ledger_publisher.clone(),
    );

    let ledger_scope = LedgerScope::new(accounts.clone(), ledger_cache, ledger_publisher);
    LedgerConsumer::new(broker.clone(), ledger_scope)
        .start()
        .await
        .unwrap();

    let notification_scope = NotificationScope::new(
        mailer.clone(),
        "https://localhost:5020/api/users/confirm-email".to_string(),
    );
    NotificationConsumer::new(broker.clone(), notification_scope)
        .start()
        .await
        .unwrap();

    TestSystem {
        broker,
        users,
        accounts,
        mailer,
        identity,
        ledger,
    }
}
