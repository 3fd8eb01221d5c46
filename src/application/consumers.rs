use futures::FutureExt;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::application::errors::ServiceError;
use crate::application::ledger_service::LedgerService;
use crate::application::notification_service::{EmailSender, NotificationService};
use crate::application::publishers::LedgerEventPublisher;
use crate::domain::{UserView, ACCOUNT_CREATED_QUEUE, EMAIL_CONFIRMED_QUEUE, USER_CREATED_QUEUE};
use crate::infrastructure::{
    AccountStore, BrokerError, HandlerError, MessageBroker, MessageHandler, ProjectionCache,
};

/// Factory for the ledger service's per-message execution scope. The store
/// and cache handles are shared, but every delivery gets a fresh facade so no
/// state leaks between messages.
#[derive(Clone)]
pub struct LedgerScope {
    accounts: Arc<dyn AccountStore>,
    cache: ProjectionCache,
    publisher: LedgerEventPublisher,
}

impl LedgerScope {
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

    pub fn ledger_service(&self) -> LedgerService {
        LedgerService::new(
            self.accounts.clone(),
            self.cache.clone(),
            self.publisher.clone(),
        )
    }
}

/// Factory for the notification service's per-message execution scope.
#[derive(Clone)]
pub struct NotificationScope {
    sender: Arc<dyn EmailSender>,
    confirmation_base_url: String,
}

impl NotificationScope {
    pub fn new(sender: Arc<dyn EmailSender>, confirmation_base_url: String) -> Self {
        Self {
            sender,
            confirmation_base_url,
        }
    }

    pub fn notification_service(&self) -> NotificationService {
        NotificationService::new(self.sender.clone(), self.confirmation_base_url.clone())
    }
}

/// Ledger-side choreography: an `EmailConfirmed` event triggers account
/// opening. Redelivered events hit the existence check and are dropped, which
/// keeps the handler safe under at-least-once delivery.
pub struct LedgerConsumer {
    broker: Arc<dyn MessageBroker>,
    scope: LedgerScope,
}

impl LedgerConsumer {
    pub fn new(broker: Arc<dyn MessageBroker>, scope: LedgerScope) -> Self {
        Self { broker, scope }
    }

    pub async fn start(&self) -> Result<(), BrokerError> {
        info!("Starting consumer for queue '{}'.", EMAIL_CONFIRMED_QUEUE);

        let scope = self.scope.clone();
        let handler: MessageHandler = Arc::new(move |payload: Vec<u8>| {
            let scope = scope.clone();
            async move {
                let user = decode_user_view(EMAIL_CONFIRMED_QUEUE, &payload)?;
                info!("Opening account for user: {} - {}", user.id, user.email);

                let service = scope.ledger_service();
                match service.open_account(&user).await {
                    Ok(_) => {
                        info!("Account successfully created for user {}.", user.id);
                        Ok(())
                    }
                    Err(err) => Err(verdict(EMAIL_CONFIRMED_QUEUE, user.id, err)),
                }
            }
            .boxed()
        });

        self.broker.consume(EMAIL_CONFIRMED_QUEUE, handler).await
    }
}

/// Notification-side choreography: `UserCreated` triggers the confirmation
/// email, `AccountCreated` the welcome email.
pub struct NotificationConsumer {
    broker: Arc<dyn MessageBroker>,
    scope: NotificationScope,
}

impl NotificationConsumer {
    pub fn new(broker: Arc<dyn MessageBroker>, scope: NotificationScope) -> Self {
        Self { broker, scope }
    }

    pub async fn start(&self) -> Result<(), BrokerError> {
        self.start_user_created().await?;
        self.start_account_created().await
    }

    async fn start_user_created(&self) -> Result<(), BrokerError> {
        info!("Starting consumer for queue '{}'.", USER_CREATED_QUEUE);

        let scope = self.scope.clone();
        let handler: MessageHandler = Arc::new(move |payload: Vec<u8>| {
            let scope = scope.clone();
            async move {
                let user = decode_user_view(USER_CREATED_QUEUE, &payload)?;
                info!("Sending confirmation email to {}", user.email);

                let service = scope.notification_service();
                match service.send_confirmation_email(&user).await {
                    Ok(()) => Ok(()),
                    Err(err) => Err(verdict(USER_CREATED_QUEUE, user.id, err)),
                }
            }
            .boxed()
        });

        self.broker.consume(USER_CREATED_QUEUE, handler).await
    }

    async fn start_account_created(&self) -> Result<(), BrokerError> {
        info!("Starting consumer for queue '{}'.", ACCOUNT_CREATED_QUEUE);

        let scope = self.scope.clone();
        let handler: MessageHandler = Arc::new(move |payload: Vec<u8>| {
            let scope = scope.clone();
            async move {
                let user = decode_user_view(ACCOUNT_CREATED_QUEUE, &payload)?;
                info!("Sending welcome email to {}", user.email);

                let service = scope.notification_service();
                match service.send_welcome_email(&user).await {
                    Ok(()) => Ok(()),
                    Err(err) => Err(verdict(ACCOUNT_CREATED_QUEUE, user.id, err)),
                }
            }
            .boxed()
        });

        self.broker.consume(ACCOUNT_CREATED_QUEUE, handler).await
    }
}

/// Malformed payloads are dropped rather than requeued: a producer bug will
/// not fix itself through redelivery.
fn decode_user_view(queue: &str, payload: &[u8]) -> Result<UserView, HandlerError> {
    serde_json::from_slice(payload).map_err(|e| {
        warn!("Failed to deserialize message from queue '{}': {}", queue, e);
        HandlerError::Discard(format!("malformed payload: {}", e))
    })
}

fn verdict(queue: &str, user_id: uuid::Uuid, err: ServiceError) -> HandlerError {
    if err.is_transient() {
        error!(
            "Transient failure processing message from '{}' for user {}: {}",
            queue, user_id, err
        );
        HandlerError::Requeue(err.to_string())
    } else {
        warn!(
            "Failed to process message from '{}' for user {}: {}",
            queue, user_id, err
        );
        HandlerError::Discard(err.to_string())
    }
}
