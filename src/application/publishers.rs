use std::sync::Arc;
use tracing::{error, info};

use crate::domain::{
    User, UserView, ACCOUNT_CREATED_QUEUE, EMAIL_CONFIRMED_QUEUE, USER_CREATED_QUEUE,
};
use crate::infrastructure::MessageBroker;

/// Events emitted by the identity service. Publishing is best-effort: every
/// failure is logged and swallowed so a broker outage can never fail the
/// sign-up or confirmation that already committed.
#[derive(Clone)]
pub struct IdentityEventPublisher {
    broker: Arc<dyn MessageBroker>,
}

impl IdentityEventPublisher {
    pub fn new(broker: Arc<dyn MessageBroker>) -> Self {
        Self { broker }
    }

    pub async fn publish_user_created(&self, user: &User) {
        publish(self.broker.as_ref(), USER_CREATED_QUEUE, &user.to_view()).await;
    }

    pub async fn publish_email_confirmed(&self, user: &User) {
        publish(self.broker.as_ref(), EMAIL_CONFIRMED_QUEUE, &user.to_view()).await;
    }
}

/// Events emitted by the ledger service, with the same best-effort policy.
#[derive(Clone)]
pub struct LedgerEventPublisher {
    broker: Arc<dyn MessageBroker>,
}

impl LedgerEventPublisher {
    pub fn new(broker: Arc<dyn MessageBroker>) -> Self {
        Self { broker }
    }

    pub async fn publish_account_created(&self, user: &UserView) {
        publish(self.broker.as_ref(), ACCOUNT_CREATED_QUEUE, user).await;
    }
}

async fn publish(broker: &dyn MessageBroker, queue: &str, user: &UserView) {
    let payload = match serde_json::to_vec(user) {
        Ok(payload) => payload,
        Err(e) => {
            error!("Failed to serialize message for queue '{}': {}", queue, e);
            return;
        }
    };

    info!(
        "Publishing message to queue '{}' for user {} - {}",
        queue, user.id, user.email
    );

    match broker.publish(queue, &payload).await {
        Ok(()) => info!("Message successfully published to queue '{}'.", queue),
        Err(e) => error!("Failed to publish message to queue '{}': {}", queue, e),
    }
}
