use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Queue a sign-up publishes to; consumed by the notification service.
pub const USER_CREATED_QUEUE: &str = "queue_user_created";
/// Queue an email confirmation publishes to; consumed by the ledger service.
pub const EMAIL_CONFIRMED_QUEUE: &str = "queue_email_confirmed";
/// Queue an account opening publishes to; consumed by the notification service.
pub const ACCOUNT_CREATED_QUEUE: &str = "queue_account_created";

/// Projection of a user carried inside every choreography event.
///
/// All three queues share this body; the queue name alone decides what the
/// message means to its consumer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserView {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub confirmed: bool,
}
