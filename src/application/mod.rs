pub mod consumers;
pub mod errors;
pub mod identity_service;
pub mod ledger_service;
pub mod notification_service;
pub mod publishers;

pub use consumers::{LedgerConsumer, LedgerScope, NotificationConsumer, NotificationScope};
pub use errors::ServiceError;
pub use identity_service::{AuthenticatedUser, IdentityService};
pub use ledger_service::LedgerService;
pub use notification_service::{ConsoleMailer, EmailSender, NotificationService};
pub use publishers::{IdentityEventPublisher, LedgerEventPublisher};
