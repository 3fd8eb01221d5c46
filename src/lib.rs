pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod web;

// Re-export commonly used types
pub use application::{
    IdentityService, LedgerConsumer, LedgerScope, LedgerService, NotificationConsumer,
    NotificationScope, NotificationService, ServiceError,
};
pub use domain::{Account, AccountError, AccountView, User, UserView};
pub use infrastructure::{AmqpBroker, AppConfig, BrokerConfig, MessageBroker, ProjectionCache};
