pub mod account_store;
pub mod auth;
pub mod broker;
pub mod cache;
pub mod config;
pub mod logging;
pub mod store;
pub mod user_store;

pub use account_store::{AccountStore, PostgresAccountStore};
pub use broker::{
    AmqpBroker, BrokerConfig, BrokerError, HandlerError, MessageBroker, MessageHandler,
};
pub use cache::{CacheClient, CacheError, ProjectionCache, RedisCache};
pub use config::AppConfig;
pub use store::StoreError;
pub use user_store::{PostgresUserStore, UserStore};
