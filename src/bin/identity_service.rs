use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use microbank::application::{IdentityEventPublisher, IdentityService};
use microbank::infrastructure::auth::AuthConfig;
use microbank::infrastructure::logging::{init_logging, LoggingConfig};
use microbank::infrastructure::{
    AmqpBroker, AppConfig, BrokerConfig, PostgresUserStore, ProjectionCache, RedisCache,
};
use microbank::web::identity_router;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let _guard = init_logging(Some(LoggingConfig {
        file_prefix: "identity-service".to_string(),
        ..Default::default()
    }))?;

    let config = AppConfig::from_env();
    let auth_config = AuthConfig::from_env()?;

    let pool = PgPoolOptions::new()
        .max_connections(config.database_pool_size)
        .connect(&config.database_url)
        .await?;

    let cache_client = Arc::new(RedisCache::connect(&config.redis_url).await?);
    let cache = ProjectionCache::new(cache_client, config.cache_ttl());

    let broker = Arc::new(AmqpBroker::new(BrokerConfig {
        uri: config.broker_url.clone(),
        consumer_tag: "identity-service".to_string(),
        ..Default::default()
    }));

    let users = Arc::new(PostgresUserStore::new(pool));
    let publisher = IdentityEventPublisher::new(broker);
    let service = Arc::new(IdentityService::new(users, cache, publisher, auth_config));

    let app = identity_router(service);
    let addr = format!("0.0.0.0:{}", config.identity_port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Identity service listening on {}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
