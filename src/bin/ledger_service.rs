use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use microbank::application::{LedgerConsumer, LedgerEventPublisher, LedgerScope, LedgerService};
use microbank::infrastructure::logging::{init_logging, LoggingConfig};
use microbank::infrastructure::{
    AmqpBroker, AppConfig, BrokerConfig, PostgresAccountStore, ProjectionCache, RedisCache,
};
use microbank::web::ledger_router;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let _guard = init_logging(Some(LoggingConfig {
        file_prefix: "ledger-service".to_string(),
        ..Default::default()
    }))?;

    let config = AppConfig::from_env();

    let pool = PgPoolOptions::new()
        .max_connections(config.database_pool_size)
        .connect(&config.database_url)
        .await?;

    let cache_client = Arc::new(RedisCache::connect(&config.redis_url).await?);
    let cache = ProjectionCache::new(cache_client, config.cache_ttl());

    let broker: Arc<AmqpBroker> = Arc::new(AmqpBroker::new(BrokerConfig {
        uri: config.broker_url.clone(),
        consumer_tag: "ledger-service".to_string(),
        ..Default::default()
    }));

    let accounts = Arc::new(PostgresAccountStore::new(pool));
    let publisher = LedgerEventPublisher::new(broker.clone());
    let scope = LedgerScope::new(accounts.clone(), cache.clone(), publisher.clone());

    // A failed subscription is fatal here; the process supervisor restarts us.
    let consumer = LedgerConsumer::new(broker, scope);
    consumer.start().await?;

    let service = Arc::new(LedgerService::new(accounts, cache, publisher));
    let app = ledger_router(service);
    let addr = format!("0.0.0.0:{}", config.ledger_port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Ledger service listening on {}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
