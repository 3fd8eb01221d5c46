use std::sync::Arc;
use tracing::info;

use microbank::application::{ConsoleMailer, NotificationConsumer, NotificationScope};
use microbank::infrastructure::logging::{init_logging, LoggingConfig};
use microbank::infrastructure::{AmqpBroker, AppConfig, BrokerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let _guard = init_logging(Some(LoggingConfig {
        file_prefix: "notification-service".to_string(),
        ..Default::default()
    }))?;

    let config = AppConfig::from_env();

    let broker: Arc<AmqpBroker> = Arc::new(AmqpBroker::new(BrokerConfig {
        uri: config.broker_url.clone(),
        consumer_tag: "notification-service".to_string(),
        ..Default::default()
    }));

    let scope = NotificationScope::new(
        Arc::new(ConsoleMailer),
        config.confirmation_base_url.clone(),
    );

    // A failed subscription is fatal here; the process supervisor restarts us.
    let consumer = NotificationConsumer::new(broker, scope);
    consumer.start().await?;

    info!("Notification service started; waiting for events");
    tokio::signal::ctrl_c().await?;
    info!("Notification service shutting down");
    Ok(())
}
