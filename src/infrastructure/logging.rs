use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Configuration for per-service logging.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub log_dir: String,
    pub file_prefix: String,
    pub enable_console: bool,
    pub enable_file: bool,
    pub log_level: Level,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_dir: "logs".to_string(),
            file_prefix: "microbank".to_string(),
            enable_console: true,
            enable_file: true,
            log_level: Level::INFO,
        }
    }
}

/// Initialize tracing with console output and a daily-rolling log file.
/// The returned guard must be held for the lifetime of the process so the
/// non-blocking file writer flushes on shutdown.
pub fn init_logging(config: Option<LoggingConfig>) -> anyhow::Result<Option<WorkerGuard>> {
    let config = config.unwrap_or_default();

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "{},sqlx=warn,lapin=warn",
            config.log_level.to_string().to_lowercase()
        ))
    });

    let mut layers: Vec<Box<dyn Layer<tracing_subscriber::Registry> + Send + Sync>> = Vec::new();
    let mut guard = None;

    if config.enable_console {
        layers.push(tracing_subscriber::fmt::layer().boxed());
    }

    if config.enable_file {
        std::fs::create_dir_all(&config.log_dir)?;
        let appender = RollingFileAppender::new(
            Rotation::DAILY,
            &config.log_dir,
            format!("{}.log", config.file_prefix),
        );
        let (writer, file_guard) = tracing_appender::non_blocking(appender);
        layers.push(
            tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .boxed(),
        );
        guard = Some(file_guard);
    }

    tracing_subscriber::registry()
        .with(layers)
        .with(env_filter)
        .init();

    Ok(guard)
}
