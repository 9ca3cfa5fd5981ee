//! Tracing subscriber setup for the binary

use tg_shared::config::{LogFormat, LoggingConfig};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Install the global subscriber.
///
/// `RUST_LOG` takes precedence over `config.level`.
pub fn init_tracing(config: &LoggingConfig) -> anyhow::Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.level)?,
    };

    let layer = match (config.format, config.timestamp) {
        (LogFormat::Json, true) => fmt::layer()
            .json()
            .with_current_span(true)
            .with_file(config.source_location)
            .with_line_number(config.source_location)
            .boxed(),
        (LogFormat::Json, false) => fmt::layer()
            .json()
            .with_current_span(true)
            .with_file(config.source_location)
            .with_line_number(config.source_location)
            .without_time()
            .boxed(),
        (LogFormat::Pretty, true) => fmt::layer()
            .pretty()
            .with_file(config.source_location)
            .with_line_number(config.source_location)
            .boxed(),
        (LogFormat::Pretty, false) => fmt::layer()
            .pretty()
            .with_file(config.source_location)
            .with_line_number(config.source_location)
            .without_time()
            .boxed(),
        (LogFormat::Compact, true) => fmt::layer().compact().boxed(),
        (LogFormat::Compact, false) => fmt::layer().compact().without_time().boxed(),
    };

    tracing_subscriber::registry().with(layer).with(filter).try_init()?;
    Ok(())
}
