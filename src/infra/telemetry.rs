//! Tracing subscriber installation.

use tracing::level_filters::LevelFilter;
use tracing_error::ErrorLayer;
use tracing_subscriber::{
    EnvFilter, fmt,
    layer::{Layer, SubscriberExt},
    util::SubscriberInitExt,
};

use crate::config::{LogFormat, LoggingSettings};

use super::error::InfraError;

/// Per-statement logs from sqlx are noise at `info`.
const QUIET_DIRECTIVES: &[&str] = &["sqlx::query=warn"];

/// Install the global subscriber described by `logging`.
///
/// `RUST_LOG` directives are layered over the configured level.
pub fn init(logging: &LoggingSettings) -> Result<(), InfraError> {
    let env_filter = build_filter(logging.level)?;

    let fmt_layer = match logging.format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .with_target(true)
            .boxed(),
        LogFormat::Compact => fmt::layer().compact().with_target(true).boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(ErrorLayer::default())
        .with(fmt_layer)
        .try_init()
        .map_err(|err| InfraError::telemetry(format!("failed to install tracing subscriber: {err}")))
}

fn build_filter(level: LevelFilter) -> Result<EnvFilter, InfraError> {
    let mut filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    for directive in QUIET_DIRECTIVES {
        let parsed = directive
            .parse()
            .map_err(|err| InfraError::telemetry(format!("bad directive `{directive}`: {err}")))?;
        filter = filter.add_directive(parsed);
    }

    Ok(filter)
}
