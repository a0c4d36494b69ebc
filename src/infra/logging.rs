use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::LogFormat;

#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("invalid tracing filter '{filter}': {message}")]
    InvalidFilter { filter: String, message: String },
    #[error("failed to install tracing subscriber: {0}")]
    Install(String),
}

/// `RUST_LOG` wins over the configured level when set.
fn filter_directive(from_env: Option<String>, level: &str) -> String {
    from_env
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| level.to_string())
}

pub fn build_env_filter(level: &str) -> Result<EnvFilter, LoggingError> {
    let filter = filter_directive(std::env::var(EnvFilter::DEFAULT_ENV).ok(), level);

    EnvFilter::try_new(&filter).map_err(|e| LoggingError::InvalidFilter {
        filter,
        message: e.to_string(),
    })
}

/// Installs the global subscriber. Logs go to stderr so command output on
/// stdout stays machine-readable.
pub fn init(level: &str, format: LogFormat) -> Result<(), LoggingError> {
    let filter = build_env_filter(level)?;
    let registry = tracing_subscriber::registry().with(filter);

    let result = match format {
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_current_span(true),
            )
            .try_init(),
        LogFormat::Compact => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .compact()
                    .with_writer(std::io::stderr)
                    .with_target(true),
            )
            .try_init(),
    };

    result.map_err(|e| LoggingError::Install(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(None, "warn")]
    #[case(Some(""), "warn")]
    #[case(Some("  "), "warn")]
    #[case(Some("layerscope_app=debug"), "layerscope_app=debug")]
    fn environment_overrides_configured_level(#[case] env: Option<&str>, #[case] expected: &str) {
        assert_eq!(filter_directive(env.map(str::to_string), "warn"), expected);
    }
}
