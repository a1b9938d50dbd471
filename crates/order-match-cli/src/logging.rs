//! Logging setup using `tracing-subscriber`.
//!
//! Logs always go to stderr: stdout is reserved for exported records, so the
//! output of `order-match match` can be piped straight into other tools.
//!
//! # Log Levels
//!
//! - `error`: fatal errors
//! - `warn`: undetermined department groups, failed related lookups
//! - `info`: batch progress and import counts
//! - `debug`: one line per scored order line

use std::io;

use tracing::level_filters::LevelFilter;
use tracing_subscriber::{
    fmt::{self, MakeWriter},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable, one event per line.
    #[default]
    Compact,
    /// Multi-line output with span context.
    Pretty,
}

/// Configuration for logging behavior.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Level used when `RUST_LOG` is not set (or when it is ignored).
    pub level_filter: LevelFilter,
    /// Whether `RUST_LOG` may override `level_filter`.
    pub use_env_filter: bool,
    /// Include the module path of each event.
    pub with_target: bool,
    pub with_ansi: bool,
    pub format: LogFormat,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level_filter: LevelFilter::INFO,
            use_env_filter: true,
            with_target: false,
            with_ansi: false,
            format: LogFormat::default(),
        }
    }
}

impl LogConfig {
    #[must_use]
    pub fn with_level(mut self, level_filter: LevelFilter) -> Self {
        self.level_filter = level_filter;
        self
    }

    #[must_use]
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }
}

/// Install the global subscriber, writing to stderr.
///
/// Must be called once, before any command runs.
pub fn init_logging(config: &LogConfig) {
    init_logging_with_writer(config, io::stderr);
}

/// Install the global subscriber with a custom writer.
pub fn init_logging_with_writer<W>(config: &LogConfig, writer: W)
where
    W: for<'writer> MakeWriter<'writer> + Send + Sync + 'static,
{
    let filter = build_env_filter(config);
    let layer = fmt::layer()
        .with_writer(writer)
        .with_ansi(config.with_ansi)
        .with_target(config.with_target)
        .without_time();

    match config.format {
        LogFormat::Compact => {
            tracing_subscriber::registry()
                .with(filter)
                .with(layer.compact())
                .init();
        }
        LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(filter)
                .with(layer.pretty())
                .init();
        }
    }
}

/// `RUST_LOG` wins when allowed and set; otherwise our crates log at the
/// configured level and everything else at warn.
fn build_env_filter(config: &LogConfig) -> EnvFilter {
    if config.use_env_filter {
        if let Ok(filter) = EnvFilter::try_from_default_env() {
            return filter;
        }
    }
    EnvFilter::new(default_directives(config.level_filter))
}

fn default_directives(level_filter: LevelFilter) -> String {
    let level = level_filter.to_string().to_lowercase();
    format!(
        "warn,order_match_core={level},order_match_cli={level},order_match={level}",
        level = level
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directives() {
        assert_eq!(
            default_directives(LevelFilter::DEBUG),
            "warn,order_match_core=debug,order_match_cli=debug,order_match=debug"
        );
        assert_eq!(
            default_directives(LevelFilter::OFF),
            "warn,order_match_core=off,order_match_cli=off,order_match=off"
        );
    }

    #[test]
    fn test_builder() {
        let config = LogConfig::default()
            .with_level(LevelFilter::WARN)
            .with_format(LogFormat::Pretty);
        assert_eq!(config.level_filter, LevelFilter::WARN);
        assert_eq!(config.format, LogFormat::Pretty);
        assert!(config.use_env_filter);
    }
}
