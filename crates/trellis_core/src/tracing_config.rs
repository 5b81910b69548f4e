//! Tracing subscriber configuration.
//!
//! The graph crate only emits `tracing` events; nothing is printed until a
//! subscriber is installed. [`TracingConfig`] installs one.
//!
//! # Example
//!
//! ```
//! use trellis_core::{TracingConfig, TracingFormat};
//! use tracing::Level;
//!
//! // Development: pretty output, graph internals at debug.
//! TracingConfig::new()
//!     .with_level(Level::DEBUG)
//!     .with_format(TracingFormat::Pretty)
//!     .with_env_filter("trellis_graph=debug")
//!     .init();
//! ```
//!
//! In production, JSON output is usually preferable:
//!
//! ```
//! use trellis_core::{TracingConfig, TracingFormat};
//!
//! let config = TracingConfig::from_env().with_format(TracingFormat::Json);
//! # let _ = config;
//! ```

use tracing::Level;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

// ─────────────────────────────────────────────────────────────────────────────
// TracingFormat
// ─────────────────────────────────────────────────────────────────────────────

/// Tracing output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TracingFormat {
    /// Human-readable colored output (default).
    #[default]
    Pretty,
    /// Compact single-line output.
    Compact,
    /// JSON structured output for log aggregation.
    Json,
}

// ─────────────────────────────────────────────────────────────────────────────
// TracingConfig
// ─────────────────────────────────────────────────────────────────────────────

/// Builder for the process-wide tracing subscriber.
///
/// # Environment Filter
///
/// A filter string (`target=level,target=level,...`) takes precedence over
/// the plain level. An invalid filter falls back to the level.
///
/// ```
/// use trellis_core::TracingConfig;
///
/// TracingConfig::new().with_env_filter("trellis_graph=trace,warn");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TracingConfig {
    /// Maximum log level.
    level: Level,
    /// Output format.
    format: TracingFormat,
    /// Environment filter (e.g., "`trellis_graph=debug`").
    env_filter: Option<String>,
    /// Whether to include span events (enter/exit).
    span_events: bool,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            format: TracingFormat::Pretty,
            env_filter: None,
            span_events: false,
        }
    }
}

impl TracingConfig {
    /// Creates a configuration with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a configuration whose filter is read from `RUST_LOG`, if set.
    #[must_use]
    pub fn from_env() -> Self {
        let env_filter = std::env::var(EnvFilter::DEFAULT_ENV)
            .ok()
            .filter(|filter| !filter.trim().is_empty());
        Self {
            env_filter,
            ..Self::default()
        }
    }

    /// Sets the maximum log level.
    #[must_use]
    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Sets the output format.
    #[must_use]
    pub fn with_format(mut self, format: TracingFormat) -> Self {
        self.format = format;
        self
    }

    /// Sets a custom environment filter string.
    #[must_use]
    pub fn with_env_filter(mut self, filter: impl Into<String>) -> Self {
        self.env_filter = Some(filter.into());
        self
    }

    /// Enables span enter/exit events in output.
    #[must_use]
    pub fn with_span_events(mut self, enabled: bool) -> Self {
        self.span_events = enabled;
        self
    }

    /// Returns the configured level.
    #[must_use]
    pub fn level(&self) -> Level {
        self.level
    }

    /// Returns the configured format.
    #[must_use]
    pub fn format(&self) -> TracingFormat {
        self.format
    }

    /// Returns the configured filter string, if any.
    #[must_use]
    pub fn env_filter(&self) -> Option<&str> {
        self.env_filter.as_deref()
    }

    fn filter(&self) -> EnvFilter {
        match &self.env_filter {
            Some(filter) => {
                EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new(self.level.as_str()))
            }
            None => EnvFilter::new(self.level.as_str()),
        }
    }

    /// Installs the global subscriber.
    ///
    /// Returns false if a subscriber was already installed, in which case
    /// the existing one is left in place.
    pub fn init(&self) -> bool {
        let span_events = if self.span_events {
            FmtSpan::ENTER | FmtSpan::EXIT
        } else {
            FmtSpan::NONE
        };
        let registry = tracing_subscriber::registry().with(self.filter());

        // try_init fails only if a global subscriber already exists.
        let installed = match self.format {
            TracingFormat::Pretty => registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .pretty()
                        .with_span_events(span_events),
                )
                .try_init()
                .is_ok(),
            TracingFormat::Compact => registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .compact()
                        .with_span_events(span_events),
                )
                .try_init()
                .is_ok(),
            TracingFormat::Json => registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_span_events(span_events),
                )
                .try_init()
                .is_ok(),
        };

        if installed {
            tracing::info!(level = %self.level, format = ?self.format, "tracing initialized");
        }
        installed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::filter::LevelFilter;

    #[test]
    fn tracing_format_default_is_pretty() {
        assert_eq!(TracingFormat::default(), TracingFormat::Pretty);
    }

    #[test]
    fn default_level_is_info() {
        let config = TracingConfig::default();
        assert_eq!(config.level(), Level::INFO);
        assert_eq!(config.env_filter(), None);
    }

    #[test]
    fn builder_methods_apply() {
        let config = TracingConfig::new()
            .with_level(Level::TRACE)
            .with_format(TracingFormat::Compact)
            .with_env_filter("trellis_graph=debug")
            .with_span_events(true);
        assert_eq!(config.level(), Level::TRACE);
        assert_eq!(config.format(), TracingFormat::Compact);
        assert_eq!(config.env_filter(), Some("trellis_graph=debug"));
        assert!(config.span_events);
    }

    #[test]
    fn filter_uses_level_without_directives() {
        let config = TracingConfig::new().with_level(Level::WARN);
        assert_eq!(config.filter().max_level_hint(), Some(LevelFilter::WARN));
    }

    #[test]
    fn invalid_filter_falls_back_to_level() {
        let config = TracingConfig::new()
            .with_level(Level::ERROR)
            .with_env_filter("trellis_graph=loudest");
        assert_eq!(config.filter().max_level_hint(), Some(LevelFilter::ERROR));
    }

    #[test]
    fn second_init_keeps_existing_subscriber() {
        TracingConfig::new().with_format(TracingFormat::Compact).init();
        assert!(!TracingConfig::new().with_format(TracingFormat::Json).init());
    }
}
