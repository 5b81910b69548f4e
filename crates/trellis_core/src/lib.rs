//! Core infrastructure for Trellis.
//!
//! - [`TracingConfig`] - Installs a `tracing` subscriber for the events the
//!   graph emits
//! - [`SharedGraph`] - A graph behind a read/write lock for multi-threaded
//!   consumers

/// Shared, lock-protected graph access.
pub mod shared;

/// Tracing subscriber configuration.
pub mod tracing_config;

pub use shared::SharedGraph;
pub use tracing_config::{TracingConfig, TracingFormat};
