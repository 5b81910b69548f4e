//! # Trellis Internal Library
//!
//! Re-exports the core Trellis crates for convenience.

/// The element graph, cascading deletion and interchange document.
pub use trellis_graph;

/// Tracing configuration and shared graph access.
pub use trellis_core;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use trellis_core::{SharedGraph, TracingConfig, TracingFormat};
    pub use trellis_graph::prelude::*;
}
