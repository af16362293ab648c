// rasp-stat library - public API

// Re-export error types
pub mod error;
pub use error::{Result, StatError};

// Module declarations
pub mod commands;
pub mod core;
pub mod platform;
pub mod server;

// Re-export commonly used types
pub use crate::core::config::StatConfig;
pub use crate::core::stats::{DataPoint, MetricKind, ReadGateway, Route, Sample, StatService};

/// Initialize logging. `RUST_LOG` wins over `default_level`.
pub fn init_logging(default_level: log::LevelFilter) {
    env_logger::Builder::new()
        .filter_level(default_level)
        .parse_default_env()
        .init();
}
