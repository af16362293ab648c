// Core business logic module

pub mod config;
pub mod stats;

// Re-export commonly used items
pub use config::StatConfig;
pub use stats::{ReadGateway, StatService};
