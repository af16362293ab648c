use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{Result, StatError};

pub const DEFAULT_PORT: u16 = 4322;
pub const DEFAULT_FETCH_INTERVAL_SECS: u64 = 1;
pub const DEFAULT_POINTS_PER_STAT: usize = 2;
pub const DEFAULT_COMMAND_TIMEOUT_MS: u64 = 2000;

/// Runtime settings for the stat service.
///
/// Built once from the command line / environment and checked with
/// [`StatConfig::validate`] before anything is constructed from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatConfig {
    pub port: u16,
    /// Pause between the end of one tick and the start of the next
    pub fetch_interval_secs: u64,
    /// Samples kept in memory per metric
    pub points_per_stat: usize,
    /// Upper bound on each external command
    pub command_timeout_ms: u64,
}

impl Default for StatConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            fetch_interval_secs: DEFAULT_FETCH_INTERVAL_SECS,
            points_per_stat: DEFAULT_POINTS_PER_STAT,
            command_timeout_ms: DEFAULT_COMMAND_TIMEOUT_MS,
        }
    }
}

impl StatConfig {
    pub fn validate(&self) -> Result<()> {
        if self.fetch_interval_secs == 0 {
            return Err(StatError::config("fetch interval must be at least 1 second"));
        }
        if self.points_per_stat == 0 {
            return Err(StatError::config("points per stat must be at least 1"));
        }
        if self.command_timeout_ms == 0 {
            return Err(StatError::config("command timeout must be positive"));
        }
        Ok(())
    }

    pub fn fetch_interval(&self) -> Duration {
        Duration::from_secs(self.fetch_interval_secs)
    }

    pub fn command_timeout(&self) -> Duration {
        Duration::from_millis(self.command_timeout_ms)
    }
}
