// Command handlers module
pub mod sample;
pub mod serve;
pub mod version;

use clap::ArgMatches;

use crate::core::config::StatConfig;

/// Build the service config from parsed arguments (flags or their env fallbacks).
///
/// Anything not supplied keeps its default; range checks happen in
/// [`StatConfig::validate`].
pub fn config_from_matches(matches: &ArgMatches) -> StatConfig {
    let defaults = StatConfig::default();

    StatConfig {
        port: matches.get_one::<u16>("port").copied().unwrap_or(defaults.port),
        fetch_interval_secs: matches
            .get_one::<u64>("interval")
            .copied()
            .unwrap_or(defaults.fetch_interval_secs),
        points_per_stat: matches
            .get_one::<usize>("points")
            .copied()
            .unwrap_or(defaults.points_per_stat),
        command_timeout_ms: matches
            .get_one::<u64>("command-timeout")
            .copied()
            .unwrap_or(defaults.command_timeout_ms),
    }
}
