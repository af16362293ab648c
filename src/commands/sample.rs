//! `sample` command: run a single tick against the real commands and print
//! what was stored. Handy for checking a new host's command output.

use anyhow::{Context, Result};
use clap::ArgMatches;

use crate::core::stats::{Sampler, StatService};
use crate::platform::CommandSampleSource;

use super::config_from_matches;

pub fn execute(matches: &ArgMatches) -> Result<()> {
    let config = config_from_matches(matches);
    let service = StatService::new(&config).context("Invalid configuration")?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start tokio runtime")?;

    let report = runtime.block_on(async {
        let source = CommandSampleSource::new(config.command_timeout());
        let mut sampler = Sampler::new(source, service.store(), config.fetch_interval());
        sampler.tick().await
    });

    for kind in report.fetch_failed.iter().chain(&report.parse_failed) {
        eprintln!("{kind}: no sample");
    }

    let raw = service.gateway().raw_all();
    println!(
        "{}",
        serde_json::to_string_pretty(&raw).context("Failed to serialize samples")?
    );

    Ok(())
}
