//! `serve` command: run the sampler and the HTTP API until Ctrl-C.

use std::future::Future;
use std::io;

use anyhow::{Context, Result};
use clap::ArgMatches;
use tokio::task::JoinHandle;

use crate::core::stats::StatService;
use crate::platform::CommandSampleSource;
use crate::server;

use super::config_from_matches;

pub fn execute(matches: &ArgMatches) -> Result<()> {
    let config = config_from_matches(matches);
    let service = StatService::new(&config).context("Invalid configuration")?;

    log::info!(
        "Running version {}: port {}, interval {}s, {} points per stat",
        env!("CARGO_PKG_VERSION"),
        config.port,
        config.fetch_interval_secs,
        config.points_per_stat
    );

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("rasp-stat-worker")
        .build()
        .context("Failed to start tokio runtime")?;

    runtime.block_on(async {
        let listener = server::bind(config.port).await?;

        let sampler = service.spawn_sampler(CommandSampleSource::new(config.command_timeout()));
        let server = tokio::spawn(server::serve(
            listener,
            service.gateway(),
            service.subscribe_shutdown(),
        ));

        supervise(&service, sampler, server, tokio::signal::ctrl_c()).await
    })
}

/// Wait for `stop` or for the HTTP server to exit on its own, then stop
/// the sampler and collect both tasks.
async fn supervise<F>(
    service: &StatService,
    sampler: JoinHandle<()>,
    mut server: JoinHandle<crate::error::Result<()>>,
    stop: F,
) -> Result<()>
where
    F: Future<Output = io::Result<()>>,
{
    let early_exit = tokio::select! {
        signal = stop => {
            signal.context("Failed to listen for Ctrl-C")?;
            log::info!("Ctrl-C received, stopping");
            None
        }
        finished = &mut server => {
            log::error!("HTTP server stopped on its own, shutting down");
            Some(finished)
        }
    };
    service.shutdown();

    // The sampler only sees the signal between ticks
    if let Err(e) = sampler.await {
        log::error!("Sampler task failed: {}", e);
    }

    let finished = match early_exit {
        Some(finished) => finished,
        None => server.await,
    };
    finished
        .context("HTTP server task panicked")?
        .context("HTTP server failed")?;

    Ok(())
}
