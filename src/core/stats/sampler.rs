//! Periodic sampling task.
//!
//! One tick fetches and parses every [`MetricKind`] in order and appends each
//! success to the shared store. The next tick is scheduled only once the
//! previous one has finished, so slow commands stretch the period instead of
//! piling up work.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::broadcast;

use super::history::MetricStore;
use super::metrics::MetricKind;
use super::parser;
use super::source::SampleSource;

/// Outcome of a single tick
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    pub appended: Vec<MetricKind>,
    pub fetch_failed: Vec<MetricKind>,
    pub parse_failed: Vec<MetricKind>,
}

impl TickReport {
    pub fn skipped(&self) -> usize {
        self.fetch_failed.len() + self.parse_failed.len()
    }
}

/// The single writer of the metric store.
pub struct Sampler<S> {
    source: S,
    store: Arc<Mutex<MetricStore>>,
    interval: Duration,
}

impl<S: SampleSource> Sampler<S> {
    pub fn new(source: S, store: Arc<Mutex<MetricStore>>, interval: Duration) -> Self {
        Self {
            source,
            store,
            interval,
        }
    }

    /// Sample every kind once.
    ///
    /// A failing kind is logged and skipped; it never aborts the tick and
    /// its previous samples stay in place.
    pub async fn tick(&mut self) -> TickReport {
        let mut report = TickReport::default();

        for kind in MetricKind::ALL {
            let raw = match self.source.fetch(kind).await {
                Ok(raw) => raw,
                Err(e) => {
                    log::warn!("Skipping {} this tick: {}", kind, e);
                    report.fetch_failed.push(kind);
                    continue;
                }
            };

            let sample = match parser::parse(kind, &raw) {
                Ok(sample) => sample,
                Err(e) => {
                    log::warn!("Skipping {} this tick: {}", kind, e);
                    report.parse_failed.push(kind);
                    continue;
                }
            };

            log::trace!("{} -> {:?}", kind, sample);

            // Blocking acquire: readers only ever try_lock and hold it
            // briefly, so this cannot starve.
            self.store.lock().append(sample);
            report.appended.push(kind);
        }

        report
    }

    /// Tick, sleep, repeat until a shutdown signal arrives.
    pub async fn run(mut self, mut shutdown: broadcast::Receiver<()>) {
        log::info!(
            "Sampler started, interval {:?}, {} points per stat",
            self.interval,
            self.store.lock().capacity()
        );

        loop {
            let report = self.tick().await;
            log::debug!(
                "Tick done: {} appended, {} skipped",
                report.appended.len(),
                report.skipped()
            );

            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {}
                _ = shutdown.recv() => {
                    log::info!("Sampler shutting down");
                    break;
                }
            }
        }
    }
}
