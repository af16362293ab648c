//! Owns the store, the read gateway and the background sampler.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use super::gateway::ReadGateway;
use super::history::MetricStore;
use super::sampler::Sampler;
use super::source::SampleSource;
use crate::core::config::StatConfig;
use crate::error::Result;

/// The sampling-and-caching engine.
///
/// The sampler is the only writer; any number of tasks can share
/// [`StatService::gateway`] for reads.
pub struct StatService {
    fetch_interval: Duration,
    store: Arc<Mutex<MetricStore>>,
    gateway: Arc<ReadGateway>,
    shutdown_tx: broadcast::Sender<()>,
}

impl StatService {
    /// Validate `config` and build an empty store.
    pub fn new(config: &StatConfig) -> Result<Self> {
        config.validate()?;

        let store = Arc::new(Mutex::new(MetricStore::new(config.points_per_stat)?));
        let gateway = Arc::new(ReadGateway::new(store.clone()));
        let (shutdown_tx, _) = broadcast::channel::<()>(1);

        Ok(Self {
            fetch_interval: config.fetch_interval(),
            store,
            gateway,
            shutdown_tx,
        })
    }

    /// Spawn the sampler on the current tokio runtime.
    ///
    /// Call once; a second sampler would break the single-writer ordering.
    pub fn spawn_sampler<S>(&self, source: S) -> JoinHandle<()>
    where
        S: SampleSource + 'static,
    {
        let sampler = Sampler::new(source, self.store.clone(), self.fetch_interval);
        tokio::spawn(sampler.run(self.shutdown_tx.subscribe()))
    }

    pub fn gateway(&self) -> Arc<ReadGateway> {
        self.gateway.clone()
    }

    pub fn store(&self) -> Arc<Mutex<MetricStore>> {
        self.store.clone()
    }

    /// Receiver that fires when [`StatService::shutdown`] is called
    pub fn subscribe_shutdown(&self) -> broadcast::Receiver<()> {
        self.shutdown_tx.subscribe()
    }

    /// Ask the sampler and any other subscriber to stop.
    pub fn shutdown(&self) {
        // Fails only when nobody is subscribed
        let _ = self.shutdown_tx.send(());
    }
}
