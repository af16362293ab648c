use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use rasp_stat::core::stats::{MetricKind, SampleSource};
use rasp_stat::{Result, StatError};

/// Replays queued outputs per metric; an exhausted queue reads as a failed
/// command. Also records every fetch in order.
#[derive(Clone, Default)]
pub struct ScriptedSource {
    outputs: Arc<Mutex<HashMap<MetricKind, VecDeque<Option<String>>>>>,
    pub calls: Arc<Mutex<Vec<MetricKind>>>,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful fetch returning `raw`
    pub fn push(&self, kind: MetricKind, raw: &str) -> &Self {
        self.outputs
            .lock()
            .entry(kind)
            .or_default()
            .push_back(Some(raw.to_string()));
        self
    }

    /// Queue a failing fetch
    pub fn push_failure(&self, kind: MetricKind) -> &Self {
        self.outputs.lock().entry(kind).or_default().push_back(None);
        self
    }
}

#[async_trait]
impl SampleSource for ScriptedSource {
    async fn fetch(&mut self, kind: MetricKind) -> Result<String> {
        self.calls.lock().push(kind);
        let next = self
            .outputs
            .lock()
            .get_mut(&kind)
            .and_then(|queue| queue.pop_front());

        match next {
            Some(Some(raw)) => Ok(raw),
            _ => Err(StatError::command_failed(kind.name(), "scripted failure")),
        }
    }
}
