use async_trait::async_trait;

use super::metrics::MetricKind;
use crate::error::Result;

/// Where raw measurements come from.
///
/// Implementations are provided in the platform layer. `fetch` may be slow
/// but must be bounded: the sampler awaits every kind in turn, so a call that
/// never returns stalls the remaining kinds of the tick.
#[async_trait]
pub trait SampleSource: Send {
    /// Raw text for one measurement of `kind`
    async fn fetch(&mut self, kind: MetricKind) -> Result<String>;
}
