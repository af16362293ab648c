//! Stat sampling core.
//!
//! This module holds the bounded per-metric history, the periodic sampler
//! that fills it and the non-blocking read gateway in front of it.

mod gateway;
mod history;
mod metrics;
pub mod parser;
mod sampler;
mod service;
mod source;

pub use gateway::{DataPoint, ReadGateway, Route, Snapshot};
pub use history::{MetricSeries, MetricStore};
pub use metrics::{MemoryUsage, MetricKind, Reading, Sample, ThrottleState, Unit};
pub use sampler::{Sampler, TickReport};
pub use service::StatService;
pub use source::SampleSource;
