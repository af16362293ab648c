//! Non-blocking read path.
//!
//! Readers never wait for the sampler. Each read makes a single `try_lock`
//! on the store; if that fails, or the series has nothing yet, the caller
//! gets the last response this route produced, or the [`DataPoint::none`]
//! sentinel on a cold start.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use serde::{Serialize, Serializer};

use super::history::MetricStore;
use super::metrics::{MetricKind, Sample};

/// A formatted value as served to callers: `{"data": "40.0 C"}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DataPoint {
    #[serde(rename = "data")]
    pub value: String,
}

impl DataPoint {
    /// "No data yet". Integer -1 with an empty unit, as existing clients expect.
    pub fn none() -> Self {
        Self::int(-1, "")
    }

    pub fn is_none(&self) -> bool {
        *self == Self::none()
    }

    fn float(value: f32, unit: impl fmt::Display, precision: usize) -> Self {
        Self {
            value: format!("{value:.precision$} {unit}"),
        }
    }

    fn int(value: i64, unit: impl fmt::Display) -> Self {
        Self {
            value: format!("{value} {unit}"),
        }
    }

    fn text(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }
}

/// Response key for single-value reads.
///
/// Several routes can read the same series (all memory routes read
/// [`MetricKind::Memory`]); each keeps its own fallback entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Temp,
    Gpu,
    Cpu,
    Volts,
    Throttled,
    MemFree,
    MemTotal,
    MemSwap,
    MemSwapTotal,
}

impl Route {
    pub const ALL: [Route; 9] = [
        Route::Temp,
        Route::Gpu,
        Route::Cpu,
        Route::Volts,
        Route::Throttled,
        Route::MemFree,
        Route::MemTotal,
        Route::MemSwap,
        Route::MemSwapTotal,
    ];

    pub fn path(self) -> &'static str {
        match self {
            Route::Temp => "/temp",
            Route::Gpu => "/gpu",
            Route::Cpu => "/cpu",
            Route::Volts => "/volts",
            Route::Throttled => "/throttled",
            Route::MemFree => "/memFree",
            Route::MemTotal => "/memTotal",
            Route::MemSwap => "/memSwap",
            Route::MemSwapTotal => "/memSwapTotal",
        }
    }

    pub fn from_path(path: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|route| route.path() == path)
    }

    pub fn kind(self) -> MetricKind {
        match self {
            Route::Temp => MetricKind::Temperature,
            Route::Gpu => MetricKind::GpuClock,
            Route::Cpu => MetricKind::CpuClock,
            Route::Volts => MetricKind::Voltage,
            Route::Throttled => MetricKind::Throttle,
            Route::MemFree | Route::MemTotal | Route::MemSwap | Route::MemSwapTotal => {
                MetricKind::Memory
            }
        }
    }

    /// Format `sample` for this route. `None` if the sample is of another kind.
    pub fn render(self, sample: &Sample) -> Option<DataPoint> {
        let point = match (self, sample) {
            (Route::Temp, Sample::Temperature(r)) => DataPoint::float(r.value, r.unit, 1),
            (Route::Gpu, Sample::GpuClock(r)) | (Route::Cpu, Sample::CpuClock(r)) => {
                DataPoint::float(r.value, r.unit, 3)
            }
            (Route::Volts, Sample::Voltage(r)) => DataPoint::float(r.value, r.unit, 2),
            (Route::Throttled, Sample::Throttle(t)) => DataPoint::text(t.raw.clone()),
            (Route::MemFree, Sample::Memory(m)) => DataPoint::int(m.free as i64, "MB"),
            (Route::MemTotal, Sample::Memory(m)) => DataPoint::int(m.total as i64, "MB"),
            (Route::MemSwap, Sample::Memory(m)) => DataPoint::int(m.swap_used as i64, "MB"),
            (Route::MemSwapTotal, Sample::Memory(m)) => DataPoint::int(m.swap_total as i64, "MB"),
            _ => return None,
        };
        Some(point)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Result of a raw (history) read.
///
/// `Unavailable` is returned when the store was busy; a bulk read is never
/// served half-consistent. Serializes to `{"data": ...}` or the sentinel.
#[derive(Debug, Clone, PartialEq)]
pub enum Snapshot<T> {
    Ready(T),
    Unavailable,
}

impl<T> Snapshot<T> {
    pub fn ready(self) -> Option<T> {
        match self {
            Snapshot::Ready(data) => Some(data),
            Snapshot::Unavailable => None,
        }
    }
}

impl<T: Serialize> Serialize for Snapshot<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Wrapped<'a, D> {
            data: &'a D,
        }

        match self {
            Snapshot::Ready(data) => Wrapped { data }.serialize(serializer),
            Snapshot::Unavailable => DataPoint::none().serialize(serializer),
        }
    }
}

/// Read side of the metric store, with a last-known-good cache per route.
///
/// Cache entries carry the store generation they were rendered from and are
/// only replaced by a newer one, so the fallback never moves backwards when
/// readers race.
#[derive(Debug)]
pub struct ReadGateway {
    store: Arc<Mutex<MetricStore>>,
    fallback: RwLock<HashMap<Route, (u64, DataPoint)>>,
}

impl ReadGateway {
    pub fn new(store: Arc<Mutex<MetricStore>>) -> Self {
        Self {
            store,
            fallback: RwLock::new(HashMap::new()),
        }
    }

    /// Latest value for `route`, never blocking on the sampler.
    pub fn read(&self, route: Route) -> DataPoint {
        // Copy the sample out and release before formatting
        let latest = match self.store.try_lock() {
            Some(store) => {
                let kind = route.kind();
                store
                    .latest(kind)
                    .cloned()
                    .map(|sample| (store.generation(kind), sample))
            }
            None => {
                log::trace!("{} read hit a busy store, serving fallback", route);
                return self.fallback_for(route);
            }
        };

        let rendered = latest
            .and_then(|(generation, sample)| route.render(&sample).map(|p| (generation, p)));
        match rendered {
            Some((generation, point)) => {
                self.remember(route, generation, &point);
                point
            }
            None => self.fallback_for(route),
        }
    }

    /// Full history of one metric, oldest first
    pub fn raw_snapshot(&self, kind: MetricKind) -> Snapshot<Vec<Sample>> {
        match self.store.try_lock() {
            Some(store) => Snapshot::Ready(store.snapshot(kind)),
            None => Snapshot::Unavailable,
        }
    }

    /// Full history of every metric, taken under one acquisition
    pub fn raw_all(&self) -> Snapshot<BTreeMap<MetricKind, Vec<Sample>>> {
        match self.store.try_lock() {
            Some(store) => Snapshot::Ready(
                MetricKind::ALL
                    .into_iter()
                    .map(|kind| (kind, store.snapshot(kind)))
                    .collect(),
            ),
            None => Snapshot::Unavailable,
        }
    }

    fn remember(&self, route: Route, generation: u64, point: &DataPoint) {
        let mut fallback = self.fallback.write();
        let newer_cached =
            matches!(fallback.get(&route), Some((cached, _)) if *cached > generation);
        if !newer_cached {
            fallback.insert(route, (generation, point.clone()));
        }
    }

    fn fallback_for(&self, route: Route) -> DataPoint {
        self.fallback
            .read()
            .get(&route)
            .map(|(_, point)| point.clone())
            .unwrap_or_else(DataPoint::none)
    }
}
