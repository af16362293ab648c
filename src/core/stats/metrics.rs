use serde::{Deserialize, Serialize};
use std::fmt;

/// The fixed set of measured quantities.
///
/// `ALL` is the order the sampler walks every tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricKind {
    #[serde(rename = "cpu")]
    CpuClock,
    #[serde(rename = "gpu")]
    GpuClock,
    #[serde(rename = "temp")]
    Temperature,
    #[serde(rename = "volts")]
    Voltage,
    #[serde(rename = "throttled")]
    Throttle,
    Memory,
}

impl MetricKind {
    pub const ALL: [MetricKind; 6] = [
        MetricKind::CpuClock,
        MetricKind::GpuClock,
        MetricKind::Temperature,
        MetricKind::Voltage,
        MetricKind::Throttle,
        MetricKind::Memory,
    ];

    pub const COUNT: usize = Self::ALL.len();

    /// Short name, also used as the `/raw/<kind>` path segment
    pub fn name(self) -> &'static str {
        match self {
            MetricKind::CpuClock => "cpu",
            MetricKind::GpuClock => "gpu",
            MetricKind::Temperature => "temp",
            MetricKind::Voltage => "volts",
            MetricKind::Throttle => "throttled",
            MetricKind::Memory => "memory",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Unit {
    #[serde(rename = "MHz")]
    MegaHertz,
    #[serde(rename = "C")]
    Celsius,
    #[serde(rename = "V")]
    Volt,
    #[serde(rename = "MB")]
    MegaByte,
}

impl Unit {
    pub fn symbol(self) -> &'static str {
        match self {
            Unit::MegaHertz => "MHz",
            Unit::Celsius => "C",
            Unit::Volt => "V",
            Unit::MegaByte => "MB",
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// A numeric measurement with its unit
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    pub value: f32,
    pub unit: Unit,
}

impl Reading {
    pub fn new(value: f32, unit: Unit) -> Self {
        Self { value, unit }
    }
}

/// Throttling bitmask as reported by `vcgencmd get_throttled`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThrottleState {
    /// Value exactly as printed, e.g. `0x50005`
    pub raw: String,
    pub flags: u32,
}

impl ThrottleState {
    const UNDER_VOLTAGE: u32 = 1 << 0;
    const FREQUENCY_CAPPED: u32 = 1 << 1;
    const THROTTLED_NOW: u32 = 1 << 2;
    const SOFT_TEMP_LIMIT: u32 = 1 << 3;

    /// Any of the "currently active" bits (0..=3) is set
    pub fn throttled(&self) -> bool {
        self.flags
            & (Self::UNDER_VOLTAGE
                | Self::FREQUENCY_CAPPED
                | Self::THROTTLED_NOW
                | Self::SOFT_TEMP_LIMIT)
            != 0
    }
}

/// Memory figures in MB, from `free -m`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryUsage {
    pub free: u64,
    pub total: u64,
    pub swap_used: u64,
    pub swap_total: u64,
}

/// One parsed measurement. Never mutated once built.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Sample {
    CpuClock(Reading),
    GpuClock(Reading),
    Temperature(Reading),
    Voltage(Reading),
    Throttle(ThrottleState),
    Memory(MemoryUsage),
}

impl Sample {
    pub fn kind(&self) -> MetricKind {
        match self {
            Sample::CpuClock(_) => MetricKind::CpuClock,
            Sample::GpuClock(_) => MetricKind::GpuClock,
            Sample::Temperature(_) => MetricKind::Temperature,
            Sample::Voltage(_) => MetricKind::Voltage,
            Sample::Throttle(_) => MetricKind::Throttle,
            Sample::Memory(_) => MetricKind::Memory,
        }
    }
}
