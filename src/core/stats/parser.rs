//! Turns raw command output into typed samples.
//!
//! `vcgencmd` prints one `key=value` line per query; the value may carry a
//! unit suffix (`40.0'C`, `0.8500V`). Memory comes from the `free -m` table.

use once_cell::sync::Lazy;
use regex::Regex;

use super::metrics::{MemoryUsage, MetricKind, Reading, Sample, ThrottleState, Unit};
use crate::error::{Result, StatError};

/// Number followed by an optional unit, e.g. `40.0'C`, `0.8500V`, `1500398464`
static NUMBER_WITH_UNIT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(-?\d+(?:\.\d+)?)'?([A-Za-z]*)$").expect("static regex is valid")
});

static HEX_FLAGS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^0[xX]([0-9a-fA-F]+)$").expect("static regex is valid"));

const HZ_PER_MHZ: f64 = 1_000_000.0;

/// Parse the output of the command sampled for `kind`.
pub fn parse(kind: MetricKind, raw: &str) -> Result<Sample> {
    match kind {
        MetricKind::CpuClock => parse_clock(kind, raw).map(Sample::CpuClock),
        MetricKind::GpuClock => parse_clock(kind, raw).map(Sample::GpuClock),
        MetricKind::Temperature => {
            parse_measure(kind, raw, Unit::Celsius).map(Sample::Temperature)
        }
        MetricKind::Voltage => parse_measure(kind, raw, Unit::Volt).map(Sample::Voltage),
        MetricKind::Throttle => parse_throttle(raw).map(Sample::Throttle),
        MetricKind::Memory => parse_memory(raw).map(Sample::Memory),
    }
}

/// Split `key=value` and return the trimmed value
fn split_equal(kind: MetricKind, raw: &str) -> Result<&str> {
    let line = raw.trim();
    let (_, value) = line
        .split_once('=')
        .ok_or_else(|| StatError::parse(kind, raw, "expected key=value"))?;
    let value = value.trim();
    if value.is_empty() {
        return Err(StatError::parse(kind, raw, "empty value"));
    }
    Ok(value)
}

fn number_and_suffix<'a>(kind: MetricKind, raw: &str, value: &'a str) -> Result<(f64, &'a str)> {
    let caps = NUMBER_WITH_UNIT
        .captures(value)
        .ok_or_else(|| StatError::parse(kind, raw, "value is not a number"))?;

    let number = caps[1]
        .parse::<f64>()
        .map_err(|e| StatError::parse(kind, raw, e.to_string()))?;
    let suffix = caps.get(2).map_or("", |m| m.as_str());

    Ok((number, suffix))
}

/// `frequency(48)=1500398464` in Hz, stored in MHz
fn parse_clock(kind: MetricKind, raw: &str) -> Result<Reading> {
    let value = split_equal(kind, raw)?;
    let (hz, suffix) = number_and_suffix(kind, raw, value)?;
    if !suffix.is_empty() {
        return Err(StatError::parse(kind, raw, "unexpected unit on clock"));
    }
    if hz < 0.0 {
        return Err(StatError::parse(kind, raw, "negative frequency"));
    }

    Ok(Reading::new((hz / HZ_PER_MHZ) as f32, Unit::MegaHertz))
}

/// `temp=40.0'C` or `volt=0.8500V`; the suffix, when present, must match
fn parse_measure(kind: MetricKind, raw: &str, unit: Unit) -> Result<Reading> {
    let value = split_equal(kind, raw)?;
    let (number, suffix) = number_and_suffix(kind, raw, value)?;
    if !suffix.is_empty() && !suffix.eq_ignore_ascii_case(unit.symbol()) {
        return Err(StatError::parse(
            kind,
            raw,
            format!("expected unit {unit}, got {suffix}"),
        ));
    }

    Ok(Reading::new(number as f32, unit))
}

/// `throttled=0x50005`
fn parse_throttle(raw: &str) -> Result<ThrottleState> {
    let kind = MetricKind::Throttle;
    let value = split_equal(kind, raw)?;
    let caps = HEX_FLAGS
        .captures(value)
        .ok_or_else(|| StatError::parse(kind, raw, "expected hex flags"))?;
    let flags = u32::from_str_radix(&caps[1], 16)
        .map_err(|e| StatError::parse(kind, raw, e.to_string()))?;

    Ok(ThrottleState {
        raw: value.to_string(),
        flags,
    })
}

/// Parse `free -m`:
///
/// ```text
///                total        used        free      shared  buff/cache   available
/// Mem:            3794         245        3092          19         456        3458
/// Swap:             99           0          99
/// ```
///
/// "free" is the `available` column (what the system can still hand out),
/// swap reports `used` and `total`.
fn parse_memory(raw: &str) -> Result<MemoryUsage> {
    let kind = MetricKind::Memory;
    let mut mem: Option<(u64, u64)> = None;
    let mut swap: Option<(u64, u64)> = None;

    for line in raw.lines() {
        let mut fields = line.split_whitespace();
        match fields.next() {
            Some("Mem:") => {
                let cols = numeric_columns(kind, raw, fields)?;
                // total used free shared buff/cache available
                if cols.len() < 6 {
                    return Err(StatError::parse(kind, raw, "short Mem: row"));
                }
                mem = Some((cols[5], cols[0]));
            }
            Some("Swap:") => {
                let cols = numeric_columns(kind, raw, fields)?;
                if cols.len() < 2 {
                    return Err(StatError::parse(kind, raw, "short Swap: row"));
                }
                swap = Some((cols[1], cols[0]));
            }
            _ => {}
        }
    }

    let (free, total) = mem.ok_or_else(|| StatError::parse(kind, raw, "missing Mem: row"))?;
    // A host without swap still prints the row; treat a missing one as zero
    let (swap_used, swap_total) = swap.unwrap_or((0, 0));

    Ok(MemoryUsage {
        free,
        total,
        swap_used,
        swap_total,
    })
}

fn numeric_columns<'a>(
    kind: MetricKind,
    raw: &str,
    fields: impl Iterator<Item = &'a str>,
) -> Result<Vec<u64>> {
    fields
        .map(|f| {
            f.parse::<u64>()
                .map_err(|e| StatError::parse(kind, raw, format!("{f:?}: {e}")))
        })
        .collect()
}
