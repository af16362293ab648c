use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use rasp_stat::core::stats::{MetricKind, Route, SampleSource};
use rasp_stat::{Result, StatConfig, StatError, StatService};
use tokio::time::Instant;

use super::support::ScriptedSource;

#[test]
fn test_zero_points_rejected_at_construction() {
    let config = StatConfig {
        points_per_stat: 0,
        ..Default::default()
    };
    assert!(matches!(StatService::new(&config), Err(StatError::Config(_))));
}

#[test]
fn test_zero_interval_rejected_at_construction() {
    let config = StatConfig {
        fetch_interval_secs: 0,
        ..Default::default()
    };
    assert!(matches!(StatService::new(&config), Err(StatError::Config(_))));
}

#[tokio::test(start_paused = true)]
async fn test_spawned_sampler_feeds_gateway_until_shutdown() {
    let source = ScriptedSource::new();
    source.push(MetricKind::Temperature, "temp=40.0'C");
    let service = StatService::new(&StatConfig::default()).unwrap();
    let gateway = service.gateway();

    assert!(gateway.read(Route::Temp).is_none());

    let handle = service.spawn_sampler(source);
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(gateway.read(Route::Temp).value, "40.0 C");

    // Later ticks fail for temp; the value stays
    tokio::time::sleep(Duration::from_secs(3)).await;
    assert_eq!(gateway.read(Route::Temp).value, "40.0 C");

    service.shutdown();
    tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("sampler stops after shutdown")
        .unwrap();
}

/// Takes `delay` per fetch and records when each tick's first fetch started
struct SlowSource {
    delay: Duration,
    tick_starts: Arc<Mutex<Vec<Instant>>>,
}

#[async_trait]
impl SampleSource for SlowSource {
    async fn fetch(&mut self, kind: MetricKind) -> Result<String> {
        if kind == MetricKind::ALL[0] {
            self.tick_starts.lock().push(Instant::now());
        }
        tokio::time::sleep(self.delay).await;
        Err(StatError::command_failed(kind.name(), "slow and broken"))
    }
}

#[tokio::test(start_paused = true)]
async fn test_ticks_never_overlap() {
    let tick_starts = Arc::new(Mutex::new(Vec::new()));
    let source = SlowSource {
        delay: Duration::from_millis(100),
        tick_starts: tick_starts.clone(),
    };
    let config = StatConfig {
        fetch_interval_secs: 1,
        ..Default::default()
    };
    let service = StatService::new(&config).unwrap();
    let handle = service.spawn_sampler(source);

    tokio::time::sleep(Duration::from_secs(10)).await;
    service.shutdown();
    handle.await.unwrap();

    let starts = tick_starts.lock().clone();
    assert!(starts.len() >= 3, "only {} ticks", starts.len());

    // Period is the interval plus the whole tick's fetch time
    let min_period = Duration::from_secs(1) + Duration::from_millis(100) * MetricKind::COUNT as u32;
    for pair in starts.windows(2) {
        assert!(pair[1] - pair[0] >= min_period, "{:?}", pair[1] - pair[0]);
    }
}
