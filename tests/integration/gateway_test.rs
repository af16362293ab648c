use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use rasp_stat::core::stats::{
    MetricKind, MetricStore, ReadGateway, Reading, Route, Sample, Snapshot, Unit,
};

fn temp(value: f32) -> Sample {
    Sample::Temperature(Reading::new(value, Unit::Celsius))
}

fn setup(capacity: usize) -> (Arc<Mutex<MetricStore>>, Arc<ReadGateway>) {
    let store = Arc::new(Mutex::new(MetricStore::new(capacity).unwrap()));
    let gateway = Arc::new(ReadGateway::new(store.clone()));
    (store, gateway)
}

#[test]
fn test_read_before_first_sample_is_sentinel() {
    let (_store, gateway) = setup(2);

    assert!(gateway.read(Route::Temp).is_none());
    assert_eq!(
        gateway.raw_snapshot(MetricKind::Temperature),
        Snapshot::Ready(Vec::new())
    );
}

#[test]
fn test_read_returns_latest_formatted() {
    let (store, gateway) = setup(2);
    store.lock().append(temp(40.0));
    store.lock().append(temp(42.5));

    assert_eq!(gateway.read(Route::Temp).value, "42.5 C");
    assert_eq!(
        gateway.raw_snapshot(MetricKind::Temperature).ready().unwrap(),
        vec![temp(40.0), temp(42.5)]
    );
}

#[test]
fn test_contended_reads_return_quickly_with_cached_value() {
    let (store, gateway) = setup(2);
    store.lock().append(temp(40.0));
    assert_eq!(gateway.read(Route::Temp).value, "40.0 C");

    // Simulate a write in progress
    let mut guard = store.lock();
    guard.append(temp(55.5));

    let readers: Vec<_> = (0..8)
        .map(|_| {
            let gateway = gateway.clone();
            thread::spawn(move || {
                let started = Instant::now();
                let temp = gateway.read(Route::Temp);
                let volts = gateway.read(Route::Volts);
                (started.elapsed(), temp, volts)
            })
        })
        .collect();

    for reader in readers {
        let (elapsed, temp, volts) = reader.join().unwrap();
        assert!(elapsed < Duration::from_secs(1), "read blocked for {elapsed:?}");
        assert_eq!(temp.value, "40.0 C");
        assert!(volts.is_none());
    }

    drop(guard);
    assert_eq!(gateway.read(Route::Temp).value, "55.5 C");
}

#[test]
fn test_concurrent_reads_never_see_torn_values() {
    let (store, gateway) = setup(4);
    const WRITES: u32 = 2_000;

    let writer = {
        let store = store.clone();
        thread::spawn(move || {
            for i in 0..WRITES {
                store.lock().append(temp(i as f32));
            }
        })
    };

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let gateway = gateway.clone();
            thread::spawn(move || {
                let mut seen = Vec::new();
                for _ in 0..WRITES {
                    seen.push(gateway.read(Route::Temp));
                    if let Snapshot::Ready(history) =
                        gateway.raw_snapshot(MetricKind::Temperature)
                    {
                        assert!(history.len() <= 4);
                    }
                }
                seen
            })
        })
        .collect();

    writer.join().unwrap();
    for reader in readers {
        for point in reader.join().unwrap() {
            if point.is_none() {
                continue;
            }
            let (number, unit) = point.value.split_once(' ').unwrap();
            assert_eq!(unit, "C");
            let value: f32 = number.parse().unwrap();
            assert!(value >= 0.0 && value < WRITES as f32 && value.fract() == 0.0);
        }
    }

    assert_eq!(gateway.read(Route::Temp).value, format!("{:.1} C", (WRITES - 1) as f32));
}

#[test]
fn test_bulk_read_is_all_or_nothing() {
    let (store, gateway) = setup(2);
    store.lock().append(temp(40.0));

    let all = gateway.raw_all().ready().unwrap();
    assert_eq!(all.len(), MetricKind::COUNT);
    assert_eq!(all[&MetricKind::Temperature], vec![temp(40.0)]);
    assert!(all[&MetricKind::Memory].is_empty());

    let _guard = store.lock();
    assert_eq!(gateway.raw_all(), Snapshot::Unavailable);
}
