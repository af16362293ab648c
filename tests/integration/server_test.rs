use std::time::Duration;

use rasp_stat::core::stats::{MetricKind, Reading, Sample, Unit};
use rasp_stat::{server, StatConfig, StatService};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

async fn get(port: u16, path: &str) -> String {
    let mut stream = TcpStream::connect(("127.0.0.1", port)).await.unwrap();
    let request = format!("GET {path} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n");
    stream.write_all(request.as_bytes()).await.unwrap();

    let mut response = String::new();
    stream.read_to_string(&mut response).await.unwrap();
    response
}

#[tokio::test]
async fn test_http_round_trip() {
    let service = StatService::new(&StatConfig::default()).unwrap();
    let listener = server::bind(0).await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let server = tokio::spawn(server::serve(
        listener,
        service.gateway(),
        service.subscribe_shutdown(),
    ));

    let cold = get(port, "/temp").await;
    assert!(cold.starts_with("HTTP/1.1 200"), "{cold}");
    assert!(cold.contains("application/json"));
    assert!(cold.ends_with(r#"{"data":"-1 "}"#), "{cold}");

    service
        .store()
        .lock()
        .append(Sample::Temperature(Reading::new(40.0, Unit::Celsius)));

    let warm = get(port, "/temp").await;
    assert!(warm.ends_with(r#"{"data":"40.0 C"}"#), "{warm}");

    let raw = get(port, &format!("/raw/{}", MetricKind::Temperature)).await;
    assert!(raw.ends_with(r#"{"data":[{"value":40.0,"unit":"C"}]}"#), "{raw}");

    let missing = get(port, "/reboot").await;
    assert!(missing.starts_with("HTTP/1.1 404"), "{missing}");

    service.shutdown();
    tokio::time::timeout(Duration::from_secs(5), server)
        .await
        .unwrap()
        .unwrap()
        .unwrap();
}

#[tokio::test]
async fn test_server_outlives_dropped_connections() {
    let service = StatService::new(&StatConfig::default()).unwrap();
    let listener = server::bind(0).await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let server = tokio::spawn(server::serve(
        listener,
        service.gateway(),
        service.subscribe_shutdown(),
    ));

    // Clients that hang up before or in the middle of a request
    for i in 0..16 {
        let mut stream = TcpStream::connect(("127.0.0.1", port)).await.unwrap();
        if i % 2 == 1 {
            stream.write_all(b"GET /te").await.unwrap();
        }
        drop(stream);
    }

    let reply = get(port, "/temp").await;
    assert!(reply.ends_with(r#"{"data":"-1 "}"#), "{reply}");
    assert!(!server.is_finished());

    service.shutdown();
    tokio::time::timeout(Duration::from_secs(5), server)
        .await
        .unwrap()
        .unwrap()
        .unwrap();
}
