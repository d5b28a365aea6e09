use axum::{http::StatusCode, routing::get, Router};
use iqair_exporter::{IqAirCollector, PullCollector};
use prometheus::proto::{MetricFamily, MetricType};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

const SAMPLE: &str = r#"{"current":{"co":410,"p2":5,"p1":12,"tp":21.5,"hm":40}}"#;

/// Serve `router` on an ephemeral local port and return its address.
async fn spawn_upstream(router: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

fn collector_for(addr: SocketAddr, timeout: Duration) -> IqAirCollector {
    IqAirCollector::new(&format!("http://{}/status", addr), timeout).unwrap()
}

fn value(families: &[MetricFamily], name: &str) -> f64 {
    let family = families
        .iter()
        .find(|family| family.get_name() == name)
        .unwrap_or_else(|| panic!("missing metric family {}", name));
    let metric = &family.get_metric()[0];

    match family.get_field_type() {
        MetricType::COUNTER => metric.get_counter().get_value(),
        MetricType::GAUGE => metric.get_gauge().get_value(),
        other => panic!("unexpected metric type {:?} for {}", other, name),
    }
}

fn readings(families: &[MetricFamily]) -> [f64; 5] {
    [
        value(families, "iqair_co2"),
        value(families, "iqair_p25"),
        value(families, "iqair_p10"),
        value(families, "iqair_temperature"),
        value(families, "iqair_humidity"),
    ]
}

#[tokio::test]
async fn test_successful_scrape_publishes_reading() {
    let addr = spawn_upstream(Router::new().route("/status", get(|| async { SAMPLE }))).await;
    let collector = collector_for(addr, Duration::from_secs(5));

    let families = collector.collect().await;

    assert_eq!(value(&families, "iqair_up"), 1.0);
    assert_eq!(readings(&families), [410.0, 5.0, 12.0, 21.5, 40.0]);
    assert_eq!(value(&families, "iqair_exporter_scrapes_total"), 1.0);
    assert_eq!(value(&families, "iqair_exporter_json_parse_failures_total"), 0.0);
}

#[tokio::test]
async fn test_metric_types() {
    let addr = spawn_upstream(Router::new().route("/status", get(|| async { SAMPLE }))).await;
    let families = collector_for(addr, Duration::from_secs(5)).collect().await;

    for family in &families {
        let expected = if family.get_name().ends_with("_total") {
            MetricType::COUNTER
        } else {
            MetricType::GAUGE
        };
        assert_eq!(family.get_field_type(), expected, "{}", family.get_name());
    }
}

#[tokio::test]
async fn test_empty_object_is_up_with_zero_readings() {
    let addr = spawn_upstream(Router::new().route("/status", get(|| async { "{}" }))).await;
    let collector = collector_for(addr, Duration::from_secs(5));

    let families = collector.collect().await;

    assert_eq!(value(&families, "iqair_up"), 1.0);
    assert_eq!(readings(&families), [0.0; 5]);
    assert_eq!(collector.json_parse_failures_total(), 0);
}

#[tokio::test]
async fn test_null_reading_keeps_other_values() {
    let body = r#"{"current":{"co":null,"p2":5,"p1":12,"tp":21.5,"hm":40}}"#;
    let addr = spawn_upstream(Router::new().route("/status", get(move || async move { body }))).await;
    let collector = collector_for(addr, Duration::from_secs(5));

    let families = collector.collect().await;

    assert_eq!(value(&families, "iqair_up"), 1.0);
    assert_eq!(readings(&families), [0.0, 5.0, 12.0, 21.5, 40.0]);
    assert_eq!(collector.json_parse_failures_total(), 0);
}

#[tokio::test]
async fn test_malformed_json_counts_parse_failure() {
    let addr = spawn_upstream(Router::new().route("/status", get(|| async { "{\"current\": " }))).await;
    let collector = collector_for(addr, Duration::from_secs(5));

    let families = collector.collect().await;

    assert_eq!(value(&families, "iqair_up"), 0.0);
    assert_eq!(readings(&families), [0.0; 5]);
    assert_eq!(value(&families, "iqair_exporter_scrapes_total"), 1.0);
    assert_eq!(value(&families, "iqair_exporter_json_parse_failures_total"), 1.0);
}

#[tokio::test]
async fn test_unreachable_upstream() {
    // Reserve a port, then close it so connections are refused.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let collector = collector_for(addr, Duration::from_secs(5));
    let families = collector.collect().await;

    assert_eq!(value(&families, "iqair_up"), 0.0);
    assert_eq!(readings(&families), [0.0; 5]);
    assert_eq!(collector.scrapes_total(), 1);
    assert_eq!(collector.json_parse_failures_total(), 0);
}

#[tokio::test]
async fn test_error_status_is_not_a_parse_failure() {
    let router = Router::new().route(
        "/status",
        get(|| async { (StatusCode::SERVICE_UNAVAILABLE, SAMPLE) }),
    );
    let addr = spawn_upstream(router).await;
    let collector = collector_for(addr, Duration::from_secs(5));

    let families = collector.collect().await;

    assert_eq!(value(&families, "iqair_up"), 0.0);
    assert_eq!(readings(&families), [0.0; 5]);
    assert_eq!(collector.json_parse_failures_total(), 0);
}

#[tokio::test]
async fn test_timeout_is_enforced() {
    let router = Router::new().route(
        "/status",
        get(|| async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            SAMPLE
        }),
    );
    let addr = spawn_upstream(router).await;
    let collector = collector_for(addr, Duration::from_millis(200));

    let started = Instant::now();
    let families = collector.collect().await;

    assert!(started.elapsed() < Duration::from_secs(4));
    assert_eq!(value(&families, "iqair_up"), 0.0);
    assert_eq!(collector.json_parse_failures_total(), 0);
}

#[tokio::test]
async fn test_sequential_scrapes_accumulate() {
    let addr = spawn_upstream(Router::new().route("/status", get(|| async { SAMPLE }))).await;
    let collector = collector_for(addr, Duration::from_secs(5));

    let mut families = Vec::new();
    for _ in 0..5 {
        families = collector.collect().await;
    }

    assert_eq!(value(&families, "iqair_exporter_scrapes_total"), 5.0);
    assert_eq!(value(&families, "iqair_exporter_json_parse_failures_total"), 0.0);
    assert_eq!(collector.scrapes_total(), 5);
}

#[tokio::test]
async fn test_recovers_after_failure() {
    let healthy = Arc::new(Mutex::new(false));
    let flag = Arc::clone(&healthy);
    let router = Router::new().route(
        "/status",
        get(move || {
            let ok = *flag.lock().unwrap();
            async move { if ok { SAMPLE } else { "oops" } }
        }),
    );
    let addr = spawn_upstream(router).await;
    let collector = collector_for(addr, Duration::from_secs(5));

    let families = collector.collect().await;
    assert_eq!(value(&families, "iqair_up"), 0.0);

    *healthy.lock().unwrap() = true;
    let families = collector.collect().await;
    assert_eq!(value(&families, "iqair_up"), 1.0);
    assert_eq!(value(&families, "iqair_co2"), 410.0);
    assert_eq!(value(&families, "iqair_exporter_scrapes_total"), 2.0);
    assert_eq!(value(&families, "iqair_exporter_json_parse_failures_total"), 1.0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_collects_do_not_overlap() {
    let calls: Arc<Mutex<Vec<(Instant, Instant)>>> = Arc::new(Mutex::new(Vec::new()));
    let recorded = Arc::clone(&calls);
    let router = Router::new().route(
        "/status",
        get(move || {
            let recorded = Arc::clone(&recorded);
            async move {
                let start = Instant::now();
                tokio::time::sleep(Duration::from_millis(200)).await;
                recorded.lock().unwrap().push((start, Instant::now()));
                SAMPLE
            }
        }),
    );
    let addr = spawn_upstream(router).await;
    let collector = Arc::new(collector_for(addr, Duration::from_secs(5)));

    let first = tokio::spawn({
        let collector = Arc::clone(&collector);
        async move { collector.collect().await }
    });
    let second = tokio::spawn({
        let collector = Arc::clone(&collector);
        async move { collector.collect().await }
    });
    let (first, second) = (first.await.unwrap(), second.await.unwrap());

    let mut calls = calls.lock().unwrap().clone();
    calls.sort_by_key(|(start, _)| *start);
    assert_eq!(calls.len(), 2);
    assert!(calls[1].0 >= calls[0].1, "upstream requests overlapped");

    let mut totals = [
        value(&first, "iqair_exporter_scrapes_total"),
        value(&second, "iqair_exporter_scrapes_total"),
    ];
    totals.sort_by(|a, b| a.partial_cmp(b).unwrap());
    assert_eq!(totals, [1.0, 2.0]);
}

#[tokio::test]
async fn test_fetch_reading_does_not_count() {
    let addr = spawn_upstream(Router::new().route("/status", get(|| async { SAMPLE }))).await;
    let collector = collector_for(addr, Duration::from_secs(5));

    let reading = tokio_test::assert_ok!(collector.fetch_reading().await);
    assert_eq!(reading.co2, 410);
    assert_eq!(reading.temperature, 21.5);
    assert_eq!(collector.scrapes_total(), 0);
}
