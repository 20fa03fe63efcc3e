//! Tick semantics: what is sent, what is reset, what survives a failure.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

mod common;

use std::sync::Arc;

use lineflux_agent::export::{build_snapshot, Exporter, TickOutcome};
use lineflux_core::{CountersStore, HttpMethod, LatencyCategory};

use common::{FailingSampler, FixedSampler, RecordingSink};

fn exporter(store: &Arc<CountersStore>, sink: &Arc<RecordingSink>) -> Exporter {
    Exporter::new(
        Arc::clone(store),
        Arc::new(FixedSampler::idle()),
        Arc::clone(sink) as _,
        "test-svc",
    )
}

#[tokio::test]
async fn get_get_patch_then_successful_tick() {
    let store = Arc::new(CountersStore::with_domain("pizza"));
    let sink = Arc::new(RecordingSink::ok());
    let ex = exporter(&store, &sink);

    for m in ["GET", "GET", "PATCH"] {
        store.record_request(m);
    }
    store.observe_latency(LatencyCategory::Service, 35);

    let outcome = ex.run_tick().await;
    assert!(matches!(outcome, TickOutcome::Pushed { lines: 15, window_reset: true }));

    let snap = store.snapshot();
    assert_eq!(snap.total_requests, 3);
    assert_eq!(snap.method_counts.count(HttpMethod::Get), 2);
    assert_eq!(snap.method_counts.count(HttpMethod::Post), 0);
    assert_eq!(snap.method_counts.count(HttpMethod::Put), 0);
    assert_eq!(snap.method_counts.count(HttpMethod::Delete), 0);
    assert_eq!(snap.latency.service_ms, 0);
    assert_eq!(snap.latency.domain_ms, 0);

    let bodies = sink.bodies();
    assert_eq!(bodies.len(), 1);
    let lines: Vec<&str> = bodies[0].split('\n').collect();
    assert_eq!(lines[0], "request,source=test-svc,method=all total=3");
    assert_eq!(lines[1], "request,source=test-svc,method=GET total=2");
    assert_eq!(lines[5], "system,source=test-svc,method=cpu usage=5");
    assert_eq!(lines[13], "latency,source=test-svc,method=service total=35");
}

#[tokio::test]
async fn failed_push_changes_nothing() {
    let store = Arc::new(CountersStore::new());
    let sink = Arc::new(RecordingSink::with_status(500));
    let ex = exporter(&store, &sink);

    store.record_request("POST");
    store.record_auth_attempt(false);
    store.record_sale(true, false, 9.99);
    store.observe_latency(LatencyCategory::Service, 120);
    store.observe_latency(LatencyCategory::Domain, 80);
    let before = store.snapshot();

    let outcome = ex.run_tick().await;
    match outcome {
        TickOutcome::PushFailed(e) => assert_eq!(e.kind().as_str(), "PUSH_FAILURE"),
        other => panic!("expected push failure, got {other:?}"),
    }
    assert_eq!(store.snapshot(), before);
    assert_eq!(sink.bodies().len(), 1);
}

#[tokio::test]
async fn latency_max_carries_over_a_failed_window() {
    let store = Arc::new(CountersStore::new());
    let sink = Arc::new(RecordingSink::with_status(503));
    let ex = exporter(&store, &sink);

    store.observe_latency(LatencyCategory::Service, 200);
    assert!(!ex.run_tick().await.is_pushed());

    store.observe_latency(LatencyCategory::Service, 50);
    sink.set_status(204);
    assert!(ex.run_tick().await.is_pushed());

    let second = &sink.bodies()[1];
    assert!(second.contains("latency,source=test-svc,method=service total=200"));
    assert_eq!(store.latency_snapshot().service_ms, 0);
}

#[tokio::test]
async fn successful_push_keeps_cumulative_counters() {
    let store = Arc::new(CountersStore::new());
    let sink = Arc::new(RecordingSink::ok());
    let ex = exporter(&store, &sink);

    store.record_request("GET");
    store.user_session_started();
    store.record_sale(true, false, 3.5);
    assert!(ex.run_tick().await.is_pushed());

    store.record_request("GET");
    assert!(ex.run_tick().await.is_pushed());

    let snap = store.snapshot();
    assert_eq!(snap.total_requests, 2);
    assert_eq!(snap.active_users, 1);
    assert_eq!(snap.items_sold, 1);
    assert_eq!(snap.revenue, 3.5);
    assert!(sink.bodies()[1].contains("request,source=test-svc,method=all total=2"));
}

#[tokio::test]
async fn sampling_failure_aborts_the_whole_tick() {
    let store = Arc::new(CountersStore::new());
    let sink = Arc::new(RecordingSink::ok());
    let ex = Exporter::new(
        Arc::clone(&store),
        Arc::new(FailingSampler),
        Arc::clone(&sink) as _,
        "test-svc",
    );

    store.observe_latency(LatencyCategory::Service, 70);
    match ex.run_tick().await {
        TickOutcome::BuildFailed(e) => assert_eq!(e.kind().as_str(), "SAMPLING_FAILURE"),
        other => panic!("expected build failure, got {other:?}"),
    }
    assert!(sink.bodies().is_empty());
    assert_eq!(store.latency_snapshot().service_ms, 70);
}

#[tokio::test]
async fn build_failure_sends_nothing() {
    let store = Arc::new(CountersStore::with_domain("bad domain"));
    let sink = Arc::new(RecordingSink::ok());
    let ex = exporter(&store, &sink);

    match ex.run_tick().await {
        TickOutcome::BuildFailed(e) => assert_eq!(e.kind().as_str(), "BUILD_FAILURE"),
        other => panic!("expected build failure, got {other:?}"),
    }
    assert_eq!(sink.started(), 0);
}

#[tokio::test]
async fn newer_max_survives_a_late_success() {
    // tick captures 40; a slower request lands while the push is outstanding
    let store = Arc::new(CountersStore::new());
    store.observe_latency(LatencyCategory::Service, 40);
    let (_, snap) = build_snapshot(&store, &FixedSampler::idle(), "svc").unwrap();

    store.observe_latency(LatencyCategory::Service, 95);
    let reset = store.reset_latency_window_if_unchanged(&snap.latency);

    assert!(!reset);
    assert_eq!(store.latency_snapshot().service_ms, 95);
}

#[test]
fn build_snapshot_does_not_mutate() {
    let store = CountersStore::new();
    store.record_request("DELETE");
    store.observe_latency(LatencyCategory::Domain, 12);
    let before = store.snapshot();

    let (batch, snap) = build_snapshot(&store, &FixedSampler::idle(), "svc").unwrap();
    assert_eq!(snap, before);
    assert_eq!(store.snapshot(), before);
    assert_eq!(batch.len(), 15);
}
