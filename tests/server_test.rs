mod common;

use std::sync::Arc;
use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use common::{canonical, listing_page, sample_page, StubFetcher, IA_LISTING, ID_A};
use ib_sample_scraper::server::{router, AppState};
use ib_sample_scraper::{
    Harvester, ListingSource, MemoryStore, SampleFilter, SampleRecord, SampleStore, SiteProfile,
};
use serde_json::Value;
use tower::ServiceExt;

fn record(url: &str, subject: &str, title: &str) -> SampleRecord {
    let mut r = SampleRecord::new(subject).with_source_url(url);
    r.title = title.to_string();
    r
}

async fn seeded_store() -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::new());
    for i in 0..12 {
        let subject = if i % 3 == 0 { "Physics HL" } else { "Math AI SL" };
        store
            .upsert(&record(&format!("https://nailib.com/s/{i}"), subject, &format!("Sample {i}")))
            .await
            .expect("upsert failed");
    }
    store
}

fn app(store: Arc<MemoryStore>, fetcher: StubFetcher) -> Router {
    let harvester = Harvester::new(fetcher, SiteProfile::default());
    router(AppState::new(
        store,
        harvester,
        vec![ListingSource::new(IA_LISTING)],
    ))
}

async fn send(app: Router, method: &str, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

#[tokio::test]
async fn health_reports_version() {
    let (status, body) = send(app(seeded_store().await, StubFetcher::new()), "GET", "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn list_defaults_to_ten() {
    let (status, body) = send(app(seeded_store().await, StubFetcher::new()), "GET", "/samples").await;
    assert_eq!(status, StatusCode::OK);
    let items = body.as_array().expect("array");
    assert_eq!(items.len(), 10);
    assert_eq!(items[0]["title"], "Sample 0");
    assert!(items[0]["id"].is_string());
}

#[tokio::test]
async fn list_filters_by_subject_with_limit() {
    let (status, body) = send(
        app(seeded_store().await, StubFetcher::new()),
        "GET",
        "/samples?subject=Physics%20HL&limit=2",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let items = body.as_array().expect("array");
    assert_eq!(items.len(), 2);
    assert!(items.iter().all(|s| s["subject"] == "Physics HL"));
}

#[tokio::test]
async fn count_with_and_without_subject() {
    let store = seeded_store().await;

    let (status, body) = send(app(store.clone(), StubFetcher::new()), "GET", "/samples/count").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_samples"], 12);
    assert_eq!(body["subject"], Value::Null);

    let (_, body) = send(
        app(store, StubFetcher::new()),
        "GET",
        "/samples/count?subject=Physics%20HL",
    )
    .await;
    assert_eq!(body["total_samples"], 4);
    assert_eq!(body["subject"], "Physics HL");
}

#[tokio::test]
async fn get_by_id_and_not_found() {
    let store = seeded_store().await;
    let id = store
        .list(&SampleFilter::default(), 1)
        .await
        .expect("list failed")[0]
        .id
        .clone();

    let (status, body) = send(app(store.clone(), StubFetcher::new()), "GET", &format!("/samples/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], id.as_str());
    assert_eq!(body["source_url"], "https://nailib.com/s/0");

    let (status, body) = send(app(store, StubFetcher::new()), "GET", "/samples/missing").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "not_found");
}

#[tokio::test]
async fn scrape_is_accepted_and_runs_in_background() {
    let store = Arc::new(MemoryStore::new());
    let fetcher = StubFetcher::new()
        .page(IA_LISTING, listing_page(&[&format!("/ia-sample/x/{ID_A}")]))
        .page(canonical(ID_A), sample_page("Background"));

    let (status, body) = send(app(store.clone(), fetcher), "POST", "/scrape").await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(body["status"], "accepted");

    let mut stored = 0;
    for _ in 0..50 {
        stored = store.count(&SampleFilter::default()).await.expect("count failed");
        if stored == 1 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert_eq!(stored, 1);
}

#[tokio::test]
async fn cors_allows_any_origin() {
    let response = app(seeded_store().await, StubFetcher::new())
        .oneshot(
            Request::builder()
                .uri("/health")
                .header("origin", "https://example.com")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(
        response
            .headers()
            .get("access-control-allow-origin")
            .and_then(|v| v.to_str().ok()),
        Some("*")
    );
}
