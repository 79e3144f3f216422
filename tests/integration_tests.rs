//! Integration tests for the retrying single-request fetcher, using
//! wiremock to simulate the stats API.

use courtside::endpoint::{BlockKey, Descriptor};
use courtside::endpoints::{LeagueGameLog, SeasonType};
use courtside::table::Record;
use courtside::{CancellationToken, Client, Error};
use serde::Deserialize;
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Debug, Deserialize, PartialEq)]
struct Leader {
    #[serde(rename = "PLAYER")]
    player: String,
    #[serde(rename = "PTS")]
    points: f64,
}

fn leaders_payload() -> serde_json::Value {
    json!({
        "resultSets": [{
            "name": "Leaders",
            "headers": ["PLAYER", "PTS"],
            "rowSet": [["Gilgeous-Alexander", 32.7], ["Doncic", 28.1]]
        }]
    })
}

fn client_for(server: &MockServer) -> Client {
    // Opt in with RUST_LOG to watch retry and rate-limit events.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
    Client::builder()
        .base_url(server.uri())
        .base_delay(Duration::from_millis(10))
        .max_delay(Duration::from_millis(50))
        .build()
        .unwrap()
}

#[tokio::test]
async fn successful_tabular_get() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/leagueleaders"))
        .respond_with(ResponseTemplate::new(200).set_body_json(leaders_payload()))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let endpoint: Descriptor<Vec<Leader>> =
        Descriptor::new("leagueleaders").table(BlockKey::Name("Leaders".to_string()));

    let response = client.get(&endpoint).await.unwrap();

    assert_eq!(response.data.len(), 2);
    assert_eq!(response.data[0].player, "Gilgeous-Alexander");
    assert_eq!(response.data[1].points, 28.1);
    assert_eq!(response.status.as_u16(), 200);
    assert_eq!(response.attempts, 1);
    assert!(!response.was_retried());
}

#[tokio::test]
async fn query_params_and_default_headers_reach_the_server() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/leaguegamelog"))
        .and(query_param("Season", "2024-25"))
        .and(query_param("SeasonType", "Regular Season"))
        .and(header("referer", "https://stats.nba.com/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "resultSets": [{
                "name": "LeagueGameLog",
                "headers": ["SEASON_ID", "TEAM_ID", "TEAM_ABBREVIATION", "GAME_ID",
                            "GAME_DATE", "MATCHUP", "WL", "PTS", "PLUS_MINUS"],
                "rowSet": []
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let endpoint = LeagueGameLog::new("2024-25", SeasonType::RegularSeason);

    let response = client.get(&endpoint).await.unwrap();
    assert!(response.data.is_empty());
}

#[tokio::test]
async fn http_404_is_fatal_after_one_attempt() {
    let server = MockServer::start().await;
    let hits = Arc::new(AtomicUsize::new(0));
    let hits_clone = hits.clone();

    Mock::given(method("GET"))
        .and(path("/nosuch"))
        .respond_with(move |_req: &wiremock::Request| {
            hits_clone.fetch_add(1, Ordering::SeqCst);
            ResponseTemplate::new(404).set_body_string("Not found")
        })
        .mount(&server)
        .await;

    let client = client_for(&server);
    let endpoint: Descriptor<Vec<Record>> = Descriptor::new("nosuch").table(BlockKey::Index(0));

    let result = client.get(&endpoint).await;

    match result {
        Err(Error::Client { status, path, body }) => {
            assert_eq!(status.as_u16(), 404);
            assert_eq!(path, "nosuch");
            assert_eq!(body, "Not found");
        }
        other => panic!("expected Client error, got {other:?}"),
    }
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn invalid_json_is_fatal_and_keeps_raw_body() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/garbled"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json at all"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let endpoint: Descriptor<serde_json::Value> = Descriptor::new("garbled");

    match client.get(&endpoint).await {
        Err(Error::Decode { context, raw, .. }) => {
            assert_eq!(context, "garbled");
            assert_eq!(raw, "not json at all");
        }
        other => panic!("expected Decode error, got {other:?}"),
    }
}

#[tokio::test]
async fn missing_block_is_fatal_and_lists_available() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/leagueleaders"))
        .respond_with(ResponseTemplate::new(200).set_body_json(leaders_payload()))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let endpoint: Descriptor<Vec<Record>> =
        Descriptor::new("leagueleaders").table(BlockKey::Name("Standings".to_string()));

    match client.get(&endpoint).await {
        Err(Error::BlockNotFound { wanted, available }) => {
            assert_eq!(wanted, "Standings");
            assert_eq!(available, vec!["Leaders".to_string()]);
        }
        other => panic!("expected BlockNotFound, got {other:?}"),
    }
}

#[tokio::test]
async fn retries_through_two_429s_then_succeeds() {
    let server = MockServer::start().await;
    let hits = Arc::new(AtomicUsize::new(0));
    let hits_clone = hits.clone();
    let payload = leaders_payload();

    Mock::given(method("GET"))
        .and(path("/leagueleaders"))
        .respond_with(move |_req: &wiremock::Request| {
            let n = hits_clone.fetch_add(1, Ordering::SeqCst);
            if n < 2 {
                ResponseTemplate::new(429).set_body_string("Too many requests")
            } else {
                ResponseTemplate::new(200).set_body_json(&payload)
            }
        })
        .mount(&server)
        .await;

    let client = client_for(&server);
    let endpoint: Descriptor<Vec<Record>> =
        Descriptor::new("leagueleaders").table(BlockKey::Index(0));

    let response = client.get(&endpoint).await.unwrap();

    assert_eq!(response.attempts, 3);
    assert!(response.was_retried());
    assert_eq!(hits.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn exhausted_retries_surface_the_last_error() {
    let server = MockServer::start().await;
    let hits = Arc::new(AtomicUsize::new(0));
    let hits_clone = hits.clone();

    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(move |_req: &wiremock::Request| {
            hits_clone.fetch_add(1, Ordering::SeqCst);
            ResponseTemplate::new(500).set_body_string("Server error")
        })
        .mount(&server)
        .await;

    let client = Client::builder()
        .base_url(server.uri())
        .max_retries(2)
        .base_delay(Duration::from_millis(10))
        .build()
        .unwrap();
    let endpoint: Descriptor<serde_json::Value> = Descriptor::new("flaky");

    match client.get(&endpoint).await {
        Err(Error::Server {
            status,
            path,
            attempts,
            ..
        }) => {
            assert_eq!(status.as_u16(), 500);
            assert_eq!(path, "flaky");
            // max_retries = 2 means 3 total attempts.
            assert_eq!(attempts, 3);
        }
        other => panic!("expected Server error, got {other:?}"),
    }
    assert_eq!(hits.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn retry_after_hint_floors_the_backoff() {
    let server = MockServer::start().await;
    let hits = Arc::new(AtomicUsize::new(0));
    let hits_clone = hits.clone();
    let payload = leaders_payload();

    Mock::given(method("GET"))
        .and(path("/leagueleaders"))
        .respond_with(move |_req: &wiremock::Request| {
            let n = hits_clone.fetch_add(1, Ordering::SeqCst);
            if n == 0 {
                ResponseTemplate::new(429)
                    .insert_header("retry-after", "1")
                    .set_body_string("Rate limited")
            } else {
                ResponseTemplate::new(200).set_body_json(&payload)
            }
        })
        .mount(&server)
        .await;

    // Backoff alone would wait at most 10ms; the server hint must win.
    let client = client_for(&server);
    let endpoint: Descriptor<Vec<Record>> =
        Descriptor::new("leagueleaders").table(BlockKey::Index(0));

    let start = std::time::Instant::now();
    let response = client.get(&endpoint).await.unwrap();

    assert_eq!(response.attempts, 2);
    assert!(start.elapsed() >= Duration::from_millis(900));
}

#[tokio::test]
async fn oversized_hint_is_capped_by_max_hint_wait() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/leagueleaders"))
        .respond_with(
            ResponseTemplate::new(429)
                .insert_header("retry-after", "600")
                .set_body_string("Rate limited"),
        )
        .mount(&server)
        .await;

    let client = Client::builder()
        .base_url(server.uri())
        .max_retries(1)
        .base_delay(Duration::from_millis(10))
        .max_hint_wait(Duration::from_secs(1))
        .build()
        .unwrap();
    let endpoint: Descriptor<serde_json::Value> = Descriptor::new("leagueleaders");

    let start = std::time::Instant::now();
    let result = client.get(&endpoint).await;

    assert!(matches!(result, Err(Error::RateLimited { .. })));
    let elapsed = start.elapsed();
    // One retry, waiting the capped hint (~1s) rather than 10 minutes.
    assert!(elapsed >= Duration::from_secs(1));
    assert!(elapsed < Duration::from_secs(5));
}

#[tokio::test]
async fn cancellation_interrupts_backoff() {
    let server = MockServer::start().await;

    // A 30s Retry-After makes the pending backoff wait deterministic.
    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(
            ResponseTemplate::new(429)
                .insert_header("retry-after", "30")
                .set_body_string("Rate limited"),
        )
        .mount(&server)
        .await;

    let cancel = CancellationToken::new();
    let client = Client::builder()
        .base_url(server.uri())
        .base_delay(Duration::from_millis(10))
        .cancellation_token(cancel.clone())
        .build()
        .unwrap();
    let endpoint: Descriptor<serde_json::Value> = Descriptor::new("flaky");

    let start = std::time::Instant::now();
    let request = tokio::spawn(async move { client.get(&endpoint).await });

    tokio::time::sleep(Duration::from_millis(100)).await;
    cancel.cancel();

    let result = request.await.unwrap();
    assert!(matches!(result, Err(Error::Cancelled)));
    // The 30s backoff sleep must have been abandoned.
    assert!(start.elapsed() < Duration::from_secs(5));
}
