//! End-to-end tests of the public client API against mock endpoints

use std::time::{Duration, Instant};

use chrono::NaiveDate;
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use umapi::config::{ClientConfig, Credentials};
use umapi::{ApiClient, ErrorKind, RequestOptions, ResponseSource};

fn client_for(server: &MockServer, credentials: Credentials) -> ApiClient {
    let config = ClientConfig {
        scheme: "http".to_string(),
        default_host: server.address().to_string(),
        token_url: format!("{}/token", server.uri()),
        ..Default::default()
    };
    ApiClient::new(config, credentials).expect("client should build")
}

async fn mount_token(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"access_token": "T1", "expires_in": 3600})),
        )
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_meetings_scenario_is_served_from_cache_on_repeat() {
    let server = MockServer::start().await;
    mount_token(&server).await;
    Mock::given(method("GET"))
        .and(path("/Curriculum/Classrooms/v1/Classrooms/AH1001/Meetings"))
        .and(query_param("startDate", "01-05-2026"))
        .and(query_param("endDate", "01-09-2026"))
        .and(header("Authorization", "Bearer T1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"rooms": ["AH1001"]})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, Credentials::default());
    client.configure("consumerKey", "key").unwrap();
    client.configure("consumerSecret", "secret").unwrap();

    let start = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
    let end = NaiveDate::from_ymd_opt(2026, 1, 9).unwrap();

    let first = client.get_meetings("AH1001", start, end).await.unwrap();
    assert_eq!(first.source, ResponseSource::Network);
    assert_eq!(first.data, json!({"rooms": ["AH1001"]}));

    let second = client.get_meetings("AH1001", start, end).await.unwrap();
    assert_eq!(second.source, ResponseSource::Cache);
    assert_eq!(second.data, first.data);

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);
}

#[tokio::test]
async fn test_outage_without_cache_returns_originating_error() {
    let server = MockServer::start().await;
    mount_token(&server).await;
    Mock::given(method("GET"))
        .and(path("/rooms"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let client = client_for(&server, Credentials::new("key", "secret"));
    let err = client.call(RequestOptions::new("/rooms")).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::NonSuccessStatus);
    assert!(client.cache().is_empty());
}

#[tokio::test]
async fn test_clearing_cache_forces_refetch() {
    let server = MockServer::start().await;
    mount_token(&server).await;
    Mock::given(method("GET"))
        .and(path("/rooms"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([1, 2, 3])))
        .expect(2)
        .mount(&server)
        .await;

    let client = client_for(&server, Credentials::new("key", "secret"));
    client.call(RequestOptions::new("/rooms")).await.unwrap();
    client.cache().clear();

    let response = client.call(RequestOptions::new("/rooms")).await.unwrap();
    assert_eq!(response.source, ResponseSource::Network);
}

#[tokio::test]
async fn test_concurrent_calls_share_one_token_exchange() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"access_token": "T1", "expires_in": 3600}))
                .set_delay(Duration::from_millis(50)),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .mount(&server)
        .await;

    let client = client_for(&server, Credentials::new("key", "secret"));
    let calls = ["/a", "/b", "/c", "/d"].map(|p| client.call(RequestOptions::new(p)));
    let results = futures::future::join_all(calls).await;

    assert!(results.iter().all(|r| r.is_ok()));
    assert_eq!(client.cache().len(), 4);
}

#[tokio::test]
async fn test_concurrent_calls_share_one_failed_token_exchange() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
        .expect(1)
        .mount(&server)
        .await;

    let config = ClientConfig {
        scheme: "http".to_string(),
        default_host: server.address().to_string(),
        token_url: format!("{}/token", server.uri()),
        timeout: Duration::from_millis(300),
        ..Default::default()
    };
    let client = ApiClient::new(config, Credentials::new("key", "secret")).unwrap();

    let started = Instant::now();
    let calls = (0..5).map(|_| client.call(RequestOptions::new("/rooms")));
    let results = futures::future::join_all(calls).await;
    let elapsed = started.elapsed();

    assert!(results
        .iter()
        .all(|r| matches!(r, Err(e) if e.kind() == ErrorKind::Network)));
    assert!(
        elapsed < Duration::from_millis(1200),
        "waiters should not retry one after another: {:?}",
        elapsed
    );
}

#[tokio::test]
async fn test_missing_options_path_fails_before_network() {
    let server = MockServer::start().await;
    let client = client_for(&server, Credentials::new("key", "secret"));

    let err = client.call(RequestOptions::default()).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    assert!(server.received_requests().await.unwrap().is_empty());
}
