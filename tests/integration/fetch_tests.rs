use crate::common::test_fetcher;
use pagesift::config::DEFAULT_USER_AGENT;
use std::time::{Duration, Instant};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn request_count(server: &MockServer) -> usize {
    server
        .received_requests()
        .await
        .expect("Request recording disabled")
        .len()
}

#[tokio::test]
async fn test_always_failing_url_exhausts_attempts_with_backoff() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/down"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let fetcher = test_fetcher(3, 60, 1000.0);
    let start = Instant::now();
    let result = fetcher
        .fetch(&format!("{}/down", mock_server.uri()))
        .await;
    let elapsed = start.elapsed();

    assert!(!result.is_success());
    assert_eq!(result.attempts(), 3);
    assert!(result.into_body().is_none());
    assert_eq!(request_count(&mock_server).await, 3);

    // Backoff of 60ms * 1 and 60ms * 2 between the three attempts
    assert!(
        elapsed >= Duration::from_millis(180),
        "finished after {:?}",
        elapsed
    );
}

#[tokio::test]
async fn test_fail_once_then_succeed() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<p>ok</p>"))
        .mount(&mock_server)
        .await;

    let fetcher = test_fetcher(3, 50, 1000.0);
    let start = Instant::now();
    let result = fetcher
        .fetch(&format!("{}/flaky", mock_server.uri()))
        .await;

    assert!(result.is_success());
    assert_eq!(result.attempts(), 2);
    assert_eq!(result.body(), Some("<p>ok</p>"));
    assert_eq!(request_count(&mock_server).await, 2);
    assert!(start.elapsed() >= Duration::from_millis(50));
}

#[tokio::test]
async fn test_success_on_first_attempt() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("hello"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let fetcher = test_fetcher(3, 50, 1000.0);
    let result = fetcher.fetch(&format!("{}/", mock_server.uri())).await;

    assert_eq!(result.attempts(), 1);
    assert_eq!(result.into_body().as_deref(), Some("hello"));
}

#[tokio::test]
async fn test_client_error_status_is_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let fetcher = test_fetcher(2, 10, 1000.0);
    let result = fetcher
        .fetch(&format!("{}/missing", mock_server.uri()))
        .await;

    assert!(!result.is_success());
    assert_eq!(request_count(&mock_server).await, 2);
}

#[tokio::test]
async fn test_identifying_user_agent_sent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(header("user-agent", DEFAULT_USER_AGENT))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .mount(&mock_server)
        .await;

    let fetcher = test_fetcher(1, 10, 1000.0);
    let result = fetcher.fetch(&mock_server.uri()).await;

    assert!(result.is_success());
}

#[tokio::test]
async fn test_rate_limit_spaces_consecutive_fetches() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .mount(&mock_server)
        .await;

    // 10 calls per second: at least 100ms between requests
    let fetcher = test_fetcher(1, 10, 10.0);
    let url = mock_server.uri();

    let start = Instant::now();
    for _ in 0..3 {
        assert!(fetcher.fetch(&url).await.is_success());
    }

    assert!(start.elapsed() >= Duration::from_millis(200));
}
