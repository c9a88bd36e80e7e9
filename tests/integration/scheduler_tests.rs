use crate::common::{file_names, test_runner, LISTING};
use pagesift::config::SelectorSet;
use pagesift::job::{Job, Scheduler};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_scheduled_job_runs_repeatedly_until_stopped() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(LISTING))
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let runner = Arc::new(test_runner(dir.path()));
    let mut scheduler = Scheduler::new(runner);
    scheduler.schedule_every(
        Job::new(mock_server.uri(), SelectorSet::default()),
        Duration::from_millis(100),
    );
    let handle = scheduler.shutdown_handle();

    let running = tokio::spawn(scheduler.run());
    tokio::time::sleep(Duration::from_millis(450)).await;
    handle.stop();

    let runs = tokio::time::timeout(Duration::from_secs(5), running)
        .await
        .expect("Scheduler did not stop")
        .expect("Scheduler task panicked");

    assert!(runs >= 2, "only {} runs", runs);
    assert_eq!(file_names(dir.path()).len(), runs);
}

#[tokio::test]
async fn test_shutdown_lets_in_flight_run_finish() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(LISTING)
                .set_delay(Duration::from_millis(300)),
        )
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let runner = Arc::new(test_runner(dir.path()));
    let mut scheduler = Scheduler::new(runner);
    scheduler.schedule_every(
        Job::new(mock_server.uri(), SelectorSet::default()),
        Duration::from_millis(50),
    );
    let handle = scheduler.shutdown_handle();

    let running = tokio::spawn(scheduler.run());

    // First tick at 50ms; its fetch is still waiting on the slow response.
    tokio::time::sleep(Duration::from_millis(150)).await;
    handle.stop();

    let runs = tokio::time::timeout(Duration::from_secs(5), running)
        .await
        .expect("Scheduler did not stop")
        .expect("Scheduler task panicked");

    assert_eq!(runs, 1);
    let names = file_names(dir.path());
    assert_eq!(names.len(), 1);
    assert!(names[0].starts_with("output_"));
}

#[tokio::test]
async fn test_failing_job_does_not_stop_other_jobs() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(LISTING))
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let runner = Arc::new(test_runner(dir.path()));
    let mut scheduler = Scheduler::new(runner);
    scheduler.schedule_every(
        Job::new("http://127.0.0.1:9/", SelectorSet::default()),
        Duration::from_millis(80),
    );
    scheduler.schedule_every(
        Job::new(mock_server.uri(), SelectorSet::default()),
        Duration::from_millis(80),
    );
    let handle = scheduler.shutdown_handle();

    let running = tokio::spawn(scheduler.run());
    tokio::time::sleep(Duration::from_millis(400)).await;
    handle.stop();

    tokio::time::timeout(Duration::from_secs(5), running)
        .await
        .expect("Scheduler did not stop")
        .expect("Scheduler task panicked");

    assert!(file_names(dir.path()).len() >= 2);
}
