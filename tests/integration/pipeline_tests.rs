use crate::common::{file_names, read_rows, test_fetcher, test_runner, LISTING};
use pagesift::config::{SelectorSet, CONTAINER_KEY};
use pagesift::extract::Record;
use pagesift::job::{JobRunner, RunOutcome};
use pagesift::output::{OutputError, OutputResult, RecordWriter};
use std::path::Path;
use std::sync::Arc;
use tempfile::{NamedTempFile, TempDir};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn serve(mock_server: &MockServer, route: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/html"),
        )
        .mount(mock_server)
        .await;
}

#[tokio::test]
async fn test_run_once_writes_one_row_per_kept_container() {
    let mock_server = MockServer::start().await;
    serve(&mock_server, "/shop", LISTING).await;

    let dir = TempDir::new().unwrap();
    let runner = test_runner(dir.path());

    let outcome = runner
        .run_once(&format!("{}/shop", mock_server.uri()), &SelectorSet::default())
        .await;

    let (path, records) = match outcome {
        RunOutcome::Written { path, records } => (path, records),
        other => panic!("unexpected outcome: {:?}", other),
    };
    assert_eq!(records, 3);

    let name = path.file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.starts_with("output_") && name.ends_with(".csv"), "{}", name);

    let rows = read_rows(&path);
    assert_eq!(rows.len(), 4);
    assert_eq!(rows[0], vec!["title", "price"]);
    assert_eq!(rows[1], vec!["Desk Lamp | Desk Lamp", "$20"]);
    assert_eq!(rows[3], vec!["Bookshelf", "$90"]);
}

#[tokio::test]
async fn test_custom_selectors_drive_columns() {
    let mock_server = MockServer::start().await;
    serve(
        &mock_server,
        "/",
        r#"<table>
            <tr class="row"><td class="name">Kettle</td><td class="stock">4</td></tr>
            <tr class="row"><td class="name">Toaster</td><td class="stock"></td></tr>
        </table>"#,
    )
    .await;

    let dir = TempDir::new().unwrap();
    let runner = test_runner(dir.path());
    let selectors = SelectorSet::new()
        .with(CONTAINER_KEY, "tr.row")
        .with("name", ".name")
        .with("stock", ".stock");

    let outcome = runner.run_once(&mock_server.uri(), &selectors).await;
    let RunOutcome::Written { path, .. } = outcome else {
        panic!("expected output");
    };

    let rows = read_rows(&path);
    assert_eq!(rows[0], vec!["name", "stock"]);
    assert_eq!(rows[2], vec!["Toaster", ""]);
}

#[tokio::test]
async fn test_fetch_failure_writes_nothing() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let runner = test_runner(dir.path());

    let outcome = runner
        .run_once(&mock_server.uri(), &SelectorSet::default())
        .await;

    assert_eq!(outcome, RunOutcome::FetchFailed { attempts: 2 });
    assert!(file_names(dir.path()).is_empty());
}

#[tokio::test]
async fn test_page_without_data_writes_nothing() {
    let mock_server = MockServer::start().await;
    serve(&mock_server, "/", "<html><body><p>Closed for holidays</p></body></html>").await;

    let dir = TempDir::new().unwrap();
    let runner = test_runner(dir.path());

    let outcome = runner
        .run_once(&mock_server.uri(), &SelectorSet::default())
        .await;

    assert_eq!(outcome, RunOutcome::NoRecords);
    assert!(file_names(dir.path()).is_empty());
}

#[tokio::test]
async fn test_whole_page_fallback_produces_single_record() {
    let mock_server = MockServer::start().await;
    serve(
        &mock_server,
        "/",
        r#"<article><h1 class="title">Single Product</h1><p class="price">$12</p></article>"#,
    )
    .await;

    let dir = TempDir::new().unwrap();
    let runner = test_runner(dir.path());

    let outcome = runner
        .run_once(&mock_server.uri(), &SelectorSet::default())
        .await;

    let RunOutcome::Written { path, records } = outcome else {
        panic!("expected output");
    };
    assert_eq!(records, 1);
    assert_eq!(read_rows(&path)[1], vec!["Single Product", "$12"]);
}

#[tokio::test]
async fn test_repeated_runs_never_overwrite() {
    let mock_server = MockServer::start().await;
    serve(&mock_server, "/", LISTING).await;

    let dir = TempDir::new().unwrap();
    let runner = test_runner(dir.path());
    let url = mock_server.uri();
    let selectors = SelectorSet::default();

    let (first, second) = tokio::join!(
        runner.run_once(&url, &selectors),
        runner.run_once(&url, &selectors)
    );

    assert!(first.is_success());
    assert!(second.is_success());
    assert_ne!(first, second);
    assert_eq!(file_names(dir.path()).len(), 2);
}

#[tokio::test]
async fn test_invalid_url_reported() {
    let dir = TempDir::new().unwrap();
    let runner = test_runner(dir.path());

    let outcome = runner
        .run_once("ftp://example.com/", &SelectorSet::default())
        .await;

    assert!(matches!(outcome, RunOutcome::InvalidUrl { .. }));
}

struct FailingWriter;

impl RecordWriter for FailingWriter {
    fn stage(&self, _records: &[Record], _directory: &Path) -> OutputResult<NamedTempFile> {
        Err(OutputError::Io(std::io::Error::new(
            std::io::ErrorKind::Other,
            "disk full",
        )))
    }
}

#[tokio::test]
async fn test_write_failure_leaves_no_output_file() {
    let mock_server = MockServer::start().await;
    serve(&mock_server, "/", LISTING).await;

    let dir = TempDir::new().unwrap();
    let runner = JobRunner::new(
        test_fetcher(1, 10, 1000.0),
        Arc::new(FailingWriter),
        dir.path(),
    );

    let outcome = runner
        .run_once(&mock_server.uri(), &SelectorSet::default())
        .await;

    assert!(matches!(outcome, RunOutcome::WriteFailed { .. }));
    assert!(file_names(dir.path()).is_empty());
}

#[tokio::test]
async fn test_redirected_page_is_extracted() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/old-shop"))
        .respond_with(
            ResponseTemplate::new(301)
                .insert_header("location", format!("{}/shop", mock_server.uri()).as_str()),
        )
        .mount(&mock_server)
        .await;
    serve(&mock_server, "/shop", LISTING).await;

    let dir = TempDir::new().unwrap();
    let runner = test_runner(dir.path());

    let outcome = runner
        .run_once(
            &format!("{}/old-shop", mock_server.uri()),
            &SelectorSet::default(),
        )
        .await;

    assert!(matches!(outcome, RunOutcome::Written { records: 3, .. }));
}

#[tokio::test]
async fn test_missing_output_directory_is_created() {
    let mock_server = MockServer::start().await;
    serve(&mock_server, "/", LISTING).await;

    let dir = TempDir::new().unwrap();
    let nested = dir.path().join("runs").join("daily");
    let runner = test_runner(&nested);

    let outcome = runner
        .run_once(&mock_server.uri(), &SelectorSet::default())
        .await;

    assert!(outcome.is_success());
    let names = file_names(&nested);
    assert_eq!(names.len(), 1);
    assert!(names[0].starts_with("output_"));
}
