use pagesift::config::FetcherConfig;
use pagesift::fetch::Fetcher;
use pagesift::job::JobRunner;
use pagesift::output::CsvWriter;
use std::path::Path;
use std::sync::Arc;

pub const LISTING: &str = r#"
<html><body>
    <div class="item"><a class="title" href="/p/desk-lamp">Desk Lamp</a><span class="price">$20</span></div>
    <div class="item"><a class="title" href="/p/office-chair">Office Chair</a><span class="price">$150</span></div>
    <div class="item"><span class="note">sold out</span></div>
    <div class="item"><a class="title" href="/p/bookshelf"></a><span class="price">$90</span></div>
</body></html>
"#;

/// Fetcher with short delays for tests
pub fn test_fetcher(max_attempts: u32, retry_delay_ms: u64, calls_per_second: f64) -> Fetcher {
    let config = FetcherConfig {
        max_attempts,
        retry_delay_ms,
        calls_per_second,
        timeout_secs: 5,
        ..FetcherConfig::default()
    };
    Fetcher::from_config(&config).expect("Failed to build fetcher")
}

pub fn test_runner(output_dir: &Path) -> JobRunner {
    JobRunner::new(
        test_fetcher(2, 20, 1000.0),
        Arc::new(CsvWriter::new()),
        output_dir,
    )
}

/// Rows of a CSV file, header included
pub fn read_rows(path: &Path) -> Vec<Vec<String>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_path(path)
        .expect("Failed to open CSV");
    reader
        .records()
        .map(|row| {
            row.expect("Bad CSV row")
                .iter()
                .map(str::to_string)
                .collect()
        })
        .collect()
}

/// Names of the files in a directory, sorted
pub fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .expect("Failed to read dir")
        .map(|entry| {
            entry
                .expect("Bad dir entry")
                .file_name()
                .to_string_lossy()
                .into_owned()
        })
        .collect();
    names.sort();
    names
}
