//! Integration tests for Pagesift
//!
//! These tests use wiremock to create mock HTTP servers and exercise the
//! fetch, extract and write pipeline end-to-end.

mod common;
mod fetch_tests;
mod pipeline_tests;
mod scheduler_tests;
