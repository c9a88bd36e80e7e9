//! URL handling module for Pagesift
//!
//! Target URLs are accepted loosely from configuration and the command line,
//! so this module turns user input into a fetchable absolute URL.

mod normalize;

pub use normalize::{normalize_target_url, DEFAULT_SCHEME};
