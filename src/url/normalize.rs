use crate::{UrlError, UrlResult};
use url::Url;

/// Scheme assumed when the user omits one
pub const DEFAULT_SCHEME: &str = "https";

/// Normalizes a user-supplied target URL
///
/// # Normalization Steps
///
/// 1. Trim surrounding whitespace
/// 2. Prefix `https://` when no scheme is present
/// 3. Parse the URL; reject if malformed
/// 4. Accept only HTTP and HTTPS schemes
/// 5. Require a host
/// 6. Remove fragment (never sent to the server)
///
/// Paths and query strings are left untouched: the page the user pointed at
/// is exactly the page that gets fetched.
///
/// # Examples
///
/// ```
/// use pagesift::url::normalize_target_url;
///
/// let url = normalize_target_url("example.com/shop?page=2").unwrap();
/// assert_eq!(url.as_str(), "https://example.com/shop?page=2");
/// ```
pub fn normalize_target_url(input: &str) -> UrlResult<Url> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(UrlError::Parse("URL is empty".to_string()));
    }

    let candidate = if has_scheme(trimmed) {
        trimmed.to_string()
    } else {
        format!("{}://{}", DEFAULT_SCHEME, trimmed.trim_start_matches('/'))
    };

    let mut url = Url::parse(&candidate).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    match url.host_str() {
        Some(host) if !host.is_empty() => {}
        _ => return Err(UrlError::MissingDomain),
    }

    url.set_fragment(None);

    Ok(url)
}

/// Checks whether the input already carries a `scheme://` prefix
fn has_scheme(input: &str) -> bool {
    match input.find("://") {
        Some(idx) if idx > 0 => {
            let scheme = &input[..idx];
            scheme
                .chars()
                .next()
                .is_some_and(|c| c.is_ascii_alphabetic())
                && scheme
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '+' || c == '-' || c == '.')
        }
        _ => false,
    }
}
