//! Text heuristics used by composite title extraction

use scraper::ElementRef;

/// Visible text of an element: every text node trimmed, blanks dropped,
/// the rest concatenated
pub fn visible_text(element: &ElementRef<'_>) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
        .collect()
}

/// Human-readable label from the last path segment of an `href`
///
/// Trailing slashes are ignored, hyphens become spaces, and the result is
/// title-cased. `"/shop/blue-desk-lamp/"` becomes `"Blue Desk Lamp"`.
pub fn label_from_href(href: &str) -> String {
    let segment = href
        .trim()
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or_default();

    title_case(&segment.replace('-', " "))
}

/// Title-cases text: a letter following a non-letter is upper-cased, any
/// other letter lower-cased, everything else left alone
pub fn title_case(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut previous_is_letter = false;

    for c in text.chars() {
        if c.is_alphabetic() {
            if previous_is_letter {
                result.extend(c.to_lowercase());
            } else {
                result.extend(c.to_uppercase());
            }
            previous_is_letter = true;
        } else {
            result.push(c);
            previous_is_letter = false;
        }
    }

    result
}
