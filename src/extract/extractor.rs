//! Selector-driven record extraction
//!
//! This module applies a [`SelectorSet`] to an HTML document:
//! - Containers are located with the container selector
//! - Every other field is searched within each container
//! - The `title` field gets composite extraction (text, `title` attribute,
//!   anchor `href` label)
//! - Failures are isolated per field and per container

use crate::config::{SelectorSet, TITLE_FIELD};
use crate::extract::label::{label_from_href, visible_text};
use crate::extract::record::Record;
use scraper::{ElementRef, Html, Selector};

/// Joins the pieces of a multi-element field
pub const FIELD_SEPARATOR: &str = " | ";

/// Why a field ended up empty
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmptyReason {
    /// The selector matched nothing inside the container
    NoMatch,
    /// The selector expression could not be parsed
    InvalidSelector(String),
}

/// Result of extracting one field from one container
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldOutcome {
    /// At least one element matched; the value may still be empty
    Value(String),
    /// Nothing usable was found
    Empty(EmptyReason),
}

impl FieldOutcome {
    /// The value to store in the record; empty outcomes become `""`
    pub fn into_value(self) -> String {
        match self {
            FieldOutcome::Value(value) => value,
            FieldOutcome::Empty(_) => String::new(),
        }
    }
}

/// A field selector compiled once per extraction pass
struct FieldPlan<'s> {
    name: &'s str,
    raw: &'s str,
    selector: Result<Selector, String>,
}

impl<'s> FieldPlan<'s> {
    fn compile(name: &'s str, raw: &'s str) -> Self {
        Self {
            name,
            raw,
            selector: Selector::parse(raw).map_err(|e| e.to_string()),
        }
    }
}

/// Extracts records from markup using named selectors
#[derive(Debug, Clone, Copy, Default)]
pub struct Extractor;

impl Extractor {
    pub fn new() -> Self {
        Self
    }

    /// Extracts one record per container
    ///
    /// # Algorithm
    ///
    /// 1. Absent or blank markup yields no records
    /// 2. Containers are selected with [`SelectorSet::container`]; when none
    ///    match (or the container selector is invalid) the whole document is
    ///    used as a single container
    /// 3. Each field is extracted within the container; a field that matches
    ///    nothing is stored as an empty string
    /// 4. A record whose fields are all empty is dropped
    ///
    /// Records are returned in container order.
    ///
    /// # Example
    ///
    /// ```
    /// use pagesift::config::SelectorSet;
    /// use pagesift::extract::Extractor;
    ///
    /// let html = r#"<div class="item"><span class="title">Lamp</span><span class="price">$20</span></div>"#;
    /// let records = Extractor::new().extract(Some(html), &SelectorSet::default());
    /// assert_eq!(records.len(), 1);
    /// assert_eq!(records[0].get("price"), Some("$20"));
    /// ```
    pub fn extract(&self, markup: Option<&str>, selectors: &SelectorSet) -> Vec<Record> {
        let markup = match markup {
            Some(markup) if !markup.trim().is_empty() => markup,
            _ => {
                tracing::error!("No HTML content to parse");
                return Vec::new();
            }
        };

        let document = Html::parse_document(markup);
        let containers = select_containers(&document, selectors.container());

        let plans: Vec<FieldPlan<'_>> = selectors
            .fields()
            .map(|(name, raw)| FieldPlan::compile(name, raw))
            .collect();

        let mut records = Vec::new();

        for (position, container) in containers.iter().enumerate() {
            let index = position + 1;

            let fields = plans
                .iter()
                .map(|plan| {
                    let outcome = extract_field(container, plan);
                    log_outcome(index, plan, &outcome);
                    (plan.name.to_string(), outcome.into_value())
                })
                .collect();

            let record = Record::from_fields(fields);
            if record.has_content() {
                tracing::info!("Added item {}: {}", records.len() + 1, record);
                records.push(record);
            } else {
                tracing::warn!("Container {}: No data extracted, skipping", index);
            }
        }

        records
    }
}

/// Selects container elements, falling back to the document root
fn select_containers<'a>(document: &'a Html, raw: &str) -> Vec<ElementRef<'a>> {
    let containers: Vec<ElementRef<'a>> = match Selector::parse(raw) {
        Ok(selector) => {
            let found: Vec<_> = document.select(&selector).collect();
            tracing::info!(
                "Found {} containers using selector: {}",
                found.len(),
                raw
            );
            found
        }
        Err(e) => {
            tracing::error!("Invalid container selector '{}': {}", raw, e);
            Vec::new()
        }
    };

    if containers.is_empty() {
        tracing::warn!("No containers found, treating the whole page as one container");
        vec![document.root_element()]
    } else {
        containers
    }
}

/// Extracts one field from one container
fn extract_field(container: &ElementRef<'_>, plan: &FieldPlan<'_>) -> FieldOutcome {
    let selector = match &plan.selector {
        Ok(selector) => selector,
        Err(message) => return FieldOutcome::Empty(EmptyReason::InvalidSelector(message.clone())),
    };

    let elements: Vec<ElementRef<'_>> = container.select(selector).collect();
    if elements.is_empty() {
        return FieldOutcome::Empty(EmptyReason::NoMatch);
    }

    let value = if plan.name == TITLE_FIELD {
        composite_title(&elements)
    } else {
        elements
            .iter()
            .map(visible_text)
            .collect::<Vec<_>>()
            .join(FIELD_SEPARATOR)
    };

    FieldOutcome::Value(value)
}

/// Builds a title from every matched element
///
/// Per element, in order: visible text, the `title` attribute, and for
/// anchors a label derived from the `href`. Empty pieces are skipped.
fn composite_title(elements: &[ElementRef<'_>]) -> String {
    let mut pieces = Vec::new();

    for element in elements {
        pieces.push(visible_text(element));

        if let Some(title) = element.value().attr("title") {
            pieces.push(title.trim().to_string());
        }

        if element.value().name() == "a" {
            if let Some(href) = element.value().attr("href") {
                pieces.push(label_from_href(href));
            }
        }
    }

    pieces.retain(|piece| !piece.is_empty());
    pieces.join(FIELD_SEPARATOR)
}

fn log_outcome(index: usize, plan: &FieldPlan<'_>, outcome: &FieldOutcome) {
    match outcome {
        FieldOutcome::Value(value) => {
            tracing::debug!(
                "Container {}: Found content for {}: {}",
                index,
                plan.name,
                value
            );
        }
        FieldOutcome::Empty(EmptyReason::NoMatch) => {
            tracing::warn!(
                "Container {}: No elements found for selector '{}' (field: {})",
                index,
                plan.raw,
                plan.name
            );
        }
        FieldOutcome::Empty(EmptyReason::InvalidSelector(message)) => {
            tracing::error!(
                "Container {}: Error extracting {} using selector {}: {}",
                index,
                plan.name,
                plan.raw,
                message
            );
        }
    }
}
