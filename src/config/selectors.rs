//! Named selector sets
//!
//! A selector set maps field names to CSS selector expressions. One reserved
//! key, [`CONTAINER_KEY`], names the scope within which all other fields are
//! searched. Entry order is significant: it becomes the CSV column order.

use serde::de::{Deserialize, Deserializer, MapAccess, Visitor};
use std::fmt;

/// Reserved key naming the container selector
pub const CONTAINER_KEY: &str = "container";

/// Container selector used when none is configured
pub const DEFAULT_CONTAINER: &str = ".item";

/// Field that receives composite title extraction
pub const TITLE_FIELD: &str = "title";

/// Ordered mapping from field name to selector expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorSet {
    entries: Vec<(String, String)>,
}

impl SelectorSet {
    /// Creates an empty selector set
    ///
    /// With no entries, extraction falls back to [`DEFAULT_CONTAINER`] and
    /// produces no fields.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Adds or replaces a selector, keeping the original position on replace
    pub fn insert(&mut self, name: impl Into<String>, selector: impl Into<String>) {
        let name = name.into();
        let selector = selector.into();

        match self.entries.iter_mut().find(|(existing, _)| *existing == name) {
            Some(entry) => entry.1 = selector,
            None => self.entries.push((name, selector)),
        }
    }

    /// Builder-style variant of [`SelectorSet::insert`]
    pub fn with(mut self, name: impl Into<String>, selector: impl Into<String>) -> Self {
        self.insert(name, selector);
        self
    }

    /// Looks up the raw selector for a key
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, selector)| selector.as_str())
    }

    /// The container selector, falling back to [`DEFAULT_CONTAINER`]
    /// when unset or blank
    pub fn container(&self) -> &str {
        match self.get(CONTAINER_KEY).map(str::trim) {
            Some(selector) if !selector.is_empty() => selector,
            _ => DEFAULT_CONTAINER,
        }
    }

    /// Field selectors in insertion order, excluding the container key
    /// and any field whose selector is blank
    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .filter(|(name, selector)| name != CONTAINER_KEY && !selector.trim().is_empty())
            .map(|(name, selector)| (name.as_str(), selector.as_str()))
    }

    /// All entries, including the container key, in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(name, selector)| (name.as_str(), selector.as_str()))
    }

    /// Number of entries, including the container key
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether the set has no entries at all
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for SelectorSet {
    /// The stock selector set: `.item` containers with `.title` and `.price` fields
    fn default() -> Self {
        SelectorSet::new()
            .with(CONTAINER_KEY, DEFAULT_CONTAINER)
            .with(TITLE_FIELD, ".title")
            .with("price", ".price")
    }
}

impl fmt::Display for SelectorSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (index, (name, selector)) in self.entries.iter().enumerate() {
            if index > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: '{}'", name, selector)?;
        }
        write!(f, "}}")
    }
}

impl<'a> FromIterator<(&'a str, &'a str)> for SelectorSet {
    fn from_iter<I: IntoIterator<Item = (&'a str, &'a str)>>(iter: I) -> Self {
        let mut set = SelectorSet::new();
        for (name, selector) in iter {
            set.insert(name, selector);
        }
        set
    }
}

// Deserialized by hand so that table order survives into column order.
impl<'de> Deserialize<'de> for SelectorSet {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct SelectorSetVisitor;

        impl<'de> Visitor<'de> for SelectorSetVisitor {
            type Value = SelectorSet;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a table of field names to CSS selectors")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut set = SelectorSet::new();
                while let Some((name, selector)) = map.next_entry::<String, String>()? {
                    set.insert(name, selector);
                }
                Ok(set)
            }
        }

        deserializer.deserialize_map(SelectorSetVisitor)
    }
}
