//! Flattening of records into placeholder lookups.

use super::{FieldValue, StructuredRecord};
use crate::render::tags;
use std::collections::BTreeMap;

/// Resolved placeholder key → display text.
///
/// Keys are canonical: `subject`, `sender.name`. A template may spell the
/// tag as `{{ sender.name }}` or `{{sender.name}}`; both resolve to the same
/// entry because padding inside the braces is trimmed before lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaceholderMap {
    entries: BTreeMap<String, String>,
}

impl PlaceholderMap {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the map from a record.
    ///
    /// Scalars map to their display text (null → empty string). Groups are
    /// flattened with dotted keys; deeper nesting keeps adding segments.
    pub fn from_record(record: &StructuredRecord) -> Self {
        let mut map = Self::new();
        for (key, value) in record.iter() {
            map.flatten(key, value);
        }
        map
    }

    fn flatten(&mut self, key: &str, value: &FieldValue) {
        match value {
            FieldValue::Group(group) => {
                for (sub_key, sub_value) in group {
                    self.flatten(&format!("{}.{}", key, sub_key), sub_value);
                }
            }
            other => {
                self.entries.insert(key.to_string(), other.to_string());
            }
        }
    }

    /// Insert an entry.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    /// Look up a canonical key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Look up a tag in either spelling, e.g. `{{ subject }}` or `{{subject}}`.
    pub fn resolve(&self, tag: &str) -> Option<&str> {
        tags::normalize_tag(tag).and_then(|key| self.get(key))
    }

    /// Check for a canonical key.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// The two accepted surface spellings of a key: padded and unpadded.
    pub fn spellings(key: &str) -> [String; 2] {
        [format!("{{{{ {} }}}}", key), format!("{{{{{}}}}}", key)]
    }

    /// Iterate over every accepted tag spelling with its value.
    pub fn tags(&self) -> impl Iterator<Item = (String, &str)> {
        self.entries.iter().flat_map(|(key, value)| {
            Self::spellings(key)
                .into_iter()
                .map(move |tag| (tag, value.as_str()))
        })
    }

    /// A copy of this map without `key`.
    pub fn without(&self, key: &str) -> Self {
        let mut entries = self.entries.clone();
        entries.remove(key);
        Self { entries }
    }

    /// Iterate over canonical keys and values.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of canonical keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the map is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl From<&StructuredRecord> for PlaceholderMap {
    fn from(record: &StructuredRecord) -> Self {
        Self::from_record(record)
    }
}
