//! Structured records merged into templates.
//!
//! A record is a mapping from field name to a scalar or a nested group
//! (`sender`, `recipient`, ...). Records usually arrive as YAML produced by a
//! language model, so the loader tolerates Markdown code fences around the
//! payload.

mod placeholder;

pub use placeholder::PlaceholderMap;

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

/// Field holding the multi-line body text.
pub const BODY_FIELD: &str = "body";

/// Field holding the document type.
pub const DOCUMENT_TYPE_FIELD: &str = "document_type";

/// A field value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Absent value
    Null,
    /// Boolean
    Bool(bool),
    /// Integer number
    Integer(i64),
    /// Floating point number
    Float(f64),
    /// Text
    Text(String),
    /// Sequence of values
    List(Vec<FieldValue>),
    /// Nested group of fields
    Group(BTreeMap<String, FieldValue>),
}

impl FieldValue {
    /// Check for null.
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// Get the nested group, if this value is one.
    pub fn as_group(&self) -> Option<&BTreeMap<String, FieldValue>> {
        match self {
            FieldValue::Group(g) => Some(g),
            _ => None,
        }
    }

    /// Display text of the value. Null renders as an empty string.
    pub fn display_text(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Null => Ok(()),
            FieldValue::Bool(b) => write!(f, "{}", b),
            FieldValue::Integer(i) => write!(f, "{}", i),
            // Whole numbers keep a decimal point so `1.0` stays distinct from `1`.
            FieldValue::Float(x) if x.is_finite() && x.fract() == 0.0 => write!(f, "{:.1}", x),
            FieldValue::Float(x) => write!(f, "{}", x),
            FieldValue::Text(s) => f.write_str(s),
            FieldValue::List(items) => {
                let parts: Vec<String> = items
                    .iter()
                    .map(|v| v.to_string())
                    .filter(|s| !s.is_empty())
                    .collect();
                f.write_str(&parts.join(", "))
            }
            FieldValue::Group(group) => {
                let parts: Vec<String> = group
                    .values()
                    .map(|v| v.to_string())
                    .filter(|s| !s.is_empty())
                    .collect();
                f.write_str(&parts.join(" "))
            }
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

impl From<i64> for FieldValue {
    fn from(i: i64) -> Self {
        FieldValue::Integer(i)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(FieldValue::Null)
    }
}

/// A structured data record for one render request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StructuredRecord {
    fields: BTreeMap<String, FieldValue>,
}

impl StructuredRecord {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a record from YAML.
    ///
    /// Surrounding code fences (```` ```yaml ````) are stripped first. A
    /// document that is empty or not a mapping is rejected.
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let payload = strip_code_fences(text);
        if payload.trim().is_empty() {
            return Err(Error::Record("empty record".to_string()));
        }
        let value: serde_yaml::Value = serde_yaml::from_str(&payload)?;
        if !value.is_mapping() {
            return Err(Error::Record("record must be a mapping".to_string()));
        }
        Ok(serde_yaml::from_value(value)?)
    }

    /// Parse a record from JSON.
    pub fn from_json_str(text: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(text)?;
        if !value.is_object() {
            return Err(Error::Record("record must be an object".to_string()));
        }
        Ok(serde_json::from_value(value)?)
    }

    /// Load a record from a file; `.json` files are parsed as JSON, anything
    /// else as YAML.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .map(|e| e.eq_ignore_ascii_case("json"))
            .unwrap_or(false);
        if is_json {
            Self::from_json_str(&text)
        } else {
            Self::from_yaml_str(&text)
        }
    }

    /// Get a top-level field.
    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.fields.get(key)
    }

    /// Get a field by dotted path, e.g. `sender.name`.
    pub fn get_path(&self, path: &str) -> Option<&FieldValue> {
        let mut parts = path.split('.');
        let mut current = self.fields.get(parts.next()?)?;
        for part in parts {
            current = current.as_group()?.get(part)?;
        }
        Some(current)
    }

    /// Set a top-level field.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<FieldValue>) {
        self.fields.insert(key.into(), value.into());
    }

    /// Set a field inside a group, creating the group when needed.
    ///
    /// A non-group value under `group` is replaced by a new group.
    pub fn insert_in_group(
        &mut self,
        group: &str,
        key: impl Into<String>,
        value: impl Into<FieldValue>,
    ) {
        let entry = self
            .fields
            .entry(group.to_string())
            .or_insert_with(|| FieldValue::Group(BTreeMap::new()));
        if !matches!(entry, FieldValue::Group(_)) {
            *entry = FieldValue::Group(BTreeMap::new());
        }
        if let FieldValue::Group(g) = entry {
            g.insert(key.into(), value.into());
        }
    }

    /// Fill `group.key` with `value` unless the record already holds it.
    ///
    /// Used to merge form-supplied values (sender, recipient) into a record
    /// produced elsewhere. Returns `true` when the value was filled.
    pub fn fill_missing(&mut self, group: &str, key: &str, value: impl Into<FieldValue>) -> bool {
        let present = self
            .get(group)
            .and_then(FieldValue::as_group)
            .map(|g| g.contains_key(key))
            .unwrap_or(false);
        if present {
            return false;
        }
        self.insert_in_group(group, key, value);
        true
    }

    /// Remove a field.
    pub fn remove(&mut self, key: &str) -> Option<FieldValue> {
        self.fields.remove(key)
    }

    /// Body text, when present and not null.
    pub fn body(&self) -> Option<String> {
        self.text_field(BODY_FIELD)
    }

    /// Display text of a scalar top-level field; `None` for absent, null or
    /// group values.
    pub fn text_field(&self, key: &str) -> Option<String> {
        match self.fields.get(key) {
            None | Some(FieldValue::Null) | Some(FieldValue::Group(_)) => None,
            Some(v) => Some(v.to_string()),
        }
    }

    /// Normalize the `document_type` field.
    ///
    /// The stored value becomes upper case (the form used inside
    /// templates); the returned value is the capitalized form used for
    /// metadata. Returns `None` when the field is absent or empty.
    pub fn normalize_document_type(&mut self) -> Option<String> {
        let raw = self.get(DOCUMENT_TYPE_FIELD)?.to_string();
        if raw.is_empty() {
            return None;
        }
        self.insert(DOCUMENT_TYPE_FIELD, raw.to_uppercase());
        Some(capitalize(&raw))
    }

    /// Iterate over top-level fields in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &FieldValue)> {
        self.fields.iter()
    }

    /// Number of top-level fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if the record has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl FromIterator<(String, FieldValue)> for StructuredRecord {
    fn from_iter<I: IntoIterator<Item = (String, FieldValue)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

/// Upper-case the first character and lower-case the rest.
pub fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

fn strip_code_fences(text: &str) -> String {
    text.trim()
        .replace("```yaml", "")
        .replace("```", "")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
document_type: письмо
subject: Поставка оборудования
sender:
  name: Иванов И.И.
  position: Директор
recipient:
  name: Петров П.П.
  position: null
pages: 3
urgent: true
body: |
  Первый абзац.

  Второй абзац.
"#;

    #[test]
    fn test_from_yaml() {
        let record = StructuredRecord::from_yaml_str(SAMPLE).unwrap();
        assert_eq!(
            record.get_path("sender.name").map(|v| v.to_string()).as_deref(),
            Some("Иванов И.И.")
        );
        assert_eq!(record.get_path("recipient.position"), Some(&FieldValue::Null));
        assert_eq!(record.get("pages"), Some(&FieldValue::Integer(3)));
        assert_eq!(record.get("urgent"), Some(&FieldValue::Bool(true)));
        assert_eq!(
            record.body().as_deref(),
            Some("Первый абзац.\n\nВторой абзац.\n")
        );
    }

    #[test]
    fn test_from_yaml_with_fences() {
        let text = "```yaml\nsubject: Hello\n```";
        let record = StructuredRecord::from_yaml_str(text).unwrap();
        assert_eq!(record.get("subject"), Some(&FieldValue::from("Hello")));
    }

    #[test]
    fn test_from_yaml_rejects_scalars() {
        assert!(matches!(
            StructuredRecord::from_yaml_str("just text"),
            Err(Error::Record(_))
        ));
        assert!(StructuredRecord::from_yaml_str("   ").is_err());
    }

    #[test]
    fn test_from_json() {
        let record =
            StructuredRecord::from_json_str(r#"{"sender": {"name": "A", "position": "B"}}"#)
                .unwrap();
        assert_eq!(record.get_path("sender.position"), Some(&FieldValue::from("B")));
        assert!(StructuredRecord::from_json_str("[1, 2]").is_err());
    }

    #[test]
    fn test_display_text() {
        assert_eq!(FieldValue::Null.display_text(), "");
        assert_eq!(FieldValue::Float(2.5).display_text(), "2.5");
        assert_eq!(FieldValue::Float(1.0).display_text(), "1.0");
        assert_eq!(FieldValue::Float(-3.0).display_text(), "-3.0");
        assert_eq!(FieldValue::Integer(1).display_text(), "1");
        let list = FieldValue::List(vec!["a".into(), FieldValue::Null, "b".into()]);
        assert_eq!(list.display_text(), "a, b");
    }

    #[test]
    fn test_fill_missing() {
        let mut record = StructuredRecord::new();
        record.insert_in_group("sender", "name", "From model");

        assert!(!record.fill_missing("sender", "name", "From form"));
        assert!(record.fill_missing("sender", "position", "Director"));
        assert!(record.fill_missing("recipient", "name", "Someone"));

        assert_eq!(record.get_path("sender.name"), Some(&FieldValue::from("From model")));
        assert_eq!(record.get_path("sender.position"), Some(&FieldValue::from("Director")));
        assert_eq!(record.get_path("recipient.name"), Some(&FieldValue::from("Someone")));
    }

    #[test]
    fn test_fill_missing_replaces_null_group() {
        let mut record = StructuredRecord::new();
        record.insert("sender", FieldValue::Null);
        assert!(record.fill_missing("sender", "name", "A"));
        assert_eq!(record.get_path("sender.name"), Some(&FieldValue::from("A")));
    }

    #[test]
    fn test_normalize_document_type() {
        let mut record = StructuredRecord::new();
        record.insert(DOCUMENT_TYPE_FIELD, "служебная записка");
        let display = record.normalize_document_type();
        assert_eq!(display.as_deref(), Some("Служебная записка"));
        assert_eq!(
            record.get(DOCUMENT_TYPE_FIELD),
            Some(&FieldValue::from("СЛУЖЕБНАЯ ЗАПИСКА"))
        );
    }

    #[test]
    fn test_body_absent_or_null() {
        let mut record = StructuredRecord::new();
        assert_eq!(record.body(), None);
        record.insert(BODY_FIELD, FieldValue::Null);
        assert_eq!(record.body(), None);
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("пИСЬМО"), "Письмо");
        assert_eq!(capitalize(""), "");
    }
}
