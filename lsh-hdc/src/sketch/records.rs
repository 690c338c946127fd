use serde_json::Value;

use crate::clustering::Label;
use crate::error::{Error, Result};
use crate::text::tokenize_text;

/// Reads the fields the sketch source needs out of a record.
pub trait RecordAccessor: Send + Sync {
    type Record: Sync;
    type Label: Label;

    /// Text that gets shingled and signed.
    fn body<'a>(&self, record: &'a Self::Record) -> Result<&'a str>;

    fn label(&self, record: &Self::Record) -> Result<Self::Label>;

    /// Grouping prefix, such as the author. Optional.
    fn prefix(&self, record: &Self::Record) -> Option<String>;
}

/// Accessor for JSON records, with fields addressed by dotted paths.
///
/// ```
/// use lsh_hdc::sketch::{JsonRecordAccessor, RecordAccessor};
/// use serde_json::json;
///
/// let accessor = JsonRecordAccessor::default();
/// let record = json!({"object": {"post_id": 17, "user_id": "u1", "content": "hi"}});
/// assert_eq!(accessor.label(&record).unwrap(), "17");
/// assert_eq!(accessor.body(&record).unwrap(), "hi");
/// assert_eq!(accessor.prefix(&record), Some("u1".to_string()));
/// ```
#[derive(Clone, Debug)]
pub struct JsonRecordAccessor {
    body: String,
    label: String,
    prefix: String,
}

impl Default for JsonRecordAccessor {
    fn default() -> Self {
        JsonRecordAccessor::new("object.content", "object.post_id", "object.user_id")
    }
}

impl JsonRecordAccessor {
    pub fn new(body: &str, label: &str, prefix: &str) -> Self {
        JsonRecordAccessor {
            body: to_pointer(body),
            label: to_pointer(label),
            prefix: to_pointer(prefix),
        }
    }
}

fn to_pointer(path: &str) -> String {
    path.split('.')
        .map(|key| format!("/{}", key.replace('~', "~0").replace('/', "~1")))
        .collect()
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

impl RecordAccessor for JsonRecordAccessor {
    type Record = Value;
    type Label = String;

    fn body<'a>(&self, record: &'a Value) -> Result<&'a str> {
        record
            .pointer(&self.body)
            .and_then(Value::as_str)
            .ok_or_else(|| Error::MalformedRecord(format!("no text at {}", self.body)))
    }

    fn label(&self, record: &Value) -> Result<String> {
        record
            .pointer(&self.label)
            .and_then(scalar_to_string)
            .ok_or_else(|| Error::MalformedRecord(format!("no label at {}", self.label)))
    }

    fn prefix(&self, record: &Value) -> Option<String> {
        record.pointer(&self.prefix).and_then(scalar_to_string)
    }
}

/// Decides whether a record's body is worth signing.
pub trait ContentFilter: Send + Sync {
    fn accept(&self, body: &str) -> bool;
}

impl<F> ContentFilter for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn accept(&self, body: &str) -> bool {
        self(body)
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct AcceptAll;

impl ContentFilter for AcceptAll {
    fn accept(&self, _body: &str) -> bool {
        true
    }
}

/// Accepts bodies with at least this many word tokens.
#[derive(Clone, Copy, Debug)]
pub struct MinTokens(pub usize);

impl ContentFilter for MinTokens {
    fn accept(&self, body: &str) -> bool {
        self.0 == 0 || tokenize_text(body).nth(self.0 - 1).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_custom_paths() {
        let accessor = JsonRecordAccessor::new("text", "meta.id", "meta.author");
        let record = json!({"text": "body", "meta": {"id": "a/1", "author": 3}});
        assert_eq!(accessor.body(&record).unwrap(), "body");
        assert_eq!(accessor.label(&record).unwrap(), "a/1");
        assert_eq!(accessor.prefix(&record), Some("3".to_string()));
    }

    #[test]
    fn test_missing_fields() {
        let accessor = JsonRecordAccessor::default();
        let record = json!({"object": {"post_id": 1, "content": ["not", "text"]}});
        assert!(matches!(accessor.body(&record), Err(Error::MalformedRecord(_))));
        assert!(matches!(accessor.label(&json!({})), Err(Error::MalformedRecord(_))));
        assert_eq!(accessor.prefix(&record), None);
    }

    #[test]
    fn test_filters() {
        assert!(AcceptAll.accept(""));
        assert!(MinTokens(0).accept(""));
        assert!(MinTokens(2).accept("two words"));
        assert!(!MinTokens(3).accept("two words"));
        let no_links = |body: &str| !body.contains("http");
        assert!(!no_links.accept("see http://example.com"));
    }
}
