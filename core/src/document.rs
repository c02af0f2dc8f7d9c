use crate::DocId;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::borrow::Cow;
use std::collections::BTreeMap;

/// A document: an id plus named fields. Fields hold raw (unnormalized) values
/// so results can be presented as they were loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub document_id: DocId,
    pub fields: BTreeMap<String, Value>,
}

impl Document {
    pub fn new<K, V>(document_id: DocId, fields: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        let fields = fields.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
        Self { document_id, fields }
    }

    /// Text of the named field, or `default` if it is missing or null.
    /// Non-string values are rendered as JSON.
    pub fn get_field<'a>(&'a self, name: &str, default: &'a str) -> Cow<'a, str> {
        match self.fields.get(name) {
            Some(Value::String(s)) => Cow::Borrowed(s.as_str()),
            None | Some(Value::Null) => Cow::Borrowed(default),
            Some(other) => Cow::Owned(other.to_string()),
        }
    }

    /// Numeric value of the named field; numeric strings are parsed.
    pub fn get_number(&self, name: &str) -> Option<f64> {
        match self.fields.get(name)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn set_field(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(name.into(), value.into());
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.fields.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn reads_text_and_numbers() {
        let doc = Document::new(3, [("title", json!("the foo")), ("static_quality_score", json!(0.9)), ("rank", json!("7"))]);
        assert_eq!(doc.get_field("title", ""), "the foo");
        assert_eq!(doc.get_field("missing", "n/a"), "n/a");
        assert_eq!(doc.get_field("static_quality_score", ""), "0.9");
        assert_eq!(doc.get_number("static_quality_score"), Some(0.9));
        assert_eq!(doc.get_number("rank"), Some(7.0));
        assert_eq!(doc.get_number("title"), None);
        assert_eq!(doc.field_names().collect::<Vec<_>>(), vec!["rank", "static_quality_score", "title"]);
    }
}
