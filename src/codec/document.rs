//! JSON document helpers.
//!
//! The document format is a loosely-versioned persisted blob: any key may be
//! absent (older writers did not know newer fields), so record decoders read
//! each field with an `opt_*` helper and substitute the empty record's value
//! when the key is missing or holds the wrong type.

use serde_json::{Map, Value};
use url::Url;

/// A record document: one JSON object, one key per field.
pub type Document = Map<String, Value>;

/// Integer field, absent when missing or non-numeric.
pub fn opt_i64(doc: &Document, key: &str) -> Option<i64> {
    doc.get(key).and_then(Value::as_i64)
}

/// Boolean field, absent when missing or non-boolean.
pub fn opt_bool(doc: &Document, key: &str) -> Option<bool> {
    doc.get(key).and_then(Value::as_bool)
}

/// String field, absent when missing, `null`, or non-string.
pub fn opt_str<'a>(doc: &'a Document, key: &str) -> Option<&'a str> {
    doc.get(key).and_then(Value::as_str)
}

/// URI field. Missing keys, empty strings and unparseable values all read
/// as absent; a bad URI never fails the decode of the whole document.
pub fn opt_uri(doc: &Document, key: &str) -> Option<Url> {
    let s = opt_str(doc, key)?;
    if s.is_empty() {
        return None;
    }
    match Url::parse(s) {
        Ok(uri) => Some(uri),
        Err(e) => {
            tracing::debug!(key, uri = %s, error = %e, "Dropping unparseable URI key");
            None
        }
    }
}

/// Write a URI key, omitting it entirely when absent. Encoded documents
/// never carry an explicit `null` for a defaulted field.
pub fn put_uri(doc: &mut Document, key: &str, value: Option<&Url>) {
    if let Some(uri) = value {
        doc.insert(key.to_string(), Value::String(uri.as_str().to_string()));
    }
}

/// Write an optional string key, omitting it when absent.
pub fn put_opt_str(doc: &mut Document, key: &str, value: Option<&str>) {
    if let Some(s) = value {
        doc.insert(key.to_string(), Value::String(s.to_string()));
    }
}
