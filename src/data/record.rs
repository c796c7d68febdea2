//! Accessors over raw CMS records.
//!
//! Two record shapes show up upstream:
//!
//! - v2: `{ "id", "isDraft", "isArchived", "fieldData": { ... } }`
//! - v1: `{ "_id", "_draft", "_archived", <fields inline> }`
//!
//! These helpers hide the difference from the field mapping code.

use serde_json::{Map, Value};

/// Field map of a record: `fieldData` when present, else the record itself.
pub fn record_fields(raw: &Value) -> Option<&Map<String, Value>> {
    let obj = raw.as_object()?;
    match obj.get("fieldData") {
        Some(Value::Object(fields)) => Some(fields),
        _ => Some(obj),
    }
}

pub fn record_id(raw: &Value) -> Option<String> {
    let obj = raw.as_object()?;
    obj.get("id")
        .or_else(|| obj.get("_id"))
        .and_then(Value::as_str)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
}

/// A single-item read may come back bare or wrapped in `{ "items": [..] }`.
pub fn single_record(raw: &Value) -> &Value {
    match raw.get("items").and_then(Value::as_array) {
        Some(items) if !items.is_empty() => &items[0],
        _ => raw,
    }
}

/// Draft or archived at the record level.
pub fn is_hidden(raw: &Value) -> bool {
    let Some(obj) = raw.as_object() else {
        return false;
    };
    ["isDraft", "_draft", "isArchived", "_archived"]
        .iter()
        .any(|key| obj.get(*key).and_then(as_flag) == Some(true))
}

pub fn text_field(fields: &Map<String, Value>, key: &str) -> Option<String> {
    match fields.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Image fields hold either a URL string or an object with a `url` member.
pub fn image_field(fields: &Map<String, Value>, key: &str) -> Option<String> {
    let url = match fields.get(key)? {
        Value::String(s) => s.as_str(),
        Value::Object(obj) => obj.get("url")?.as_str()?,
        _ => return None,
    };
    let url = url.trim();
    (!url.is_empty()).then(|| url.to_string())
}

/// Ids of a multi-reference field, first occurrence wins.
pub fn id_list(fields: &Map<String, Value>, key: &str) -> Vec<String> {
    let raw: Vec<&str> = match fields.get(key) {
        Some(Value::Array(values)) => values
            .iter()
            .filter_map(|v| match v {
                Value::String(s) => Some(s.as_str()),
                Value::Object(obj) => obj.get("id").or_else(|| obj.get("_id"))?.as_str(),
                _ => None,
            })
            .collect(),
        Some(Value::String(s)) => vec![s.as_str()],
        _ => Vec::new(),
    };

    let mut out: Vec<String> = Vec::with_capacity(raw.len());
    for id in raw {
        if !id.is_empty() && !out.iter().any(|seen| seen == id) {
            out.push(id.to_string());
        }
    }
    out
}

pub fn flag_field(fields: &Map<String, Value>, key: &str) -> Option<bool> {
    fields.get(key).and_then(as_flag)
}

fn as_flag(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" => Some(true),
            "false" | "0" | "no" | "" => Some(false),
            _ => None,
        },
        Value::Null => Some(false),
        _ => None,
    }
}
