//! Conversion between plain JSON and Firestore's typed REST value encoding.
//!
//! Firestore wraps every value in a single-key object naming its type, e.g.
//! `{"stringValue": "x"}` or `{"mapValue": {"fields": {..}}}`. Integers travel
//! as decimal strings.

use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::database::StoreError;
use crate::models::Fields;

/// A document resource as returned by the Firestore REST API.
#[derive(Debug, Deserialize)]
pub struct FirestoreDocument {
    pub name: String,
    #[serde(default)]
    pub fields: Map<String, Value>,
}

impl FirestoreDocument {
    /// Last path segment of the resource name, i.e. the document id.
    pub fn id(&self) -> Result<String, StoreError> {
        document_id(&self.name)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListDocumentsResponse {
    #[serde(default)]
    pub documents: Vec<FirestoreDocument>,
    pub next_page_token: Option<String>,
}

/// Extract the document id from `projects/p/databases/d/documents/coll/{id}`.
pub fn document_id(name: &str) -> Result<String, StoreError> {
    name.rsplit('/')
        .next()
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .ok_or_else(|| StoreError::Decode(format!("invalid document name: {}", name)))
}

pub fn encode_value(value: &Value) -> Value {
    match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(b) => json!({ "booleanValue": b }),
        Value::Number(n) => match n.as_i64() {
            Some(i) => json!({ "integerValue": i.to_string() }),
            None => json!({ "doubleValue": n.as_f64() }),
        },
        Value::String(s) => json!({ "stringValue": s }),
        Value::Array(items) => {
            let values: Vec<Value> = items.iter().map(encode_value).collect();
            json!({ "arrayValue": { "values": values } })
        }
        Value::Object(map) => json!({ "mapValue": { "fields": encode_fields(map) } }),
    }
}

pub fn encode_fields(fields: &Fields) -> Value {
    Value::Object(
        fields
            .iter()
            .map(|(key, value)| (key.clone(), encode_value(value)))
            .collect(),
    )
}

pub fn decode_value(value: &Value) -> Result<Value, StoreError> {
    let typed = value
        .as_object()
        .and_then(|obj| obj.iter().next())
        .map(|(kind, inner)| (kind.as_str(), inner))
        .ok_or_else(|| StoreError::Decode(format!("untyped value: {}", value)))?;

    match typed {
        ("nullValue", _) => Ok(Value::Null),
        ("booleanValue", Value::Bool(b)) => Ok(Value::Bool(*b)),
        ("integerValue", Value::String(s)) => s
            .parse::<i64>()
            .map(Value::from)
            .map_err(|e| StoreError::Decode(format!("integerValue {}: {}", s, e))),
        ("integerValue", Value::Number(n)) => Ok(Value::Number(n.clone())),
        ("doubleValue", Value::Number(n)) => Ok(Value::Number(n.clone())),
        // NaN and the infinities arrive as strings and have no JSON form.
        ("doubleValue", Value::String(s)) => Ok(s.parse::<f64>().map(Value::from).unwrap_or(Value::Null)),
        ("timestampValue", Value::String(s))
        | ("stringValue", Value::String(s))
        | ("bytesValue", Value::String(s))
        | ("referenceValue", Value::String(s)) => Ok(Value::String(s.clone())),
        ("geoPointValue", Value::Object(point)) => Ok(json!({
            "latitude": point.get("latitude").cloned().unwrap_or(json!(0.0)),
            "longitude": point.get("longitude").cloned().unwrap_or(json!(0.0)),
        })),
        ("arrayValue", Value::Object(array)) => {
            let values = match array.get("values") {
                Some(Value::Array(values)) => values
                    .iter()
                    .map(decode_value)
                    .collect::<Result<Vec<_>, _>>()?,
                _ => Vec::new(),
            };
            Ok(Value::Array(values))
        }
        ("mapValue", Value::Object(map)) => {
            let fields = match map.get("fields") {
                Some(Value::Object(fields)) => decode_fields(fields)?,
                _ => Fields::new(),
            };
            Ok(Value::Object(fields))
        }
        (kind, _) => Err(StoreError::Decode(format!("unsupported value {}: {}", kind, value))),
    }
}

pub fn decode_fields(fields: &Map<String, Value>) -> Result<Fields, StoreError> {
    fields
        .iter()
        .map(|(key, value)| Ok((key.clone(), decode_value(value)?)))
        .collect()
}

/// Quote a top-level key for use in an update mask.
///
/// Simple names (`[A-Za-z_][A-Za-z0-9_]*`) are used as is; anything else is
/// wrapped in backticks with backticks and backslashes escaped.
pub fn field_path(key: &str) -> String {
    let mut chars = key.chars();
    let simple = matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
    if simple {
        return key.to_string();
    }
    let escaped = key.replace('\\', "\\\\").replace('`', "\\`");
    format!("`{}`", escaped)
}
