//! Conversion between player records and Firestore's typed JSON values.

use serde::Deserialize;
use serde_json::{Map, Value, json};

use crate::models::{Player, PlayerId, PlayerRecord};
use crate::utils::errors::{Result, RosterError};

#[derive(Debug, Clone, Deserialize)]
pub struct FirestoreDocument {
    /// Full resource name, `projects/{p}/databases/(default)/documents/{collection}/{id}`
    pub name: String,
    #[serde(default)]
    pub fields: Map<String, Value>,
}

impl FirestoreDocument {
    pub fn id(&self) -> PlayerId {
        PlayerId::new(self.name.rsplit('/').next().unwrap_or_default())
    }
}

/// One element of a `runQuery` response stream.
#[derive(Debug, Deserialize)]
pub struct RunQueryItem {
    pub document: Option<FirestoreDocument>,
}

pub fn to_firestore_value(value: &Value) -> Value {
    match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(b) => json!({ "booleanValue": b }),
        Value::Number(n) if n.is_i64() || n.is_u64() => json!({ "integerValue": n.to_string() }),
        Value::Number(n) => json!({ "doubleValue": n }),
        Value::String(s) => json!({ "stringValue": s }),
        Value::Array(items) => json!({
            "arrayValue": { "values": items.iter().map(to_firestore_value).collect::<Vec<_>>() }
        }),
        Value::Object(map) => json!({ "mapValue": { "fields": encode_fields(map) } }),
    }
}

pub fn from_firestore_value(value: &Value) -> Value {
    let Some(typed) = value.as_object() else {
        return Value::Null;
    };

    if let Some(v) = typed.get("stringValue") {
        return v.clone();
    }
    if let Some(v) = typed.get("integerValue") {
        // int64 values travel as strings
        return match v {
            Value::String(s) => s.parse::<i64>().map(Value::from).unwrap_or(Value::Null),
            other => other.clone(),
        };
    }
    if let Some(v) = typed.get("doubleValue") {
        return v.clone();
    }
    if let Some(v) = typed.get("booleanValue") {
        return v.clone();
    }
    if let Some(v) = typed
        .get("timestampValue")
        .or_else(|| typed.get("referenceValue"))
    {
        return v.clone();
    }
    if let Some(array) = typed.get("arrayValue") {
        let values = array
            .get("values")
            .and_then(Value::as_array)
            .map(|items| items.iter().map(from_firestore_value).collect())
            .unwrap_or_default();
        return Value::Array(values);
    }
    if let Some(map) = typed.get("mapValue") {
        let fields = map
            .get("fields")
            .and_then(Value::as_object)
            .map(decode_fields)
            .unwrap_or_default();
        return Value::Object(fields);
    }
    Value::Null
}

fn encode_fields(map: &Map<String, Value>) -> Map<String, Value> {
    map.iter()
        .map(|(k, v)| (k.clone(), to_firestore_value(v)))
        .collect()
}

fn decode_fields(fields: &Map<String, Value>) -> Map<String, Value> {
    fields
        .iter()
        .map(|(k, v)| (k.clone(), from_firestore_value(v)))
        // Nulls fall back to record defaults
        .filter(|(_, v)| !v.is_null())
        .collect()
}

/// Typed `fields` object for a whole record.
pub fn encode_record(record: &PlayerRecord) -> Result<Map<String, Value>> {
    match serde_json::to_value(record)? {
        Value::Object(map) => Ok(encode_fields(&map)),
        other => Err(RosterError::Backend(format!(
            "player record serialized to non-object: {}",
            other
        ))),
    }
}

pub fn decode_document(document: &FirestoreDocument) -> Result<Player> {
    let plain = decode_fields(&document.fields);
    let record: PlayerRecord = serde_json::from_value(Value::Object(plain))?;
    Ok(Player::new(document.id(), record))
}
