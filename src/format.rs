use serde::Serialize;

use crate::error::TdvqError;
use crate::materialize::QueryResult;

/// Convert a QueryResult to a TOON document with `columns`, `types`,
/// `rows` and `incomplete` keys.
///
/// Column names are listed separately so a zero-row result still carries them.
pub fn to_toon(result: &QueryResult) -> Result<String, TdvqError> {
    let columns = result
        .columns
        .iter()
        .map(|c| serde_json::Value::String(c.name.clone()))
        .collect();
    let types = result
        .columns
        .iter()
        .map(|c| serde_json::Value::String(c.type_name.clone()))
        .collect();
    let rows = (0..result.rows.len())
        .filter_map(|i| result.record(i))
        .map(serde_json::Value::Object)
        .collect();

    let mut map = serde_json::Map::new();
    map.insert("columns".to_string(), serde_json::Value::Array(columns));
    map.insert("types".to_string(), serde_json::Value::Array(types));
    map.insert("rows".to_string(), serde_json::Value::Array(rows));
    map.insert(
        "incomplete".to_string(),
        serde_json::Value::Bool(result.incomplete),
    );

    value_to_toon(&serde_json::Value::Object(map))
}

/// Encode any serializable value (schema, form fields) as TOON.
pub fn serialize_to_toon<T: Serialize>(value: &T) -> Result<String, TdvqError> {
    let json = serde_json::to_value(value).map_err(|e| TdvqError::Format {
        message: e.to_string(),
    })?;
    value_to_toon(&json)
}

/// Encode any serializable value as pretty JSON.
pub fn to_json<T: Serialize>(value: &T) -> Result<String, TdvqError> {
    serde_json::to_string_pretty(value)
        .map(|s| s + "\n")
        .map_err(|e| TdvqError::Format {
            message: e.to_string(),
        })
}

fn value_to_toon(value: &serde_json::Value) -> Result<String, TdvqError> {
    toon_format::encode_default(value).map_err(|e| TdvqError::Format {
        message: e.to_string(),
    })
}
