//! Command implementations, one module per CLI subcommand.

pub mod check;
pub mod delete;
pub mod get;
pub mod lifetime;
pub mod list;
pub mod put;
pub mod safemode;
pub mod stats;

use crate::error::{CliError, Result};
use objstore_core::{Error as CoreError, FieldValue, UuidService};
use uuid::Uuid;

/// Parses and validates a UUID at the CLI's ingress point. Rejects
/// anything that isn't a canonical v4 UUID, not just anything
/// `uuid::Uuid` happens to parse.
pub(crate) fn parse_uuid(s: &str) -> Result<Uuid> {
    if !UuidService::validate(s) {
        return Err(CliError::Core(CoreError::InvalidUuid(s.to_string())));
    }
    Ok(Uuid::parse_str(s).expect("validate() already confirmed this parses"))
}

/// Renders a live `FieldValue` as a `serde_json::Value` for display.
/// Children are shown as `{"$ref": "<uuid>"}`, matching the on-disk
/// reference marker the same value would serialize to.
pub(crate) fn field_value_to_json(value: &FieldValue) -> serde_json::Value {
    use serde_json::Value;
    match value {
        FieldValue::Null => Value::Null,
        FieldValue::Bool(b) => Value::Bool(*b),
        FieldValue::Number(n) => serde_json::Number::from_f64(*n)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        FieldValue::String(s) => Value::String(s.clone()),
        FieldValue::Array(items) => Value::Array(items.iter().map(field_value_to_json).collect()),
        FieldValue::Map(fields) => {
            let mut map = serde_json::Map::new();
            for (k, v) in fields {
                map.insert(k.clone(), field_value_to_json(v));
            }
            Value::Object(map)
        }
        FieldValue::Child(child) => {
            let borrowed = child.borrow();
            let mut map = serde_json::Map::new();
            map.insert(
                "$ref".into(),
                match borrowed.uuid {
                    Some(uuid) => Value::String(uuid.to_string()),
                    None => Value::Null,
                },
            );
            Value::Object(map)
        }
    }
}

/// Parses a CLI `name=value` field argument, accepting JSON values
/// (numbers, booleans, arrays, objects) and falling back to a plain
/// string for anything that isn't valid JSON.
pub(crate) fn parse_field(arg: &str) -> Result<(String, FieldValue)> {
    let (name, raw) = arg
        .split_once('=')
        .ok_or_else(|| CliError::user(format!("field '{arg}' is not in name=value form")))?;
    if name.is_empty() {
        return Err(CliError::user(format!("field '{arg}' has an empty name")));
    }
    let value = match serde_json::from_str::<serde_json::Value>(raw) {
        Ok(json) => json_value_to_field_value(&json),
        Err(_) => FieldValue::String(raw.to_string()),
    };
    Ok((name.to_string(), value))
}

fn json_value_to_field_value(value: &serde_json::Value) -> FieldValue {
    use serde_json::Value;
    match value {
        Value::Null => FieldValue::Null,
        Value::Bool(b) => FieldValue::Bool(*b),
        Value::Number(n) => FieldValue::Number(n.as_f64().unwrap_or(0.0)),
        Value::String(s) => FieldValue::String(s.clone()),
        Value::Array(items) => FieldValue::Array(items.iter().map(json_value_to_field_value).collect()),
        Value::Object(fields) => {
            let mut map = indexmap::IndexMap::new();
            for (k, v) in fields {
                map.insert(k.clone(), json_value_to_field_value(v));
            }
            FieldValue::Map(map)
        }
    }
}
