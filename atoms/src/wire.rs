//! Strict field extraction over raw GraphQL response values.
//!
//! Every helper fails with a `Decode` error naming the offending field
//! instead of substituting a default: a missing or mistyped field means
//! the response shape does not match the catalog anymore.

use chrono::{DateTime, Utc};
use serde_json::Value;

use ccai_client::{ClientError, Result};

pub fn field<'a>(value: &'a Value, name: &str) -> Result<&'a Value> {
    value
        .get(name)
        .ok_or_else(|| ClientError::decode(format!("missing field `{}`", name)))
}

pub fn str_field(value: &Value, name: &str) -> Result<String> {
    field(value, name)?
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| ClientError::decode(format!("field `{}` is not a string", name)))
}

pub fn opt_str_field(value: &Value, name: &str) -> Result<Option<String>> {
    match field(value, name)? {
        Value::Null => Ok(None),
        Value::String(text) => Ok(Some(text.clone())),
        _ => Err(ClientError::decode(format!(
            "field `{}` is neither a string nor null",
            name
        ))),
    }
}

pub fn bool_field(value: &Value, name: &str) -> Result<bool> {
    field(value, name)?
        .as_bool()
        .ok_or_else(|| ClientError::decode(format!("field `{}` is not a boolean", name)))
}

pub fn opt_bool_field(value: &Value, name: &str) -> Result<Option<bool>> {
    match field(value, name)? {
        Value::Null => Ok(None),
        Value::Bool(flag) => Ok(Some(*flag)),
        _ => Err(ClientError::decode(format!(
            "field `{}` is neither a boolean nor null",
            name
        ))),
    }
}

pub fn f64_field(value: &Value, name: &str) -> Result<f64> {
    field(value, name)?
        .as_f64()
        .ok_or_else(|| ClientError::decode(format!("field `{}` is not a number", name)))
}

pub fn i64_field(value: &Value, name: &str) -> Result<i64> {
    field(value, name)?
        .as_i64()
        .ok_or_else(|| ClientError::decode(format!("field `{}` is not an integer", name)))
}

pub fn opt_f64_field(value: &Value, name: &str) -> Result<Option<f64>> {
    match field(value, name)? {
        Value::Null => Ok(None),
        number => number
            .as_f64()
            .map(Some)
            .ok_or_else(|| ClientError::decode(format!("field `{}` is not a number", name))),
    }
}

pub fn opt_i64_field(value: &Value, name: &str) -> Result<Option<i64>> {
    match field(value, name)? {
        Value::Null => Ok(None),
        number => number
            .as_i64()
            .map(Some)
            .ok_or_else(|| ClientError::decode(format!("field `{}` is not an integer", name))),
    }
}

pub fn array_field<'a>(value: &'a Value, name: &str) -> Result<&'a Vec<Value>> {
    field(value, name)?
        .as_array()
        .ok_or_else(|| ClientError::decode(format!("field `{}` is not a list", name)))
}

pub fn datetime_field(value: &Value, name: &str) -> Result<DateTime<Utc>> {
    let raw = str_field(value, name)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|stamp| stamp.with_timezone(&Utc))
        .map_err(|err| {
            ClientError::decode(format!("field `{}` is not a timestamp: {}", name, err))
        })
}

/// Flattens a relay-style `name { edges { node ... } }` connection into
/// the list of node values.
pub fn edge_nodes<'a>(value: &'a Value, name: &str) -> Result<Vec<&'a Value>> {
    let edges = array_field(field(value, name)?, "edges")?;
    edges
        .iter()
        .map(|edge| field(edge, "node"))
        .collect::<Result<Vec<_>>>()
        .map_err(|_| ClientError::decode(format!("edge under `{}` has no node", name)))
}

/// Reads a nullable `author { name }` object.
pub fn author_name(value: &Value) -> Result<Option<String>> {
    match field(value, "author")? {
        Value::Null => Ok(None),
        author => str_field(author, "name").map(Some),
    }
}
