//! Array-aware JSON codec.
//!
//! [`encode`] turns a [`Value`] tree into a plain `serde_json::Value`, replacing
//! every [`NumericArray`] leaf with an encoded node:
//!
//! ```json
//! {"__ndarray__": true, "dtype": "float64", "shape": [2, 2], "data": [0.0, 2.0, 3.0, 4.0]}
//! ```
//!
//! `data` is the row-major flattening of the array. [`decode`] walks a parsed
//! document and rebuilds arrays wherever the marker key appears; any other
//! node passes through untouched. Because the marker is what identifies an
//! encoded node on the wire, ordinary mappings may not use it as a key.

use std::collections::BTreeMap;

use serde_json::{Map, Value as JsonValue};

use crate::array::{DType, NumericArray};
use crate::error::{Error, Result};
use crate::value::Value;

/// Reserved key identifying an encoded array node.
pub const ARRAY_MARKER: &str = "__ndarray__";
const DTYPE_KEY: &str = "dtype";
const SHAPE_KEY: &str = "shape";
const DATA_KEY: &str = "data";

#[derive(Debug, Clone, Copy)]
enum Segment<'a> {
    Key(&'a str),
    Index(usize),
}

// RFC 6901 pointer of the node being visited, rendered only for error messages.
fn pointer(trail: &[Segment<'_>]) -> String {
    if trail.is_empty() {
        return "<root>".to_string();
    }
    let mut out = String::new();
    for seg in trail {
        out.push('/');
        match seg {
            Segment::Key(k) => out.push_str(&k.replace('~', "~0").replace('/', "~1")),
            Segment::Index(i) => out.push_str(&i.to_string()),
        }
    }
    out
}

/// Encode a value tree into JSON-safe form.
///
/// Fails with [`Error::PreconditionViolation`] if any mapping uses
/// [`ARRAY_MARKER`] as a key.
pub fn encode(value: &Value) -> Result<JsonValue> {
    encode_at(value, &mut Vec::new())
}

fn encode_at<'a>(value: &'a Value, trail: &mut Vec<Segment<'a>>) -> Result<JsonValue> {
    match value {
        Value::Null => Ok(JsonValue::Null),
        Value::Bool(b) => Ok(JsonValue::Bool(*b)),
        Value::Number(n) => Ok(JsonValue::Number(n.clone())),
        Value::String(s) => Ok(JsonValue::String(s.clone())),
        Value::Seq(items) => {
            let mut out = Vec::with_capacity(items.len());
            for (i, item) in items.iter().enumerate() {
                trail.push(Segment::Index(i));
                out.push(encode_at(item, trail)?);
                trail.pop();
            }
            Ok(JsonValue::Array(out))
        }
        Value::Map(map) => {
            let mut out = Map::new();
            for (key, item) in map {
                if key == ARRAY_MARKER {
                    return Err(Error::PreconditionViolation(format!(
                        "mapping at {} uses reserved key {ARRAY_MARKER:?}",
                        pointer(trail)
                    )));
                }
                trail.push(Segment::Key(key));
                out.insert(key.clone(), encode_at(item, trail)?);
                trail.pop();
            }
            Ok(JsonValue::Object(out))
        }
        Value::Array(array) => Ok(encode_array(array)),
    }
}

/// Encoded node for a single array.
pub fn encode_array(array: &NumericArray) -> JsonValue {
    let mut node = Map::new();
    node.insert(ARRAY_MARKER.to_string(), JsonValue::Bool(true));
    node.insert(
        DTYPE_KEY.to_string(),
        JsonValue::String(array.dtype().name().to_string()),
    );
    node.insert(
        SHAPE_KEY.to_string(),
        array.shape().iter().map(|&d| JsonValue::from(d)).collect(),
    );
    node.insert(
        DATA_KEY.to_string(),
        JsonValue::Array(array.to_json_elements()),
    );
    JsonValue::Object(node)
}

/// Decode a parsed JSON document back into a value tree.
///
/// Fails with [`Error::CorruptArtifact`] if an encoded node is malformed, its
/// dtype tag is unknown, or its data length disagrees with its shape.
pub fn decode(value: &JsonValue) -> Result<Value> {
    decode_at(value, &mut Vec::new())
}

fn decode_at<'a>(value: &'a JsonValue, trail: &mut Vec<Segment<'a>>) -> Result<Value> {
    match value {
        JsonValue::Null => Ok(Value::Null),
        JsonValue::Bool(b) => Ok(Value::Bool(*b)),
        JsonValue::Number(n) => Ok(Value::Number(n.clone())),
        JsonValue::String(s) => Ok(Value::String(s.clone())),
        JsonValue::Array(items) => {
            let mut out = Vec::with_capacity(items.len());
            for (i, item) in items.iter().enumerate() {
                trail.push(Segment::Index(i));
                out.push(decode_at(item, trail)?);
                trail.pop();
            }
            Ok(Value::Seq(out))
        }
        JsonValue::Object(map) if map.contains_key(ARRAY_MARKER) => {
            decode_array(map, trail).map(Value::Array)
        }
        JsonValue::Object(map) => {
            let mut out = BTreeMap::new();
            for (key, item) in map {
                trail.push(Segment::Key(key));
                out.insert(key.clone(), decode_at(item, trail)?);
                trail.pop();
            }
            Ok(Value::Map(out))
        }
    }
}

fn decode_array(node: &Map<String, JsonValue>, trail: &[Segment<'_>]) -> Result<NumericArray> {
    let corrupt = |reason: String| {
        Error::CorruptArtifact(format!("encoded array at {}: {reason}", pointer(trail)))
    };

    if let Some(extra) = node
        .keys()
        .find(|k| !matches!(k.as_str(), ARRAY_MARKER | DTYPE_KEY | SHAPE_KEY | DATA_KEY))
    {
        return Err(corrupt(format!("unexpected key {extra:?}")));
    }
    if node.get(ARRAY_MARKER) != Some(&JsonValue::Bool(true)) {
        return Err(corrupt(format!("{ARRAY_MARKER:?} must be true")));
    }

    let dtype: DType = node
        .get(DTYPE_KEY)
        .and_then(JsonValue::as_str)
        .ok_or_else(|| corrupt("missing or non-string dtype".to_string()))?
        .parse()
        .map_err(corrupt)?;

    let shape = node
        .get(SHAPE_KEY)
        .and_then(JsonValue::as_array)
        .and_then(|dims| {
            dims.iter()
                .map(|d| d.as_u64().and_then(|n| usize::try_from(n).ok()))
                .collect::<Option<Vec<usize>>>()
        })
        .ok_or_else(|| corrupt("shape must be a list of non-negative integers".to_string()))?;

    let data = node
        .get(DATA_KEY)
        .and_then(JsonValue::as_array)
        .ok_or_else(|| corrupt("missing or non-list data".to_string()))?;

    let expected = shape
        .iter()
        .try_fold(1usize, |acc, &d| acc.checked_mul(d))
        .ok_or_else(|| corrupt(format!("shape {shape:?} overflows")))?;
    if data.len() != expected {
        return Err(corrupt(format!(
            "shape {shape:?} holds {expected} elements but {} were stored",
            data.len()
        )));
    }

    NumericArray::from_json_elements(dtype, &shape, data).map_err(corrupt)
}
