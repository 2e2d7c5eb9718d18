use serde_json::{Value as JsonValue, json};

use crate::array::NumericArray;
use crate::value::Value;

/// Rendering limits for [`to_display_json`].
#[derive(Debug, Clone, Copy)]
pub struct JsonOpts {
    pub max_array_elems: usize,
    pub max_depth: usize,
    /// Show arrays as `{"$array": dtype, "shape": [..]}` instead of nested lists.
    pub array_summary: bool,
}

impl Default for JsonOpts {
    fn default() -> Self {
        Self {
            max_array_elems: 128,
            max_depth: 16,
            array_summary: true,
        }
    }
}

/// Human-oriented JSON view of a value tree. Lossy: long sequences are cut,
/// deep nodes become `null`, and arrays are summarized or shown as nested lists.
/// Use [`crate::codec::encode`] for anything that must be read back.
pub fn to_display_json(value: &Value, opts: JsonOpts) -> JsonValue {
    write_value(value, 0, &opts)
}

fn write_value(v: &Value, depth: usize, opts: &JsonOpts) -> JsonValue {
    if depth > opts.max_depth {
        return JsonValue::Null;
    }
    match v {
        Value::Null => JsonValue::Null,
        Value::Bool(b) => JsonValue::Bool(*b),
        Value::Number(n) => JsonValue::Number(n.clone()),
        Value::String(s) => JsonValue::String(s.clone()),
        Value::Seq(items) => {
            let max = opts.max_array_elems.min(items.len());
            let mut arr: Vec<JsonValue> = items
                .iter()
                .take(max)
                .map(|it| write_value(it, depth + 1, opts))
                .collect();
            if items.len() > max {
                arr.push(truncation(items.len() - max));
            }
            JsonValue::Array(arr)
        }
        Value::Map(map) => JsonValue::Object(
            map.iter()
                .map(|(k, it)| (k.clone(), write_value(it, depth + 1, opts)))
                .collect(),
        ),
        Value::Array(a) if opts.array_summary => summarize(a),
        Value::Array(a) => nested(&a.to_json_elements(), a.shape(), opts),
    }
}

fn truncation(omitted: usize) -> JsonValue {
    json!({"$truncated": true, "$omitted": omitted})
}

fn summarize(a: &NumericArray) -> JsonValue {
    json!({"$array": a.dtype().name(), "shape": a.shape()})
}

// Rebuild row-major `elems` as lists nested `shape.len()` deep.
fn nested(elems: &[JsonValue], shape: &[usize], opts: &JsonOpts) -> JsonValue {
    let Some((&outer, rest)) = shape.split_first() else {
        return elems.first().cloned().unwrap_or(JsonValue::Null);
    };
    let chunk: usize = rest.iter().product();
    let max = opts.max_array_elems.min(outer);
    let mut arr: Vec<JsonValue> = (0..max)
        .map(|i| nested(&elems[i * chunk..(i + 1) * chunk], rest, opts))
        .collect();
    if outer > max {
        arr.push(truncation(outer - max));
    }
    JsonValue::Array(arr)
}
