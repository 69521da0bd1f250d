//! Conversion between [`Value`]s and `serde_json` documents.

use crate::date;
use crate::object::{Object, ObjectKind};
use crate::types::Value;
use serde_json::{Map, Number};

const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_992.0;

pub fn from_json(json: &serde_json::Value) -> Value {
    match json {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Boolean(*b),
        serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
        serde_json::Value::String(s) => Value::String(s.clone()),
        serde_json::Value::Array(items) => {
            Value::Object(Object::array(items.iter().map(from_json).collect()))
        }
        serde_json::Value::Object(map) => Value::Object(Object::from_entries(
            map.iter().map(|(k, v)| (k.clone(), from_json(v))),
        )),
    }
}

/// Functions, `undefined`, symbols and non-finite numbers become `null`, as
/// does any object already being serialized further up (a cycle).
pub fn to_json(value: &Value) -> serde_json::Value {
    to_json_inner(value, &mut Vec::new())
}

fn to_json_inner(value: &Value, stack: &mut Vec<u64>) -> serde_json::Value {
    match value {
        Value::Undefined | Value::Null | Value::Symbol(_) => serde_json::Value::Null,
        Value::Boolean(b) => serde_json::Value::Bool(*b),
        Value::Number(n) if n.fract() == 0.0 && n.abs() < MAX_SAFE_INTEGER => {
            serde_json::Value::Number(Number::from(*n as i64))
        }
        Value::Number(n) => Number::from_f64(*n)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        Value::String(s) => serde_json::Value::String(s.clone()),
        Value::BigInt(n) => serde_json::Value::String(n.to_string()),
        Value::Object(obj) => {
            let data = obj.borrow();
            if stack.contains(&data.id()) {
                return serde_json::Value::Null;
            }
            stack.push(data.id());
            let out = match &data.kind {
                ObjectKind::Function(_) => serde_json::Value::Null,
                ObjectKind::Array(items) => serde_json::Value::Array(
                    items.iter().map(|v| to_json_inner(v, stack)).collect(),
                ),
                ObjectKind::Date(t) => date::to_iso_string(*t)
                    .map(serde_json::Value::String)
                    .unwrap_or(serde_json::Value::Null),
                ObjectKind::RegExp(re) => serde_json::Value::String(re.to_string()),
                ObjectKind::Ordinary | ObjectKind::Error(_) | ObjectKind::Host(_) => {
                    let mut map = Map::new();
                    for key in data.own_enumerable_keys() {
                        let Some(v) = data.get_own_value(&key) else {
                            continue;
                        };
                        if v.is_undefined() || v.is_callable() {
                            continue;
                        }
                        map.insert(key, to_json_inner(&v, stack));
                    }
                    serde_json::Value::Object(map)
                }
            };
            stack.pop();
            out
        }
    }
}
