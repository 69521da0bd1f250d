//! Sandbox configuration records and the merge used to overlay overrides.

use crate::object::{Object, ObjectKind};
use crate::types::Value;

pub const DEFAULT_PROPERTIES: [&str; 6] = ["spy", "stub", "mock", "clock", "server", "requests"];

/// A fresh copy of the default sandbox configuration record.
pub fn default_config() -> Object {
    Object::from_entries([
        ("injectIntoThis", Value::from(true)),
        ("injectInto", Value::Null),
        (
            "properties",
            Value::Object(Object::array(
                DEFAULT_PROPERTIES.iter().map(|&p| Value::from(p)).collect(),
            )),
        ),
        ("useFakeTimers", Value::from(true)),
        ("useFakeServer", Value::from(true)),
    ])
}

/// New record holding `base`'s own enumerable data with `overrides`' own
/// enumerable keys laid over it. Neither input is modified; values are
/// shared, not cloned.
pub fn merge(base: &Object, overrides: Option<&Object>) -> Object {
    let merged = Object::plain();
    let sources = std::iter::once(base).chain(overrides);
    for source in sources {
        let data = source.borrow();
        for key in data.own_enumerable_keys() {
            if let Some(value) = data.get_own_value(&key) {
                merged.borrow_mut().insert_value(&key, value);
            }
        }
    }
    merged
}

pub fn get_config(overrides: Option<&Object>) -> Object {
    merge(&default_config(), overrides)
}

/// Typed view over a configuration record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SandboxConfig {
    pub inject_into_this: bool,
    pub inject_into: Option<String>,
    pub properties: Vec<String>,
    pub use_fake_timers: bool,
    pub use_fake_server: bool,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self::from_record(&default_config())
    }
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Undefined | Value::Null => false,
        Value::Boolean(b) => *b,
        Value::Number(n) => *n != 0.0 && !n.is_nan(),
        Value::String(s) => !s.is_empty(),
        _ => true,
    }
}

impl SandboxConfig {
    /// Missing or mistyped keys read as falsy/empty.
    pub fn from_record(record: &Object) -> Self {
        let properties = match &record.borrow().get_property("properties") {
            Value::Object(list) => match &list.borrow().kind {
                ObjectKind::Array(items) => items
                    .iter()
                    .filter_map(|v| v.as_str().map(str::to_string))
                    .collect(),
                _ => Vec::new(),
            },
            _ => Vec::new(),
        };
        Self {
            inject_into_this: truthy(&record.get("injectIntoThis")),
            inject_into: record.get("injectInto").as_str().map(str::to_string),
            properties,
            use_fake_timers: truthy(&record.get("useFakeTimers")),
            use_fake_server: truthy(&record.get("useFakeServer")),
        }
    }
}
