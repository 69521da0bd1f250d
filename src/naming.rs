use crate::types::Value;

/// Human-readable name for a (possibly substituted) function.
///
/// `receivers` are the `this` values of recorded calls, oldest first. The
/// most recent receiver holding the function under some key names it;
/// failing that the function's `displayName`, then its `name`.
pub fn function_to_string(func: &Value, receivers: &[Value]) -> String {
    if let Some(key) = receivers.iter().rev().find_map(|r| key_holding(r, func)) {
        return key;
    }
    let Value::Object(obj) = func else {
        return func.to_string();
    };
    for key in ["displayName", "name"] {
        if let Value::String(s) = obj.get(key)
            && !s.is_empty()
        {
            return s;
        }
    }
    "anonymous".to_string()
}

fn key_holding(receiver: &Value, func: &Value) -> Option<String> {
    let obj = receiver.as_object()?;
    let keys = obj.borrow().enumerable_keys_with_proto();
    keys.into_iter().find(|k| obj.get(k).strict_equals(func))
}
