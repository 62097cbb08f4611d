use serde_json::Value;

/// Key that never takes part in the signed payload, at any nesting level.
pub const SIGNATURE_KEY: &str = "signature";

/// Render a value into the canonical string the gateway signs.
///
/// Maps are walked in ascending key order and emit `key:value;` per entry, arrays emit
/// `[a,b,...]` in their original order. Booleans render as `1` or nothing, null renders as
/// nothing. An empty map therefore canonicalises to the empty string.
pub fn canonicalize(value: &Value) -> String {
    let mut out = String::new();
    write_canonical(value, &mut out);
    out
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            for key in keys {
                if key == SIGNATURE_KEY {
                    continue;
                }
                out.push_str(key);
                out.push(':');
                write_canonical(&map[key.as_str()], out);
                out.push(';');
            }
        }
        Value::Array(items) => {
            out.push('[');
            for (idx, item) in items.iter().enumerate() {
                if idx > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        Value::String(s) => out.push_str(s),
        Value::Number(n) => out.push_str(&n.to_string()),
        Value::Bool(true) => out.push('1'),
        Value::Bool(false) | Value::Null => {}
    }
}
