//! Sensitive-field redaction for recorded form submissions (§4.4).

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

pub const REDACTED: &str = "[REDACTED]";

static SENSITIVE_KEY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)password|secret|token|key|ssn|credit").unwrap());

pub fn is_sensitive_key(key: &str) -> bool {
    SENSITIVE_KEY.is_match(key)
}

/// Redacts values of sensitive-looking keys in a form-data JSON object,
/// recursing into nested objects/arrays.
pub fn redact_form_data(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for (key, v) in map.iter_mut() {
                if is_sensitive_key(key) {
                    *v = Value::String(REDACTED.to_string());
                } else {
                    redact_form_data(v);
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                redact_form_data(item);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn redacts_password_and_token_keys() {
        let mut data = json!({"username": "alice", "password": "hunter2", "apiToken": "abc"});
        redact_form_data(&mut data);
        assert_eq!(data["username"], "alice");
        assert_eq!(data["password"], REDACTED);
        assert_eq!(data["apiToken"], REDACTED);
    }

    #[test]
    fn leaves_non_sensitive_keys_alone() {
        let mut data = json!({"email": "a@b.com", "comment": "hello"});
        redact_form_data(&mut data);
        assert_eq!(data["email"], "a@b.com");
        assert_eq!(data["comment"], "hello");
    }
}
