//! JSON extraction helpers shared by the provider adapters

use crate::error::{Error, Result};
use serde_json::Value;
use url::Url;

/// Array at a JSON pointer such as `/web/results`
pub fn results_array<'a>(body: &'a Value, pointer: &str) -> Result<&'a Vec<Value>> {
    body.pointer(pointer)
        .and_then(Value::as_array)
        .ok_or_else(|| Error::InvalidResponseFormat(format!("missing {}", pointer)))
}

/// String at a JSON pointer, empty when absent or not a string
pub fn str_at(value: &Value, pointer: &str) -> String {
    value
        .pointer(pointer)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// Replace the values of sensitive query parameters so a URL can be logged
pub fn redact_url(url: &str, secret_params: &[&str]) -> String {
    let Ok(mut parsed) = Url::parse(url) else {
        return url.to_string();
    };

    let pairs: Vec<(String, String)> = parsed
        .query_pairs()
        .map(|(k, v)| {
            let value = if secret_params.contains(&&*k) {
                "HIDDEN".to_string()
            } else {
                v.into_owned()
            };
            (k.into_owned(), value)
        })
        .collect();

    if !pairs.is_empty() {
        parsed.query_pairs_mut().clear().extend_pairs(pairs);
    }
    parsed.to_string()
}
