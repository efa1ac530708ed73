use serde_json::Value;

use crate::error::FetchError;

/// Unwraps the API-Sports envelope (`{"errors": ..., "response": [...]}`) and
/// returns the `response` items.
///
/// Empty and `null` bodies yield no items. A non-empty `errors` field (the API
/// reports it either as an object or as an array) becomes [`FetchError::Api`].
pub fn parse_response_items(endpoint: &str, raw: &str) -> Result<Vec<Value>, FetchError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(Vec::new());
    }
    let mut root: Value = serde_json::from_str(trimmed).map_err(|source| FetchError::Decode {
        endpoint: endpoint.to_string(),
        source,
    })?;

    if let Some(message) = root.get("errors").and_then(api_error_message) {
        return Err(FetchError::Api {
            endpoint: endpoint.to_string(),
            message,
        });
    }

    match root.get_mut("response").map(Value::take) {
        Some(Value::Array(items)) => Ok(items),
        _ => Ok(Vec::new()),
    }
}

fn api_error_message(errors: &Value) -> Option<String> {
    let parts: Vec<String> = match errors {
        Value::Object(map) => map
            .iter()
            .map(|(key, value)| format!("{key}: {}", value_text(value)))
            .collect(),
        Value::Array(items) => items.iter().map(value_text).collect(),
        Value::String(s) if !s.trim().is_empty() => vec![s.trim().to_string()],
        _ => Vec::new(),
    };
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("; "))
    }
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

pub(crate) fn snippet(body: &str) -> String {
    body.trim()
        .replace('\n', " ")
        .replace('\r', " ")
        .chars()
        .take(220)
        .collect::<String>()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_errors_array_is_ok() {
        let items = parse_response_items("teams", r#"{"errors":[],"response":[{"a":1}]}"#)
            .expect("envelope should parse");
        assert_eq!(items.len(), 1);
    }

    #[test]
    fn error_object_is_reported() {
        let err = parse_response_items(
            "fixtures",
            r#"{"errors":{"token":"Error/Missing application key"},"response":[]}"#,
        )
        .expect_err("errors object should fail");
        assert!(err.to_string().contains("Missing application key"));
    }

    #[test]
    fn null_body_is_empty() {
        assert!(parse_response_items("odds", "null").unwrap().is_empty());
        assert!(parse_response_items("odds", "  ").unwrap().is_empty());
    }
}
