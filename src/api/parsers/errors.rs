use serde_json::Value;

const MESSAGE_FIELDS: &[&str] = &["message", "error", "detail", "msg"];

/// Pull a human-readable message out of a structured error body
pub fn extract_error_message(body: &Value) -> Option<String> {
    match body {
        Value::String(text) => non_empty(text),
        Value::Object(_) => MESSAGE_FIELDS
            .iter()
            .find_map(|field| body.get(*field).and_then(extract_error_message))
            .or_else(|| first_listed_error(body)),
        _ => None,
    }
}

fn first_listed_error(body: &Value) -> Option<String> {
    body.get("errors")?
        .as_array()?
        .iter()
        .find_map(extract_error_message)
}

fn non_empty(text: &str) -> Option<String> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
