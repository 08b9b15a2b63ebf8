use serde_json::{Map, Value};

/// Outcome of best-effort JSON extraction from free-form model text
#[derive(Debug)]
pub enum JsonExtraction {
    Parsed(Map<String, Value>),
    FallbackNeeded(String),
}

/// Locate and parse the JSON object embedded in a model response.
///
/// Takes the span from the first `{` to the last `}` and parses it as one
/// object. Intentionally greedy: a response containing several JSON-like
/// blocks can mis-parse, which callers recover from via their fallback
/// constructors. Known limitation, kept for parity.
pub fn extract_json_object(text: &str) -> JsonExtraction {
    let Some(start) = text.find('{') else {
        return JsonExtraction::FallbackNeeded("no JSON object in response".to_string());
    };
    let Some(end) = text.rfind('}') else {
        return JsonExtraction::FallbackNeeded("no closing brace in response".to_string());
    };
    if end < start {
        return JsonExtraction::FallbackNeeded("braces out of order in response".to_string());
    }

    match serde_json::from_str::<Value>(&text[start..=end]) {
        Ok(Value::Object(map)) => JsonExtraction::Parsed(map),
        Ok(_) => JsonExtraction::FallbackNeeded("top-level JSON value is not an object".to_string()),
        Err(e) => JsonExtraction::FallbackNeeded(format!("JSON parse failed: {e}")),
    }
}
