//! Body normalization before staging or saving.

/// Pretty-prints json with a two-space indent, preserving key order.
/// Anything that does not parse is returned unchanged.
pub fn format_body(raw: &str) -> String {
    match serde_json::from_str::<serde_json::Value>(raw) {
        Ok(value) => serde_json::to_string_pretty(&value).unwrap_or_else(|_| raw.to_string()),
        Err(_) => raw.to_string(),
    }
}
