//! Small helpers shared by config, models, settings, and the remote client.

/// Longest remote error body kept in an error message
const BODY_EXCERPT_CHARS: usize = 180;

/// Trimmed copy of `value`, or `None` when nothing but whitespace remains.
pub fn non_blank(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

pub fn has_http_scheme(value: &str) -> bool {
    value.starts_with("http://") || value.starts_with("https://")
}

/// Trimmed head of a response body, safe to embed in an error.
pub fn body_excerpt(body: &str) -> String {
    body.trim().chars().take(BODY_EXCERPT_CHARS).collect()
}

pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
