use http::StatusCode;

pub const UNKNOWN_STATUS: &str = "Unknown";

/// Numeric code of a response key; `None` for `default` and range keys such
/// as `2XX`.
pub fn status_code(key: &str) -> Option<u16> {
    key.parse::<u16>().ok()
}

/// Standard reason phrase for a status code, or `"Unknown"` when the code is
/// not in the table.
pub fn status_phrase(code: Option<u16>) -> &'static str {
    code.and_then(|c| StatusCode::from_u16(c).ok())
        .and_then(|s| s.canonical_reason())
        .unwrap_or(UNKNOWN_STATUS)
}

pub fn is_success(key: &str) -> bool {
    status_code(key).is_some_and(|c| (200..300).contains(&c)) || key.eq_ignore_ascii_case("2XX")
}
