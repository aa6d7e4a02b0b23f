//! Protocol-mandated "simple" classification sets.
//!
//! These are tiny and static, so lookups compare directly without hashing.

/// Simple methods. Matched case-sensitively.
pub const SIMPLE_METHODS: &[&str] = &["GET", "HEAD", "POST"];

/// Simple request headers. Matched case-insensitively.
pub const SIMPLE_REQUEST_HEADERS: &[&str] = &[
    "Accept",
    "Accept-Language",
    "Content-Language",
    "Last-Event-ID",
];

/// Simple response headers, exposed by browsers without opt-in.
/// Matched case-insensitively.
pub const SIMPLE_RESPONSE_HEADERS: &[&str] = &[
    "Cache-Control",
    "Content-Language",
    "Content-Type",
    "Expires",
    "Last-Modified",
    "Pragma",
];

/// Returns `true` if `value` is a member of `set`.
///
/// An empty value is never simple.
#[must_use]
pub fn is_simple(value: &str, set: &[&str], case_insensitive: bool) -> bool {
    if value.is_empty() {
        return false;
    }
    set.iter().any(|s| {
        if case_insensitive {
            s.eq_ignore_ascii_case(value)
        } else {
            *s == value
        }
    })
}

#[inline]
#[must_use]
pub fn is_simple_method(method: &str) -> bool {
    is_simple(method, SIMPLE_METHODS, false)
}

#[inline]
#[must_use]
pub fn is_simple_request_header(name: &str) -> bool {
    is_simple(name, SIMPLE_REQUEST_HEADERS, true)
}

#[inline]
#[must_use]
pub fn is_simple_response_header(name: &str) -> bool {
    is_simple(name, SIMPLE_RESPONSE_HEADERS, true)
}
