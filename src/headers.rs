//! Header access seams between the engine and its host.
//!
//! The engine never touches a concrete request or response type. It reads
//! request headers through [`RequestHeaders`] and appends response headers
//! through [`ResponseHeaders`]. Both are implemented for the crate's
//! [`HeaderVec`] and for `http::HeaderMap`.

use std::sync::Arc;

use http::header::{HeaderMap, HeaderName, HeaderValue};
use smallvec::SmallVec;

use crate::middleware::cors::CorsError;

/// Maximum inline header lines before heap allocation
pub const MAX_INLINE_HEADERS: usize = 16;

/// Ordered header lines. Names are `Arc<str>` because the same few names
/// repeat across every request.
pub type HeaderVec = SmallVec<[(Arc<str>, String); MAX_INLINE_HEADERS]>;

/// Values returned by a multi-line header lookup
pub type HeaderValues<'a> = SmallVec<[&'a str; 4]>;

pub const ORIGIN: &str = "Origin";
pub const ACCESS_CONTROL_REQUEST_METHOD: &str = "Access-Control-Request-Method";
pub const ACCESS_CONTROL_REQUEST_HEADERS: &str = "Access-Control-Request-Headers";

pub const ACCESS_CONTROL_ALLOW_ORIGIN: &str = "Access-Control-Allow-Origin";
pub const ACCESS_CONTROL_ALLOW_CREDENTIALS: &str = "Access-Control-Allow-Credentials";
pub const ACCESS_CONTROL_MAX_AGE: &str = "Access-Control-Max-Age";
pub const ACCESS_CONTROL_ALLOW_METHODS: &str = "Access-Control-Allow-Methods";
pub const ACCESS_CONTROL_ALLOW_HEADERS: &str = "Access-Control-Allow-Headers";
pub const ACCESS_CONTROL_EXPOSE_HEADERS: &str = "Access-Control-Expose-Headers";

/// Read-only view of the request's header lines.
pub trait RequestHeaders {
    /// First line whose name matches case-insensitively.
    fn header(&self, name: &str) -> Option<&str>;

    /// Every line whose name matches case-insensitively, in arrival order.
    fn header_all(&self, name: &str) -> HeaderValues<'_>;
}

/// Append-only view of the outgoing response's header lines.
pub trait ResponseHeaders {
    /// Append one header line. Existing lines with the same name are kept.
    fn append_header(&mut self, name: &'static str, value: &str) -> Result<(), CorsError>;
}

/// Append a header unless its value is empty.
///
/// Every header the engine emits goes through here, so an empty computed
/// value (an empty joined list, an empty `Origin`) is silently skipped.
pub fn add_header<R>(out: &mut R, name: &'static str, value: &str) -> Result<(), CorsError>
where
    R: ResponseHeaders + ?Sized,
{
    if value.is_empty() {
        return Ok(());
    }
    out.append_header(name, value)
}

impl RequestHeaders for HeaderVec {
    fn header(&self, name: &str) -> Option<&str> {
        self.iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    fn header_all(&self, name: &str) -> HeaderValues<'_> {
        self.iter()
            .filter(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
            .collect()
    }
}

impl ResponseHeaders for HeaderVec {
    fn append_header(&mut self, name: &'static str, value: &str) -> Result<(), CorsError> {
        let mut owned = String::new();
        owned
            .try_reserve_exact(value.len())
            .map_err(CorsError::allocation("header value"))?;
        owned.push_str(value);

        self.try_reserve(1)
            .map_err(|_| CorsError::Allocation { what: "header list" })?;
        self.push((Arc::from(name), owned));
        Ok(())
    }
}

impl RequestHeaders for HeaderMap {
    fn header(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(|v| v.to_str().ok())
    }

    fn header_all(&self, name: &str) -> HeaderValues<'_> {
        self.get_all(name)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .collect()
    }
}

impl ResponseHeaders for HeaderMap {
    fn append_header(&mut self, name: &'static str, value: &str) -> Result<(), CorsError> {
        let header_name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| CorsError::InvalidHeaderValue { name })?;
        let header_value =
            HeaderValue::from_str(value).map_err(|_| CorsError::InvalidHeaderValue { name })?;
        self.append(header_name, header_value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smallvec::smallvec;

    #[test]
    fn test_header_vec_lookup_is_case_insensitive() {
        let headers: HeaderVec = smallvec![
            (Arc::from("origin"), "https://a.com".to_string()),
            (Arc::from("ORIGIN"), "https://b.com".to_string()),
        ];
        assert_eq!(headers.header("Origin"), Some("https://a.com"));
        assert_eq!(
            headers.header_all("Origin").as_slice(),
            &["https://a.com", "https://b.com"]
        );
        assert!(headers.header("Host").is_none());
        assert!(headers.header_all("Host").is_empty());
    }

    #[test]
    fn test_add_header_skips_empty_values() {
        let mut out = HeaderVec::new();
        add_header(&mut out, ACCESS_CONTROL_ALLOW_METHODS, "").unwrap();
        assert!(out.is_empty());
        add_header(&mut out, ACCESS_CONTROL_ALLOW_METHODS, "GET").unwrap();
        assert_eq!(out.header(ACCESS_CONTROL_ALLOW_METHODS), Some("GET"));
    }

    #[test]
    fn test_header_vec_append_keeps_duplicates() {
        let mut out = HeaderVec::new();
        out.append_header(ACCESS_CONTROL_ALLOW_HEADERS, "X-A").unwrap();
        out.append_header(ACCESS_CONTROL_ALLOW_HEADERS, "X-B").unwrap();
        assert_eq!(
            out.header_all(ACCESS_CONTROL_ALLOW_HEADERS).as_slice(),
            &["X-A", "X-B"]
        );
    }

    #[test]
    fn test_header_map_roundtrip() {
        let mut map = HeaderMap::new();
        map.append_header(ACCESS_CONTROL_ALLOW_ORIGIN, "https://a.com")
            .unwrap();
        map.append_header(ACCESS_CONTROL_ALLOW_HEADERS, "X-A").unwrap();
        map.append_header(ACCESS_CONTROL_ALLOW_HEADERS, "X-B").unwrap();

        assert_eq!(map.header("access-control-allow-origin"), Some("https://a.com"));
        assert_eq!(
            map.header_all(ACCESS_CONTROL_ALLOW_HEADERS).as_slice(),
            &["X-A", "X-B"]
        );
    }

    #[test]
    fn test_header_map_rejects_control_characters() {
        let mut map = HeaderMap::new();
        let err = map
            .append_header(ACCESS_CONTROL_ALLOW_ORIGIN, "bad\nvalue")
            .unwrap_err();
        assert_eq!(
            err,
            CorsError::InvalidHeaderValue {
                name: ACCESS_CONTROL_ALLOW_ORIGIN
            }
        );
    }
}
