use http::Method;

/// Method names a preflight may request.
///
/// Lookup is exact and case-sensitive: `get`, `PAT` and `GETX` all fail.
pub const METHOD_NAMES: [&str; 15] = [
    "GET",
    "HEAD",
    "POST",
    "PUT",
    "DELETE",
    "MKCOL",
    "COPY",
    "MOVE",
    "OPTIONS",
    "PROPFIND",
    "PROPPATCH",
    "LOCK",
    "UNLOCK",
    "PATCH",
    "TRACE",
];

/// Map an `Access-Control-Request-Method` literal to its canonical method.
///
/// Returns `None` for anything outside the fixed table, including extension
/// methods that `http::Method` itself would accept.
#[must_use]
pub fn canonical_method(literal: &str) -> Option<Method> {
    let name = METHOD_NAMES.iter().find(|m| **m == literal)?;
    Method::from_bytes(name.as_bytes()).ok()
}
