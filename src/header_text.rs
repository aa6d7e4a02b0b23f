//! Header value construction: joining configured lists into one value and
//! splitting multi-token values.

use std::borrow::Cow;

use crate::middleware::cors::CorsError;

/// Separator used between list entries in emitted header values.
pub const LIST_SEPARATOR: &str = ", ";

/// Join values with `", "`.
///
/// A single value is returned unmodified (borrowed); an empty sequence yields
/// the empty string.
pub fn join<'a, I>(values: I) -> Result<Cow<'a, str>, CorsError>
where
    I: IntoIterator<Item = &'a str>,
    I::IntoIter: Clone,
{
    join_with(values, LIST_SEPARATOR)
}

/// Join values with an arbitrary separator.
///
/// The total length is computed in a first pass so the result is allocated
/// exactly once.
pub fn join_with<'a, I>(values: I, separator: &str) -> Result<Cow<'a, str>, CorsError>
where
    I: IntoIterator<Item = &'a str>,
    I::IntoIter: Clone,
{
    let iter = values.into_iter();

    let mut count = 0usize;
    let mut len = 0usize;
    let mut first = None;
    for value in iter.clone() {
        if count == 0 {
            first = Some(value);
        }
        count += 1;
        len += value.len();
    }

    let Some(first) = first else {
        return Ok(Cow::Borrowed(""));
    };
    if count == 1 {
        return Ok(Cow::Borrowed(first));
    }

    len += separator.len() * (count - 1);

    let mut out = String::new();
    out.try_reserve_exact(len)
        .map_err(CorsError::allocation("joined header value"))?;
    for (i, value) in iter.enumerate() {
        if i > 0 {
            out.push_str(separator);
        }
        out.push_str(value);
    }

    Ok(Cow::Owned(out))
}

/// Split `value` on every occurrence of the ASCII byte `separator`.
///
/// Consecutive separators produce empty tokens. If `separator` does not occur
/// at all the result is empty, which lets callers tell "single token" apart
/// from "several tokens" without a second scan.
pub fn split(value: &str, separator: u8) -> Result<Vec<&str>, CorsError> {
    debug_assert!(separator.is_ascii());
    let bytes = value.as_bytes();
    let occurrences = bytes.iter().filter(|b| **b == separator).count();
    if occurrences == 0 {
        return Ok(Vec::new());
    }

    let mut tokens = Vec::new();
    tokens
        .try_reserve_exact(occurrences + 1)
        .map_err(CorsError::allocation("split token buffer"))?;

    let mut start = 0;
    for (i, b) in bytes.iter().enumerate() {
        if *b == separator {
            tokens.push(&value[start..i]);
            start = i + 1;
        }
    }
    tokens.push(&value[start..]);

    Ok(tokens)
}
