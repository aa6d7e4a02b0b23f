//! Raw per-scope directives, as written in a configuration file.
//!
//! Every field is optional: an unset directive inherits the parent scope's
//! resolved value when the scope tree is merged.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::match_set::{CaseMode, MatchSet};
use super::simple::is_simple_response_header;
use super::CorsConfigError;

/// List token that turns off the corresponding allow-list check.
pub const UNBOUNDED: &str = "unbounded";

/// A list directive: either a sequence or one whitespace-separated string.
///
/// ```yaml
/// cors_method_list: [GET, POST]
/// cors_header_list: "X-Requested-With Authorization"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ListDirective {
    Many(Vec<String>),
    Inline(String),
}

impl ListDirective {
    fn tokens(&self) -> Vec<&str> {
        match self {
            ListDirective::Many(values) => values.iter().map(String::as_str).collect(),
            ListDirective::Inline(value) => value.split_whitespace().collect(),
        }
    }

    /// Compile into a match set.
    ///
    /// `unbounded` sets the unbounded flag and ends the list; values after it
    /// are ignored. Values before it are kept.
    pub fn compile(
        &self,
        directive: &'static str,
        mode: CaseMode,
    ) -> Result<CompiledList, CorsConfigError> {
        let tokens = self.tokens();
        if tokens.is_empty() {
            return Err(CorsConfigError::EmptyListDirective { directive });
        }

        let mut set = MatchSet::new(mode);
        let mut unbounded = false;
        for token in tokens {
            if token == UNBOUNDED {
                unbounded = true;
                break;
            }
            set.push(token);
        }

        Ok(CompiledList { set, unbounded })
    }
}

impl From<&[&str]> for ListDirective {
    fn from(values: &[&str]) -> Self {
        ListDirective::Many(values.iter().map(|s| s.to_string()).collect())
    }
}

/// Result of compiling a [`ListDirective`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledList {
    pub set: MatchSet,
    pub unbounded: bool,
}

/// `cors_max_age`: integer seconds or a time string like `1h30m`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MaxAgeDirective {
    Seconds(u64),
    Text(String),
}

impl MaxAgeDirective {
    pub fn seconds(&self) -> Result<u64, CorsConfigError> {
        match self {
            MaxAgeDirective::Seconds(s) => Ok(*s),
            MaxAgeDirective::Text(text) => parse_time_secs(text),
        }
    }
}

/// Parse a time value into seconds.
///
/// Accepts a bare number (seconds) or number/unit groups in strictly
/// decreasing unit order, optionally separated by spaces: `y` (365d), `M`
/// (30d), `w`, `d`, `h`, `m`, `s`. Examples: `3600`, `1h`, `1h 30m`, `2d12h`.
pub fn parse_time_secs(text: &str) -> Result<u64, CorsConfigError> {
    const UNITS: [(u8, u64); 7] = [
        (b'y', 365 * 24 * 60 * 60),
        (b'M', 30 * 24 * 60 * 60),
        (b'w', 7 * 24 * 60 * 60),
        (b'd', 24 * 60 * 60),
        (b'h', 60 * 60),
        (b'm', 60),
        (b's', 1),
    ];

    let invalid = || CorsConfigError::InvalidMaxAge {
        value: text.to_string(),
    };

    let mut total: u64 = 0;
    let mut value: Option<u64> = None;
    let mut last_unit = 0usize;
    let mut groups = 0usize;

    for b in text.bytes() {
        if b.is_ascii_digit() {
            let digit = u64::from(b - b'0');
            let v = value.unwrap_or(0);
            value = Some(
                v.checked_mul(10)
                    .and_then(|v| v.checked_add(digit))
                    .ok_or_else(invalid)?,
            );
            continue;
        }
        if b == b' ' {
            if value.is_some() {
                // a number must be followed directly by its unit
                return Err(invalid());
            }
            continue;
        }

        let unit = UNITS
            .iter()
            .position(|(u, _)| *u == b)
            .ok_or_else(invalid)?;
        if groups > 0 && unit <= last_unit {
            return Err(invalid());
        }
        let n = value.take().ok_or_else(invalid)?;
        total = n
            .checked_mul(UNITS[unit].1)
            .and_then(|secs| total.checked_add(secs))
            .ok_or_else(invalid)?;
        last_unit = unit;
        groups += 1;
    }

    match value {
        Some(n) if groups == 0 || last_unit < UNITS.len() - 1 => {
            total.checked_add(n).ok_or_else(invalid)
        }
        Some(_) => Err(invalid()),
        None if groups > 0 => Ok(total),
        None => Err(invalid()),
    }
}

/// Directives of one configuration scope.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Directives {
    #[serde(rename = "cors", default, skip_serializing_if = "Option::is_none")]
    pub enable: Option<bool>,
    #[serde(rename = "cors_origin_list", default, skip_serializing_if = "Option::is_none")]
    pub origin_list: Option<ListDirective>,
    #[serde(rename = "cors_method_list", default, skip_serializing_if = "Option::is_none")]
    pub method_list: Option<ListDirective>,
    #[serde(rename = "cors_header_list", default, skip_serializing_if = "Option::is_none")]
    pub header_list: Option<ListDirective>,
    #[serde(
        rename = "cors_expose_header_list",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub expose_header_list: Option<ListDirective>,
    #[serde(rename = "cors_max_age", default, skip_serializing_if = "Option::is_none")]
    pub max_age: Option<MaxAgeDirective>,
    #[serde(
        rename = "cors_support_credential",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub support_credential: Option<bool>,
    #[serde(
        rename = "cors_preflight_content_type",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub preflight_content_type: Option<String>,
    #[serde(
        rename = "cors_preflight_body",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub preflight_body: Option<String>,
}

/// Compile `cors_expose_header_list`, dropping headers browsers already expose.
pub(crate) fn compile_expose_list(list: &ListDirective) -> Result<MatchSet, CorsConfigError> {
    let compiled = list.compile("cors_expose_header_list", CaseMode::Insensitive)?;
    let mut set = compiled.set;
    set.retain(|name| {
        let simple = is_simple_response_header(name);
        if simple {
            debug!(header = %name, "dropping simple response header from expose list");
        }
        !simple
    });
    Ok(set)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compile_list() {
        let list = ListDirective::from(&["GET", "POST"][..]);
        let compiled = list.compile("cors_method_list", CaseMode::Sensitive).unwrap();
        assert!(!compiled.unbounded);
        assert_eq!(compiled.set.values().collect::<Vec<_>>(), vec!["GET", "POST"]);
    }

    #[test]
    fn test_inline_list_splits_on_whitespace() {
        let list = ListDirective::Inline("X-A   X-B\tX-C".to_string());
        let compiled = list.compile("cors_header_list", CaseMode::Insensitive).unwrap();
        assert_eq!(compiled.set.len(), 3);
        assert!(compiled.set.contains("x-b"));
    }

    #[test]
    fn test_unbounded_ends_list() {
        let list = ListDirective::Inline("https://a.com unbounded https://b.com".to_string());
        let compiled = list.compile("cors_origin_list", CaseMode::Sensitive).unwrap();
        assert!(compiled.unbounded);
        assert_eq!(compiled.set.values().collect::<Vec<_>>(), vec!["https://a.com"]);
    }

    #[test]
    fn test_unbounded_is_case_sensitive_token() {
        let list = ListDirective::Inline("Unbounded".to_string());
        let compiled = list.compile("cors_origin_list", CaseMode::Sensitive).unwrap();
        assert!(!compiled.unbounded);
        assert!(compiled.set.contains("Unbounded"));
    }

    #[test]
    fn test_empty_list_is_error() {
        let list = ListDirective::Many(vec![]);
        assert_eq!(
            list.compile("cors_origin_list", CaseMode::Sensitive),
            Err(CorsConfigError::EmptyListDirective {
                directive: "cors_origin_list"
            })
        );
        assert!(ListDirective::Inline("   ".to_string())
            .compile("cors_origin_list", CaseMode::Sensitive)
            .is_err());
    }

    #[test]
    fn test_expose_list_drops_simple_response_headers() {
        let list = ListDirective::from(&["X-Custom", "Content-Type", "pragma"][..]);
        let set = compile_expose_list(&list).unwrap();
        assert_eq!(set.values().collect::<Vec<_>>(), vec!["X-Custom"]);
    }

    #[test]
    fn test_parse_time_secs() {
        assert_eq!(parse_time_secs("3600").unwrap(), 3600);
        assert_eq!(parse_time_secs("30s").unwrap(), 30);
        assert_eq!(parse_time_secs("10m").unwrap(), 600);
        assert_eq!(parse_time_secs("1h30m").unwrap(), 5400);
        assert_eq!(parse_time_secs("1h 30m").unwrap(), 5400);
        assert_eq!(parse_time_secs("1d").unwrap(), 86_400);
        assert_eq!(parse_time_secs("1w").unwrap(), 604_800);
        assert_eq!(parse_time_secs("1M").unwrap(), 2_592_000);
        assert_eq!(parse_time_secs("1y").unwrap(), 31_536_000);
        assert_eq!(parse_time_secs("1h5").unwrap(), 3605);
    }

    #[test]
    fn test_parse_time_secs_rejects() {
        for bad in ["", "h", "1x", "1m1h", "1h1h", "1 h", "-5", "5s5", "99999999999999999999"] {
            assert!(parse_time_secs(bad).is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn test_max_age_directive() {
        assert_eq!(MaxAgeDirective::Seconds(60).seconds().unwrap(), 60);
        assert_eq!(MaxAgeDirective::Text("2m".into()).seconds().unwrap(), 120);
    }
}
