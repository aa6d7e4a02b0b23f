use std::sync::Arc;

use http::HeaderValue;

use super::directives::{compile_expose_list, Directives, ListDirective};
use super::match_set::{CaseMode, MatchSet};
use super::template::BodyTemplate;
use super::CorsConfigError;

/// Content type of a successful preflight response unless configured.
pub const DEFAULT_PREFLIGHT_CONTENT_TYPE: &str = "text/plain";

/// Fully resolved, immutable CORS policy for one configuration scope.
///
/// Built by merging a scope's [`Directives`] over its parent's resolved
/// policy. Lists a scope does not configure are shared with the parent by
/// `Arc`, never copied. Once resolved, a policy is only ever read.
///
/// An absent list (`None`) and an empty list both reject every candidate.
/// Neither is the same as the corresponding `*_unbounded` flag, which skips
/// the check entirely.
#[derive(Debug, Clone)]
pub struct PolicyConfig {
    /// `cors`: master switch
    pub enable: bool,
    /// `cors_origin_list`, case-sensitive
    pub origin_list: Option<Arc<MatchSet>>,
    /// `cors_method_list`, case-sensitive
    pub method_list: Option<Arc<MatchSet>>,
    /// `cors_header_list`, case-insensitive
    pub header_list: Option<Arc<MatchSet>>,
    /// `cors_expose_header_list`, case-insensitive, simple response headers removed
    pub expose_header_list: Option<Arc<MatchSet>>,
    pub origin_unbounded: bool,
    pub method_unbounded: bool,
    pub header_unbounded: bool,
    /// `cors_support_credential`
    pub support_credential: bool,
    /// `cors_max_age` in seconds; 0 means unset
    pub max_age: u64,
    pub preflight_content_type: Arc<str>,
    pub preflight_body: Arc<BodyTemplate>,
}

impl Default for PolicyConfig {
    /// Disabled policy with no lists, matching an unconfigured root scope.
    fn default() -> Self {
        Self {
            enable: false,
            origin_list: None,
            method_list: None,
            header_list: None,
            expose_header_list: None,
            origin_unbounded: false,
            method_unbounded: false,
            header_unbounded: false,
            support_credential: false,
            max_age: 0,
            preflight_content_type: Arc::from(DEFAULT_PREFLIGHT_CONTENT_TYPE),
            preflight_body: Arc::new(BodyTemplate::default()),
        }
    }
}

/// Outcome of merging one list directive.
struct MergedList {
    list: Option<Arc<MatchSet>>,
    unbounded: Option<bool>,
}

fn merge_list(
    directive: Option<&ListDirective>,
    name: &'static str,
    mode: CaseMode,
    inherited: Option<&Arc<MatchSet>>,
) -> Result<MergedList, CorsConfigError> {
    match directive {
        Some(list) => {
            let compiled = list.compile(name, mode)?;
            Ok(MergedList {
                list: Some(Arc::new(compiled.set)),
                unbounded: compiled.unbounded.then_some(true),
            })
        }
        None => Ok(MergedList {
            list: inherited.cloned(),
            unbounded: None,
        }),
    }
}

impl PolicyConfig {
    /// Resolve `directives` over `parent` (or over the defaults for a root scope).
    ///
    /// Lists: a configured list replaces the parent's; an unconfigured one
    /// shares the parent's `Arc`. Scalars: a set directive wins, an unset one
    /// takes the parent's resolved value. The `unbounded` flags are only ever
    /// set by the `unbounded` list token, so a child list without the token
    /// still inherits a parent's unbounded flag.
    pub fn resolve(
        directives: &Directives,
        parent: Option<&PolicyConfig>,
    ) -> Result<PolicyConfig, CorsConfigError> {
        let defaults;
        let parent = match parent {
            Some(p) => p,
            None => {
                defaults = PolicyConfig::default();
                &defaults
            }
        };

        let origins = merge_list(
            directives.origin_list.as_ref(),
            "cors_origin_list",
            CaseMode::Sensitive,
            parent.origin_list.as_ref(),
        )?;
        let methods = merge_list(
            directives.method_list.as_ref(),
            "cors_method_list",
            CaseMode::Sensitive,
            parent.method_list.as_ref(),
        )?;
        let headers = merge_list(
            directives.header_list.as_ref(),
            "cors_header_list",
            CaseMode::Insensitive,
            parent.header_list.as_ref(),
        )?;

        let expose_header_list = match &directives.expose_header_list {
            Some(list) => Some(Arc::new(compile_expose_list(list)?)),
            None => parent.expose_header_list.clone(),
        };

        let max_age = match &directives.max_age {
            Some(age) => age.seconds()?,
            None => parent.max_age,
        };

        let preflight_content_type = match &directives.preflight_content_type {
            Some(ct) => {
                if ct.is_empty() || HeaderValue::from_str(ct).is_err() {
                    return Err(CorsConfigError::InvalidContentType { value: ct.clone() });
                }
                Arc::from(ct.as_str())
            }
            None => Arc::clone(&parent.preflight_content_type),
        };

        let preflight_body = match &directives.preflight_body {
            Some(body) => Arc::new(BodyTemplate::parse(body)?),
            None => Arc::clone(&parent.preflight_body),
        };

        Ok(PolicyConfig {
            enable: directives.enable.unwrap_or(parent.enable),
            origin_list: origins.list,
            method_list: methods.list,
            header_list: headers.list,
            expose_header_list,
            origin_unbounded: origins.unbounded.unwrap_or(parent.origin_unbounded),
            method_unbounded: methods.unbounded.unwrap_or(parent.method_unbounded),
            header_unbounded: headers.unbounded.unwrap_or(parent.header_unbounded),
            support_credential: directives
                .support_credential
                .unwrap_or(parent.support_credential),
            max_age,
            preflight_content_type,
            preflight_body,
        })
    }

    #[inline]
    #[must_use]
    pub fn allows_origin(&self, origin: &str) -> bool {
        self.origin_list.as_deref().is_some_and(|l| l.contains(origin))
    }

    #[inline]
    #[must_use]
    pub fn allows_method(&self, method: &str) -> bool {
        self.method_list.as_deref().is_some_and(|l| l.contains(method))
    }

    #[inline]
    #[must_use]
    pub fn allows_header(&self, header: &str) -> bool {
        self.header_list.as_deref().is_some_and(|l| l.contains(header))
    }

    /// Configured method values in order (empty when no list is configured).
    pub fn method_values(&self) -> impl Iterator<Item = &str> + Clone + '_ {
        self.method_list.iter().flat_map(|l| l.values())
    }

    pub fn header_values(&self) -> impl Iterator<Item = &str> + Clone + '_ {
        self.header_list.iter().flat_map(|l| l.values())
    }

    pub fn expose_header_values(&self) -> impl Iterator<Item = &str> + Clone + '_ {
        self.expose_header_list.iter().flat_map(|l| l.values())
    }

    #[must_use]
    pub fn has_expose_headers(&self) -> bool {
        self.expose_header_list.as_deref().is_some_and(|l| !l.is_empty())
    }
}
