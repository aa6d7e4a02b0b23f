use std::fmt;

/// CORS configuration error
///
/// Returned while turning directives into a [`PolicyConfig`](super::PolicyConfig).
/// All of these are caught at load time; a configuration that resolves
/// successfully never produces a configuration error at request time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CorsConfigError {
    /// A list directive was given without any values
    EmptyListDirective {
        /// Directive name as written in the configuration
        directive: &'static str,
    },
    /// `cors_max_age` is not a valid number of seconds or time string
    InvalidMaxAge {
        /// The rejected value
        value: String,
    },
    /// The preflight content type cannot be sent as a header value
    InvalidContentType {
        /// The rejected value
        value: String,
    },
    /// The preflight body template does not compile
    InvalidTemplate {
        /// The template source
        template: String,
        /// Template engine message
        reason: String,
    },
    /// The preflight body template references a variable that does not exist
    UnknownTemplateVariable {
        /// Dotted variable path, e.g. `host` or `origin.scheme`
        name: String,
    },
    /// A nested scope name is empty or contains `/`
    InvalidScopeName {
        /// The rejected name
        name: String,
    },
    /// A key that is neither a known directive nor `scopes`
    UnknownDirective {
        /// The rejected key
        name: String,
    },
    /// An error inside a nested scope
    InScope {
        /// Slash-joined scope path, e.g. `api/v2`
        scope: String,
        source: Box<CorsConfigError>,
    },
}

impl CorsConfigError {
    /// Attach the scope path the error occurred in.
    pub(crate) fn in_scope(self, scope: &str) -> Self {
        match self {
            // keep the innermost path
            CorsConfigError::InScope { .. } => self,
            other => CorsConfigError::InScope {
                scope: scope.to_string(),
                source: Box::new(other),
            },
        }
    }
}

impl fmt::Display for CorsConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CorsConfigError::EmptyListDirective { directive } => {
                write!(
                    f,
                    "CORS configuration error: '{}' requires at least one value",
                    directive
                )
            }
            CorsConfigError::InvalidMaxAge { value } => {
                write!(
                    f,
                    "CORS configuration error: invalid cors_max_age '{}'. \
                    Expected seconds (e.g., 3600) or a time string (e.g., 1h30m)",
                    value
                )
            }
            CorsConfigError::InvalidContentType { value } => {
                write!(
                    f,
                    "CORS configuration error: invalid cors_preflight_content_type '{}'",
                    value
                )
            }
            CorsConfigError::InvalidTemplate { template, reason } => {
                write!(
                    f,
                    "CORS configuration error: invalid cors_preflight_body '{}': {}",
                    template, reason
                )
            }
            CorsConfigError::UnknownTemplateVariable { name } => {
                write!(
                    f,
                    "CORS configuration error: unknown variable '{}' in cors_preflight_body. \
                    Supported: origin, request_method, http.<header>",
                    name
                )
            }
            CorsConfigError::InvalidScopeName { name } => {
                write!(
                    f,
                    "CORS configuration error: invalid scope name '{}'. \
                    Scope names must be non-empty and must not contain '/'",
                    name
                )
            }
            CorsConfigError::UnknownDirective { name } => {
                write!(f, "CORS configuration error: unknown directive '{}'", name)
            }
            CorsConfigError::InScope { scope, source } => {
                write!(f, "{} (in scope '{}')", source, scope)
            }
        }
    }
}

impl std::error::Error for CorsConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CorsConfigError::InScope { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}
