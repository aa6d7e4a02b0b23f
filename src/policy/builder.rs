use super::directives::{Directives, ListDirective, MaxAgeDirective, UNBOUNDED};
use super::{CorsConfigError, PolicyConfig};

/// Builder for creating a [`PolicyConfig`] in code with a fluent API
///
/// Each method sets one directive. Directives left unset inherit from the
/// parent passed to [`build_with_parent`](Self::build_with_parent), or take
/// the defaults when built with [`build`](Self::build).
///
/// # Example
///
/// ```rust
/// use cross_origin::policy::PolicyConfigBuilder;
///
/// let policy = PolicyConfigBuilder::new()
///     .enable(true)
///     .origin_list(&["https://example.com"])
///     .method_list(&["GET", "PUT"])
///     .header_list(&["X-Requested-With"])
///     .support_credential(true)
///     .max_age(3600)
///     .build()
///     .expect("valid CORS policy");
///
/// assert!(policy.allows_origin("https://example.com"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct PolicyConfigBuilder {
    directives: Directives,
}

impl PolicyConfigBuilder {
    /// Create a builder with every directive unset
    pub fn new() -> Self {
        Self::default()
    }

    /// `cors on|off`
    pub fn enable(mut self, enable: bool) -> Self {
        self.directives.enable = Some(enable);
        self
    }

    /// Set allowed origins (exact, case-sensitive)
    ///
    /// Include `"unbounded"` to disable the origin check.
    pub fn origin_list(mut self, origins: &[&str]) -> Self {
        self.directives.origin_list = Some(ListDirective::from(origins));
        self
    }

    /// Set allowed request methods (exact, case-sensitive)
    pub fn method_list(mut self, methods: &[&str]) -> Self {
        self.directives.method_list = Some(ListDirective::from(methods));
        self
    }

    /// Set allowed request headers (case-insensitive)
    pub fn header_list(mut self, headers: &[&str]) -> Self {
        self.directives.header_list = Some(ListDirective::from(headers));
        self
    }

    /// Set headers exposed to scripts on actual responses
    ///
    /// Simple response headers are dropped when the policy is built.
    pub fn expose_header_list(mut self, headers: &[&str]) -> Self {
        self.directives.expose_header_list = Some(ListDirective::from(headers));
        self
    }

    /// Allow any origin
    pub fn unbounded_origins(mut self) -> Self {
        self.directives.origin_list = Some(ListDirective::from(&[UNBOUNDED][..]));
        self
    }

    /// Allow any request method
    pub fn unbounded_methods(mut self) -> Self {
        self.directives.method_list = Some(ListDirective::from(&[UNBOUNDED][..]));
        self
    }

    /// Allow any request header and echo requested headers back
    pub fn unbounded_headers(mut self) -> Self {
        self.directives.header_list = Some(ListDirective::from(&[UNBOUNDED][..]));
        self
    }

    /// Preflight cache duration in seconds
    pub fn max_age(mut self, seconds: u64) -> Self {
        self.directives.max_age = Some(MaxAgeDirective::Seconds(seconds));
        self
    }

    /// Preflight cache duration as a time string, e.g. `1h30m`
    pub fn max_age_str(mut self, value: &str) -> Self {
        self.directives.max_age = Some(MaxAgeDirective::Text(value.to_string()));
        self
    }

    pub fn support_credential(mut self, support: bool) -> Self {
        self.directives.support_credential = Some(support);
        self
    }

    pub fn preflight_content_type(mut self, content_type: &str) -> Self {
        self.directives.preflight_content_type = Some(content_type.to_string());
        self
    }

    /// Preflight response body template; may reference `origin`,
    /// `request_method` and `http.<name>`
    pub fn preflight_body(mut self, template: &str) -> Self {
        self.directives.preflight_body = Some(template.to_string());
        self
    }

    /// Resolve against the defaults
    ///
    /// # Errors
    ///
    /// Returns [`CorsConfigError`] if any directive is invalid.
    pub fn build(self) -> Result<PolicyConfig, CorsConfigError> {
        PolicyConfig::resolve(&self.directives, None)
    }

    /// Resolve against an enclosing scope's policy
    pub fn build_with_parent(self, parent: &PolicyConfig) -> Result<PolicyConfig, CorsConfigError> {
        PolicyConfig::resolve(&self.directives, Some(parent))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let policy = PolicyConfigBuilder::new().build().unwrap();
        assert!(!policy.enable);
        assert!(policy.method_list.is_none());
    }

    #[test]
    fn test_builder_sets_directives() {
        let policy = PolicyConfigBuilder::new()
            .enable(true)
            .origin_list(&["https://a.com"])
            .method_list(&["GET", "DELETE"])
            .max_age_str("10m")
            .preflight_content_type("application/json")
            .preflight_body("{\"origin\":\"{{ origin }}\"}")
            .build()
            .unwrap();
        assert!(policy.enable);
        assert!(policy.allows_origin("https://a.com"));
        assert_eq!(policy.method_values().collect::<Vec<_>>(), vec!["GET", "DELETE"]);
        assert_eq!(policy.max_age, 600);
        assert_eq!(&*policy.preflight_content_type, "application/json");
        assert!(!policy.preflight_body.is_empty());
    }

    #[test]
    fn test_builder_unbounded() {
        let policy = PolicyConfigBuilder::new()
            .unbounded_origins()
            .unbounded_methods()
            .unbounded_headers()
            .build()
            .unwrap();
        assert!(policy.origin_unbounded);
        assert!(policy.method_unbounded);
        assert!(policy.header_unbounded);
    }

    #[test]
    fn test_builder_with_parent() {
        let parent = PolicyConfigBuilder::new()
            .enable(true)
            .origin_list(&["https://a.com"])
            .build()
            .unwrap();
        let child = PolicyConfigBuilder::new()
            .support_credential(true)
            .build_with_parent(&parent)
            .unwrap();
        assert!(child.enable);
        assert!(child.support_credential);
        assert!(child.allows_origin("https://a.com"));
    }

    #[test]
    fn test_builder_rejects_empty_list() {
        let err = PolicyConfigBuilder::new().method_list(&[]).build().unwrap_err();
        assert_eq!(
            err,
            CorsConfigError::EmptyListDirective {
                directive: "cors_method_list"
            }
        );
    }
}
