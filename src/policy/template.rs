//! Preflight response body template.
//!
//! `cors_preflight_body` is compiled into a [`minijinja`] template when the
//! configuration loads and rendered per request from the request's headers.
//!
//! | variable | value |
//! |---|---|
//! | `origin` | raw `Origin` header |
//! | `request_method` | raw `Access-Control-Request-Method` header |
//! | `http.<name>` | first request header `<name>`, `_` read as `-` |
//!
//! Absent headers render as the empty string. Any other variable is
//! rejected at load time, as are syntax errors.

use std::collections::BTreeMap;

use minijinja::{context, Environment, UndefinedBehavior};
use tracing::warn;

use crate::headers::{RequestHeaders, ACCESS_CONTROL_REQUEST_METHOD, ORIGIN};
use crate::middleware::cors::CorsError;

use super::CorsConfigError;

const TEMPLATE_NAME: &str = "cors_preflight_body";

/// Compiled `cors_preflight_body`.
#[derive(Debug, Clone, Default)]
pub struct BodyTemplate {
    source: String,
    env: Option<Environment<'static>>,
    /// `(context key, header name)` for every `http.<name>` the template reads
    headers: Vec<(String, String)>,
}

impl PartialEq for BodyTemplate {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl Eq for BodyTemplate {}

/// Header read by an `http.<name>` variable, or an error for anything that
/// is not one of the three supported forms.
fn header_variable(name: &str) -> Result<Option<(String, String)>, CorsConfigError> {
    let unknown = || CorsConfigError::UnknownTemplateVariable {
        name: name.to_string(),
    };
    match name {
        "origin" | "request_method" => Ok(None),
        _ => match name.strip_prefix("http.") {
            Some(key) if !key.is_empty() && !key.contains('.') => Ok(Some((
                key.to_string(),
                key.replace('_', "-").to_ascii_lowercase(),
            ))),
            _ => Err(unknown()),
        },
    }
}

impl BodyTemplate {
    /// Compile a template source.
    pub fn parse(source: &str) -> Result<Self, CorsConfigError> {
        if source.is_empty() {
            return Ok(Self::default());
        }
        let invalid = |err: minijinja::Error| CorsConfigError::InvalidTemplate {
            template: source.to_string(),
            reason: err.to_string(),
        };

        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        env.set_keep_trailing_newline(true);
        env.add_template_owned(TEMPLATE_NAME, source.to_string())
            .map_err(invalid)?;

        let mut names: Vec<String> = env
            .get_template(TEMPLATE_NAME)
            .map_err(invalid)?
            .undeclared_variables(true)
            .into_iter()
            .collect();
        names.sort();

        let mut headers = Vec::new();
        for name in &names {
            if let Some(header) = header_variable(name)? {
                headers.push(header);
            }
        }

        let template = Self {
            source: source.to_string(),
            env: Some(env),
            headers,
        };
        // unknown filters and tests only surface when rendering
        template.render_with("", "", |_| None).map_err(invalid)?;
        Ok(template)
    }

    /// The template as written in the configuration.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.env.is_none()
    }

    fn render_with<'a, F>(
        &self,
        origin: &str,
        request_method: &str,
        lookup: F,
    ) -> Result<String, minijinja::Error>
    where
        F: Fn(&str) -> Option<&'a str>,
    {
        let Some(env) = &self.env else {
            return Ok(String::new());
        };
        let http: BTreeMap<&str, &str> = self
            .headers
            .iter()
            .map(|(key, header)| (key.as_str(), lookup(header).unwrap_or("")))
            .collect();
        env.get_template(TEMPLATE_NAME)?
            .render(context! { origin, request_method, http })
    }

    /// Render the body for one request.
    pub fn render<H>(&self, headers: &H) -> Result<String, CorsError>
    where
        H: RequestHeaders + ?Sized,
    {
        self.render_with(
            headers.header(ORIGIN).unwrap_or(""),
            headers.header(ACCESS_CONTROL_REQUEST_METHOD).unwrap_or(""),
            |name| headers.header(name),
        )
        .map_err(|err| {
            warn!(error = %err, "preflight body render failed");
            CorsError::TemplateRender {
                reason: err.to_string(),
            }
        })
    }
}
