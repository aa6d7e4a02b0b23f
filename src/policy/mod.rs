//! # Policy Module
//!
//! Configuration-time half of the CORS engine: per-scope directives, the
//! allow-list match sets they compile into, and the immutable
//! [`PolicyConfig`] each request is evaluated against.
//!
//! ## Lifecycle
//!
//! 1. **Parse** - a YAML/TOML/JSON file becomes a tree of [`ScopeDirectives`]
//! 2. **Resolve** - each scope is merged over its parent into a [`PolicyConfig`]
//! 3. **Serve** - the resulting [`PolicySet`] is shared read-only by every request
//!
//! All validation happens in step 2. A [`PolicySet`] that resolved without
//! error never fails at request time except on allocation or body rendering
//! failure.

mod builder;
mod config;
mod directives;
mod error;
mod load;
mod match_set;
mod method;
mod simple;
mod template;

pub use builder::PolicyConfigBuilder;
pub use config::{PolicyConfig, DEFAULT_PREFLIGHT_CONTENT_TYPE};
pub use directives::{
    parse_time_secs, CompiledList, Directives, ListDirective, MaxAgeDirective, UNBOUNDED,
};
pub use error::CorsConfigError;
pub use load::{load_policies, parse_policies, ConfigFormat, PolicySet, ScopeDirectives};
pub use match_set::{CaseMode, MatchSet};
pub use method::{canonical_method, METHOD_NAMES};
pub use simple::{
    is_simple, is_simple_method, is_simple_request_header, is_simple_response_header,
    SIMPLE_METHODS, SIMPLE_REQUEST_HEADERS, SIMPLE_RESPONSE_HEADERS,
};
pub use template::BodyTemplate;
