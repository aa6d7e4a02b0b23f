//! # cross-origin
//!
//! **cross-origin** is a Cross-Origin Resource Sharing (CORS) policy engine for
//! HTTP request pipelines, configured with scoped `cors_*` directives.
//!
//! ## Overview
//!
//! Per request the engine decides whether a cross-origin call is allowed
//! under the policy of the request's configuration scope. It answers
//! preflight (`OPTIONS`) requests with a synthesized response and adds
//! `Access-Control-*` headers to every other response.
//!
//! ## Architecture
//!
//! - **[`policy`]** - Directives, scope tree resolution, match sets and the
//!   immutable [`PolicyConfig`](policy::PolicyConfig)
//! - **[`middleware`]** - The decision engine (`middleware::cors`) and the
//!   phase handler / header filter traits it plugs into
//! - **[`pipeline`]** - Request/response types and stage execution
//! - **[`headers`]** / **[`header_text`]** - Header access and value construction
//! - **[`hot_reload`]** - Atomically swapped policy store with file watching
//! - **[`logging`]** - `tracing` subscriber setup
//! - **[`cli`]** - The `cross-origin` command
//!
//! ### Request Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant Host
//!     participant Store as PolicyStore
//!     participant Pipe as Pipeline
//!     participant Pre as CorsPreflight
//!     participant Content as Content handler
//!     participant Filter as ResponseFilter
//!
//!     Host->>Store: policy_for(scope)
//!     Store-->>Host: Arc<PolicyConfig>
//!     Host->>Pipe: handle(request)
//!     Pipe->>Pre: before(request)
//!     alt OPTIONS and policy allows
//!         Pre-->>Pipe: Flow::Respond(200)
//!     else declined
//!         Pre-->>Pipe: Flow::Continue
//!         Pipe->>Content: request
//!         Content-->>Pipe: response
//!     end
//!     Pipe->>Filter: filter(request, response)
//!     Filter->>Filter: add Access-Control-* headers
//!     Filter-->>Pipe: next.filter(...)
//!     Pipe-->>Host: response
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use cross_origin::middleware::install_cors;
//! use cross_origin::pipeline::{HandlerRequest, Pipeline};
//! use cross_origin::policy::PolicyConfigBuilder;
//! use http::Method;
//! use smallvec::smallvec;
//!
//! let policy = PolicyConfigBuilder::new()
//!     .enable(true)
//!     .origin_list(&["https://app.example.com"])
//!     .method_list(&["GET", "PUT"])
//!     .unbounded_headers()
//!     .build()
//!     .expect("valid policy");
//!
//! let mut pipeline = Pipeline::new();
//! install_cors(&mut pipeline);
//!
//! let req = HandlerRequest::new(
//!     Method::OPTIONS,
//!     "/items/7",
//!     smallvec![
//!         (Arc::from("Origin"), "https://app.example.com".to_string()),
//!         (Arc::from("Access-Control-Request-Method"), "PUT".to_string()),
//!     ],
//!     Arc::new(policy),
//! );
//! let res = pipeline.handle(&req);
//! assert_eq!(res.status, 200);
//! assert_eq!(res.get_header("Access-Control-Allow-Methods"), Some("GET, PUT"));
//! ```
//!
//! ## Configuration
//!
//! ```yaml
//! cors: true
//! cors_origin_list: [https://app.example.com]
//! cors_method_list: GET POST
//! cors_header_list: unbounded
//! cors_max_age: 1h
//! scopes:
//!   api:
//!     cors_method_list: [GET, PUT, DELETE]
//!     cors_support_credential: true
//! ```
//!
//! See [`policy`] for every directive.

pub mod cli;
pub mod header_text;
pub mod headers;
pub mod hot_reload;
pub mod ids;
pub mod logging;
pub mod middleware;
pub mod pipeline;
pub mod policy;

pub use middleware::cors::{
    evaluate_preflight, evaluate_response, CorsError, DeclineReason, FilterDecision,
    PreflightDecision, PreflightResponse,
};
pub use policy::{load_policies, CorsConfigError, PolicyConfig, PolicySet};
