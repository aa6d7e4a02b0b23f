//! CORS decision engine and its pipeline registrations.
//!
//! Two entry points, both pure functions of a [`PolicyConfig`] and the
//! request's headers:
//!
//! - [`evaluate_preflight`] answers `OPTIONS` preflight requests
//! - [`evaluate_response`] computes headers for every other response
//!
//! [`CorsPreflight`] and [`ResponseFilter`] wrap them as a phase handler and
//! a header filter; [`install_cors`] registers both on a [`Pipeline`].
//!
//! # Declines
//!
//! A request that does not qualify is *declined*: it continues through the
//! pipeline untouched and no CORS header is added. Declines are not errors
//! and are only visible at `debug` level.
//!
//! # Multi-token `Origin`
//!
//! On actual requests the `Origin` value may hold several space-separated
//! origins. The request matches if any token is allowed, and the whole raw
//! value is echoed back in `Access-Control-Allow-Origin`.

mod error;
mod filter;
mod preflight;

#[cfg(test)]
mod tests;

pub use error::CorsError;
pub use filter::evaluate_response;
pub use preflight::evaluate_preflight;

use std::fmt;
use std::sync::Arc;

use http::StatusCode;

use crate::headers::HeaderVec;
use crate::middleware::{Flow, HeaderFilter, Middleware};
use crate::pipeline::{HandlerRequest, HandlerResponse, Pipeline};

/// Why a request was left without CORS handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclineReason {
    /// `cors` is off for the request's scope
    Disabled,
    /// Preflight handler saw a method other than `OPTIONS`
    NotPreflight,
    /// Response filter saw an `OPTIONS` request
    Preflight,
    MissingOrigin,
    OriginNotAllowed,
    MissingRequestMethod,
    /// `Access-Control-Request-Method` is not a known method name
    UnknownMethod,
    MethodNotAllowed,
    /// None of the `Access-Control-Request-Headers` lines is allowed
    NoAllowedHeader,
}

impl DeclineReason {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            DeclineReason::Disabled => "cors disabled",
            DeclineReason::NotPreflight => "not a preflight request",
            DeclineReason::Preflight => "preflight request",
            DeclineReason::MissingOrigin => "missing Origin",
            DeclineReason::OriginNotAllowed => "origin not allowed",
            DeclineReason::MissingRequestMethod => "missing Access-Control-Request-Method",
            DeclineReason::UnknownMethod => "unknown method",
            DeclineReason::MethodNotAllowed => "method not allowed",
            DeclineReason::NoAllowedHeader => "no allowed header present",
        }
    }
}

impl fmt::Display for DeclineReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Synthesized answer to an accepted preflight request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreflightResponse {
    pub status: StatusCode,
    pub content_type: Arc<str>,
    pub body: String,
    pub headers: HeaderVec,
}

impl From<PreflightResponse> for HandlerResponse {
    fn from(p: PreflightResponse) -> Self {
        HandlerResponse {
            status: p.status.as_u16(),
            headers: p.headers,
            content_type: p.content_type,
            body: p.body,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreflightDecision {
    Handled(PreflightResponse),
    Declined(DeclineReason),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterDecision {
    /// Headers to append to the outgoing response
    Augmented(HeaderVec),
    Declined(DeclineReason),
}

/// Phase handler answering CORS preflight requests.
#[derive(Debug, Default, Clone, Copy)]
pub struct CorsPreflight;

impl Middleware for CorsPreflight {
    fn name(&self) -> &'static str {
        "cors_preflight"
    }

    fn before(&self, req: &HandlerRequest) -> Result<Flow, CorsError> {
        match evaluate_preflight(&req.policy, &req.method, req)? {
            PreflightDecision::Handled(response) => Ok(Flow::Respond(response.into())),
            PreflightDecision::Declined(_) => Ok(Flow::Continue),
        }
    }
}

/// Header filter adding CORS headers to actual responses.
///
/// Always forwards to the filter it was constructed with.
pub struct ResponseFilter {
    next: Arc<dyn HeaderFilter>,
}

impl ResponseFilter {
    pub fn new(next: Arc<dyn HeaderFilter>) -> Self {
        Self { next }
    }
}

impl HeaderFilter for ResponseFilter {
    fn filter(&self, req: &HandlerRequest, res: &mut HandlerResponse) -> Result<(), CorsError> {
        if let FilterDecision::Augmented(headers) =
            evaluate_response(&req.policy, &req.method, req)?
        {
            res.headers
                .try_reserve(headers.len())
                .map_err(|_| CorsError::Allocation {
                    what: "response header list",
                })?;
            res.headers.extend(headers);
        }
        self.next.filter(req, res)
    }
}

/// Register the preflight handler and the response filter.
pub fn install_cors(pipeline: &mut Pipeline) {
    pipeline.add_middleware(Arc::new(CorsPreflight));
    pipeline.push_header_filter(|next| Arc::new(ResponseFilter::new(next)));
}
