//! Header augmentation for actual (non-preflight) responses.

use http::Method;
use tracing::debug;

use crate::header_text::{join, split};
use crate::headers::{add_header, HeaderVec, RequestHeaders, ACCESS_CONTROL_EXPOSE_HEADERS, ORIGIN};
use crate::policy::PolicyConfig;

use super::preflight::add_origin_headers;
use super::{CorsError, DeclineReason, FilterDecision};

/// `Origin` check for actual requests.
///
/// After a cross-origin redirect the browser may send several
/// space-separated origins; the request matches if any one of them does.
fn origin_matches(policy: &PolicyConfig, origin: &str) -> Result<bool, CorsError> {
    let tokens = split(origin, b' ')?;
    if tokens.is_empty() {
        return Ok(policy.allows_origin(origin));
    }
    Ok(tokens.iter().any(|token| policy.allows_origin(token)))
}

fn declined(reason: DeclineReason) -> Result<FilterDecision, CorsError> {
    debug!(reason = %reason, "response filter skipped");
    Ok(FilterDecision::Declined(reason))
}

/// Compute the CORS headers for an actual response.
///
/// The full raw `Origin` value is echoed even when only one of several
/// tokens matched.
pub fn evaluate_response<H>(
    policy: &PolicyConfig,
    method: &Method,
    headers: &H,
) -> Result<FilterDecision, CorsError>
where
    H: RequestHeaders + ?Sized,
{
    if !policy.enable {
        return declined(DeclineReason::Disabled);
    }
    if method == Method::OPTIONS {
        return declined(DeclineReason::Preflight);
    }

    let Some(origin) = headers.header(ORIGIN) else {
        return declined(DeclineReason::MissingOrigin);
    };
    if !policy.origin_unbounded && !origin_matches(policy, origin)? {
        return declined(DeclineReason::OriginNotAllowed);
    }

    let mut out = HeaderVec::new();
    add_origin_headers(&mut out, policy, origin)?;

    if policy.has_expose_headers() {
        let exposed = join(policy.expose_header_values())?;
        add_header(&mut out, ACCESS_CONTROL_EXPOSE_HEADERS, &exposed)?;
    }

    Ok(FilterDecision::Augmented(out))
}
