//! Preflight (`OPTIONS`) evaluation.

use std::sync::Arc;

use http::{Method, StatusCode};
use tracing::debug;

use crate::header_text::join;
use crate::headers::{
    add_header, HeaderVec, RequestHeaders, ResponseHeaders, ACCESS_CONTROL_ALLOW_CREDENTIALS,
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
    ACCESS_CONTROL_MAX_AGE, ACCESS_CONTROL_REQUEST_HEADERS, ACCESS_CONTROL_REQUEST_METHOD, ORIGIN,
};
use crate::policy::{canonical_method, is_simple_method, is_simple_request_header, PolicyConfig};

use super::{CorsError, DeclineReason, PreflightDecision, PreflightResponse};

/// Append `Access-Control-Allow-Origin` and, when configured,
/// `Access-Control-Allow-Credentials`.
pub(super) fn add_origin_headers<R>(
    out: &mut R,
    policy: &PolicyConfig,
    origin: &str,
) -> Result<(), CorsError>
where
    R: ResponseHeaders + ?Sized,
{
    add_header(out, ACCESS_CONTROL_ALLOW_ORIGIN, origin)?;
    if policy.support_credential {
        add_header(out, ACCESS_CONTROL_ALLOW_CREDENTIALS, "true")?;
    }
    Ok(())
}

fn declined(reason: DeclineReason) -> Result<PreflightDecision, CorsError> {
    debug!(reason = %reason, "preflight declined");
    Ok(PreflightDecision::Declined(reason))
}

/// Decide a preflight request.
///
/// Every disqualifying check runs before any header is built, so a declined
/// request carries nothing. `Err` is returned only when building the
/// response itself fails.
pub fn evaluate_preflight<H>(
    policy: &PolicyConfig,
    method: &Method,
    headers: &H,
) -> Result<PreflightDecision, CorsError>
where
    H: RequestHeaders + ?Sized,
{
    if !policy.enable {
        return declined(DeclineReason::Disabled);
    }
    if method != Method::OPTIONS {
        return declined(DeclineReason::NotPreflight);
    }

    let Some(origin) = headers.header(ORIGIN) else {
        return declined(DeclineReason::MissingOrigin);
    };
    if !policy.origin_unbounded && !policy.allows_origin(origin) {
        return declined(DeclineReason::OriginNotAllowed);
    }

    let Some(requested_method) = headers.header(ACCESS_CONTROL_REQUEST_METHOD) else {
        return declined(DeclineReason::MissingRequestMethod);
    };
    if canonical_method(requested_method).is_none() {
        return declined(DeclineReason::UnknownMethod);
    }

    let requested_headers = headers.header_all(ACCESS_CONTROL_REQUEST_HEADERS);

    if !policy.method_unbounded && !policy.allows_method(requested_method) {
        return declined(DeclineReason::MethodNotAllowed);
    }

    if !policy.header_unbounded {
        let allowed = requested_headers
            .iter()
            .filter(|h| policy.allows_header(h))
            .count();
        if allowed == 0 {
            return declined(DeclineReason::NoAllowedHeader);
        }
    }

    let mut out = HeaderVec::new();
    add_origin_headers(&mut out, policy, origin)?;

    if policy.max_age != 0 {
        let max_age = policy.max_age.to_string();
        add_header(&mut out, ACCESS_CONTROL_MAX_AGE, &max_age)?;
    }

    if !is_simple_method(requested_method) {
        let methods = join(policy.method_values())?;
        add_header(&mut out, ACCESS_CONTROL_ALLOW_METHODS, &methods)?;
    }

    let simple_headers = requested_headers
        .iter()
        .all(|h| is_simple_request_header(h));
    if !simple_headers {
        let allowed = join(policy.header_values())?;
        add_header(&mut out, ACCESS_CONTROL_ALLOW_HEADERS, &allowed)?;
    } else if policy.header_unbounded && !requested_headers.is_empty() {
        for line in &requested_headers {
            add_header(&mut out, ACCESS_CONTROL_ALLOW_HEADERS, line)?;
        }
    }

    let body = policy.preflight_body.render(headers)?;

    debug!(
        origin = %origin,
        method = %requested_method,
        headers = out.len(),
        "preflight handled"
    );

    Ok(PreflightDecision::Handled(PreflightResponse {
        status: StatusCode::OK,
        content_type: Arc::clone(&policy.preflight_content_type),
        body,
        headers: out,
    }))
}

