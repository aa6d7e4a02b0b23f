use std::sync::Arc;

use http::Method;

use super::*;
use crate::headers::{
    RequestHeaders, ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
    ACCESS_CONTROL_MAX_AGE,
};
use crate::policy::{PolicyConfig, PolicyConfigBuilder};

fn headers(lines: &[(&str, &str)]) -> HeaderVec {
    lines
        .iter()
        .map(|(k, v)| (Arc::<str>::from(*k), v.to_string()))
        .collect()
}

fn policy() -> PolicyConfig {
    PolicyConfigBuilder::new()
        .enable(true)
        .origin_list(&["https://a.com"])
        .method_list(&["GET", "PUT"])
        .header_list(&["X-Requested-With", "X-Trace"])
        .build()
        .unwrap()
}

fn handled(decision: PreflightDecision) -> PreflightResponse {
    match decision {
        PreflightDecision::Handled(r) => r,
        PreflightDecision::Declined(reason) => panic!("unexpected decline: {reason}"),
    }
}

#[test]
fn test_one_allowed_header_is_enough() {
    let req = headers(&[
        ("Origin", "https://a.com"),
        ("Access-Control-Request-Method", "PUT"),
        ("Access-Control-Request-Headers", "X-Unknown"),
        ("Access-Control-Request-Headers", "x-trace"),
    ]);
    let res = handled(evaluate_preflight(&policy(), &Method::OPTIONS, &req).unwrap());
    assert_eq!(
        res.headers.header(ACCESS_CONTROL_ALLOW_HEADERS),
        Some("X-Requested-With, X-Trace")
    );
    assert_eq!(res.headers.header(ACCESS_CONTROL_ALLOW_METHODS), Some("GET, PUT"));
}

#[test]
fn test_max_age_rendered_in_decimal() {
    let req = headers(&[
        ("Origin", "https://a.com"),
        ("Access-Control-Request-Method", "PUT"),
    ]);
    let res = handled(evaluate_preflight(&policy(), &Method::OPTIONS, &req).unwrap());
    assert!(res.headers.header(ACCESS_CONTROL_MAX_AGE).is_none());

    for (seconds, text) in [(86_400, "86400"), (u64::MAX, "18446744073709551615")] {
        let policy = PolicyConfigBuilder::new()
            .enable(true)
            .origin_list(&["https://a.com"])
            .method_list(&["PUT"])
            .max_age(seconds)
            .build()
            .unwrap();
        let res = handled(evaluate_preflight(&policy, &Method::OPTIONS, &req).unwrap());
        assert_eq!(res.headers.header(ACCESS_CONTROL_MAX_AGE), Some(text));
    }
}

#[test]
fn test_comma_list_is_one_candidate() {
    let req = headers(&[
        ("Origin", "https://a.com"),
        ("Access-Control-Request-Method", "PUT"),
        ("Access-Control-Request-Headers", "X-Requested-With, X-Trace"),
    ]);
    assert_eq!(
        evaluate_preflight(&policy(), &Method::OPTIONS, &req).unwrap(),
        PreflightDecision::Declined(DeclineReason::NoAllowedHeader)
    );
}

#[test]
fn test_unknown_method_declines() {
    for m in ["get", "PAT", "CONNECT", "FOO"] {
        let req = headers(&[
            ("Origin", "https://a.com"),
            ("Access-Control-Request-Method", m),
            ("Access-Control-Request-Headers", "X-Trace"),
        ]);
        assert_eq!(
            evaluate_preflight(&policy(), &Method::OPTIONS, &req).unwrap(),
            PreflightDecision::Declined(DeclineReason::UnknownMethod),
            "{m}"
        );
    }
}

#[test]
fn test_disabled_policy_declines_both() {
    let p = PolicyConfig::default();
    let req = headers(&[("Origin", "https://a.com")]);
    assert_eq!(
        evaluate_preflight(&p, &Method::OPTIONS, &req).unwrap(),
        PreflightDecision::Declined(DeclineReason::Disabled)
    );
    assert_eq!(
        evaluate_response(&p, &Method::GET, &req).unwrap(),
        FilterDecision::Declined(DeclineReason::Disabled)
    );
}

#[test]
fn test_filter_skips_options() {
    let req = headers(&[("Origin", "https://a.com")]);
    assert_eq!(
        evaluate_response(&policy(), &Method::OPTIONS, &req).unwrap(),
        FilterDecision::Declined(DeclineReason::Preflight)
    );
}

#[test]
fn test_filter_multi_origin_without_match() {
    let req = headers(&[("Origin", "https://c.com https://d.com")]);
    assert_eq!(
        evaluate_response(&policy(), &Method::GET, &req).unwrap(),
        FilterDecision::Declined(DeclineReason::OriginNotAllowed)
    );
}

#[test]
fn test_filter_unbounded_origin() {
    let p = PolicyConfigBuilder::new()
        .enable(true)
        .unbounded_origins()
        .build()
        .unwrap();
    let req = headers(&[("Origin", "https://anything.example")]);
    let FilterDecision::Augmented(out) = evaluate_response(&p, &Method::POST, &req).unwrap() else {
        panic!("expected headers");
    };
    assert_eq!(
        out.header("Access-Control-Allow-Origin"),
        Some("https://anything.example")
    );
    assert!(out.header("Access-Control-Expose-Headers").is_none());
}

#[test]
fn test_decline_reason_display() {
    assert_eq!(DeclineReason::MethodNotAllowed.to_string(), "method not allowed");
}
