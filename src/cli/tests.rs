//! Unit tests for CLI commands

use crate::cli::{check_request, describe_policy, parse_header_args, Cli, Commands};
use crate::logging::LogFormat;
use crate::policy::{parse_policies, ConfigFormat, PolicyConfigBuilder};
use clap::Parser;

#[test]
fn test_check_command_parses_headers() {
    let cli = Cli::try_parse_from([
        "cross-origin",
        "check",
        "--config",
        "cors.yaml",
        "-X",
        "OPTIONS",
        "-H",
        "Origin: https://a.com",
        "-H",
        "Access-Control-Request-Method: PUT",
    ])
    .unwrap();

    match cli.command {
        Commands::Check {
            config,
            scope,
            method,
            headers,
            ..
        } => {
            assert_eq!(config.to_string_lossy(), "cors.yaml");
            assert_eq!(scope, "");
            assert_eq!(method, "OPTIONS");
            assert_eq!(headers.len(), 2);
        }
        _ => panic!("Expected Check command"),
    }
}

#[test]
fn test_global_log_flags() {
    let cli = Cli::try_parse_from([
        "cross-origin",
        "validate",
        "--config",
        "cors.toml",
        "--log-format",
        "json",
        "--log-level",
        "debug",
    ])
    .unwrap();
    assert_eq!(cli.log_format, Some(LogFormat::Json));
    let config = cli.log_config();
    assert_eq!(config.format, LogFormat::Json);
    assert_eq!(config.log_level, "debug");
}

#[test]
fn test_config_is_required() {
    assert!(Cli::try_parse_from(["cross-origin", "watch"]).is_err());
}

#[test]
fn test_parse_header_args() {
    let headers =
        parse_header_args(&["Origin:https://a.com".to_string(), "X-A:  b c ".to_string()])
            .unwrap();
    assert_eq!(&*headers[0].0, "Origin");
    assert_eq!(headers[0].1, "https://a.com");
    assert_eq!(headers[1].1, "b c");

    assert!(parse_header_args(&["no colon".to_string()]).is_err());
    assert!(parse_header_args(&[": value".to_string()]).is_err());
}

#[test]
fn test_check_request_preflight() {
    let set = parse_policies(
        "cors: true\ncors_origin_list: [https://a.com]\ncors_method_list: [GET, DELETE]\n\
         cors_header_list: unbounded\ncors_support_credential: true\n",
        ConfigFormat::Yaml,
    )
    .unwrap();
    let res = check_request(
        &set,
        "",
        "OPTIONS",
        "/items/1",
        &[
            "Origin: https://a.com".to_string(),
            "Access-Control-Request-Method: DELETE".to_string(),
        ],
    )
    .unwrap();
    assert_eq!(res.status, 200);
    assert_eq!(res.get_header("Access-Control-Allow-Methods"), Some("GET, DELETE"));
    assert_eq!(res.get_header("Access-Control-Allow-Credentials"), Some("true"));
}

#[test]
fn test_check_request_rejects_bad_method() {
    let set = parse_policies("cors: true\n", ConfigFormat::Yaml).unwrap();
    assert!(check_request(&set, "", "BAD METHOD", "/", &[]).is_err());
}

#[test]
fn test_describe_policy() {
    let policy = PolicyConfigBuilder::new()
        .enable(true)
        .origin_list(&["https://a.com", "https://b.com"])
        .unbounded_headers()
        .build()
        .unwrap();
    let text = describe_policy("root", &policy);
    assert!(text.starts_with("[root]\n"));
    assert!(text.contains("  cors: on\n"));
    assert!(text.contains("  origins: https://a.com https://b.com\n"));
    assert!(text.contains("  methods: (none)\n"));
    assert!(text.contains("  headers: unbounded\n"));
}
