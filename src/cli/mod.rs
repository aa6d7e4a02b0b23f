//! # CLI Module
//!
//! Command-line front end for the CORS engine.
//!
//! ## Commands
//!
//! ### `validate`
//!
//! Load a configuration file, resolve every scope and print the effective
//! policies:
//!
//! ```bash
//! cross-origin validate --config cors.yaml
//! ```
//!
//! ### `check`
//!
//! Evaluate one request against a configuration:
//!
//! ```bash
//! cross-origin check --config cors.yaml --scope api \
//!     -X OPTIONS \
//!     -H 'Origin: https://app.example.com' \
//!     -H 'Access-Control-Request-Method: PUT'
//! ```
//!
//! ### `watch`
//!
//! Keep a configuration loaded, reloading it whenever the file changes, until
//! SIGINT or SIGTERM:
//!
//! ```bash
//! cross-origin --log-format json watch --config cors.yaml
//! ```

mod commands;

#[cfg(test)]
mod tests;

pub use commands::{
    check_request, describe_policy, execute, parse_header_args, run_cli, Cli, Commands,
};
