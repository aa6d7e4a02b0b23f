use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, bail, Context};
use clap::{Parser, Subcommand};
use http::Method;
use tracing::info;

use crate::headers::HeaderVec;
use crate::hot_reload::{watch_config, PolicyStore};
use crate::logging::{init_logging, LogConfig, LogFormat};
use crate::middleware::install_cors;
use crate::pipeline::{HandlerRequest, HandlerResponse, Pipeline};
use crate::policy::{load_policies, MatchSet, PolicyConfig, PolicySet};

/// Command-line interface for the CORS policy engine
///
/// Validates configuration files and evaluates requests against them.
#[derive(Parser, Debug)]
#[command(name = "cross-origin")]
#[command(about = "CORS policy engine", long_about = None, version)]
pub struct Cli {
    /// Log level: trace, debug, info, warn, error (overrides CORS_LOG_LEVEL)
    #[arg(long, global = true, env = "CORS_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Log format: pretty or json (overrides CORS_LOG_FORMAT)
    #[arg(long, global = true, env = "CORS_LOG_FORMAT")]
    pub log_format: Option<LogFormat>,

    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Load a configuration file and print every scope's effective policy
    Validate {
        /// Path to the configuration file (YAML, TOML or JSON)
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Run one request through the CORS pipeline and print the response
    Check {
        /// Path to the configuration file (YAML, TOML or JSON)
        #[arg(short, long)]
        config: PathBuf,

        /// Scope path to evaluate in, e.g. `api/v2` (default: root)
        #[arg(short, long, default_value = "")]
        scope: String,

        /// Request method
        #[arg(short = 'X', long, default_value = "GET")]
        method: String,

        /// Request path, used for logging only
        #[arg(long, default_value = "/")]
        path: String,

        /// Request header as `Name: value`; repeat for more lines
        #[arg(short = 'H', long = "header")]
        headers: Vec<String>,
    },
    /// Watch a configuration file and reload it on change until interrupted
    Watch {
        /// Path to the configuration file (YAML, TOML or JSON)
        #[arg(short, long)]
        config: PathBuf,
    },
}

impl Cli {
    /// Logging configuration: environment first, then command-line flags.
    pub fn log_config(&self) -> LogConfig {
        let mut config = LogConfig::from_env();
        if let Some(level) = &self.log_level {
            config.log_level = level.clone();
        }
        if let Some(format) = self.log_format {
            config.format = format;
        }
        config
    }
}

/// Parse `Name: value` header arguments.
pub fn parse_header_args(args: &[String]) -> anyhow::Result<HeaderVec> {
    let mut headers = HeaderVec::new();
    for arg in args {
        let (name, value) = arg
            .split_once(':')
            .ok_or_else(|| anyhow!("invalid header '{arg}', expected 'Name: value'"))?;
        let name = name.trim();
        if name.is_empty() {
            bail!("invalid header '{arg}', empty name");
        }
        headers.push((Arc::from(name), value.trim().to_string()));
    }
    Ok(headers)
}

fn describe_list(list: Option<&MatchSet>, unbounded: bool) -> String {
    let values: Vec<&str> = list.map(|l| l.values().collect()).unwrap_or_default();
    match (unbounded, values.is_empty()) {
        (true, true) => "unbounded".to_string(),
        (true, false) => format!("unbounded ({})", values.join(" ")),
        (false, true) if list.is_some() => "(empty)".to_string(),
        (false, true) => "(none)".to_string(),
        (false, false) => values.join(" "),
    }
}

/// Human-readable summary of one resolved policy.
pub fn describe_policy(name: &str, policy: &PolicyConfig) -> String {
    let on_off = |b: bool| if b { "on" } else { "off" };
    let mut out = String::new();
    out.push_str(&format!("[{name}]\n"));
    out.push_str(&format!("  cors: {}\n", on_off(policy.enable)));
    out.push_str(&format!(
        "  origins: {}\n",
        describe_list(policy.origin_list.as_deref(), policy.origin_unbounded)
    ));
    out.push_str(&format!(
        "  methods: {}\n",
        describe_list(policy.method_list.as_deref(), policy.method_unbounded)
    ));
    out.push_str(&format!(
        "  headers: {}\n",
        describe_list(policy.header_list.as_deref(), policy.header_unbounded)
    ));
    out.push_str(&format!(
        "  expose headers: {}\n",
        describe_list(policy.expose_header_list.as_deref(), false)
    ));
    out.push_str(&format!("  credentials: {}\n", on_off(policy.support_credential)));
    out.push_str(&format!("  max age: {}s\n", policy.max_age));
    out.push_str(&format!(
        "  preflight content type: {}\n",
        policy.preflight_content_type
    ));
    if !policy.preflight_body.is_empty() {
        out.push_str(&format!(
            "  preflight body: {}\n",
            policy.preflight_body.source()
        ));
    }
    out
}

fn write_policies(out: &mut dyn Write, set: &PolicySet) -> anyhow::Result<()> {
    write!(out, "{}", describe_policy("root", set.root()))?;
    for (name, policy) in set.scopes() {
        write!(out, "{}", describe_policy(name, policy))?;
    }
    Ok(())
}

fn write_response(out: &mut dyn Write, res: &HandlerResponse) -> anyhow::Result<()> {
    writeln!(out, "status: {}", res.status)?;
    writeln!(out, "content-type: {}", res.content_type)?;
    for (name, value) in &res.headers {
        writeln!(out, "{name}: {value}")?;
    }
    if !res.body.is_empty() {
        writeln!(out)?;
        writeln!(out, "{}", res.body)?;
    }
    Ok(())
}

/// Build the request described by `check` arguments and run it through a
/// pipeline with the CORS engine installed.
pub fn check_request(
    set: &PolicySet,
    scope: &str,
    method: &str,
    path: &str,
    headers: &[String],
) -> anyhow::Result<HandlerResponse> {
    let method = Method::from_bytes(method.as_bytes())
        .with_context(|| format!("invalid method '{method}'"))?;
    let headers = parse_header_args(headers)?;

    let mut pipeline = Pipeline::new();
    install_cors(&mut pipeline);

    let req = HandlerRequest::new(method, path, headers, set.policy_for(scope)).with_scope(scope);
    Ok(pipeline.handle(&req))
}

#[cfg(unix)]
fn wait_for_shutdown() -> anyhow::Result<()> {
    use signal_hook::consts::{SIGINT, SIGTERM};
    use signal_hook::iterator::Signals;

    let mut signals = Signals::new([SIGINT, SIGTERM]).context("failed to install signal handlers")?;
    if let Some(sig) = signals.forever().next() {
        info!(signal = sig, "shutting down");
    }
    Ok(())
}

#[cfg(not(unix))]
fn wait_for_shutdown() -> anyhow::Result<()> {
    loop {
        std::thread::park();
    }
}

fn watch(config: &Path) -> anyhow::Result<()> {
    let store = Arc::new(PolicyStore::new(load_policies(config)?));
    info!(
        path = %config.display(),
        policies = store.snapshot().len(),
        "watching CORS configuration"
    );
    let _watcher = watch_config(config, Arc::clone(&store), |set| {
        info!(policies = set.len(), "CORS configuration reloaded");
    })
    .with_context(|| format!("failed to watch {}", config.display()))?;

    wait_for_shutdown()
}

/// Execute a parsed command, writing results to `out`.
pub fn execute(cli: &Cli, out: &mut dyn Write) -> anyhow::Result<()> {
    match &cli.command {
        Commands::Validate { config } => {
            let set = load_policies(config)?;
            write_policies(out, &set)?;
            writeln!(out, "ok: {} policies", set.len())?;
            Ok(())
        }
        Commands::Check {
            config,
            scope,
            method,
            path,
            headers,
        } => {
            let set = load_policies(config)?;
            let res = check_request(&set, scope, method, path, headers)?;
            write_response(out, &res)
        }
        Commands::Watch { config } => watch(config),
    }
}

/// Parse arguments, set up logging and run.
pub fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let _guard = init_logging(&cli.log_config())?;
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    execute(&cli, &mut out)
}
