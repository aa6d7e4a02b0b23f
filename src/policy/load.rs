//! Configuration files and the resolved scope tree.
//!
//! A file holds the root scope's directives plus optional nested `scopes`:
//!
//! ```yaml
//! cors: true
//! cors_origin_list: [https://app.example.com]
//! cors_method_list: [GET, POST]
//! scopes:
//!   api:
//!     cors_method_list: [GET, PUT, DELETE]
//!     scopes:
//!       v2:
//!         cors_support_credential: true
//! ```
//!
//! Scopes resolve top-down and are addressed by slash-joined path (`api`,
//! `api/v2`).

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::directives::Directives;
use super::{CorsConfigError, PolicyConfig};

/// One scope as written in a configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScopeDirectives {
    #[serde(flatten)]
    pub directives: Directives,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub scopes: BTreeMap<String, ScopeDirectives>,
    /// Keys that are not directives; rejected at resolve time
    #[serde(flatten, skip_serializing)]
    unknown: BTreeMap<String, IgnoredAny>,
}

impl ScopeDirectives {
    pub fn new(directives: Directives) -> Self {
        Self {
            directives,
            ..Default::default()
        }
    }

    /// Add a nested scope.
    pub fn with_scope(mut self, name: impl Into<String>, scope: ScopeDirectives) -> Self {
        self.scopes.insert(name.into(), scope);
        self
    }
}

/// Every resolved policy of one configuration generation.
#[derive(Debug, Clone)]
pub struct PolicySet {
    root: Arc<PolicyConfig>,
    scopes: BTreeMap<String, Arc<PolicyConfig>>,
}

impl Default for PolicySet {
    fn default() -> Self {
        Self {
            root: Arc::new(PolicyConfig::default()),
            scopes: BTreeMap::new(),
        }
    }
}

impl PolicySet {
    /// Resolve a scope tree into policies.
    pub fn resolve(tree: &ScopeDirectives) -> Result<Self, CorsConfigError> {
        check_keys(tree)?;
        let root = Arc::new(PolicyConfig::resolve(&tree.directives, None)?);
        let mut scopes = BTreeMap::new();
        resolve_children(tree, &root, "", &mut scopes)?;
        Ok(Self { root, scopes })
    }

    /// Wrap a single policy as the root of an otherwise empty tree.
    pub fn single(policy: PolicyConfig) -> Self {
        Self {
            root: Arc::new(policy),
            scopes: BTreeMap::new(),
        }
    }

    #[inline]
    #[must_use]
    pub fn root(&self) -> &Arc<PolicyConfig> {
        &self.root
    }

    /// Policy for a scope path, falling back to the nearest configured
    /// ancestor and finally the root.
    #[must_use]
    pub fn policy_for(&self, scope: &str) -> Arc<PolicyConfig> {
        let mut path = scope.trim_matches('/');
        while !path.is_empty() {
            if let Some(policy) = self.scopes.get(path) {
                return Arc::clone(policy);
            }
            path = match path.rsplit_once('/') {
                Some((parent, _)) => parent,
                None => "",
            };
        }
        Arc::clone(&self.root)
    }

    /// Configured scope paths and their policies, sorted by path.
    pub fn scopes(&self) -> impl Iterator<Item = (&str, &Arc<PolicyConfig>)> {
        self.scopes.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of policies including the root
    #[must_use]
    pub fn len(&self) -> usize {
        self.scopes.len() + 1
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }
}

fn check_keys(scope: &ScopeDirectives) -> Result<(), CorsConfigError> {
    match scope.unknown.keys().next() {
        Some(name) => Err(CorsConfigError::UnknownDirective { name: name.clone() }),
        None => Ok(()),
    }
}

fn resolve_children(
    scope: &ScopeDirectives,
    parent: &PolicyConfig,
    prefix: &str,
    out: &mut BTreeMap<String, Arc<PolicyConfig>>,
) -> Result<(), CorsConfigError> {
    for (name, child) in &scope.scopes {
        if name.is_empty() || name.contains('/') {
            return Err(CorsConfigError::InvalidScopeName { name: name.clone() });
        }
        let path = if prefix.is_empty() {
            name.clone()
        } else {
            format!("{prefix}/{name}")
        };

        check_keys(child).map_err(|e| e.in_scope(&path))?;
        let policy = PolicyConfig::resolve(&child.directives, Some(parent))
            .map_err(|e| e.in_scope(&path))?;
        debug!(scope = %path, enable = policy.enable, "resolved CORS scope");

        let policy = Arc::new(policy);
        resolve_children(child, &policy, &path, out)?;
        out.insert(path, policy);
    }
    Ok(())
}

/// Configuration file syntax, chosen by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Yaml,
    Toml,
    Json,
}

impl ConfigFormat {
    /// `.yaml`/`.yml` are YAML, `.toml` is TOML, anything else JSON.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml" | "yml") => ConfigFormat::Yaml,
            Some("toml") => ConfigFormat::Toml,
            _ => ConfigFormat::Json,
        }
    }
}

/// Parse configuration text and resolve every scope.
pub fn parse_policies(text: &str, format: ConfigFormat) -> anyhow::Result<PolicySet> {
    let tree: ScopeDirectives = match format {
        ConfigFormat::Yaml => serde_yaml::from_str(text).context("invalid YAML configuration")?,
        ConfigFormat::Toml => toml::from_str(text).context("invalid TOML configuration")?,
        ConfigFormat::Json => serde_json::from_str(text).context("invalid JSON configuration")?,
    };
    Ok(PolicySet::resolve(&tree)?)
}

/// Load a configuration file and resolve every scope.
pub fn load_policies(path: impl AsRef<Path>) -> anyhow::Result<PolicySet> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read CORS configuration {}", path.display()))?;
    parse_policies(&text, ConfigFormat::from_path(path))
        .with_context(|| format!("failed to load CORS configuration {}", path.display()))
}
