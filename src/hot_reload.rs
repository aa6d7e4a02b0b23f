//! # Hot Reload Module
//!
//! Live reloading of the CORS configuration file.
//!
//! ## Overview
//!
//! [`PolicyStore`] holds the active [`PolicySet`] generation. Requests take a
//! snapshot when they are dispatched and keep it until they finish, so a
//! reload never changes the policy under a request that is already running.
//!
//! [`watch_config`] watches the file and, on every modify or create event:
//!
//! 1. **Parse** - the file is loaded and every scope resolved
//! 2. **Swap** - the new generation replaces the old one atomically
//! 3. **Hook** - the caller's callback sees the new generation
//!
//! ## Error Handling
//!
//! If the new file fails to parse or resolve, the error is logged and the
//! previous generation stays active.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use cross_origin::hot_reload::{watch_config, PolicyStore};
//! use cross_origin::policy::load_policies;
//! use std::sync::Arc;
//!
//! let store = Arc::new(PolicyStore::new(load_policies("cors.yaml")?));
//! let _watcher = watch_config("cors.yaml", Arc::clone(&store), |set| {
//!     println!("reloaded {} policies", set.len());
//! })?;
//! # Ok::<(), anyhow::Error>(())
//! ```

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use arc_swap::ArcSwap;
use notify::{Config, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tracing::{error, info, warn};

use crate::policy::{load_policies, PolicyConfig, PolicySet};

/// Atomically swappable holder of the active policy generation.
#[derive(Debug)]
pub struct PolicyStore {
    current: ArcSwap<PolicySet>,
    generation: AtomicU64,
}

impl Default for PolicyStore {
    fn default() -> Self {
        Self::new(PolicySet::default())
    }
}

impl PolicyStore {
    pub fn new(set: PolicySet) -> Self {
        Self {
            current: ArcSwap::from_pointee(set),
            generation: AtomicU64::new(1),
        }
    }

    /// Current generation. Holders keep it alive across later swaps.
    #[inline]
    #[must_use]
    pub fn snapshot(&self) -> Arc<PolicySet> {
        self.current.load_full()
    }

    /// Policy a request in `scope` should be evaluated against.
    #[must_use]
    pub fn policy_for(&self, scope: &str) -> Arc<PolicyConfig> {
        self.current.load().policy_for(scope)
    }

    /// Install a new generation; returns its number.
    pub fn replace(&self, set: PolicySet) -> u64 {
        self.current.store(Arc::new(set));
        self.generation.fetch_add(1, Ordering::AcqRel) + 1
    }

    /// Number of generations installed so far, starting at 1
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }
}

/// Reload `path` into `store`.
///
/// On failure the store is left unchanged.
pub fn reload(path: &Path, store: &PolicyStore) -> anyhow::Result<u64> {
    let set = load_policies(path)?;
    let policies = set.len();
    let generation = store.replace(set);
    info!(
        path = %path.display(),
        generation,
        policies,
        "hot-reload: applied CORS configuration"
    );
    Ok(generation)
}

/// Watch a configuration file and swap `store` when it changes.
///
/// `on_reload` runs after each successful swap. The watcher stops when the
/// returned value is dropped.
pub fn watch_config<P, F>(
    config_path: P,
    store: Arc<PolicyStore>,
    mut on_reload: F,
) -> notify::Result<RecommendedWatcher>
where
    P: AsRef<Path>,
    F: FnMut(&PolicySet) + Send + 'static,
{
    let path: PathBuf = config_path.as_ref().to_path_buf();
    let watch_path = path.clone();

    let mut watcher = RecommendedWatcher::new(
        move |res: Result<notify::Event, notify::Error>| match res {
            Ok(event) => {
                if matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_)) {
                    match reload(&watch_path, &store) {
                        Ok(_) => on_reload(&store.snapshot()),
                        Err(e) => error!(
                            path = %watch_path.display(),
                            error = %format!("{e:#}"),
                            "hot-reload: keeping previous CORS configuration"
                        ),
                    }
                }
            }
            Err(e) => warn!(error = %e, "hot-reload: watch error"),
        },
        Config::default(),
    )?;

    watcher.watch(&path, RecursiveMode::NonRecursive)?;
    Ok(watcher)
}
