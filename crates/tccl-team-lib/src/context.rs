//! Top-level context: runs the resolve, discover, load, filter pipeline.

use std::path::{Path, PathBuf};

use tccl_core::config::TcclConfig;
use tracing::{error, info};

use crate::discovery;
use crate::error::{TeamLibError, TeamLibResult};
use crate::filter::{self, FilterReport};
use crate::loader::{DynamicLoader, ModuleLoader, load_all};
use crate::path::PathResolver;
use crate::registry::TeamLibRegistry;

/// An initialized TCCL library: the resolved search path plus every team
/// library that survived capability filtering.
///
/// Dropping the context finalizes and unloads every remaining team library.
#[derive(Debug)]
pub struct TcclLib {
    lib_path: PathBuf,
    registry: TeamLibRegistry,
    report: FilterReport,
}

impl TcclLib {
    /// Initializes from `config` with the default path resolver and the
    /// shared object loader.
    pub fn init(config: &TcclConfig) -> TeamLibResult<Self> {
        Self::init_with(config, &PathResolver::from_config(config), &DynamicLoader::new())
    }

    /// Initializes with an injected path resolver and module loader.
    pub fn init_with(
        config: &TcclConfig,
        resolver: &PathResolver,
        loader: &dyn ModuleLoader,
    ) -> TeamLibResult<Self> {
        let lib_path = resolver.resolve().inspect_err(|e| {
            error!(error = %e, "TCCL init: path resolution failed");
        })?;

        let mut registry = TeamLibRegistry::new();
        let candidates = discovery::discover(&lib_path)?;
        load_all(loader, candidates, config.malformed_names, &mut registry)?;

        if registry.is_empty() {
            let err = TeamLibError::NoPluginsFound { dir: lib_path };
            error!(error = %err, "TCCL init failed");
            return Err(err);
        }

        let loaded = registry.len();
        let report = filter::apply(&config.capabilities, &mut registry);

        if config.require_survivors && registry.is_empty() {
            let err = TeamLibError::NoPluginsFound { dir: lib_path };
            error!(error = %err, "TCCL init: no team library satisfies the capability request");
            return Err(err);
        }

        info!(
            path = %lib_path.display(),
            loaded = loaded,
            kept = report.kept,
            "TCCL initialized"
        );

        Ok(Self {
            lib_path,
            registry,
            report,
        })
    }

    /// The directory team libraries were loaded from.
    pub fn lib_path(&self) -> &Path {
        &self.lib_path
    }

    /// Surviving team libraries in discovery order.
    pub fn team_libs(&self) -> &TeamLibRegistry {
        &self.registry
    }

    /// Number of surviving team libraries.
    pub fn len(&self) -> usize {
        self.registry.len()
    }

    /// Whether no team library survived filtering.
    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    /// What the capability filter removed.
    pub fn filter_report(&self) -> &FilterReport {
        &self.report
    }
}
