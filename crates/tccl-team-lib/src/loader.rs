//! Dynamic team library loader.
//!
//! Opening and resolving go through [`ModuleLoader`] and [`TeamLibModule`]
//! so the pipeline can run against real shared libraries
//! ([`DynamicLoader`]) or in-memory modules ([`crate::mock::MockLoader`]).
//! Closing a module is dropping it.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use tccl_core::config::MalformedNamePolicy;
use tccl_core::types::CapabilitySet;
use tracing::{error, info, warn};

use crate::descriptor::{Finalizer, TeamLib, TeamLibDescriptor};
use crate::error::{TeamLibError, TeamLibResult};
use crate::ffi::FfiTeamLib;
use crate::ffi::safety::read_record;
use crate::registry::TeamLibRegistry;

/// File name prefix shared by every team library, which is also the prefix
/// of its descriptor symbol.
pub const TEAM_LIB_PREFIX: &str = "tccl_team_lib_";

/// Opens candidate files as modules.
pub trait ModuleLoader {
    /// Opens the module at `path`.
    fn open(&self, path: &Path) -> TeamLibResult<Box<dyn TeamLibModule>>;
}

/// An opened module. Dropping it unloads the module.
pub trait TeamLibModule: fmt::Debug {
    /// Resolves the descriptor exported under `symbol`.
    fn resolve(&self, symbol: &str) -> TeamLibResult<TeamLibDescriptor>;
}

/// Derives the descriptor symbol from a candidate's file name.
///
/// `tccl_team_lib_foo.so` yields `tccl_team_lib_foo`. Only a missing
/// prefix is malformed: `tccl_team_lib_.so` yields the bare prefix, which
/// then fails to resolve like any other absent descriptor.
pub fn symbol_name(path: &Path) -> TeamLibResult<String> {
    let malformed = || TeamLibError::MalformedName {
        path: path.to_path_buf(),
    };

    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(malformed)?;
    let start = file_name.find(TEAM_LIB_PREFIX).ok_or_else(malformed)?;
    let stem = &file_name[start..];

    let extension = format!(".{}", std::env::consts::DLL_EXTENSION);
    let symbol = stem
        .strip_suffix(extension.as_str())
        .or_else(|| stem.rsplit_once('.').map(|(head, _)| head))
        .unwrap_or(stem);

    Ok(symbol.to_string())
}

/// Loads one candidate: derives its symbol, opens it, and resolves its
/// descriptor. The module is closed again on every error path.
pub fn load_team_lib(loader: &dyn ModuleLoader, path: &Path) -> TeamLibResult<TeamLib> {
    let symbol = symbol_name(path)?;
    let module = loader.open(path)?;
    let descriptor = module.resolve(&symbol)?;

    info!(
        team_lib = %descriptor.name(),
        symbol = %symbol,
        path = %path.display(),
        "Team library loaded"
    );

    Ok(TeamLib::new(descriptor, symbol, path, module))
}

/// Loads every candidate into `registry`.
///
/// Non-fatal failures (see [`TeamLibError::is_fatal`]) skip the candidate.
/// A malformed name aborts under [`MalformedNamePolicy::Abort`] and is
/// skipped otherwise; any other fatal error aborts.
pub fn load_all<I>(
    loader: &dyn ModuleLoader,
    candidates: I,
    policy: MalformedNamePolicy,
    registry: &mut TeamLibRegistry,
) -> TeamLibResult<()>
where
    I: IntoIterator<Item = PathBuf>,
{
    for path in candidates {
        match load_team_lib(loader, &path) {
            Ok(team_lib) => {
                if registry.find(team_lib.name()).is_some() {
                    warn!(team_lib = %team_lib.name(), "Duplicate team library name");
                }
                registry.push(team_lib);
            }
            Err(e) if !e.is_fatal() => {
                if matches!(e, TeamLibError::ModuleOpen { .. }) {
                    error!(path = %path.display(), error = %e, "Team library open failed");
                } else {
                    warn!(path = %path.display(), error = %e, "Team library descriptor unresolved");
                }
            }
            Err(TeamLibError::MalformedName { .. }) if policy == MalformedNamePolicy::Skip => {
                warn!(path = %path.display(), "Skipping malformed team library name");
            }
            Err(e) => {
                error!(path = %path.display(), error = %e, "Team library load aborted");
                return Err(e);
            }
        }
    }
    Ok(())
}

/// Serializes module open/close: the platform loader is process-global.
static LOADER_LOCK: Mutex<()> = Mutex::new(());

fn loader_lock() -> MutexGuard<'static, ()> {
    LOADER_LOCK.lock().unwrap_or_else(|e| e.into_inner())
}

/// Loads team libraries from shared objects via `libloading`.
#[derive(Debug, Default, Clone, Copy)]
pub struct DynamicLoader;

impl DynamicLoader {
    /// Creates a new dynamic loader.
    pub fn new() -> Self {
        Self
    }
}

impl ModuleLoader for DynamicLoader {
    // Opening runs the module's initializers; only trusted directories
    // should be searched.
    fn open(&self, path: &Path) -> TeamLibResult<Box<dyn TeamLibModule>> {
        let _guard = loader_lock();
        let library = unsafe { libloading::Library::new(path) }.map_err(|e| {
            TeamLibError::ModuleOpen {
                path: path.to_path_buf(),
                reason: e.to_string(),
            }
        })?;

        Ok(Box::new(DynamicModule {
            path: path.to_path_buf(),
            library: Some(library),
        }))
    }
}

/// A shared object opened by [`DynamicLoader`].
pub struct DynamicModule {
    path: PathBuf,
    library: Option<libloading::Library>,
}

impl DynamicModule {
    fn symbol_error(&self, symbol: &str, reason: impl Into<String>) -> TeamLibError {
        TeamLibError::SymbolResolution {
            path: self.path.clone(),
            symbol: symbol.to_string(),
            reason: reason.into(),
        }
    }
}

impl TeamLibModule for DynamicModule {
    fn resolve(&self, symbol: &str) -> TeamLibResult<TeamLibDescriptor> {
        let library = self
            .library
            .as_ref()
            .ok_or_else(|| self.symbol_error(symbol, "module already closed"))?;

        // The symbol is a data symbol: its address is the record.
        let record: *const FfiTeamLib = unsafe { library.get::<*const FfiTeamLib>(symbol.as_bytes()) }
            .map(|sym| *sym)
            .map_err(|e| self.symbol_error(symbol, e.to_string()))?;

        let (ffi, name) =
            unsafe { read_record(record) }.map_err(|reason| self.symbol_error(symbol, reason))?;

        let capabilities = CapabilitySet::from(ffi.config);
        let mut descriptor = TeamLibDescriptor::new(name.clone(), capabilities);

        if let Some(finalize) = ffi.finalize {
            descriptor = descriptor.with_finalizer(Finalizer::new(move || {
                // The owning TeamLib runs this before the module is closed.
                let rc = unsafe { finalize(record) };
                if rc != 0 {
                    warn!(team_lib = %name, code = rc, "Team library finalize failed");
                }
            }));
        }

        Ok(descriptor)
    }
}

impl Drop for DynamicModule {
    fn drop(&mut self) {
        if let Some(library) = self.library.take() {
            let _guard = loader_lock();
            if let Err(e) = library.close() {
                warn!(path = %self.path.display(), error = %e, "Failed to close team library");
            }
        }
    }
}

impl fmt::Debug for DynamicModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DynamicModule")
            .field("path", &self.path)
            .field("open", &self.library.is_some())
            .finish()
    }
}
