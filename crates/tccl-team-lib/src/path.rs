//! Team library search path resolution.
//!
//! A [`PathResolver`] consults an ordered chain of [`LibPathProvider`]
//! strategies and returns the first directory any of them yields. The
//! embedding application decides which strategies run; the default chain
//! is the configured override followed by process module introspection.

use std::fmt;
use std::path::{Path, PathBuf};

use tccl_core::config::TcclConfig;
use tracing::{debug, info};

use crate::error::{TeamLibError, TeamLibResult};

/// File name marker of the core library among the process's modules.
pub const CORE_LIBRARY_MARKER: &str = "libtccl.so";

/// Directory appended to the core library's directory.
pub const TEAM_LIB_SUBDIR: &str = "tccl";

/// A strategy that may know where team libraries live.
pub trait LibPathProvider: fmt::Debug {
    /// Short name for diagnostics.
    fn name(&self) -> &'static str;

    /// The search directory, if this strategy can determine one.
    fn lib_path(&self) -> Option<PathBuf>;
}

/// An externally supplied directory, used verbatim.
#[derive(Debug, Clone)]
pub struct OverridePath(Option<PathBuf>);

impl OverridePath {
    /// Creates a provider from an optional override.
    pub fn new(path: Option<PathBuf>) -> Self {
        Self(path)
    }
}

impl LibPathProvider for OverridePath {
    fn name(&self) -> &'static str {
        "override"
    }

    fn lib_path(&self) -> Option<PathBuf> {
        self.0.clone()
    }
}

/// Derives the search directory from the location of the core library
/// mapped into the running process.
#[derive(Debug, Clone)]
pub struct ProcessModules {
    /// Substring identifying the core library's file name.
    marker: String,
    /// Directory appended to the core library's directory.
    suffix: String,
}

impl ProcessModules {
    /// Creates a provider with a custom marker and suffix.
    pub fn new(marker: impl Into<String>, suffix: impl Into<String>) -> Self {
        Self {
            marker: marker.into(),
            suffix: suffix.into(),
        }
    }

    /// Picks the first module whose file name contains the marker and
    /// returns its directory joined with the suffix.
    ///
    /// The first match wins. `/proc/self/maps` lists mappings in address
    /// order, so a core library mapped from several paths resolves to the
    /// lowest-addressed one rather than whichever the platform loader
    /// reports last.
    pub fn derive<I, P>(&self, modules: I) -> Option<PathBuf>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        modules.into_iter().find_map(|module| {
            let module = module.as_ref();
            let file_name = module.file_name()?.to_str()?;
            if !file_name.contains(&self.marker) {
                return None;
            }
            let dir = module.parent()?;
            debug!(module = %module.display(), "Found core library module");
            Some(dir.join(&self.suffix))
        })
    }
}

impl Default for ProcessModules {
    fn default() -> Self {
        Self::new(CORE_LIBRARY_MARKER, TEAM_LIB_SUBDIR)
    }
}

impl LibPathProvider for ProcessModules {
    fn name(&self) -> &'static str {
        "process-modules"
    }

    fn lib_path(&self) -> Option<PathBuf> {
        self.derive(loaded_modules())
    }
}

/// Paths of the file-backed modules mapped into this process.
#[cfg(target_os = "linux")]
pub fn loaded_modules() -> Vec<PathBuf> {
    let maps = match std::fs::read_to_string("/proc/self/maps") {
        Ok(maps) => maps,
        Err(e) => {
            debug!(error = %e, "Cannot read /proc/self/maps");
            return Vec::new();
        }
    };

    let mut modules: Vec<PathBuf> = Vec::new();
    for line in maps.lines() {
        // address perms offset dev inode pathname
        let Some(start) = line.find('/') else {
            continue;
        };
        let path = PathBuf::from(line[start..].trim_end());
        if modules.last() != Some(&path) {
            modules.push(path);
        }
    }
    modules
}

/// Paths of the file-backed modules mapped into this process.
#[cfg(not(target_os = "linux"))]
pub fn loaded_modules() -> Vec<PathBuf> {
    Vec::new()
}

/// Resolves the team library search directory from a chain of providers.
#[derive(Debug)]
pub struct PathResolver {
    providers: Vec<Box<dyn LibPathProvider>>,
}

impl PathResolver {
    /// Creates a resolver consulting `providers` in order.
    pub fn new(providers: Vec<Box<dyn LibPathProvider>>) -> Self {
        Self { providers }
    }

    /// The default chain: the configured override, then process modules.
    pub fn from_config(config: &TcclConfig) -> Self {
        Self::new(vec![
            Box::new(OverridePath::new(config.team_lib_path.clone())),
            Box::new(ProcessModules::default()),
        ])
    }

    /// Returns the first directory any provider yields.
    pub fn resolve(&self) -> TeamLibResult<PathBuf> {
        for provider in &self.providers {
            if let Some(path) = provider.lib_path() {
                info!(
                    provider = provider.name(),
                    path = %path.display(),
                    "Resolved team library path"
                );
                return Ok(path);
            }
            debug!(provider = provider.name(), "Provider yielded no path");
        }

        let tried = self
            .providers
            .iter()
            .map(|p| p.name())
            .collect::<Vec<_>>()
            .join(", ");
        Err(TeamLibError::PathResolution { tried })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_override_wins_verbatim() {
        let resolver = PathResolver::new(vec![
            Box::new(OverridePath::new(Some(PathBuf::from("relative/../tl")))),
            Box::new(OverridePath::new(Some(PathBuf::from("/never")))),
        ]);
        assert_eq!(resolver.resolve().expect("path"), PathBuf::from("relative/../tl"));
    }

    #[test]
    fn test_falls_through_empty_providers() {
        let resolver = PathResolver::new(vec![
            Box::new(OverridePath::new(None)),
            Box::new(OverridePath::new(Some(PathBuf::from("/opt/tl")))),
        ]);
        assert_eq!(resolver.resolve().expect("path"), PathBuf::from("/opt/tl"));
    }

    #[test]
    fn test_no_provider_yields_path() {
        let resolver = PathResolver::new(vec![
            Box::new(OverridePath::new(None)),
            Box::new(ProcessModules::new("libdefinitely-not-loaded-tccl.so", "tccl")),
        ]);
        match resolver.resolve() {
            Err(TeamLibError::PathResolution { tried }) => {
                assert_eq!(tried, "override, process-modules");
            }
            other => panic!("expected PathResolution, got {other:?}"),
        }
    }

    #[test]
    fn test_derive_from_core_library_location() {
        let provider = ProcessModules::default();
        let modules = [
            "/usr/lib/x86_64-linux-gnu/libc.so.6",
            "/opt/tccl/lib/libtccl.so.0.0.0",
            "/opt/other/lib/libtccl.so",
        ];
        assert_eq!(
            provider.derive(modules),
            Some(PathBuf::from("/opt/tccl/lib/tccl"))
        );
    }

    #[test]
    fn test_derive_matches_file_name_only() {
        let provider = ProcessModules::default();
        let modules = ["/home/libtccl.so/lib/libc.so.6"];
        assert_eq!(provider.derive(modules), None);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_loaded_modules_lists_test_binary() {
        let exe = std::env::current_exe().expect("current exe");
        let modules = loaded_modules();
        assert!(!modules.is_empty());
        let exe_name = exe.file_name().expect("file name");
        assert!(modules.iter().any(|m| m.file_name() == Some(exe_name)));
    }
}
