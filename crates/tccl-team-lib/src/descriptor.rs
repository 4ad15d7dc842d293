//! Loaded team library descriptors and their owning handle.

use std::fmt;
use std::path::{Path, PathBuf};

use tccl_core::types::CapabilitySet;
use tracing::debug;

use crate::loader::TeamLibModule;

/// A team library's teardown entry point.
pub struct Finalizer(Box<dyn FnOnce()>);

impl Finalizer {
    /// Wraps a teardown callback.
    pub fn new(f: impl FnOnce() + 'static) -> Self {
        Self(Box::new(f))
    }

    fn run(self) {
        (self.0)()
    }
}

impl fmt::Debug for Finalizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Finalizer(<fn>)")
    }
}

/// What a team library says about itself.
///
/// Capabilities are read once at load time and cannot change afterwards.
#[derive(Debug)]
pub struct TeamLibDescriptor {
    name: String,
    capabilities: CapabilitySet,
    finalizer: Option<Finalizer>,
}

impl TeamLibDescriptor {
    /// Creates a descriptor without a teardown entry point.
    pub fn new(name: impl Into<String>, capabilities: CapabilitySet) -> Self {
        Self {
            name: name.into(),
            capabilities,
            finalizer: None,
        }
    }

    /// Attaches a teardown entry point.
    pub fn with_finalizer(mut self, finalizer: Finalizer) -> Self {
        self.finalizer = Some(finalizer);
        self
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Supported capabilities.
    pub fn capabilities(&self) -> &CapabilitySet {
        &self.capabilities
    }
}

/// A loaded team library: its descriptor plus the module it came from.
///
/// The module handle is owned exclusively. Dropping a `TeamLib` runs the
/// teardown entry point and then unloads the module, exactly once.
pub struct TeamLib {
    descriptor: TeamLibDescriptor,
    symbol: String,
    path: PathBuf,
    module: Option<Box<dyn TeamLibModule>>,
}

impl TeamLib {
    /// Binds a resolved descriptor to the module that exported it.
    pub fn new(
        descriptor: TeamLibDescriptor,
        symbol: impl Into<String>,
        path: impl Into<PathBuf>,
        module: Box<dyn TeamLibModule>,
    ) -> Self {
        Self {
            descriptor,
            symbol: symbol.into(),
            path: path.into(),
            module: Some(module),
        }
    }

    /// Display name.
    pub fn name(&self) -> &str {
        self.descriptor.name()
    }

    /// Supported capabilities.
    pub fn capabilities(&self) -> &CapabilitySet {
        self.descriptor.capabilities()
    }

    /// The descriptor.
    pub fn descriptor(&self) -> &TeamLibDescriptor {
        &self.descriptor
    }

    /// The exported descriptor symbol.
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// The file the module was loaded from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Tears the team library down and unloads its module.
    pub fn unload(self) {
        drop(self);
    }

    fn release(&mut self) {
        if let Some(finalizer) = self.descriptor.finalizer.take() {
            debug!(team_lib = %self.descriptor.name, "Finalizing team library");
            finalizer.run();
        }
        if let Some(module) = self.module.take() {
            drop(module);
            debug!(
                team_lib = %self.descriptor.name,
                path = %self.path.display(),
                "Team library unloaded"
            );
        }
    }
}

impl Drop for TeamLib {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Debug for TeamLib {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TeamLib")
            .field("name", &self.descriptor.name)
            .field("capabilities", &self.descriptor.capabilities)
            .field("symbol", &self.symbol)
            .field("path", &self.path)
            .finish()
    }
}
