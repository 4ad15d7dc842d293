//! # tccl-team-lib
//!
//! Team library registry for TCCL. Provides:
//!
//! - Search path resolution through injectable providers
//! - Discovery of `tccl_team_lib_<name>` shared objects
//! - Dynamic loading via `libloading` with exactly-once teardown
//! - Capability filtering of the loaded set
//! - The C ABI and export macro for team library authors

pub mod context;
pub mod descriptor;
pub mod discovery;
pub mod error;
pub mod ffi;
pub mod filter;
pub mod loader;
pub mod macros;
pub mod mock;
pub mod path;
pub mod registry;

pub use context::TcclLib;
pub use descriptor::{Finalizer, TeamLib, TeamLibDescriptor};
pub use error::{TeamLibError, TeamLibResult};
pub use filter::FilterReport;
pub use loader::{DynamicLoader, ModuleLoader, TeamLibModule};
pub use path::{LibPathProvider, OverridePath, PathResolver, ProcessModules};
pub use registry::TeamLibRegistry;
