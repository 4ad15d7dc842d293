//! FFI ABI definitions for team libraries.
//!
//! A team library shipped as `tccl_team_lib_<name>.<ext>` must export a
//! static [`FfiTeamLib`] under the symbol `tccl_team_lib_<name>`.

use std::ffi::{c_char, c_int, c_void};

use tccl_core::types::CapabilitySet;

/// Capability masks as laid out in the exported record.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FfiTeamLibConfig {
    /// Reproducibility mask.
    pub reproducible: u64,
    /// Thread mode mask.
    pub thread_mode: u64,
    /// Team usage mask.
    pub team_usage: u64,
    /// Collective types mask.
    pub coll_types: u64,
}

impl From<FfiTeamLibConfig> for CapabilitySet {
    fn from(config: FfiTeamLibConfig) -> Self {
        Self {
            reproducible: config.reproducible,
            thread_mode: config.thread_mode,
            team_usage: config.team_usage,
            coll_types: config.coll_types,
        }
    }
}

/// Teardown entry point. Receives the library's own record; a non-zero
/// return reports a failed cleanup.
pub type FfiFinalizeFn = unsafe extern "C" fn(lib: *const FfiTeamLib) -> c_int;

/// The descriptor record exported by every team library.
#[repr(C)]
#[derive(Debug)]
pub struct FfiTeamLib {
    /// Reserved for the host. Rust hosts keep the module handle on their
    /// side and leave this null.
    pub dl_handle: *mut c_void,
    /// Display name (null-terminated).
    pub name: *const c_char,
    /// Supported capabilities.
    pub config: FfiTeamLibConfig,
    /// Teardown entry point, if the library needs one.
    pub finalize: Option<FfiFinalizeFn>,
}

// Exported records are immutable statics; the raw pointers only reference
// other statics of the same module.
unsafe impl Sync for FfiTeamLib {}
