//! Loopback team library for teams with a single member.
//!
//! Every collective on a one-member team is a local copy, so this library
//! is reproducible, thread-agnostic, and covers every collective type.
//!
//! Built as a `cdylib`; install it as `tccl_team_lib_self.<ext>` in the
//! team library directory.

use std::ffi::c_int;
use std::sync::atomic::{AtomicUsize, Ordering};

use tccl_core::types::capability::{coll_types, reproducibility, team_usage, thread_mode};
use tccl_team_lib::ffi::FfiTeamLib;
use tccl_team_lib::team_lib_descriptor;

static FINALIZE_CALLS: AtomicUsize = AtomicUsize::new(0);

/// Number of times the host has finalized this library in this process.
pub fn finalize_calls() -> usize {
    FINALIZE_CALLS.load(Ordering::SeqCst)
}

/// C entry point for [`finalize_calls`], for hosts that open this library
/// dynamically.
#[unsafe(no_mangle)]
pub extern "C" fn tccl_team_lib_self_finalize_calls() -> usize {
    finalize_calls()
}

unsafe extern "C" fn self_finalize(_lib: *const FfiTeamLib) -> c_int {
    FINALIZE_CALLS.fetch_add(1, Ordering::SeqCst);
    tracing::debug!("tl-self finalized");
    0
}

team_lib_descriptor!(tccl_team_lib_self {
    name: "self",
    reproducible: reproducibility::REPRODUCIBLE,
    thread_mode: thread_mode::SINGLE | thread_mode::MULTIPLE,
    team_usage: team_usage::SW_COLLECTIVES,
    coll_types: coll_types::BARRIER
        | coll_types::BCAST
        | coll_types::ALLREDUCE
        | coll_types::REDUCE
        | coll_types::ALLTOALL
        | coll_types::ALLGATHER
        | coll_types::GATHER
        | coll_types::SCATTER,
    finalize: self_finalize,
});

#[cfg(test)]
mod tests {
    use super::*;
    use tccl_core::types::{CapabilityDimension, CapabilityRequest, CapabilitySet};
    use tccl_team_lib::ffi::safety::read_record;

    #[test]
    fn test_exported_record() {
        let (record, name) = unsafe { read_record(&tccl_team_lib_self) }.expect("record");
        assert_eq!(name, "self");
        assert!(record.dl_handle.is_null());

        let caps = CapabilitySet::from(record.config);
        assert_eq!(caps.reproducible, reproducibility::REPRODUCIBLE);
        let request = CapabilityRequest::any()
            .with(CapabilityDimension::ThreadMode, thread_mode::MULTIPLE)
            .with(CapabilityDimension::CollTypes, coll_types::ALLREDUCE);
        assert!(request.is_satisfied_by(&caps));
    }

    #[test]
    fn test_finalize_entry_point() {
        let finalize = tccl_team_lib_self.finalize.expect("finalize");
        let before = finalize_calls();
        let rc = unsafe { finalize(&tccl_team_lib_self) };
        assert_eq!(rc, 0);
        assert_eq!(finalize_calls(), before + 1);
    }
}
