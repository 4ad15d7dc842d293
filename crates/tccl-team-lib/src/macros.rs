//! Convenience macros for team library development.

/// Declares the exported descriptor record of a team library.
///
/// The static must be named after the library's file stem, e.g.
/// `tccl_team_lib_self` for `tccl_team_lib_self.so`.
///
/// # Example
/// ```rust,ignore
/// team_lib_descriptor!(tccl_team_lib_ucx {
///     name: "ucx",
///     reproducible: reproducibility::NON_REPRODUCIBLE,
///     thread_mode: thread_mode::SINGLE | thread_mode::MULTIPLE,
///     team_usage: team_usage::SW_COLLECTIVES,
///     coll_types: coll_types::BARRIER | coll_types::ALLREDUCE,
///     finalize: ucx_finalize,
/// });
/// ```
#[macro_export]
macro_rules! team_lib_descriptor {
    (
        $symbol:ident {
            name: $name:literal,
            reproducible: $reproducible:expr,
            thread_mode: $thread_mode:expr,
            team_usage: $team_usage:expr,
            coll_types: $coll_types:expr
            $(, finalize: $finalize:expr)?
            $(,)?
        }
    ) => {
        #[unsafe(no_mangle)]
        #[allow(non_upper_case_globals)]
        pub static $symbol: $crate::ffi::FfiTeamLib = $crate::ffi::FfiTeamLib {
            dl_handle: ::std::ptr::null_mut(),
            name: concat!($name, "\0").as_ptr().cast(),
            config: $crate::ffi::FfiTeamLibConfig {
                reproducible: $reproducible,
                thread_mode: $thread_mode,
                team_usage: $team_usage,
                coll_types: $coll_types,
            },
            finalize: $crate::team_lib_descriptor!(@finalize $($finalize)?),
        };
    };
    (@finalize) => {
        None
    };
    (@finalize $finalize:expr) => {
        Some($finalize)
    };
}
