//! C ABI shared between the loader and team libraries.

pub mod abi;
pub mod safety;

pub use abi::{FfiFinalizeFn, FfiTeamLib, FfiTeamLibConfig};
