//! Core type definitions used across the TCCL workspace.

pub mod capability;

pub use capability::{CapabilityDimension, CapabilityRequest, CapabilitySet};
