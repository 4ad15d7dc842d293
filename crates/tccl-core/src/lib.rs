//! # tccl-core
//!
//! Core crate for the TCCL team library registry. Contains the unified
//! error system, coarse status codes, capability types, configuration
//! schemas, and tracing setup.
//!
//! This crate has **no** internal dependencies on other TCCL crates.

pub mod config;
pub mod error;
pub mod logging;
pub mod result;
pub mod status;
pub mod types;

pub use config::{MalformedNamePolicy, TcclConfig};
pub use error::AppError;
pub use result::AppResult;
pub use status::TcclStatus;
pub use types::{CapabilityDimension, CapabilityRequest, CapabilitySet};
