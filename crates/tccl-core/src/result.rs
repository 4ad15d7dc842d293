//! Convenience result type alias for TCCL.

use crate::error::AppError;

/// A specialized `Result` type for TCCL operations.
pub type AppResult<T> = Result<T, AppError>;
