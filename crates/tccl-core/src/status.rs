//! Coarse status codes returned across the C boundary.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Success/failure signal with the granularity of the C API.
///
/// Rich error detail lives in [`AppError`]; this is what a C caller sees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(i32)]
pub enum TcclStatus {
    /// The operation succeeded.
    Ok = 0,
    /// The operation failed; details were logged.
    ErrNoMessage = -1,
}

impl TcclStatus {
    /// Collapses any result into its coarse status.
    pub fn of<T, E>(result: &Result<T, E>) -> Self {
        match result {
            Ok(_) => Self::Ok,
            Err(_) => Self::ErrNoMessage,
        }
    }

    /// Whether this status signals success.
    pub fn is_ok(self) -> bool {
        self == Self::Ok
    }

    /// The raw integer code.
    pub fn code(self) -> i32 {
        self as i32
    }
}

impl From<&AppError> for TcclStatus {
    fn from(_: &AppError) -> Self {
        Self::ErrNoMessage
    }
}

impl fmt::Display for TcclStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ok => write!(f, "TCCL_OK"),
            Self::ErrNoMessage => write!(f, "TCCL_ERR_NO_MESSAGE"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_of_result() {
        let ok: Result<u32, AppError> = Ok(1);
        let err: Result<u32, AppError> = Err(AppError::internal("boom"));
        assert_eq!(TcclStatus::of(&ok), TcclStatus::Ok);
        assert_eq!(TcclStatus::of(&err), TcclStatus::ErrNoMessage);
        assert!(TcclStatus::Ok.is_ok());
        assert_eq!(TcclStatus::ErrNoMessage.code(), -1);
    }
}
