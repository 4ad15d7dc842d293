//! Error taxonomy for team library initialization.

use std::path::PathBuf;

use tccl_core::error::AppError;
use thiserror::Error;

/// Errors raised while resolving, discovering, loading, or filtering team
/// libraries.
#[derive(Debug, Error)]
pub enum TeamLibError {
    /// No provider yielded a search directory.
    #[error("Failed to get tccl library path (tried: {tried}). Set TCCL_TEAM_LIB_PATH")]
    PathResolution {
        /// Comma separated provider names that were consulted.
        tried: String,
    },

    /// Discovery and loading produced no team library.
    #[error("Couldn't find any tccl_team_lib_<name> plugins in {}", .dir.display())]
    NoPluginsFound {
        /// The searched directory.
        dir: PathBuf,
    },

    /// A candidate's file name lacks the team library prefix.
    #[error("Team library file name is malformed: {}", .path.display())]
    MalformedName {
        /// The offending candidate.
        path: PathBuf,
    },

    /// The dynamic module could not be opened.
    #[error(
        "Failed to load TCCL team library {}: {reason}. Check TCCL_TEAM_LIB_PATH or LD_LIBRARY_PATH",
        .path.display()
    )]
    ModuleOpen {
        /// The candidate path.
        path: PathBuf,
        /// Loader-provided reason.
        reason: String,
    },

    /// The descriptor symbol was missing or unusable.
    #[error("Team library {} has no usable descriptor '{symbol}': {reason}", .path.display())]
    SymbolResolution {
        /// The candidate path.
        path: PathBuf,
        /// The expected descriptor symbol.
        symbol: String,
        /// Why resolution failed.
        reason: String,
    },

    /// The discovery pattern could not be built.
    #[error("Invalid discovery pattern '{pattern}': {reason}")]
    Discovery {
        /// The glob pattern.
        pattern: String,
        /// Parser message.
        reason: String,
    },
}

impl TeamLibError {
    /// Whether this error aborts initialization as a whole.
    ///
    /// `MalformedName` is reported as fatal; callers may downgrade it via
    /// [`tccl_core::MalformedNamePolicy::Skip`].
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            Self::ModuleOpen { .. } | Self::SymbolResolution { .. }
        )
    }
}

impl From<TeamLibError> for AppError {
    fn from(err: TeamLibError) -> Self {
        match &err {
            TeamLibError::PathResolution { .. } => AppError::configuration(err.to_string()),
            TeamLibError::NoPluginsFound { .. } => AppError::not_found(err.to_string()),
            TeamLibError::MalformedName { .. } => AppError::validation(err.to_string()),
            _ => AppError::plugin(err.to_string()),
        }
    }
}

/// Result alias for team library operations.
pub type TeamLibResult<T> = Result<T, TeamLibError>;
