//! Team library candidate discovery.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{TeamLibError, TeamLibResult};
use crate::loader::TEAM_LIB_PREFIX;

/// The file name pattern candidates must match.
pub fn file_pattern() -> String {
    format!("{TEAM_LIB_PREFIX}*.{}", std::env::consts::DLL_EXTENSION)
}

/// Lazily enumerates `tccl_team_lib_*.<ext>` files directly inside `dir`.
///
/// The search is not recursive and directories are never candidates.
/// Order is whatever the enumeration yields; callers must not rely on it.
pub fn discover(dir: &Path) -> TeamLibResult<impl Iterator<Item = PathBuf>> {
    let escaped_dir = glob::Pattern::escape(&dir.to_string_lossy());
    let pattern = format!("{escaped_dir}/{}", file_pattern());

    let paths = glob::glob(&pattern).map_err(|e| TeamLibError::Discovery {
        pattern: pattern.clone(),
        reason: e.to_string(),
    })?;

    Ok(paths.filter_map(|entry| match entry {
        Ok(path) if path.is_file() => Some(path),
        Ok(path) => {
            debug!(path = %path.display(), "Skipping non-file candidate");
            None
        }
        Err(e) => {
            debug!(error = %e, "Skipping unreadable candidate");
            None
        }
    }))
}
