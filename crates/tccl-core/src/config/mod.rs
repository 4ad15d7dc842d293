//! Initialization configuration.
//!
//! [`TcclConfig`] is deserialized via the `config` crate from an optional
//! TOML file overlaid with `TCCL_`-prefixed environment variables. The
//! team library search path override is `TCCL_TEAM_LIB_PATH`.

pub mod logging;

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use self::logging::LoggingConfig;

use crate::error::AppError;
use crate::result::AppResult;
use crate::types::CapabilityRequest;

/// Environment variable prefix for every configuration key.
pub const ENV_PREFIX: &str = "TCCL";

/// Environment variable overriding the team library directory.
pub const TEAM_LIB_PATH_ENV: &str = "TCCL_TEAM_LIB_PATH";

/// What to do with a candidate whose file name lacks the team library prefix.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MalformedNamePolicy {
    /// Abort the whole initialization.
    #[default]
    Abort,
    /// Log the candidate and continue with the rest.
    Skip,
}

/// Root configuration for team library initialization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TcclConfig {
    /// Directory to search for team libraries, used verbatim when set.
    #[serde(default)]
    pub team_lib_path: Option<PathBuf>,
    /// Capabilities every surviving team library must provide.
    #[serde(default)]
    pub capabilities: CapabilityRequest,
    /// Handling of candidates with malformed file names.
    #[serde(default)]
    pub malformed_names: MalformedNamePolicy,
    /// Fail initialization when the capability filter leaves nothing.
    #[serde(default)]
    pub require_survivors: bool,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl TcclConfig {
    /// Load configuration from an optional TOML file and the process
    /// environment.
    pub fn load(file: Option<&Path>) -> AppResult<Self> {
        Self::load_from(file, None)
    }

    /// Load configuration from an optional TOML file and an explicit
    /// environment map. `None` reads the process environment.
    pub fn load_from(
        file: Option<&Path>,
        env: Option<HashMap<String, String>>,
    ) -> AppResult<Self> {
        let mut builder = config::Config::builder();

        if let Some(path) = file {
            builder = builder.add_source(config::File::from(path).required(true));
        }

        let config = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .source(env),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))
    }
}
