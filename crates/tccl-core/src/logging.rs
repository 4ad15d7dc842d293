//! Tracing subscriber setup.

use tracing_subscriber::{EnvFilter, fmt};

use crate::config::logging::LoggingConfig;
use crate::error::AppError;
use crate::result::AppResult;

/// Installs the global tracing subscriber described by `config`.
///
/// `RUST_LOG` takes precedence over the configured level. Fails if a global
/// subscriber is already installed.
pub fn init(config: &LoggingConfig) -> AppResult<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .map_err(|e| {
            AppError::configuration(format!("Invalid log level '{}': {e}", config.level))
        })?;

    let result = match config.format.as_str() {
        "json" => fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .with_thread_ids(true)
            .try_init(),
        _ => fmt()
            .pretty()
            .with_env_filter(filter)
            .with_target(true)
            .try_init(),
    };

    result.map_err(|e| AppError::internal(format!("Failed to install tracing subscriber: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_is_reported() {
        let config = LoggingConfig::default();
        assert!(init(&config).is_ok());
        assert!(init(&config).is_err());
    }

    #[test]
    fn test_invalid_level_is_configuration_error() {
        let config = LoggingConfig {
            level: "tccl=verbose".to_string(),
            format: "json".to_string(),
        };
        if std::env::var_os("RUST_LOG").is_none() {
            let err = init(&config).expect_err("bad directive");
            assert_eq!(err.kind, crate::error::ErrorKind::Configuration);
        }
    }
}
