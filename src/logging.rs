use flexi_logger::{detailed_format, Logger, LoggerHandle};

use crate::config::LoggingConfig;
use crate::error::MigrateError;

/// Starts the stderr logger. `RUST_LOG` takes precedence over the configured
/// level. Stdout stays reserved for the completion line.
pub fn init(config: &LoggingConfig) -> Result<LoggerHandle, MigrateError> {
    let handle = Logger::try_with_env_or_str(&config.level)?
        .log_to_stderr()
        .format(detailed_format)
        .start()?;

    Ok(handle)
}
