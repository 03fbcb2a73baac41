// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Logging initialization.
//!
//! The crate logs through the `log` facade; these helpers install an
//! `env_logger` backend for applications that have none.

use thiserror::Error;

/// Log level for typeform logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => log::LevelFilter::Off,
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("a logger is already installed")]
    AlreadyInitialized(#[from] log::SetLoggerError),
}

/// Initialize console logging at `level`.
///
/// Fails if a logger is already installed.
pub fn init_logging(level: LogLevel) -> Result<(), LoggingError> {
    env_logger::Builder::new()
        .filter_level(level.into())
        .format_timestamp_millis()
        .try_init()?;
    Ok(())
}

/// Initialize logging from `RUST_LOG`, falling back to `default_level`.
pub fn init_logging_env(default_level: LogLevel) -> Result<(), LoggingError> {
    let filter: log::LevelFilter = default_level.into();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter.to_string()))
        .format_timestamp_millis()
        .try_init()?;
    Ok(())
}

/// Initialize logging with a filter string (e.g. `"typeform=debug,info"`).
pub fn init_logging_with_filter(filter: &str) -> Result<(), LoggingError> {
    env_logger::Builder::new()
        .parse_filters(filter)
        .format_timestamp_millis()
        .try_init()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_conversion() {
        assert_eq!(log::LevelFilter::from(LogLevel::Off), log::LevelFilter::Off);
        assert_eq!(log::LevelFilter::from(LogLevel::Debug), log::LevelFilter::Debug);
    }

    #[test]
    fn test_second_init_fails() {
        // The first call may race with other tests; only the second is checked.
        let _ = init_logging_with_filter("typeform=trace");
        assert!(matches!(
            init_logging(LogLevel::Info),
            Err(LoggingError::AlreadyInitialized(_))
        ));
    }
}
