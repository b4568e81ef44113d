//! # Logging Utilities
//!
//! Logging infrastructure for symdecl using `tracing`.
//!
//! Declarations are printed on stdout, so every log layer writes to stderr
//! (or to a file). This module provides:
//! - Multiple output formats (JSON for tooling, pretty for people)
//! - Environment variable configuration
//! - Log level filtering
//! - Optional file output
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use symdecl_utils::init_logging;
//!
//! // Initialize with default settings (reads from RUST_LOG env var)
//! init_logging().expect("Failed to initialize logging");
//!
//! tracing::debug!("Loaded symbol graph");
//! ```
//!
//! ## Environment Variables
//!
//! - `RUST_LOG`: Set log level filter (e.g., `RUST_LOG=debug`, `RUST_LOG=symdecl_core=trace`)
//! - `SYMDECL_LOG_FORMAT`: Set output format (`json` or `pretty`, default: `pretty`)
//! - `SYMDECL_LOG_FILE`: Optional path to log file (if not set, logs only to stderr).
//!   A directory gets a dated `YYYY-MM-DD-symdecl.log` file inside it.
//!
//! ## Examples
//!
//! ```rust,no_run
//! use symdecl_utils::{LogFormat, LogLevel, init_logging_with_level};
//!
//! // Show every recovery decision the declarators make
//! init_logging_with_level(LogLevel::Debug, LogFormat::Pretty)
//!     .expect("Failed to initialize logging");
//! ```

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::{env, io};

use chrono::Utc;
use tracing::Level;
use tracing_subscriber::fmt::time::ChronoUtc;
use tracing_subscriber::fmt::{self};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat
{
    /// Pretty-printed, human-readable format (default)
    Pretty,
    /// JSON format, one object per line
    Json,
}

impl FromStr for LogFormat
{
    type Err = LoggingError;

    fn from_str(s: &str) -> Result<Self, Self::Err>
    {
        match s.to_lowercase().as_str() {
            "pretty" | "dev" | "development" => Ok(LogFormat::Pretty),
            "json" | "prod" | "production" => Ok(LogFormat::Json),
            _ => Err(LoggingError::InvalidFormat(format!("{s}. Use 'pretty' or 'json'"))),
        }
    }
}

/// Log level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel
{
    /// Error level
    Error,
    /// Warning level (default: placeholders for unmodeled symbols)
    Warn,
    /// Info level
    Info,
    /// Debug level (recovery decisions)
    Debug,
    /// Trace level (every attribute read and traversal step)
    Trace,
}

impl From<LogLevel> for Level
{
    fn from(level: LogLevel) -> Self
    {
        match level {
            LogLevel::Error => Level::ERROR,
            LogLevel::Warn => Level::WARN,
            LogLevel::Info => Level::INFO,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Trace => Level::TRACE,
        }
    }
}

impl FromStr for LogLevel
{
    type Err = LoggingError;

    fn from_str(s: &str) -> Result<Self, Self::Err>
    {
        match s.to_lowercase().as_str() {
            "error" | "err" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" | "dbg" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            _ => Err(LoggingError::InvalidLevel(format!(
                "{s}. Use 'error', 'warn', 'info', 'debug', or 'trace'"
            ))),
        }
    }
}

/// Initialize logging with default settings
///
/// Reads configuration from environment variables:
/// - `RUST_LOG`: Log level filter (e.g., `debug`, `symdecl_core=trace`)
/// - `SYMDECL_LOG_FORMAT`: Output format (`json` or `pretty`, default: `pretty`)
/// - `SYMDECL_LOG_FILE`: Optional path to log file
///
/// Without `RUST_LOG` only warnings and errors are shown.
///
/// ## Errors
///
/// Returns an error if:
/// - Logging is already initialized
/// - `SYMDECL_LOG_FORMAT` holds an unknown format
/// - File logging fails (if `SYMDECL_LOG_FILE` is set)
pub fn init_logging() -> Result<(), LoggingError>
{
    let format = match env::var("SYMDECL_LOG_FORMAT") {
        Ok(value) => value.parse()?,
        Err(_) => LogFormat::Pretty,
    };

    // Read log level from RUST_LOG or default to WARN
    let default_level = env::var("RUST_LOG")
        .ok()
        .and_then(|value| value.parse::<LogLevel>().ok())
        .map_or(Level::WARN, Into::into);

    init_logging_internal(format, default_level)
}

/// Initialize logging with explicit level and format
///
/// `RUST_LOG` still wins when it is set, so module filters keep working.
///
/// ## Errors
///
/// Returns an error if logging is already initialized or file logging fails.
pub fn init_logging_with_level(level: LogLevel, format: LogFormat) -> Result<(), LoggingError>
{
    init_logging_internal(format, level.into())
}

/// Directory and file name for a rolling appender.
fn split_log_path(path: &Path) -> Result<(PathBuf, PathBuf), LoggingError>
{
    if path.is_dir() {
        let today = Utc::now().format("%Y-%m-%d");
        return Ok((path.to_path_buf(), PathBuf::from(format!("{today}-symdecl.log"))));
    }
    let name = path
        .file_name()
        .ok_or_else(|| LoggingError::InitializationFailed(format!("{} is not a file path", path.display())))?;
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&dir)?;
    Ok((dir, PathBuf::from(name)))
}

/// Internal initialization function
fn init_logging_internal(format: LogFormat, default_level: Level) -> Result<(), LoggingError>
{
    // RUST_LOG can override the default level with more specific filters
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level.to_string()));

    let log_file = match env::var("SYMDECL_LOG_FILE") {
        Ok(path) => Some(split_log_path(Path::new(&path))?),
        Err(_) => None,
    };

    let init = match format {
        LogFormat::Pretty => {
            let console_layer = fmt::layer()
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_timer(ChronoUtc::rfc_3339())
                .with_ansi(true)
                .with_writer(io::stderr)
                .with_filter(env_filter.clone());

            if let Some((dir, name)) = log_file {
                let file_appender = tracing_appender::rolling::never(dir, name);
                let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
                // The process is short-lived; keep the writer alive until exit.
                std::mem::forget(guard);
                let file_layer = fmt::layer()
                    .with_writer(non_blocking)
                    .with_target(true)
                    .with_file(true)
                    .with_line_number(true)
                    .with_timer(ChronoUtc::rfc_3339())
                    .with_ansi(false) // No ANSI in files
                    .with_filter(env_filter);

                Registry::default().with(console_layer).with(file_layer).try_init()
            } else {
                Registry::default().with(console_layer).try_init()
            }
        }
        LogFormat::Json => {
            let console_layer = fmt::layer()
                .json()
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_timer(ChronoUtc::rfc_3339())
                .with_current_span(true)
                .with_span_list(true)
                .with_writer(io::stderr)
                .with_filter(env_filter.clone());

            if let Some((dir, name)) = log_file {
                let file_appender = tracing_appender::rolling::never(dir, name);
                let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
                std::mem::forget(guard);
                let file_layer = fmt::layer()
                    .json()
                    .with_writer(non_blocking)
                    .with_target(true)
                    .with_file(true)
                    .with_line_number(true)
                    .with_timer(ChronoUtc::rfc_3339())
                    .with_current_span(true)
                    .with_span_list(true)
                    .with_filter(env_filter);

                Registry::default().with(console_layer).with(file_layer).try_init()
            } else {
                Registry::default().with(console_layer).try_init()
            }
        }
    };

    init.map_err(|err| LoggingError::InitializationFailed(err.to_string()))
}

/// Logging initialization error
#[derive(Debug, thiserror::Error)]
pub enum LoggingError
{
    /// Invalid log format
    #[error("Invalid log format: {0}")]
    InvalidFormat(String),

    /// Invalid log level
    #[error("Invalid log level: {0}")]
    InvalidLevel(String),

    /// Failed to initialize logging
    #[error("Failed to initialize logging: {0}")]
    InitializationFailed(String),

    /// File logging error
    #[error("File logging error: {0}")]
    FileError(#[from] io::Error),
}
