//! # symdecl Utilities
//!
//! Shared utilities for the symdecl workspace: logging built on `tracing` and
//! the TOML render configuration consumed by the CLI.

pub mod config;
pub mod logging;

pub use config::{ConfigError, RenderConfig};
// Re-export commonly used logging functions for convenience
pub use logging::{init_logging, init_logging_with_level, LogFormat, LogLevel, LoggingError};
pub use tracing::{debug, error, info, trace, warn};
