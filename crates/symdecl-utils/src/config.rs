//! # Render Configuration
//!
//! Rendering defaults read from a TOML file:
//!
//! ```toml
//! hex_enum_values = true
//! show_hooks = false
//! metadata_comments = false
//! force_calling_convention = false
//! ```
//!
//! Missing keys keep their defaults. The file is located through an explicit
//! path (`--config`) or the `SYMDECL_CONFIG` environment variable.

use std::path::{Path, PathBuf};
use std::{env, fs, io};

use serde::Deserialize;
use symdecl_core::{DeclarationOptions, EnumRadix};
use tracing::debug;

/// Environment variable naming a render configuration file.
pub const CONFIG_ENV: &str = "SYMDECL_CONFIG";

/// Rendering defaults for one CLI invocation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderConfig
{
    /// Print enumerant values as `0x..` instead of decimal
    pub hex_enum_values: bool,
    /// Emit the private `hook_method` section in UDT definitions
    pub show_hooks: bool,
    /// Append `// <attr=value>` comments to generated lines
    pub metadata_comments: bool,
    /// Always spell out calling conventions
    pub force_calling_convention: bool,
}

impl Default for RenderConfig
{
    fn default() -> Self
    {
        Self {
            hex_enum_values: true,
            show_hooks: false,
            metadata_comments: false,
            force_calling_convention: false,
        }
    }
}

impl RenderConfig
{
    /// Parse a configuration from TOML text.
    ///
    /// ## Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed TOML or unknown keys.
    pub fn from_toml(text: &str) -> Result<Self, ConfigError>
    {
        Ok(toml::from_str(text)?)
    }

    /// Read a configuration file.
    ///
    /// ## Errors
    ///
    /// Returns [`ConfigError::Read`] if the file cannot be read and
    /// [`ConfigError::Parse`] if it is not a valid configuration.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError>
    {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml(&text)?;
        debug!("Loaded render config from {}: {:?}", path.display(), config);
        Ok(config)
    }

    /// Load from `explicit`, else from `SYMDECL_CONFIG`, else defaults.
    ///
    /// ## Errors
    ///
    /// Propagates [`RenderConfig::load`] errors for the chosen file.
    pub fn discover(explicit: Option<&Path>) -> Result<Self, ConfigError>
    {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        match env::var_os(CONFIG_ENV) {
            Some(path) => Self::load(PathBuf::from(path)),
            None => Ok(Self::default()),
        }
    }

    /// Options for one synthesis request.
    #[must_use]
    pub fn to_options(&self) -> DeclarationOptions
    {
        let radix = if self.hex_enum_values { EnumRadix::Hex } else { EnumRadix::Decimal };
        DeclarationOptions::new()
            .with_enum_radix(radix)
            .with_show_hooks(self.show_hooks)
            .with_metadata_comments(self.metadata_comments)
            .with_force_calling_convention(self.force_calling_convention)
    }
}

/// Configuration loading error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError
{
    /// The file could not be read
    #[error("Failed to read config {}: {source}", path.display())]
    Read
    {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The file is not a valid configuration
    #[error("Invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

#[cfg(test)]
mod tests
{
    use std::io::Write;

    use super::*;

    #[test]
    fn test_defaults()
    {
        let config = RenderConfig::from_toml("").unwrap();
        assert_eq!(config, RenderConfig::default());
        assert!(config.hex_enum_values);
        assert_eq!(config.to_options(), DeclarationOptions::new());
    }

    #[test]
    fn test_partial_file_keeps_defaults()
    {
        let config = RenderConfig::from_toml("show_hooks = true\nhex_enum_values = false\n").unwrap();
        assert!(config.show_hooks);
        assert!(!config.hex_enum_values);
        assert!(!config.metadata_comments);

        let options = config.to_options();
        assert_eq!(options.enum_radix(), EnumRadix::Decimal);
        assert!(options.show_hooks());
        assert!(!options.force_calling_convention());
    }

    #[test]
    fn test_unknown_key_rejected()
    {
        let err = RenderConfig::from_toml("show_hook = true").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_from_file()
    {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "metadata_comments = true").unwrap();
        writeln!(file, "force_calling_convention = true").unwrap();

        let config = RenderConfig::discover(Some(file.path())).unwrap();
        assert!(config.metadata_comments);
        assert!(config.force_calling_convention);
        assert!(config.to_options().metadata_comments());
    }

    #[test]
    fn test_missing_file()
    {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("symdecl.toml");
        let err = RenderConfig::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
        assert!(err.to_string().contains("symdecl.toml"));
    }
}
