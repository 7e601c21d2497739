//! Engine configuration
//!
//! Settings come from a TOML document, usually the file named by the
//! `HILITE_CONFIG` environment variable. Missing keys keep their
//! defaults and unknown keys are ignored.
//!
//! Example:
//! ```toml
//! [cache]
//! max-entries = 256
//! max-bytes = 16777216
//!
//! [highlight]
//! default-theme = "InspiredGitHub"
//! ```

use std::fs;
use std::path::Path;

use crate::error::{Error, Result};
use crate::syntax::builtin::DEFAULT_THEME;

/// Environment variable naming a configuration file
pub const CONFIG_ENV: &str = "HILITE_CONFIG";

const MAX_CACHE_ENTRIES: usize = 65_536;
const MIN_CACHE_BYTES: usize = 1024;

/// Engine settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Most results the cache holds
    pub max_entries: usize,
    /// Approximate byte budget of the cache
    pub max_bytes: usize,
    /// Theme used when the requested one is unknown
    pub default_theme: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_entries: 256,
            max_bytes: 16 * 1024 * 1024,
            default_theme: DEFAULT_THEME.to_string(),
        }
    }
}

impl EngineConfig {
    /// Parse a TOML document
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let table = contents
            .parse::<toml::Table>()
            .map_err(|e| Error::Config(e.to_string()))?;
        let mut config = Self::default();
        config.apply(&table)?;
        Ok(config)
    }

    /// Load a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Load the file named by `HILITE_CONFIG`, or use defaults
    ///
    /// A file that fails to load is logged and ignored.
    pub fn from_env() -> Self {
        let Some(path) = std::env::var_os(CONFIG_ENV) else {
            return Self::default();
        };
        match Self::load(Path::new(&path)) {
            Ok(config) => {
                tracing::info!(path = ?path, "loaded engine configuration");
                config
            }
            Err(e) => {
                tracing::warn!(path = ?path, error = %e, "ignoring unreadable configuration");
                Self::default()
            }
        }
    }

    /// Apply settings from a parsed document
    fn apply(&mut self, table: &toml::Table) -> Result<()> {
        if let Some(cache) = section(table, "cache")? {
            if let Some(value) = integer(cache, "cache.max-entries")? {
                self.max_entries = value.clamp(1, MAX_CACHE_ENTRIES);
            }
            if let Some(value) = integer(cache, "cache.max-bytes")? {
                self.max_bytes = value.max(MIN_CACHE_BYTES);
            }
        }

        if let Some(highlight) = section(table, "highlight")? {
            match highlight.get("default-theme") {
                Some(toml::Value::String(name)) if !name.trim().is_empty() => {
                    self.default_theme = name.trim().to_string();
                }
                Some(_) => {
                    return Err(Error::Config(
                        "highlight.default-theme must be a non-empty string".to_string(),
                    ))
                }
                None => {}
            }
        }
        Ok(())
    }
}

fn section<'a>(table: &'a toml::Table, name: &str) -> Result<Option<&'a toml::Table>> {
    match table.get(name) {
        Some(toml::Value::Table(section)) => Ok(Some(section)),
        Some(_) => Err(Error::Config(format!("[{}] must be a table", name))),
        None => Ok(None),
    }
}

/// Read a non-negative integer; `key` is `section.name`
fn integer(section: &toml::Table, key: &str) -> Result<Option<usize>> {
    let name = key.rsplit('.').next().unwrap_or(key);
    match section.get(name) {
        Some(toml::Value::Integer(n)) => usize::try_from(*n)
            .map(Some)
            .map_err(|_| Error::Config(format!("{} must not be negative", key))),
        Some(_) => Err(Error::Config(format!("{} must be an integer", key))),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let config = EngineConfig::from_toml_str(
            r#"
            # engine settings
            [cache]
            max-entries = 32
            max-bytes = 65536

            [highlight]
            default-theme = "Monokai"
            "#,
        )
        .unwrap();

        assert_eq!(config.max_entries, 32);
        assert_eq!(config.max_bytes, 65536);
        assert_eq!(config.default_theme, "Monokai");
    }

    #[test]
    fn test_missing_keys_keep_defaults() {
        let config = EngineConfig::from_toml_str("[cache]\nmax-entries = 8\n[other]\nx = 1\n").unwrap();
        assert_eq!(config.max_entries, 8);
        assert_eq!(config.max_bytes, EngineConfig::default().max_bytes);
        assert_eq!(config.default_theme, DEFAULT_THEME);

        assert_eq!(EngineConfig::from_toml_str("").unwrap(), EngineConfig::default());
    }

    #[test]
    fn test_values_are_clamped() {
        let config =
            EngineConfig::from_toml_str("[cache]\nmax-entries = 0\nmax-bytes = 10\n").unwrap();
        assert_eq!(config.max_entries, 1);
        assert_eq!(config.max_bytes, MIN_CACHE_BYTES);

        let config = EngineConfig::from_toml_str("[cache]\nmax-entries = 10000000\n").unwrap();
        assert_eq!(config.max_entries, MAX_CACHE_ENTRIES);
    }

    #[test]
    fn test_invalid_values() {
        assert!(EngineConfig::from_toml_str("[cache]\nmax-entries = -1\n").is_err());
        assert!(EngineConfig::from_toml_str("[cache]\nmax-entries = \"many\"\n").is_err());
        assert!(EngineConfig::from_toml_str("cache = 3\n").is_err());
        assert!(EngineConfig::from_toml_str("[highlight]\ndefault-theme = \"\"\n").is_err());
        assert!(matches!(
            EngineConfig::from_toml_str("not toml ["),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let err = EngineConfig::load(Path::new("/nonexistent/hilite.toml")).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
