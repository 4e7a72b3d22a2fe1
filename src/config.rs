use crate::error::{Result, StitchError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub resolver: ResolverSettings,
}

/// Resolver behavior configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ResolverSettings {
    /// Abort the whole run on the first failed recording instead of
    /// continuing with the rest.
    pub fail_fast: bool,
    /// Treat a window-start going backwards (with correctly sorted ids) as
    /// fatal. The source data is broken either way; relaxing this only
    /// changes whether the run limps on.
    pub strict_time_order: bool,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            fail_fast: false,
            strict_time_order: true,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Returns an error if the file contains invalid TOML.
    /// Missing fields will use default values.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from a file, or return defaults if it is missing
    ///
    /// Only a missing file falls back to defaults; invalid TOML is an error.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        match Self::load(path) {
            Ok(config) => Ok(config),
            Err(StitchError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                Ok(Self::default())
            }
            Err(e) => Err(e),
        }
    }

    /// Apply environment variable overrides
    ///
    /// Supported environment variables:
    /// - CTMSTITCH_FAIL_FAST → resolver.fail_fast
    /// - CTMSTITCH_STRICT_TIME_ORDER → resolver.strict_time_order
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(value) = env_bool("CTMSTITCH_FAIL_FAST") {
            self.resolver.fail_fast = value;
        }
        if let Some(value) = env_bool("CTMSTITCH_STRICT_TIME_ORDER") {
            self.resolver.strict_time_order = value;
        }
        self
    }

    /// Get the default configuration file path
    ///
    /// Returns ~/.config/ctmstitch/config.toml on Linux
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("ctmstitch").join("config.toml"))
    }
}

fn env_bool(key: &str) -> Option<bool> {
    match std::env::var(key) {
        Ok(value) => match value.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Some(true),
            "0" | "false" | "no" | "off" => Some(false),
            _ => None,
        },
        Err(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::Mutex;
    use tempfile::NamedTempFile;

    // Mutex to serialize tests that modify environment variables
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    // SAFETY: These helpers are only used in tests with ENV_LOCK held,
    // ensuring no concurrent access to environment variables.
    fn set_env(key: &str, value: &str) {
        unsafe { std::env::set_var(key, value) }
    }

    fn remove_env(key: &str) {
        unsafe { std::env::remove_var(key) }
    }

    fn clear_ctmstitch_env() {
        remove_env("CTMSTITCH_FAIL_FAST");
        remove_env("CTMSTITCH_STRICT_TIME_ORDER");
    }

    #[test]
    fn test_default_config_has_correct_values() {
        let config = Config::default();
        assert!(!config.resolver.fail_fast);
        assert!(config.resolver.strict_time_order);
    }

    #[test]
    fn test_load_from_toml_file() {
        let toml_content = r#"
            [resolver]
            fail_fast = true
            strict_time_order = false
        "#;

        let mut file = NamedTempFile::new().unwrap();
        file.write_all(toml_content.as_bytes()).unwrap();

        let config = Config::load(file.path()).unwrap();
        assert!(config.resolver.fail_fast);
        assert!(!config.resolver.strict_time_order);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let toml_content = r#"
            [resolver]
            fail_fast = true
        "#;

        let mut file = NamedTempFile::new().unwrap();
        file.write_all(toml_content.as_bytes()).unwrap();

        let config = Config::load(file.path()).unwrap();
        assert!(config.resolver.fail_fast);
        // Unspecified field keeps its default
        assert!(config.resolver.strict_time_order);
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"not = valid = toml").unwrap();

        assert!(Config::load(file.path()).is_err());
        assert!(Config::load_or_default(file.path()).is_err());
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let config = Config::load_or_default(Path::new("/nonexistent/ctmstitch.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_env_overrides() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_ctmstitch_env();

        set_env("CTMSTITCH_FAIL_FAST", "true");
        set_env("CTMSTITCH_STRICT_TIME_ORDER", "0");

        let config = Config::default().with_env_overrides();
        assert!(config.resolver.fail_fast);
        assert!(!config.resolver.strict_time_order);

        clear_ctmstitch_env();
    }

    #[test]
    fn test_env_overrides_ignore_garbage() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_ctmstitch_env();

        set_env("CTMSTITCH_FAIL_FAST", "maybe");

        let config = Config::default().with_env_overrides();
        assert!(!config.resolver.fail_fast);

        clear_ctmstitch_env();
    }

    #[test]
    fn test_config_round_trips_through_toml() {
        let config = Config {
            resolver: ResolverSettings {
                fail_fast: true,
                strict_time_order: false,
            },
        };
        let text = toml::to_string(&config).unwrap();
        let reparsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(reparsed, config);
    }
}
