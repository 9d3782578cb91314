//! Client configuration: backend location, timeouts and logging.
//!
//! # Responsibility
//! - Load settings from an optional TOML file.
//! - Apply environment overrides on top of file values.
//!
//! # Invariants
//! - Every field has a default, so an empty file is a valid configuration.
//! - `base_url` is checked as an absolute http(s) URL before use.

use crate::logging::default_log_level;
use crate::repo::http_transport::parse_base_url;
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;
pub const ENV_BASE_URL: &str = "NOTEKEEP_BASE_URL";
pub const ENV_LOG_LEVEL: &str = "NOTEKEEP_LOG_LEVEL";

#[derive(Debug)]
pub enum ConfigError {
    Read { path: PathBuf, source: std::io::Error },
    Parse { path: PathBuf, message: String },
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Read { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse { path, message } => {
                write!(f, "failed to parse config `{}`: {message}", path.display())
            }
            Self::Invalid(message) => write!(f, "invalid config: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Read { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Effective client settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClientConfig {
    /// Root of the REST API; `/notes` is appended.
    pub base_url: String,
    /// Per-request timeout in milliseconds.
    pub timeout_ms: u64,
    /// One of `trace|debug|info|warn|error`.
    pub log_level: String,
    /// Absolute directory for rolling log files; `None` disables file logs.
    pub log_dir: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            log_level: default_log_level().to_string(),
            log_dir: None,
        }
    }
}

impl ClientConfig {
    /// Parses a TOML document. `origin` is only used in error messages.
    pub fn from_toml_str(content: &str, origin: &Path) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content).map_err(|err| ConfigError::Parse {
            path: origin.to_path_buf(),
            message: err.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reads `path` when given, else starts from defaults, then applies
    /// environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => {
                let content =
                    std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
                        path: path.to_path_buf(),
                        source,
                    })?;
                Self::from_toml_str(&content, path)?
            }
            None => Self::default(),
        };
        config.with_overrides(|key| std::env::var(key).ok())
    }

    /// Applies `NOTEKEEP_*` overrides read through `lookup`.
    pub fn with_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(base_url) = lookup(ENV_BASE_URL).filter(|value| !value.trim().is_empty()) {
            self.base_url = base_url;
        }
        if let Some(level) = lookup(ENV_LOG_LEVEL).filter(|value| !value.trim().is_empty()) {
            self.log_level = level;
        }
        self.validate()?;
        Ok(self)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        parse_base_url(&self.base_url).map_err(|err| ConfigError::Invalid(err.to_string()))?;
        if self.timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "timeout_ms must be greater than zero".to_string(),
            ));
        }
        if let Some(dir) = &self.log_dir {
            if !dir.is_absolute() {
                return Err(ConfigError::Invalid(format!(
                    "log_dir must be an absolute path, got `{}`",
                    dir.display()
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{ClientConfig, ConfigError, DEFAULT_BASE_URL, ENV_BASE_URL, ENV_LOG_LEVEL};
    use std::io::Write;
    use std::path::Path;

    #[test]
    fn empty_document_yields_defaults() {
        let config = ClientConfig::from_toml_str("", Path::new("empty.toml")).unwrap();
        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn file_values_override_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "base_url = \"https://notes.example.com/api\"\ntimeout_ms = 2500"
        )
        .unwrap();

        let config = ClientConfig::from_toml_str(
            &std::fs::read_to_string(file.path()).unwrap(),
            file.path(),
        )
        .unwrap();
        assert_eq!(config.base_url, "https://notes.example.com/api");
        assert_eq!(config.timeout().as_millis(), 2500);
    }

    #[test]
    fn environment_overrides_win_over_file_values() {
        let config = ClientConfig::default()
            .with_overrides(|key| match key {
                ENV_BASE_URL => Some("http://10.0.0.2:8080".to_string()),
                ENV_LOG_LEVEL => Some("warn".to_string()),
                _ => None,
            })
            .unwrap();
        assert_eq!(config.base_url, "http://10.0.0.2:8080");
        assert_eq!(config.log_level, "warn");
    }

    #[test]
    fn rejects_unknown_keys_and_bad_urls() {
        let unknown = ClientConfig::from_toml_str("colour = \"red\"", Path::new("c.toml"));
        assert!(matches!(unknown, Err(ConfigError::Parse { .. })));

        let bad_url = ClientConfig::from_toml_str("base_url = \"ftp://x\"", Path::new("c.toml"));
        assert!(matches!(bad_url, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn rejects_relative_log_dir() {
        let err = ClientConfig::from_toml_str("log_dir = \"logs\"", Path::new("c.toml"))
            .unwrap_err();
        assert!(err.to_string().contains("absolute"));
    }
}
