//! Configuration loading: TOML file with environment variable overrides.
//!
//! Looks for `leadrouter.toml` in the working directory unless another path
//! is given. Every field has a default so the file is optional. Environment
//! variables take precedence over file values, and command-line flags over
//! both.

use std::path::{Path, PathBuf};

use clap::ValueEnum;
use serde::Deserialize;

use leadrouter_adapter_webdriver::WebDriverConfig;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// The WordPress site whose forms are reconciled.
    pub console: ConsoleConfig,
    /// Where the routing rules come from.
    pub source: SourceConfig,
    /// How the console is driven.
    pub surface: SurfaceConfig,
    /// Run-wide routing choices.
    pub routing: RoutingConfig,
    /// Operator interaction.
    pub operator: OperatorConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    /// Site root, e.g. `https://www.dealer.example`.
    pub base_url: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// Google Sheets values API.
    #[default]
    SheetsApi,
    /// A JSON export of the value grid.
    ValuesFile,
}

/// Rule source configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub kind: SourceKind,
    /// Spreadsheet id or sharing URL.
    pub spreadsheet: Option<String>,
    /// Sheet range holding the rules, header row first.
    pub range: String,
    /// OAuth access token with read access to the spreadsheet.
    pub access_token: Option<String>,
    pub values_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum SurfaceKind {
    /// A browser driven through WebDriver.
    #[default]
    Webdriver,
    /// The in-memory console.
    Virtual,
}

/// Console surface configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SurfaceConfig {
    pub kind: SurfaceKind,
    /// JSON fixture for the virtual console; the demo console when unset.
    pub fixture: Option<PathBuf>,
    #[serde(flatten)]
    pub webdriver: WebDriverConfig,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RoutingConfig {
    /// Configure the text notification on location-based forms. Asked once
    /// at startup when unset.
    pub text_for_location_forms: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct OperatorConfig {
    /// How long to wait for the operator to log in, in seconds. `0` skips
    /// the wait.
    pub login_wait_secs: u64,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

impl Config {
    /// Load configuration from `path` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::from_file(path)?;
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    /// Apply overrides looked up by environment variable name.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(val) = lookup("LEADROUTER_CONSOLE_URL") {
            self.console.base_url = val;
        }
        if let Some(val) = lookup("LEADROUTER_SPREADSHEET") {
            self.source.spreadsheet = Some(val);
        }
        if let Some(val) = lookup("LEADROUTER_SHEETS_TOKEN") {
            self.source.access_token = Some(val);
        }
        if let Some(val) = lookup("LEADROUTER_WEBDRIVER_URL") {
            self.surface.webdriver.webdriver_url = val;
        }
        if let Some(val) = lookup("CHROME_BINARY_PATH") {
            self.surface.webdriver.chrome_binary = Some(PathBuf::from(val));
        }
        if let Some(val) = lookup("LEADROUTER_LOG") {
            self.logging.filter = val;
        }
        if let Some(val) = lookup("RUST_LOG") {
            self.logging.filter = val;
        }
    }

    /// Check the rule source settings.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] naming the missing setting.
    pub fn validate_source(&self) -> Result<(), ConfigError> {
        match self.source.kind {
            SourceKind::SheetsApi => {
                if self.source.spreadsheet.as_deref().is_none_or(str::is_empty) {
                    return Err(ConfigError::Validation(
                        "source.spreadsheet is required for the sheets API".to_string(),
                    ));
                }
                if self.source.access_token.as_deref().is_none_or(str::is_empty) {
                    return Err(ConfigError::Validation(
                        "source.access_token (or LEADROUTER_SHEETS_TOKEN) is required for the sheets API"
                            .to_string(),
                    ));
                }
            }
            SourceKind::ValuesFile => {
                if self.source.values_file.is_none() {
                    return Err(ConfigError::Validation(
                        "source.values_file is required for a values file source".to_string(),
                    ));
                }
            }
        }
        if self.source.range.trim().is_empty() {
            return Err(ConfigError::Validation(
                "source.range must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Check every setting a full run needs.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] naming the first invalid setting.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_source()?;
        if self.surface.kind == SurfaceKind::Webdriver {
            let url = self.console.base_url.trim();
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ConfigError::Validation(
                    "console.base_url must be an http(s) URL".to_string(),
                ));
            }
            if self.surface.webdriver.element_timeout_ms == 0 {
                return Err(ConfigError::Validation(
                    "surface.element_timeout_ms must be non-zero".to_string(),
                ));
            }
        }
        Ok(())
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            kind: SourceKind::default(),
            spreadsheet: None,
            range: "Combined Feed Info".to_string(),
            access_token: None,
            values_file: None,
        }
    }
}

impl Default for OperatorConfig {
    fn default() -> Self {
        Self {
            login_wait_secs: 900,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "leadrouter=info,leadrouter_app=info".to_string(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}
