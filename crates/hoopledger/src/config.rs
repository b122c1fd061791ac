// Configuration loading and parsing (hoopledger.toml).

use std::fmt;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use hoopledger_core::ReportScope;
use serde::Deserialize;
use thiserror::Error;

use crate::output::OutputFormat;

/// Shipped defaults; also the fallback when no config file is found.
pub const DEFAULT_CONFIG: &str = include_str!("../defaults/hoopledger.toml");

pub const CONFIG_FILE_NAME: &str = "hoopledger.toml";

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("cannot determine the current directory: {source}")]
    CurrentDir { source: std::io::Error },
}

// ---------------------------------------------------------------------------
// Config structs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub report: ReportConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    pub path: String,
    pub has_headers: bool,
    pub delimiter: String,
    /// Abort on the first malformed row instead of skipping it.
    pub strict: bool,
}

impl Default for InputConfig {
    fn default() -> Self {
        InputConfig {
            path: "euroleague.csv".into(),
            has_headers: true,
            delimiter: ",".into(),
            strict: false,
        }
    }
}

impl InputConfig {
    /// The delimiter as a byte. Only meaningful after validation.
    pub fn delimiter_byte(&self) -> u8 {
        self.delimiter.as_bytes().first().copied().unwrap_or(b',')
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub scope: ReportScope,
    pub format: OutputFormat,
    /// Output file path, or `-` for stdout.
    pub output: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        ReportConfig {
            scope: ReportScope::All,
            format: OutputFormat::Text,
            output: "-".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directives; `RUST_LOG` takes precedence.
    pub filter: String,
    /// Log to this file instead of stderr.
    pub file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            filter: "hoopledger=info,hoopledger_core=info,warn".into(),
            file: None,
        }
    }
}

/// Where the loaded configuration came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    File(PathBuf),
    BuiltIn,
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigSource::File(path) => write!(f, "{}", path.display()),
            ConfigSource::BuiltIn => f.write_str("built-in defaults"),
        }
    }
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate a single config file.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })?;
    parse_config(&text, path)
}

/// Parse and validate config text. `origin` is only used in error messages.
pub fn parse_config(text: &str, origin: &Path) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(text).map_err(|e| ConfigError::ParseError {
        path: origin.to_path_buf(),
        source: e,
    })?;
    validate(&config)?;
    Ok(config)
}

/// The shipped defaults.
pub fn builtin() -> Result<Config, ConfigError> {
    parse_config(DEFAULT_CONFIG, Path::new("<built-in defaults>"))
}

/// Find a config file without an explicit path: `config/hoopledger.toml`
/// under `base_dir` first, then the per-user config directory.
pub fn locate_config(base_dir: &Path) -> Option<PathBuf> {
    let local = base_dir.join("config").join(CONFIG_FILE_NAME);
    if local.is_file() {
        return Some(local);
    }
    ProjectDirs::from("", "", "hoopledger")
        .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
        .filter(|path| path.is_file())
}

/// Load from `explicit` if given (it must exist), otherwise from the first
/// file `locate_config` finds relative to `base_dir`, otherwise the built-in
/// defaults.
pub fn load_config_in(
    base_dir: &Path,
    explicit: Option<&Path>,
) -> Result<(Config, ConfigSource), ConfigError> {
    if let Some(path) = explicit {
        return Ok((load_config_from(path)?, ConfigSource::File(path.to_path_buf())));
    }
    match locate_config(base_dir) {
        Some(path) => Ok((load_config_from(&path)?, ConfigSource::File(path))),
        None => Ok((builtin()?, ConfigSource::BuiltIn)),
    }
}

/// Convenience wrapper: looks for config relative to the current directory.
pub fn load_config(explicit: Option<&Path>) -> Result<(Config, ConfigSource), ConfigError> {
    load_config_from_cwd(std::env::current_dir(), explicit)
}

fn load_config_from_cwd(
    cwd: std::io::Result<PathBuf>,
    explicit: Option<&Path>,
) -> Result<(Config, ConfigSource), ConfigError> {
    let cwd = cwd.map_err(|source| ConfigError::CurrentDir { source })?;
    load_config_in(&cwd, explicit)
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.input.path.trim().is_empty() {
        return Err(ConfigError::ValidationError {
            field: "input.path".into(),
            message: "must not be empty".into(),
        });
    }

    let delimiter = &config.input.delimiter;
    if delimiter.len() != 1 || !delimiter.is_ascii() {
        return Err(ConfigError::ValidationError {
            field: "input.delimiter".into(),
            message: format!("must be a single ASCII character, got {delimiter:?}"),
        });
    }

    if config.report.output.trim().is_empty() {
        return Err(ConfigError::ValidationError {
            field: "report.output".into(),
            message: "must not be empty (use \"-\" for stdout)".into(),
        });
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
