//! TOML Configuration File Support
//!
//! Loads settings from `~/.config/hostglow/hostglow.toml`.
//!
//! # Configuration Priority
//!
//! Configuration values are loaded with the following priority (highest first):
//! 1. CLI arguments (via [`ConfigOverrides`])
//! 2. Environment variables (`HOSTGLOW_*`)
//! 3. TOML configuration file
//! 4. Default values
//!
//! # Example Configuration
//!
//! ```toml
//! [checkmk]
//! url = "http://monitor:5000/cmk"
//! user = "automation"
//! secret = "s3cret"
//! request_timeout_ms = 10000
//!
//! [poller]
//! interval_secs = 30
//! trigger_interval_ms = 500
//! max_attempts = 3
//! initial_backoff_ms = 1000
//! backoff_multiplier = 2.0
//! max_backoff_ms = 60000
//!
//! [render]
//! fps = 30
//! brightness = 1.0
//! speed = 1.0
//! cells = 120
//! columns = 24
//! theme = "nord"
//!
//! [triggers]
//! dir = "/tmp"
//!
//! [export]
//! path = "/tmp/hostglow_hosts.json"
//! ```
//!
//! Loading never validates; call [`HostglowConfig::validate`] before use.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::poller::PollerConfig;
use crate::render::RenderConfig;
use crate::source::CheckmkConfig;

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur when loading or validating configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file at {path}: {source}")]
    ReadError {
        /// The path that was attempted
        path: PathBuf,
        /// The underlying IO error
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("Failed to parse TOML config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

// =============================================================================
// Configuration Source Tracking
// =============================================================================

/// Tracks where the configuration was last overridden from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Value from command-line argument
    Cli,
    /// Value from environment variable
    Env,
    /// Value from TOML configuration file
    File,
    /// Default value
    Default,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cli => write!(f, "CLI"),
            Self::Env => write!(f, "environment"),
            Self::File => write!(f, "config file"),
            Self::Default => write!(f, "default"),
        }
    }
}

// =============================================================================
// TOML Configuration Structures
// =============================================================================

/// `[checkmk]` section
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckmkToml {
    /// Site base URL
    pub url: Option<String>,
    /// Automation user
    pub user: Option<String>,
    /// Automation secret
    pub secret: Option<String>,
    /// Per-request timeout in milliseconds
    pub request_timeout_ms: Option<u64>,
}

/// `[poller]` section
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PollerToml {
    /// Seconds between fetch cycles
    pub interval_secs: Option<u64>,
    /// Milliseconds between trigger checks
    pub trigger_interval_ms: Option<u64>,
    /// Attempts per fetch cycle
    pub max_attempts: Option<u32>,
    /// First retry wait in milliseconds
    pub initial_backoff_ms: Option<u64>,
    /// Growth factor between retry waits
    pub backoff_multiplier: Option<f64>,
    /// Longest single retry wait in milliseconds
    pub max_backoff_ms: Option<u64>,
}

/// `[render]` section
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderToml {
    /// Frames per second
    pub fps: Option<u32>,
    /// Global brightness in `[0, 1]`
    pub brightness: Option<f32>,
    /// Ambient pulse speed multiplier
    pub speed: Option<f32>,
    /// Number of output cells
    pub cells: Option<usize>,
    /// Cells per grid row
    pub columns: Option<usize>,
    /// Built-in theme name
    pub theme: Option<String>,
}

/// `[triggers]` section
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TriggersToml {
    /// Directory watched for trigger files
    pub dir: Option<PathBuf>,
}

/// `[export]` section
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportToml {
    /// Host list JSON destination
    pub path: Option<PathBuf>,
}

/// Top-level TOML configuration structure
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HostglowToml {
    /// CheckMK connection
    pub checkmk: CheckmkToml,
    /// Poll timing
    pub poller: PollerToml,
    /// Frame rendering
    pub render: RenderToml,
    /// Manual triggers
    pub triggers: TriggersToml,
    /// Host list export
    pub export: ExportToml,
}

// =============================================================================
// Main Configuration Struct
// =============================================================================

/// Resolved configuration for the whole process
#[derive(Clone, Debug)]
pub struct HostglowConfig {
    /// CheckMK connection
    pub checkmk: CheckmkConfig,
    /// Poll timing
    pub poller: PollerConfig,
    /// Frame rendering
    pub render: RenderConfig,
    /// Directory watched for trigger files
    pub trigger_dir: PathBuf,
    /// Host list JSON destination (no export if `None`)
    pub export_path: Option<PathBuf>,
    /// Path to the config file that was loaded (if any)
    pub config_file_path: Option<PathBuf>,
    source: ConfigSource,
}

impl Default for HostglowConfig {
    fn default() -> Self {
        Self {
            checkmk: CheckmkConfig::default(),
            poller: PollerConfig::default(),
            render: RenderConfig::default(),
            trigger_dir: std::env::temp_dir(),
            export_path: None,
            config_file_path: None,
            source: ConfigSource::Default,
        }
    }
}

impl HostglowConfig {
    /// Create a new configuration with default values
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the last source that changed this configuration
    #[must_use]
    pub fn source(&self) -> ConfigSource {
        self.source
    }

    /// Check every section
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError::ValidationError`] found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.checkmk.validate()?;
        self.poller.validate()?;
        self.render.validate()?;
        Ok(())
    }
}

// =============================================================================
// Configuration Loading
// =============================================================================

/// Get the default configuration file path
///
/// Returns `$XDG_CONFIG_HOME/hostglow/hostglow.toml` when a config directory
/// is known.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("hostglow").join("hostglow.toml"))
}

/// Load configuration from the default path plus environment
///
/// # Errors
///
/// Returns an error if the config file exists but cannot be read or parsed.
pub fn load_config() -> Result<HostglowConfig, ConfigError> {
    load_config_from_path(default_config_path())
}

/// Load configuration from a specific path plus environment
///
/// A missing file is not an error (defaults are used).
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_config_from_path(path: Option<PathBuf>) -> Result<HostglowConfig, ConfigError> {
    let mut config = HostglowConfig::default();

    if let Some(ref config_path) = path {
        if config_path.exists() {
            let toml_content =
                std::fs::read_to_string(config_path).map_err(|e| ConfigError::ReadError {
                    path: config_path.clone(),
                    source: e,
                })?;

            let toml_config: HostglowToml = toml::from_str(&toml_content)?;
            apply_toml_config(&mut config, &toml_config);
            config.config_file_path = Some(config_path.clone());
            config.source = ConfigSource::File;

            tracing::info!(path = %config_path.display(), "Loaded configuration from file");
        } else {
            tracing::debug!(path = %config_path.display(), "Config file not found, using defaults");
        }
    }

    apply_env_config(&mut config);

    Ok(config)
}

fn apply_toml_config(config: &mut HostglowConfig, toml: &HostglowToml) {
    let cmk = &toml.checkmk;
    if let Some(ref url) = cmk.url {
        config.checkmk.url.clone_from(url);
    }
    if let Some(ref user) = cmk.user {
        config.checkmk.user.clone_from(user);
    }
    if let Some(ref secret) = cmk.secret {
        config.checkmk.secret.clone_from(secret);
    }
    if let Some(ms) = cmk.request_timeout_ms {
        config.checkmk.request_timeout = Duration::from_millis(ms);
    }

    let poller = &toml.poller;
    if let Some(secs) = poller.interval_secs {
        config.poller.fetch_interval = Duration::from_secs(secs);
    }
    if let Some(ms) = poller.trigger_interval_ms {
        config.poller.trigger_interval = Duration::from_millis(ms);
    }
    if let Some(n) = poller.max_attempts {
        config.poller.retry.max_attempts = n;
    }
    if let Some(ms) = poller.initial_backoff_ms {
        config.poller.retry.initial_backoff = Duration::from_millis(ms);
    }
    if let Some(m) = poller.backoff_multiplier {
        config.poller.retry.multiplier = m;
    }
    if let Some(ms) = poller.max_backoff_ms {
        config.poller.retry.max_backoff = Duration::from_millis(ms);
    }

    let render = &toml.render;
    if let Some(fps) = render.fps {
        config.render.fps = fps;
    }
    if let Some(b) = render.brightness {
        config.render.brightness = b;
    }
    if let Some(s) = render.speed {
        config.render.speed = s;
    }
    if let Some(cells) = render.cells {
        config.render.cells = cells;
    }
    if let Some(columns) = render.columns {
        config.render.columns = columns;
    }
    if let Some(ref theme) = render.theme {
        config.render.theme = theme.to_lowercase();
    }

    if let Some(ref dir) = toml.triggers.dir {
        config.trigger_dir.clone_from(dir);
    }
    if toml.export.path.is_some() {
        config.export_path.clone_from(&toml.export.path);
    }
}

fn apply_env_config(config: &mut HostglowConfig) {
    if let Ok(url) = std::env::var("HOSTGLOW_CHECKMK_URL") {
        config.checkmk.url = url;
        config.source = ConfigSource::Env;
    }
    if let Ok(user) = std::env::var("HOSTGLOW_CHECKMK_USER") {
        config.checkmk.user = user;
        config.source = ConfigSource::Env;
    }
    if let Ok(secret) = std::env::var("HOSTGLOW_CHECKMK_SECRET") {
        config.checkmk.secret = secret;
        config.source = ConfigSource::Env;
    }
    if let Ok(interval) = std::env::var("HOSTGLOW_INTERVAL") {
        if let Ok(secs) = interval.parse::<u64>() {
            config.poller.fetch_interval = Duration::from_secs(secs);
            config.source = ConfigSource::Env;
        }
    }
    if let Ok(fps) = std::env::var("HOSTGLOW_FPS") {
        if let Ok(n) = fps.parse::<u32>() {
            config.render.fps = n;
            config.source = ConfigSource::Env;
        }
    }
    if let Ok(brightness) = std::env::var("HOSTGLOW_BRIGHTNESS") {
        if let Ok(b) = brightness.parse::<f32>() {
            config.render.brightness = b;
            config.source = ConfigSource::Env;
        }
    }
    if let Ok(theme) = std::env::var("HOSTGLOW_THEME") {
        config.render.theme = theme.to_lowercase();
        config.source = ConfigSource::Env;
    }
    if let Ok(dir) = std::env::var("HOSTGLOW_TRIGGER_DIR") {
        config.trigger_dir = PathBuf::from(dir);
        config.source = ConfigSource::Env;
    }
    if let Ok(path) = std::env::var("HOSTGLOW_EXPORT_PATH") {
        config.export_path = Some(PathBuf::from(path));
        config.source = ConfigSource::Env;
    }
}

// =============================================================================
// CLI Override Support
// =============================================================================

/// Builder for applying CLI overrides to configuration
#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    /// Theme override
    pub theme: Option<String>,
    /// FPS override
    pub fps: Option<u32>,
    /// Brightness override
    pub brightness: Option<f32>,
    /// Fetch interval override (seconds)
    pub interval_secs: Option<u64>,
    /// Trigger directory override
    pub trigger_dir: Option<PathBuf>,
    /// Export path override
    pub export_path: Option<PathBuf>,
}

impl ConfigOverrides {
    /// Create a new empty set of overrides
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set theme override
    #[must_use]
    pub fn with_theme(mut self, theme: impl Into<String>) -> Self {
        self.theme = Some(theme.into());
        self
    }

    /// Set FPS override
    #[must_use]
    pub fn with_fps(mut self, fps: u32) -> Self {
        self.fps = Some(fps);
        self
    }

    /// Set brightness override
    #[must_use]
    pub fn with_brightness(mut self, brightness: f32) -> Self {
        self.brightness = Some(brightness);
        self
    }

    /// Set fetch interval override
    #[must_use]
    pub fn with_interval_secs(mut self, secs: u64) -> Self {
        self.interval_secs = Some(secs);
        self
    }

    /// Set trigger directory override
    #[must_use]
    pub fn with_trigger_dir(mut self, dir: PathBuf) -> Self {
        self.trigger_dir = Some(dir);
        self
    }

    /// Set export path override
    #[must_use]
    pub fn with_export_path(mut self, path: PathBuf) -> Self {
        self.export_path = Some(path);
        self
    }

    fn is_empty(&self) -> bool {
        self.theme.is_none()
            && self.fps.is_none()
            && self.brightness.is_none()
            && self.interval_secs.is_none()
            && self.trigger_dir.is_none()
            && self.export_path.is_none()
    }

    /// Apply overrides to a configuration
    pub fn apply(&self, config: &mut HostglowConfig) {
        if !self.is_empty() {
            config.source = ConfigSource::Cli;
        }
        if let Some(ref theme) = self.theme {
            config.render.theme = theme.to_lowercase();
        }
        if let Some(fps) = self.fps {
            config.render.fps = fps;
        }
        if let Some(b) = self.brightness {
            config.render.brightness = b;
        }
        if let Some(secs) = self.interval_secs {
            config.poller.fetch_interval = Duration::from_secs(secs);
        }
        if let Some(ref dir) = self.trigger_dir {
            config.trigger_dir.clone_from(dir);
        }
        if self.export_path.is_some() {
            config.export_path.clone_from(&self.export_path);
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_toml(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    // =========================================================================
    // Defaults
    // =========================================================================

    #[test]
    fn test_default_config() {
        let config = HostglowConfig::default();
        assert_eq!(config.poller.fetch_interval, Duration::from_secs(30));
        assert_eq!(config.poller.trigger_interval, Duration::from_millis(500));
        assert_eq!(config.poller.retry.max_attempts, 3);
        assert_eq!(config.render.fps, 30);
        assert_eq!(config.render.cells, 120);
        assert!(config.export_path.is_none());
        assert_eq!(config.source(), ConfigSource::Default);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_config_path() {
        if let Some(p) = default_config_path() {
            assert!(p.to_string_lossy().contains("hostglow"));
            assert!(p.to_string_lossy().ends_with("hostglow.toml"));
        }
    }

    // =========================================================================
    // TOML Parsing
    // =========================================================================

    #[test]
    fn test_parse_valid_toml() {
        let file = write_toml(
            r#"
[checkmk]
url = "https://mon.example/site"
secret = "abc"
request_timeout_ms = 2500

[poller]
interval_secs = 10
trigger_interval_ms = 250
max_attempts = 5
initial_backoff_ms = 200
backoff_multiplier = 1.5
max_backoff_ms = 5000

[render]
fps = 60
brightness = 0.5
cells = 104
columns = 26

[triggers]
dir = "/run/hostglow"

[export]
path = "/run/hostglow/hosts.json"
"#,
        );

        let config = load_config_from_path(Some(file.path().to_path_buf())).unwrap();

        assert_eq!(config.checkmk.url, "https://mon.example/site");
        assert_eq!(config.checkmk.secret, "abc");
        assert_eq!(config.checkmk.request_timeout, Duration::from_millis(2500));
        assert_eq!(config.poller.fetch_interval, Duration::from_secs(10));
        assert_eq!(config.poller.trigger_interval, Duration::from_millis(250));
        assert_eq!(config.poller.retry.max_attempts, 5);
        assert_eq!(config.poller.retry.initial_backoff, Duration::from_millis(200));
        assert!((config.poller.retry.multiplier - 1.5).abs() < f64::EPSILON);
        assert_eq!(config.poller.retry.max_backoff, Duration::from_secs(5));
        assert_eq!(config.render.fps, 60);
        assert!((config.render.brightness - 0.5).abs() < f32::EPSILON);
        assert_eq!(config.render.cells, 104);
        assert_eq!(config.render.columns, 26);
        assert_eq!(config.trigger_dir, PathBuf::from("/run/hostglow"));
        assert_eq!(config.export_path, Some(PathBuf::from("/run/hostglow/hosts.json")));
        assert_eq!(config.config_file_path, Some(file.path().to_path_buf()));
    }

    #[test]
    fn test_parse_partial_toml_keeps_defaults() {
        let file = write_toml("[poller]\nmax_attempts = 4\n");
        let config = load_config_from_path(Some(file.path().to_path_buf())).unwrap();
        assert_eq!(config.poller.retry.max_attempts, 4);
        assert_eq!(config.poller.retry.initial_backoff, Duration::from_secs(1));
        assert_eq!(config.render.cells, 120);
    }

    #[test]
    fn test_missing_file_graceful() {
        let path = PathBuf::from("/nonexistent/path/hostglow.toml");
        let config = load_config_from_path(Some(path)).unwrap();
        assert!(config.config_file_path.is_none());
        assert!(
            config.source() == ConfigSource::Default || config.source() == ConfigSource::Env,
            "Expected Default or Env source, got: {:?}",
            config.source()
        );
    }

    #[test]
    fn test_malformed_toml_error() {
        let file = write_toml("[poller\ninterval_secs = \"soon\"\n");
        let result = load_config_from_path(Some(file.path().to_path_buf()));
        assert!(matches!(result.unwrap_err(), ConfigError::ParseError(_)));
    }

    // =========================================================================
    // Validation
    // =========================================================================

    #[test]
    fn test_validation_catches_each_section() {
        let mut config = HostglowConfig::default();
        config.render.fps = 0;
        assert!(matches!(config.validate(), Err(ConfigError::ValidationError(_))));

        let mut config = HostglowConfig::default();
        config.render.fps = 121;
        assert!(config.validate().is_err());

        let mut config = HostglowConfig::default();
        config.poller.retry.max_attempts = 0;
        assert!(config.validate().is_err());

        let mut config = HostglowConfig::default();
        config.checkmk.url = String::new();
        assert!(config.validate().is_err());

        let mut config = HostglowConfig::default();
        config.render.theme = "plaid".to_string();
        assert!(config.validate().is_err());
    }

    // =========================================================================
    // Priority Ordering
    // =========================================================================

    #[test]
    fn test_env_overrides_file() {
        let file = write_toml("[checkmk]\nuser = \"file-user\"\n");

        std::env::set_var("HOSTGLOW_CHECKMK_USER", "env-user");
        let config = load_config_from_path(Some(file.path().to_path_buf())).unwrap();
        std::env::remove_var("HOSTGLOW_CHECKMK_USER");

        assert_eq!(config.checkmk.user, "env-user");
        assert_eq!(config.source(), ConfigSource::Env);
    }

    #[test]
    fn test_cli_overrides_everything() {
        let file = write_toml("[render]\ntheme = \"fire\"\n");
        let mut config = load_config_from_path(Some(file.path().to_path_buf())).unwrap();

        ConfigOverrides::new()
            .with_theme("Matrix")
            .with_export_path(PathBuf::from("/tmp/x.json"))
            .apply(&mut config);

        assert_eq!(config.render.theme, "matrix");
        assert_eq!(config.export_path, Some(PathBuf::from("/tmp/x.json")));
        assert_eq!(config.source(), ConfigSource::Cli);
    }

    #[test]
    fn test_empty_overrides_keep_source() {
        let mut config = HostglowConfig::default();
        ConfigOverrides::new().apply(&mut config);
        assert_eq!(config.source(), ConfigSource::Default);
    }
}
