//! TOML-based configuration for the monitor.
//!
//! Reads `AppConfig` from `$XDG_CONFIG_HOME/input-activity/config.toml`
//! (falling back to `~/.config/input-activity/config.toml`), or from an
//! explicit path given on the command line.  A missing file is not an error:
//! every field has a default matching the stock behaviour.
//!
//! ```toml
//! [monitor]
//! publish_interval_ms = 1000
//! poll_timeout_ms = 1000
//!
//! [discovery]
//! keyboard_probe_order = [3, 0, 1, 2]
//!
//! [state]
//! keyboard_count_file = "/tmp/upwork-keyboard-count"
//! ```
//!
//! # Serde default values
//!
//! Fields annotated with `#[serde(default = "some_fn")]` use the return value
//! of `some_fn()` when the field is absent, and whole sections default via
//! `#[serde(default)]`, so an empty file is a valid configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use activity_core::NameHints;
use serde::Deserialize;
use thiserror::Error;

use crate::application::monitor::MonitorSettings;

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The platform config directory could not be determined.
    #[error("could not determine platform config directory")]
    NoPlatformConfigDir,

    /// A file system I/O error occurred.
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

// ── Config schema types ───────────────────────────────────────────────────────

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub monitor: MonitorConfig,
    #[serde(default)]
    pub discovery: DiscoveryConfig,
    #[serde(default)]
    pub state: StateConfig,
}

/// Loop timing and logging.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct MonitorConfig {
    /// Minimum milliseconds between counter publishes.
    #[serde(default = "default_interval_ms")]
    pub publish_interval_ms: u64,
    /// Upper bound in milliseconds on one readiness wait.
    #[serde(default = "default_interval_ms")]
    pub poll_timeout_ms: u64,
    /// `tracing` log level: `"error"`, `"warn"`, `"info"`, `"debug"`, `"trace"`.
    /// `RUST_LOG` takes precedence when set.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Where and how the locator looks for devices.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct DiscoveryConfig {
    /// Directory of stable-name symlinks.
    #[serde(default = "default_by_path_dir")]
    pub by_path_dir: PathBuf,
    /// Kernel capability listing.
    #[serde(default = "default_capabilities_file")]
    pub capabilities_file: PathBuf,
    /// Directory holding the `event<N>` nodes.
    #[serde(default = "default_device_dir")]
    pub device_dir: PathBuf,
    /// Node numbers probed, in order, when no keyboard was found otherwise.
    #[serde(default = "default_keyboard_probe_order")]
    pub keyboard_probe_order: Vec<u32>,
    /// Nodes `event0..event<limit>` are probed when no pointer was found.
    #[serde(default = "default_pointer_probe_limit")]
    pub pointer_probe_limit: u32,
    #[serde(default = "default_symlink_keyboard_hints")]
    pub symlink_keyboard_hints: Vec<String>,
    #[serde(default = "default_symlink_pointer_hints")]
    pub symlink_pointer_hints: Vec<String>,
    #[serde(default = "default_capability_keyboard_hints")]
    pub capability_keyboard_hints: Vec<String>,
    #[serde(default = "default_capability_pointer_hints")]
    pub capability_pointer_hints: Vec<String>,
}

/// The four published state files.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct StateConfig {
    #[serde(default = "default_keyboard_count_file")]
    pub keyboard_count_file: PathBuf,
    #[serde(default = "default_pointer_count_file")]
    pub pointer_count_file: PathBuf,
    #[serde(default = "default_idle_file")]
    pub idle_file: PathBuf,
    #[serde(default = "default_last_activity_file")]
    pub last_activity_file: PathBuf,
}

// ── Default helpers ───────────────────────────────────────────────────────────

const KEYBOARD_COUNT_FILE: &str = "upwork-keyboard-count";
const POINTER_COUNT_FILE: &str = "upwork-mouse-count";
const IDLE_FILE: &str = "upwork-idle-ms";
const LAST_ACTIVITY_FILE: &str = "upwork-last-activity";

fn default_interval_ms() -> u64 {
    1000
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_by_path_dir() -> PathBuf {
    PathBuf::from("/dev/input/by-path")
}
fn default_capabilities_file() -> PathBuf {
    PathBuf::from("/proc/bus/input/devices")
}
fn default_device_dir() -> PathBuf {
    PathBuf::from("/dev/input")
}
fn default_keyboard_probe_order() -> Vec<u32> {
    // event3 is the i8042 keyboard on most laptops.
    vec![3, 0, 1, 2]
}
fn default_pointer_probe_limit() -> u32 {
    20
}
fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
fn default_symlink_keyboard_hints() -> Vec<String> {
    strings(&["kbd", "keyboard"])
}
fn default_symlink_pointer_hints() -> Vec<String> {
    strings(&["mouse", "pointer"])
}
fn default_capability_keyboard_hints() -> Vec<String> {
    strings(&["keyboard", "kbd"])
}
fn default_capability_pointer_hints() -> Vec<String> {
    strings(&["mouse", "touchpad", "trackpad"])
}
fn default_keyboard_count_file() -> PathBuf {
    Path::new("/tmp").join(KEYBOARD_COUNT_FILE)
}
fn default_pointer_count_file() -> PathBuf {
    Path::new("/tmp").join(POINTER_COUNT_FILE)
}
fn default_idle_file() -> PathBuf {
    Path::new("/tmp").join(IDLE_FILE)
}
fn default_last_activity_file() -> PathBuf {
    Path::new("/tmp").join(LAST_ACTIVITY_FILE)
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            publish_interval_ms: default_interval_ms(),
            poll_timeout_ms: default_interval_ms(),
            log_level: default_log_level(),
        }
    }
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            by_path_dir: default_by_path_dir(),
            capabilities_file: default_capabilities_file(),
            device_dir: default_device_dir(),
            keyboard_probe_order: default_keyboard_probe_order(),
            pointer_probe_limit: default_pointer_probe_limit(),
            symlink_keyboard_hints: default_symlink_keyboard_hints(),
            symlink_pointer_hints: default_symlink_pointer_hints(),
            capability_keyboard_hints: default_capability_keyboard_hints(),
            capability_pointer_hints: default_capability_pointer_hints(),
        }
    }
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            keyboard_count_file: default_keyboard_count_file(),
            pointer_count_file: default_pointer_count_file(),
            idle_file: default_idle_file(),
            last_activity_file: default_last_activity_file(),
        }
    }
}

impl MonitorConfig {
    pub fn settings(&self) -> MonitorSettings {
        MonitorSettings {
            publish_interval: Duration::from_millis(self.publish_interval_ms),
            poll_timeout: Duration::from_millis(self.poll_timeout_ms),
        }
    }
}

impl DiscoveryConfig {
    pub fn symlink_hints(&self) -> NameHints {
        NameHints::new(&self.symlink_keyboard_hints, &self.symlink_pointer_hints)
    }

    pub fn capability_hints(&self) -> NameHints {
        NameHints::new(&self.capability_keyboard_hints, &self.capability_pointer_hints)
    }
}

impl StateConfig {
    /// The default file names placed under `dir`.
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            keyboard_count_file: dir.join(KEYBOARD_COUNT_FILE),
            pointer_count_file: dir.join(POINTER_COUNT_FILE),
            idle_file: dir.join(IDLE_FILE),
            last_activity_file: dir.join(LAST_ACTIVITY_FILE),
        }
    }
}

// ── Config repository ─────────────────────────────────────────────────────────

/// Determines the platform-appropriate directory for the config file.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] when neither
/// `XDG_CONFIG_HOME` nor `HOME` is set.
pub fn config_dir() -> Result<PathBuf, ConfigError> {
    platform_config_dir().ok_or(ConfigError::NoPlatformConfigDir)
}

/// Resolves the full path to the default config file.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] if the base directory cannot be
/// determined.
pub fn config_file_path() -> Result<PathBuf, ConfigError> {
    Ok(config_dir()?.join("config.toml"))
}

/// Loads `AppConfig` from the default location, returning
/// `AppConfig::default()` if the file does not exist (or no config directory
/// can be determined at all).
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors other than "not found",
/// and [`ConfigError::Parse`] if the TOML is malformed.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    match config_file_path() {
        Ok(path) => load_config_from(&path, true),
        Err(ConfigError::NoPlatformConfigDir) => Ok(AppConfig::default()),
        Err(e) => Err(e),
    }
}

/// Loads `AppConfig` from `path`.  When `missing_ok` is set a missing file
/// yields the defaults; otherwise it is an I/O error.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] or [`ConfigError::Parse`].
pub fn load_config_from(path: &Path, missing_ok: bool) -> Result<AppConfig, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(toml::from_str(&content)?),
        Err(e) if missing_ok && e.kind() == std::io::ErrorKind::NotFound => {
            Ok(AppConfig::default())
        }
        Err(source) => Err(ConfigError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

fn platform_config_dir() -> Option<PathBuf> {
    // XDG_CONFIG_HOME or ~/.config
    let base = std::env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
    Some(base.join("input-activity"))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
