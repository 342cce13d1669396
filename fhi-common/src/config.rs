//! Configuration loading and root folder resolution
//!
//! A missing or unreadable config file is never fatal: the binaries log a
//! warning and continue on compiled defaults.

use crate::{time, Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

/// Environment variable overriding the root folder
pub const ROOT_FOLDER_ENV: &str = "FHI_ROOT_FOLDER";

/// Endpoint used when the operator never configured a server location
pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:5741/api";

/// Quiet period before a pending draft is written
pub const DEFAULT_DRAFT_QUIET_MS: u64 = 1000;

/// Timeout applied to every record store request
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Contents of `config.toml`
///
/// ```toml
/// root_folder = "/srv/fhi"
/// log_level = "debug"
/// default_server_url = "http://10.0.0.5:5741/api"
/// draft_quiet_ms = 1000
/// request_timeout_secs = 10
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct TomlConfig {
    pub root_folder: Option<PathBuf>,
    pub log_level: String,
    /// Empty string selects local-only mode when no server location is stored
    pub default_server_url: String,
    pub draft_quiet_ms: u64,
    pub request_timeout_secs: u64,
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            root_folder: None,
            log_level: "info".to_string(),
            default_server_url: DEFAULT_SERVER_URL.to_string(),
            draft_quiet_ms: DEFAULT_DRAFT_QUIET_MS,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

impl TomlConfig {
    /// Parse a config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }

    /// Load the platform config file, falling back to defaults
    pub fn load_or_default() -> Self {
        let path = match config_file_path() {
            Ok(path) => path,
            Err(e) => {
                debug!("No config file: {}", e);
                return Self::default();
            }
        };

        match Self::load(&path) {
            Ok(config) => {
                debug!("Loaded config from {}", path.display());
                config
            }
            Err(e) => {
                warn!("Ignoring unreadable config file, using defaults: {}", e);
                Self::default()
            }
        }
    }

    pub fn draft_quiet(&self) -> Duration {
        time::millis_to_duration(self.draft_quiet_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Write the config as TOML, creating parent directories
    pub fn write(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }
}

/// Root folder resolution, in priority order:
/// 1. Command-line argument
/// 2. `FHI_ROOT_FOLDER` environment variable
/// 3. `root_folder` from the TOML config
/// 4. OS-dependent compiled default
pub fn resolve_root_folder(cli_arg: Option<&Path>, config: &TomlConfig) -> PathBuf {
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    if let Ok(path) = std::env::var(ROOT_FOLDER_ENV) {
        if !path.is_empty() {
            return PathBuf::from(path);
        }
    }

    if let Some(path) = &config.root_folder {
        return path.clone();
    }

    default_root_folder()
}

/// Get the config file path for the platform
pub fn config_file_path() -> Result<PathBuf> {
    if cfg!(target_os = "linux") {
        // Try ~/.config/fhi/config.toml first, then /etc/fhi/config.toml
        let user_config = dirs::config_dir().map(|d| d.join("fhi").join("config.toml"));
        let system_config = PathBuf::from("/etc/fhi/config.toml");

        if let Some(path) = user_config {
            if path.exists() {
                return Ok(path);
            }
        }
        if system_config.exists() {
            return Ok(system_config);
        }
        Err(Error::Config("No config file found".to_string()))
    } else {
        let path = dirs::config_dir()
            .map(|d| d.join("fhi").join("config.toml"))
            .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))?;
        if path.exists() {
            Ok(path)
        } else {
            Err(Error::Config(format!("Config file not found: {:?}", path)))
        }
    }
}

/// Get OS-dependent default root folder path
pub fn default_root_folder() -> PathBuf {
    if cfg!(target_os = "linux") {
        // ~/.local/share/fhi (or /var/lib/fhi for system-wide)
        dirs::data_local_dir()
            .map(|d| d.join("fhi"))
            .unwrap_or_else(|| PathBuf::from("/var/lib/fhi"))
    } else if cfg!(target_os = "macos") {
        dirs::data_dir()
            .map(|d| d.join("fhi"))
            .unwrap_or_else(|| PathBuf::from("/Library/Application Support/fhi"))
    } else if cfg!(target_os = "windows") {
        dirs::data_local_dir()
            .map(|d| d.join("fhi"))
            .unwrap_or_else(|| PathBuf::from("C:\\ProgramData\\fhi"))
    } else {
        PathBuf::from("./fhi_data")
    }
}
