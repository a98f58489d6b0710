// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::Error;

/// The name of the application.
pub const APP_NAME: &str = "synccal";

/// Default height of a calendar cell, in terminal rows.
pub const DEFAULT_CELL_HEIGHT: u16 = 6;

/// Configuration of the schedule calendar.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct Config {
    /// Directory for storing application state, in-memory storage when `None`.
    #[serde(default)]
    pub state_dir: Option<PathBuf>,

    /// Height of a calendar cell.
    #[serde(default = "default_cell_height")]
    pub cell_height: u16,

    /// Kind of device, gates layout decisions.
    #[serde(default)]
    pub device: Device,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            state_dir: None,
            cell_height: default_cell_height(),
            device: Device::default(),
        }
    }
}

impl Config {
    /// Normalize the configuration.
    #[tracing::instrument(skip(self))]
    pub fn normalize(&mut self) -> Result<(), Error> {
        match &self.state_dir {
            Some(a) => {
                let dir = expand_path(a).map_err(|e| {
                    Error::Config(format!("Failed to expand state directory path: {e}"))
                })?;
                self.state_dir = Some(dir);
            }
            None => match get_state_dir() {
                Ok(a) => self.state_dir = Some(a.join(APP_NAME)),
                Err(e) => tracing::warn!(err = %e, "failed to get state directory"),
            },
        }

        if self.cell_height == 0 {
            tracing::warn!("cell height of zero, using default");
            self.cell_height = DEFAULT_CELL_HEIGHT;
        }
        Ok(())
    }
}

const fn default_cell_height() -> u16 {
    DEFAULT_CELL_HEIGHT
}

/// Kind of device the calendar runs on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Device {
    /// Large screen.
    #[default]
    Desktop,

    /// Small screen, dialogs grow past the viewport.
    Tablet,

    /// Small screen, dialogs grow past the viewport.
    Phone,
}

impl Device {
    /// Whether the device has a small screen.
    pub fn is_small_screen(self) -> bool {
        matches!(self, Device::Tablet | Device::Phone)
    }
}

impl FromStr for Device {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "desktop" => Ok(Device::Desktop),
            "tablet" => Ok(Device::Tablet),
            "phone" => Ok(Device::Phone),
            _ => Err(format!("Unknown device: {s}")),
        }
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Device::Desktop => "desktop",
            Device::Tablet => "tablet",
            Device::Phone => "phone",
        };
        write!(f, "{s}")
    }
}

/// Sync server authentication method.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Deserialize)]
#[serde(tag = "type")]
pub enum AuthMethod {
    /// No authentication.
    #[serde(rename = "none")]
    #[default]
    None,
    /// Basic authentication (username/password).
    #[serde(rename = "basic")]
    Basic {
        /// Username for authentication.
        username: String,
        /// Password for authentication.
        password: String,
    },
    /// Bearer token authentication.
    #[serde(rename = "bearer")]
    Bearer {
        /// Bearer token.
        token: String,
    },
}

/// Sync server configuration.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
pub struct SyncConfig {
    /// Base URL of the sync server.
    pub base_url: String,
    /// Authentication method.
    #[serde(default)]
    pub auth: AuthMethod,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// User agent string.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

const fn default_timeout() -> u64 {
    30
}

fn default_user_agent() -> String {
    concat!("synccal/", env!("CARGO_PKG_VERSION")).to_string()
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            auth: AuthMethod::default(),
            timeout_secs: default_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

/// Handle tilde (~) and environment variables in the path
pub fn expand_path(path: &Path) -> Result<PathBuf, String> {
    if path.is_absolute() {
        return Ok(path.to_owned());
    }

    let path = path.to_str().ok_or("Invalid path")?;

    let home_prefixes: &[&str] = if cfg!(unix) {
        &["~/", "$HOME/", "${HOME}/"]
    } else {
        &[r"~\", "~/", r"%UserProfile%\", r"%UserProfile%/"]
    };
    for prefix in home_prefixes {
        if let Some(stripped) = path.strip_prefix(prefix) {
            return Ok(get_home_dir()?.join(stripped));
        }
    }

    let config_prefixes: &[&str] = if cfg!(unix) {
        &["$XDG_CONFIG_HOME/", "${XDG_CONFIG_HOME}/"]
    } else {
        &[r"%LOCALAPPDATA%\", "%LOCALAPPDATA%/"]
    };
    for prefix in config_prefixes {
        if let Some(stripped) = path.strip_prefix(prefix) {
            return Ok(get_config_dir()?.join(stripped));
        }
    }

    Ok(path.into())
}

fn get_home_dir() -> Result<PathBuf, String> {
    dirs::home_dir().ok_or_else(|| "User-specific home directory not found".to_string())
}

/// User-specific configuration directory.
pub fn get_config_dir() -> Result<PathBuf, String> {
    #[cfg(unix)]
    let config_dir = xdg::BaseDirectories::new().get_config_home();
    #[cfg(windows)]
    let config_dir = dirs::config_dir();
    config_dir.ok_or_else(|| "User-specific config directory not found".to_string())
}

fn get_state_dir() -> Result<PathBuf, String> {
    #[cfg(unix)]
    let state_dir = xdg::BaseDirectories::new().get_state_home();
    #[cfg(windows)]
    let state_dir = dirs::data_dir();
    state_dir.ok_or_else(|| "User-specific state directory not found".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_path_home_env() {
        let home = get_home_dir().unwrap();
        let home_prefixes: &[&str] = if cfg!(unix) {
            &["~", "$HOME", "${HOME}"]
        } else {
            &[r"~", r"%UserProfile%"]
        };
        for prefix in home_prefixes {
            let result = expand_path(&PathBuf::from(format!("{prefix}/synccal"))).unwrap();
            assert_eq!(result, home.join("synccal"));
            assert!(result.is_absolute());
        }
    }

    #[test]
    fn test_expand_path_absolute_and_relative() {
        let absolute = PathBuf::from("/var/lib/synccal");
        assert_eq!(expand_path(&absolute).unwrap(), absolute);

        let relative = PathBuf::from("state/synccal");
        assert_eq!(expand_path(&relative).unwrap(), relative);
    }

    #[test]
    fn test_config_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.cell_height, DEFAULT_CELL_HEIGHT);
        assert_eq!(config.device, Device::Desktop);
        assert!(config.state_dir.is_none());
    }

    #[test]
    fn test_config_parse() {
        let config: Config = toml::from_str(
            r#"
state_dir = "/tmp/synccal"
cell_height = 10
device = "phone"
"#,
        )
        .unwrap();
        assert_eq!(config.state_dir, Some(PathBuf::from("/tmp/synccal")));
        assert_eq!(config.cell_height, 10);
        assert!(config.device.is_small_screen());
    }

    #[test]
    fn test_normalize_fixes_zero_cell_height() {
        let mut config = Config {
            state_dir: Some(PathBuf::from("/tmp/synccal")),
            cell_height: 0,
            device: Device::Desktop,
        };
        config.normalize().unwrap();
        assert_eq!(config.cell_height, DEFAULT_CELL_HEIGHT);
        assert_eq!(config.state_dir, Some(PathBuf::from("/tmp/synccal")));
    }

    #[test]
    fn test_sync_config_auth() {
        let config: SyncConfig = toml::from_str(
            r#"
base_url = "https://sync.example.com"
timeout_secs = 5

[auth]
type = "bearer"
token = "secret"
"#,
        )
        .unwrap();
        assert_eq!(config.timeout_secs, 5);
        assert_eq!(
            config.auth,
            AuthMethod::Bearer {
                token: "secret".into()
            }
        );
        assert!(config.user_agent.starts_with("synccal/"));
    }

    #[test]
    fn test_device_from_str() {
        assert_eq!("Tablet".parse::<Device>().unwrap(), Device::Tablet);
        assert!("watch".parse::<Device>().is_err());
        assert!(!Device::Desktop.is_small_screen());
    }
}
