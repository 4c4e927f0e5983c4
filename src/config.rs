//! Configuration management for Zero HID Gateway
//!
//! Configuration is read from a TOML file. Every section and field is optional;
//! anything left out takes the default shown below.
//!
//! ## Config File Locations
//!
//! | Platform | Path |
//! |----------|------|
//! | Linux | `~/.config/zero-hid-gateway/config.toml` |
//! | Any | the path given with `--config` |
//!
//! ## Example
//!
//! ```toml
//! [server]
//! bind = "0.0.0.0"
//! port = 8088
//!
//! [device]
//! path = "/dev/hidg0"
//!
//! [typing]
//! layout = "thec64"
//! downtime_ms = 50
//! interval_ms = 50
//!
//! [gadget]
//! provision = true
//! name = "zerohid"
//! ```

use crate::keyboard::Timing;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Error type for configuration operations
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to determine config directory
    #[error("Could not determine config directory")]
    NoConfigDir,
    /// IO error reading or writing config file
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    /// Failed to parse config file
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Failed to serialize config
    #[error("Serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
    /// `server.bind` and `server.port` do not form a socket address
    #[error("Invalid listen address '{0}'")]
    InvalidAddress(String),
}

/// Returns the path of the default config file.
///
/// The file itself may not exist.
pub fn config_path() -> Result<PathBuf, ConfigError> {
    let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
    Ok(config_dir.join("zero-hid-gateway").join("config.toml"))
}

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// HTTP listener settings
    pub server: ServerConfig,
    /// HID device settings
    pub device: DeviceConfig,
    /// Default layout and timing for keypress requests
    pub typing: TypingConfig,
    /// USB gadget provisioning
    pub gadget: GadgetConfig,
}

/// HTTP listener configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind
    pub bind: String,
    /// TCP port
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0".to_string(),
            port: 8088,
        }
    }
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let addr = format!("{}:{}", self.bind, self.port);
        addr.parse().map_err(|_| ConfigError::InvalidAddress(addr))
    }
}

/// HID device configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DeviceConfig {
    /// Character device created by the gadget's HID function
    pub path: PathBuf,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(crate::keyboard::device::DEFAULT_DEVICE_PATH),
        }
    }
}

/// Typing defaults applied when a request leaves them out
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TypingConfig {
    /// Layout name; the keymap registry default when unset
    pub layout: Option<String>,
    /// Key hold duration in milliseconds
    pub downtime_ms: u64,
    /// Gap between keys in milliseconds
    pub interval_ms: u64,
}

impl Default for TypingConfig {
    fn default() -> Self {
        Self {
            layout: None,
            downtime_ms: 50,
            interval_ms: 50,
        }
    }
}

impl TypingConfig {
    pub fn timing(&self) -> Timing {
        Timing::from_millis(self.downtime_ms, self.interval_ms)
    }
}

/// USB gadget configuration written through configfs
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct GadgetConfig {
    /// Provision the gadget at startup
    pub provision: bool,
    /// configfs `usb_gadget` directory
    pub configfs_root: PathBuf,
    /// Directory listing USB device controllers
    pub udc_root: PathBuf,
    /// Gadget directory name
    pub name: String,
    pub vendor_id: u16,
    pub product_id: u16,
    pub serial_number: String,
    pub manufacturer: String,
    pub product: String,
}

impl Default for GadgetConfig {
    fn default() -> Self {
        Self {
            provision: true,
            configfs_root: PathBuf::from("/sys/kernel/config/usb_gadget"),
            udc_root: PathBuf::from("/sys/class/udc"),
            name: "zerohid".to_string(),
            vendor_id: 0x1d6b,
            product_id: 0x0104,
            serial_number: "fedcba9876543210".to_string(),
            manufacturer: "Zero HID Gateway".to_string(),
            product: "USB Keyboard".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from the default config file.
    ///
    /// Returns the default configuration if the file doesn't exist.
    /// Returns an error if the file exists but cannot be parsed.
    pub fn load() -> Result<Self, ConfigError> {
        let path = config_path()?;

        if !path.exists() {
            return Ok(Self::default());
        }

        Self::load_from(&path)
    }

    /// Load configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Render as pretty TOML
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Save configuration to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        fs::write(path, self.to_toml()?)?;
        Ok(())
    }
}
