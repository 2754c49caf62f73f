//! Device configuration

use crate::error::{ClientError, Result};
use mixlink_core::{DEFAULT_FEEDBACK_PORT, DEFAULT_TARGET_PORT};
use serde::{Deserialize, Serialize};

/// Connection settings for one device.
///
/// `host` takes a literal IPv4 address or a DNS name. `device_name` is the
/// name configured on the unit itself; it scopes every OSC path on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    pub host: String,
    pub device_name: String,
    /// Port the device listens on for commands
    pub target_port: u16,
    /// Local port the device sends feedback to
    pub feedback_port: u16,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            device_name: String::new(),
            target_port: DEFAULT_TARGET_PORT,
            feedback_port: DEFAULT_FEEDBACK_PORT,
        }
    }
}

impl DeviceConfig {
    /// Check the session can be started at all. Ports are always present
    /// under `u16` typing, so only host and device name can be missing.
    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(ClientError::BadConfig("host is required".to_string()));
        }
        if self.device_name.trim().is_empty() {
            return Err(ClientError::BadConfig("device name is required".to_string()));
        }
        Ok(())
    }

    /// Trimmed device name as configured
    pub fn trimmed_name(&self) -> &str {
        self.device_name.trim()
    }

    /// Short label for status displays
    pub fn display_label(&self) -> String {
        let name = self.trimmed_name();
        if name.is_empty() {
            "OSC device".to_string()
        } else {
            name.to_string()
        }
    }
}
