//! Link configuration

use serde::{Deserialize, Serialize};

/// Fixed device node of the virtual DPRAM channel to the CP
pub const DEFAULT_DEVICE_PATH: &str = "/dev/vdpram0";

/// Canonical line speed for the vdpram channel
pub const DEFAULT_BAUD_RATE: u32 = 115_200;

/// Read timeout applied to the channel (VTIME equivalent, one decisecond)
pub const DEFAULT_READ_TIMEOUT_MS: u64 = 100;

/// Serial link configuration
///
/// The device path is a fixed deployment value, not discovered at
/// runtime. The remaining fields describe the canonical line
/// discipline applied on open: 8 data bits, 1 stop bit, no parity,
/// hardware flow control disabled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkConfig {
    pub device_path: String,
    pub baud_rate: u32,
    pub read_timeout_ms: u64,
}

impl LinkConfig {
    /// Create a configuration for a specific device node, keeping the
    /// canonical line parameters
    pub fn new(device_path: impl Into<String>) -> Self {
        Self {
            device_path: device_path.into(),
            ..Self::default()
        }
    }
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            device_path: DEFAULT_DEVICE_PATH.to_string(),
            baud_rate: DEFAULT_BAUD_RATE,
            read_timeout_ms: DEFAULT_READ_TIMEOUT_MS,
        }
    }
}
