//! Trace-level hex dump of channel traffic

use std::fmt;

/// Traffic direction for dump annotations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Rx,
    Tx,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Rx => write!(f, "RX"),
            Direction::Tx => write!(f, "TX"),
        }
    }
}

/// Dump channel data at trace level, 16 bytes per row
pub fn dump(dir: Direction, data: &[u8]) {
    if !log::log_enabled!(log::Level::Trace) {
        return;
    }

    log::trace!("[{}] data dump [data length: {}]", dir, data.len());
    for (row, chunk) in data.chunks(16).enumerate() {
        let hex: String = chunk.iter().map(|b| format!("{:02X} ", b)).collect();
        log::trace!("  {:04x}  {}", row * 16, hex.trim_end());
    }
}
