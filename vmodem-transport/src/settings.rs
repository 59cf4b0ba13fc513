//! Line-discipline snapshots and their per-handle store

use crate::stream::ChannelHandle;
use std::collections::HashMap;
use tokio_serial::{DataBits, FlowControl, Parity, SerialPort, StopBits};

/// Captured line-discipline state of a channel
///
/// Taken from the port when it is first configured so `close()` can
/// put the terminal back the way it was found.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineSettings {
    pub baud_rate: u32,
    pub data_bits: DataBits,
    pub stop_bits: StopBits,
    pub parity: Parity,
    pub flow_control: FlowControl,
}

impl LineSettings {
    /// Capture the current settings of an open port
    pub fn capture<P: SerialPort>(port: &P) -> Result<Self, tokio_serial::Error> {
        Ok(Self {
            baud_rate: port.baud_rate()?,
            data_bits: port.data_bits()?,
            stop_bits: port.stop_bits()?,
            parity: port.parity()?,
            flow_control: port.flow_control()?,
        })
    }

    /// Write the captured settings back to the port
    pub fn restore<P: SerialPort>(&self, port: &mut P) -> Result<(), tokio_serial::Error> {
        port.set_baud_rate(self.baud_rate)?;
        port.set_data_bits(self.data_bits)?;
        port.set_stop_bits(self.stop_bits)?;
        port.set_parity(self.parity)?;
        port.set_flow_control(self.flow_control)?;
        Ok(())
    }
}

/// Per-handle store of line-settings snapshots
///
/// Keyed map owned by the link instance, so separate links (and
/// tests) never share restore state. Uniqueness per handle is a map
/// property; insertion order is irrelevant.
#[derive(Debug, Default)]
pub struct LineSettingsStore {
    entries: HashMap<ChannelHandle, LineSettings>,
}

impl LineSettingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a snapshot; a prior snapshot for the same handle is
    /// overwritten (last-write-wins)
    pub fn save(&mut self, handle: ChannelHandle, settings: LineSettings) {
        self.entries.insert(handle, settings);
    }

    /// Look up the snapshot for a handle
    pub fn find(&self, handle: ChannelHandle) -> Option<&LineSettings> {
        self.entries.get(&handle)
    }

    /// Delete and return the snapshot for a handle; no-op when absent
    pub fn remove(&mut self, handle: ChannelHandle) -> Option<LineSettings> {
        self.entries.remove(&handle)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
