//! Serial link layer for the vmodem stack
//!
//! This crate owns the physical channel to the CP: device open with
//! canonical line configuration, restore-on-close via per-handle
//! settings snapshots, DPRAM power control and a retrying write path.

pub mod config;
pub mod dump;
pub mod error;
pub mod power;
pub mod serial;
pub mod settings;
pub mod stream;

pub use config::LinkConfig;
pub use dump::Direction;
pub use error::{VmodemError, VmodemResult};
pub use serial::{SerialLink, WRITE_RETRY_DELAY, WRITE_RETRY_LIMIT};
pub use settings::{LineSettings, LineSettingsStore};
pub use stream::{ChannelAccessor, ChannelHandle, ChannelLink};
