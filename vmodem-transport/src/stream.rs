//! Channel accessor traits for the serial link

use crate::error::VmodemResult;
use async_trait::async_trait;
use std::fmt;

/// Opaque identifier for one open channel to the CP
///
/// A handle is created on a successful `open()` and invalidated by
/// `close()`. At most one line-settings snapshot exists per live
/// handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChannelHandle(u32);

impl ChannelHandle {
    pub(crate) fn new(id: u32) -> Self {
        Self(id)
    }

    /// Construct a handle from its raw identifier
    ///
    /// Mostly useful for tests and diagnostics; production handles
    /// come from `ChannelLink::open()`.
    pub fn from_raw(id: u32) -> Self {
        Self(id)
    }
}

impl fmt::Display for ChannelHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "channel#{}", self.0)
    }
}

/// Data-plane interface of an open channel to the CP
///
/// The handshake controller and the AT command pump talk to the modem
/// through this trait, so tests can substitute a scripted fake for
/// the real serial device.
#[async_trait]
pub trait ChannelAccessor: Send {
    /// Read once from the channel
    ///
    /// Returns fewer bytes than the buffer holds when fewer are
    /// available. An `Err` is a soft failure: callers log it and keep
    /// waiting for the next readiness event.
    async fn read(&mut self, buf: &mut [u8]) -> VmodemResult<usize>;

    /// Write the full buffer, retrying transient backpressure
    ///
    /// Returns the number of bytes actually delivered. A short count
    /// means the command was not fully delivered; a count of zero
    /// after a non-empty request means the retry ceiling was
    /// exhausted. Neither is reported as `Err` — callers must check
    /// the count.
    async fn write(&mut self, buf: &[u8]) -> VmodemResult<usize>;

    /// Check whether the channel is currently open
    fn is_open(&self) -> bool;
}

/// Lifecycle and power-control interface of the serial link
#[async_trait]
pub trait ChannelLink: ChannelAccessor {
    /// Open the device and apply the canonical line discipline
    async fn open(&mut self) -> VmodemResult<ChannelHandle>;

    /// Restore the saved line discipline and release the channel
    ///
    /// Idempotent: closing a channel with no stored snapshot (or one
    /// that was never opened) succeeds without touching the device.
    async fn close(&mut self) -> VmodemResult<()>;

    /// Assert CP power; the externally visible power-state flag is
    /// the caller's to update
    fn power_on(&mut self) -> bool;

    /// Deassert CP power
    fn power_off(&mut self) -> bool;
}
