//! Serial link to the virtual DPRAM modem device

use crate::config::LinkConfig;
use crate::dump::{self, Direction};
use crate::error::{VmodemError, VmodemResult};
use crate::settings::{LineSettings, LineSettingsStore};
use crate::stream::{ChannelAccessor, ChannelHandle, ChannelLink};
use async_trait::async_trait;
use std::fmt;
use std::io;
use std::ops::{Deref, DerefMut};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio_serial::{DataBits, FlowControl, Parity, SerialPort, SerialStream, StopBits};

use crate::power;
use std::os::unix::io::AsRawFd;

/// Ceiling of consecutive transient-failure retries per write call
pub const WRITE_RETRY_LIMIT: u32 = 10;

/// Pause between write retries
pub const WRITE_RETRY_DELAY: Duration = Duration::from_millis(50);

/// Wrapper for SerialStream that implements Debug
struct DebugSerialStream(SerialStream);

impl fmt::Debug for DebugSerialStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SerialStream").finish()
    }
}

impl Deref for DebugSerialStream {
    type Target = SerialStream;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for DebugSerialStream {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

/// Serial link owning one channel to the CP
///
/// Manages the device lifetime (open, canonical line configuration,
/// restore-on-close) and the data plane (single reads, fully ordered
/// retrying writes, power control). Line-settings snapshots live in a
/// store owned by this instance, so separate links never share
/// restore state.
#[derive(Debug)]
pub struct SerialLink {
    config: LinkConfig,
    stream: Option<DebugSerialStream>,
    handle: Option<ChannelHandle>,
    saved: LineSettingsStore,
    next_handle: u32,
}

impl SerialLink {
    /// Create a link for the given configuration; the device is not
    /// touched until `open()`
    pub fn new(config: LinkConfig) -> Self {
        Self {
            config,
            stream: None,
            handle: None,
            saved: LineSettingsStore::new(),
            next_handle: 1,
        }
    }

    /// Link against the default vdpram device
    pub fn new_default() -> Self {
        Self::new(LinkConfig::default())
    }

    /// Handle of the currently open channel, if any
    pub fn handle(&self) -> Option<ChannelHandle> {
        self.handle
    }

    fn not_connected() -> VmodemError {
        VmodemError::Connection(io::Error::new(
            io::ErrorKind::NotConnected,
            "vdpram channel not open",
        ))
    }

    /// Apply the canonical line discipline: 8 data bits, 1 stop bit,
    /// no parity, hardware flow control off, short read timeout
    fn apply_canonical(
        stream: &mut SerialStream,
        config: &LinkConfig,
    ) -> Result<(), tokio_serial::Error> {
        stream.set_baud_rate(config.baud_rate)?;
        stream.set_data_bits(DataBits::Eight)?;
        stream.set_stop_bits(StopBits::One)?;
        stream.set_parity(Parity::None)?;
        stream.set_flow_control(FlowControl::None)?;
        stream.set_timeout(Duration::from_millis(config.read_timeout_ms))?;
        Ok(())
    }
}

/// Write the full buffer, looping until every byte is accepted.
///
/// Transient backpressure (`WouldBlock`, `EBUSY`) pauses 50 ms and
/// retries; hitting the retry ceiling reports **zero** bytes written,
/// which is distinct from a partial write. Any other error aborts
/// immediately, reporting the bytes delivered so far. The retry
/// counter is local to one call.
pub(crate) async fn write_retrying<W>(stream: &mut W, buf: &[u8]) -> usize
where
    W: AsyncWrite + Unpin,
{
    let mut written = 0;
    let mut retries = 0;

    while written < buf.len() {
        match stream.write(&buf[written..]).await {
            Ok(0) => {
                log::error!("write accepted zero bytes, giving up at [{}]", written);
                return written;
            }
            Ok(n) => {
                log::debug!("write progressed: [{}] bytes, total [{}]", n, written + n);
                written += n;
            }
            Err(e) if is_transient(&e) => {
                if retries == WRITE_RETRY_LIMIT {
                    log::error!("maximum write retries exhausted");
                    return 0;
                }
                retries += 1;
                tokio::time::sleep(WRITE_RETRY_DELAY).await;
            }
            Err(e) => {
                log::error!("write failed after [{}] bytes: [{}]", written, e);
                return written;
            }
        }
    }

    written
}

fn is_transient(e: &io::Error) -> bool {
    e.kind() == io::ErrorKind::WouldBlock || e.raw_os_error() == Some(libc::EBUSY)
}

#[async_trait]
impl ChannelAccessor for SerialLink {
    async fn read(&mut self, buf: &mut [u8]) -> VmodemResult<usize> {
        let stream = self.stream.as_mut().ok_or_else(Self::not_connected)?;

        let n = stream.read(buf).await.map_err(|e| {
            log::error!("vdpram read failed: [{}]", e);
            VmodemError::Connection(e)
        })?;

        dump::dump(Direction::Rx, &buf[..n]);
        Ok(n)
    }

    async fn write(&mut self, buf: &[u8]) -> VmodemResult<usize> {
        let stream = self.stream.as_mut().ok_or_else(Self::not_connected)?;

        dump::dump(Direction::Tx, buf);
        Ok(write_retrying(&mut **stream, buf).await)
    }

    fn is_open(&self) -> bool {
        self.stream.is_some()
    }
}

#[async_trait]
impl ChannelLink for SerialLink {
    async fn open(&mut self) -> VmodemResult<ChannelHandle> {
        if self.stream.is_some() {
            return Err(VmodemError::DeviceUnavailable(
                "channel has already been opened".to_string(),
            ));
        }

        let builder = tokio_serial::new(&self.config.device_path, self.config.baud_rate);
        let mut stream = SerialStream::open(&builder).map_err(|e| {
            VmodemError::DeviceUnavailable(format!(
                "failed to open {}: {}",
                self.config.device_path, e
            ))
        })?;

        let handle = ChannelHandle::new(self.next_handle);
        self.next_handle += 1;

        // Snapshot the line discipline before reconfiguring, so close()
        // can put the terminal back.
        let snapshot = LineSettings::capture(&stream).map_err(|e| {
            VmodemError::DeviceUnavailable(format!("failed to capture line settings: {}", e))
        })?;
        self.saved.save(handle, snapshot);

        if let Err(e) = Self::apply_canonical(&mut stream, &self.config) {
            // Dropping the stream closes the partially opened device.
            self.saved.remove(handle);
            return Err(VmodemError::DeviceUnavailable(format!(
                "failed to configure {}: {}",
                self.config.device_path, e
            )));
        }

        // Legacy liveness probe: the reported status is not acted upon,
        // only a probe that cannot be issued fails open().
        match power::phone_get_status(stream.as_raw_fd()) {
            Ok(status) => log::debug!("phone status probe: [{}] (ignored)", status),
            Err(e) => {
                self.saved.remove(handle);
                return Err(VmodemError::DeviceUnavailable(format!(
                    "phone status probe failed: {}",
                    e
                )));
            }
        }

        log::debug!("opened {} as {}", self.config.device_path, handle);
        self.stream = Some(DebugSerialStream(stream));
        self.handle = Some(handle);
        Ok(handle)
    }

    async fn close(&mut self) -> VmodemResult<()> {
        let Some(mut stream) = self.stream.take() else {
            return Ok(());
        };

        if let Some(handle) = self.handle.take() {
            match self.saved.remove(handle) {
                Some(settings) => {
                    // Restore failure is reported, but the device is
                    // released either way; holding the fd would not
                    // recover the terminal state.
                    if let Err(e) = settings.restore(&mut *stream) {
                        log::error!("failed to restore line settings on {}: [{}]", handle, e);
                        return Err(VmodemError::Connection(io::Error::other(e)));
                    }
                    log::debug!("restored line settings on {}", handle);
                }
                None => log::debug!("no previous line settings for {}", handle),
            }
        }

        Ok(())
    }

    fn power_on(&mut self) -> bool {
        match &self.stream {
            Some(stream) => power::phone_power_on(stream.as_raw_fd()),
            None => {
                log::error!("phone power on requested on a closed channel");
                false
            }
        }
    }

    fn power_off(&mut self) -> bool {
        match &self.stream {
            Some(stream) => power::phone_power_off(stream.as_raw_fd()),
            None => {
                log::error!("phone power off requested on a closed channel");
                false
            }
        }
    }
}
