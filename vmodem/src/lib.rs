//! vmodem - transport and protocol-adaptation core for a cellular
//! modem interface
//!
//! Owns the serial channel to the CP baseband, negotiates line
//! parameters, powers the channel on and off, performs reliable
//! framed writes, and normalizes asynchronous modem notifications so
//! upstream AT parsing sees standards-conformant data.
//!
//! # Architecture
//!
//! This library is organized as a workspace with multiple crates:
//!
//! - `vmodem-core`: error taxonomy, CP activity status, AT line
//!   handling
//! - `vmodem-transport`: serial link (open/configure/close, power
//!   control, retrying writes, line-settings restore)
//! - `vmodem-session`: CP power-on handshake and incoming-data
//!   dispatch
//! - `vmodem-sms`: +CMT PDU re-encoding
//!
//! # Usage
//!
//! ```no_run
//! use vmodem::transport::{ChannelLink, SerialLink};
//! use vmodem::session::HandshakeController;
//!
//! # async fn start() -> vmodem::VmodemResult<()> {
//! let mut link = SerialLink::new_default();
//! link.open().await?;
//! link.power_on();
//!
//! let mut handshake = HandshakeController::new();
//! let status = handshake.run(&mut link).await?;
//! println!("CP answered with {}", status);
//! # Ok(())
//! # }
//! ```

// Re-export core types
pub use vmodem_core::{CpActivityStatus, VmodemError, VmodemResult};

// Re-export transport API
pub mod transport {
    pub use vmodem_transport::*;
}

// Re-export session API
pub mod session {
    pub use vmodem_session::*;
}

// Re-export SMS re-encoding API
pub mod sms {
    pub use vmodem_sms::*;
}
