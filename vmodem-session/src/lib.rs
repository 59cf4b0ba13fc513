//! Session layer for the vmodem stack
//!
//! This crate drives the CP power-on handshake over the serial link
//! and dispatches incoming channel data to the host callbacks,
//! normalizing truncated +CMT notifications on the way.

pub mod dispatch;
pub mod error;
pub mod handshake;
pub mod state;

pub use dispatch::{dispatch_received, ReceiveSink};
pub use error::{VmodemError, VmodemResult};
pub use handshake::{HandshakeController, PROBE_COMMAND, RESPONSE_BUDGET};
pub use state::HandshakeState;
