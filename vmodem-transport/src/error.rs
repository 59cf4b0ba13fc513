//! Error re-exports for the transport layer

pub use vmodem_core::{VmodemError, VmodemResult};
