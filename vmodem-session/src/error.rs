//! Error re-exports for the session layer

pub use vmodem_core::{VmodemError, VmodemResult};
