//! Error re-exports for the SMS re-encoding layer

pub use vmodem_core::{VmodemError, VmodemResult};
