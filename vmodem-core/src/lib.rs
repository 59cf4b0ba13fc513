//! Core types for the vmodem transport stack
//!
//! This crate provides the error taxonomy, the CP activity status
//! enumeration and minimal AT response line handling shared by the
//! transport and session layers.

pub mod at;
pub mod error;
pub mod status;

pub use error::{VmodemError, VmodemResult};
pub use status::CpActivityStatus;
