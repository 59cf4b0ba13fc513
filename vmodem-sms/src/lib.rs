//! MT SMS PDU re-encoding for the vmodem stack
//!
//! Repairs +CMT push notifications whose PDU region arrived as raw
//! bytes with a stale unit-count field, producing the hex-encoded,
//! length-correct form upstream AT parsing expects.

pub mod error;
pub mod reencode;

pub use error::{VmodemError, VmodemResult};
pub use reencode::{is_sms_push, nibble_at, reencode, CMT_PREFIX, SCRATCH_CAPACITY};
