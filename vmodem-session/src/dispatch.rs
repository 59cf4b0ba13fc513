//! Incoming-data dispatch
//!
//! On every readiness event the link reads raw bytes and forwards
//! them here. Raw data always reaches the generic receive callback;
//! the response-dispatch entry point receives normalized data, which
//! for truncated +CMT pushes means the re-encoded PDU form.

use vmodem_sms::{is_sms_push, reencode};

/// Consumer of received channel data
///
/// Implemented by the host plugin layer: `on_raw` is the generic
/// receive callback invoked for every successful read, `on_response`
/// feeds the downstream command/response matching.
pub trait ReceiveSink {
    fn on_raw(&mut self, data: &[u8]);
    fn on_response(&mut self, data: &[u8]);
}

/// Forward one received buffer to the sink.
///
/// +CMT notifications are re-encoded before reaching the response
/// path; when re-encoding fails the uncorrected bytes are forwarded
/// so the upstream parser can still surface the failure. Everything
/// else passes through untouched.
pub fn dispatch_received(buf: &[u8], sink: &mut dyn ReceiveSink) {
    sink.on_raw(buf);

    if is_sms_push(buf) {
        match reencode(buf) {
            Ok(corrected) => {
                log::debug!(
                    "+CMT notification re-encoded: [{}] -> [{}] bytes",
                    buf.len(),
                    corrected.len()
                );
                sink.on_response(&corrected);
            }
            Err(e) => {
                log::error!("+CMT re-encode failed: [{}], forwarding as-is", e);
                sink.on_response(buf);
            }
        }
    } else {
        sink.on_response(buf);
    }
}
