//! CP activity status codes reported by the +CPAS status query

use std::fmt;

/// CP (Communication Processor) activity status
///
/// These are the status codes the modem may report in response to the
/// `AT+CPAS` activity query. The numeric values are fixed by the
/// command definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CpActivityStatus {
    /// CP is powered and ready to accept commands
    Ready,
    /// CP reports it is unavailable
    Unavailable,
    /// CP cannot determine its own state
    Unknown,
    /// Incoming call is ringing
    Ringing,
    /// A call is in progress
    CallInProgress,
    /// CP is in a low-power sleep state
    Asleep,
}

impl CpActivityStatus {
    /// Map a numeric status code to its activity status.
    ///
    /// Codes outside the defined enumeration fold into `Unknown`, the
    /// same way the reference handling lumps unrecognized codes into
    /// the default arm.
    pub fn from_code(code: u32) -> Self {
        match code {
            0 => CpActivityStatus::Ready,
            1 => CpActivityStatus::Unavailable,
            2 => CpActivityStatus::Unknown,
            3 => CpActivityStatus::Ringing,
            4 => CpActivityStatus::CallInProgress,
            5 => CpActivityStatus::Asleep,
            _ => CpActivityStatus::Unknown,
        }
    }

    /// Numeric code as carried on the wire
    pub fn code(&self) -> u32 {
        match self {
            CpActivityStatus::Ready => 0,
            CpActivityStatus::Unavailable => 1,
            CpActivityStatus::Unknown => 2,
            CpActivityStatus::Ringing => 3,
            CpActivityStatus::CallInProgress => 4,
            CpActivityStatus::Asleep => 5,
        }
    }
}

impl fmt::Display for CpActivityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CpActivityStatus::Ready => "ready",
            CpActivityStatus::Unavailable => "unavailable",
            CpActivityStatus::Unknown => "unknown",
            CpActivityStatus::Ringing => "ringing",
            CpActivityStatus::CallInProgress => "call-in-progress",
            CpActivityStatus::Asleep => "asleep",
        };
        write!(f, "{} ({})", name, self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_code_roundtrip() {
        for code in 0..=5u32 {
            let status = CpActivityStatus::from_code(code);
            assert_eq!(status.code(), code);
        }
    }

    #[test]
    fn test_unrecognized_code_is_unknown() {
        assert_eq!(CpActivityStatus::from_code(99), CpActivityStatus::Unknown);
    }
}
