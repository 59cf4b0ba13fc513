//! CP power-on handshake state machine

/// Handshake state
///
/// ```text
/// Idle -> ProbeSent (probe transmitted, response awaited)
/// ProbeSent -> Ready (CP answered)
/// ProbeSent -> ProbeSent (malformed response, new attempt)
/// ```
///
/// `Ready` is terminal; there is no failure state because the probe
/// cycle retries for as long as the process lives. A response timeout
/// keeps the same attempt alive (the identical command is resent as a
/// keepalive) and does not transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HandshakeState {
    /// No probe has been sent yet
    #[default]
    Idle,
    /// A status probe is outstanding
    ProbeSent,
    /// The CP answered; control passes to plugin loading
    Ready,
}

impl HandshakeState {
    /// Check whether the CP has answered and probing has stopped
    pub fn is_ready(&self) -> bool {
        matches!(self, HandshakeState::Ready)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HandshakeState::Idle => "Idle",
            HandshakeState::ProbeSent => "ProbeSent",
            HandshakeState::Ready => "Ready",
        }
    }
}
