//! CP power-on handshake
//!
//! After a cold start the CP needs an unknown amount of time before
//! it can talk AT. The handshake probes it with `AT+CPAS` until any
//! response arrives, then hands control back to the caller (which
//! loads the modem plugins in the original design).

use crate::error::{VmodemError, VmodemResult};
use crate::state::HandshakeState;
use bytes::BytesMut;
use std::io;
use std::time::Duration;
use vmodem_core::{at, CpActivityStatus};
use vmodem_transport::ChannelAccessor;

/// Fixed status-query probe transmitted to the CP
pub const PROBE_COMMAND: &[u8] = b"AT+CPAS\r";

/// Per-wait response budget before the probe is retransmitted
pub const RESPONSE_BUDGET: Duration = Duration::from_secs(10);

/// Pause after a zero-length read, so a quiescent or closed channel
/// parks the task instead of re-polling hot
const ZERO_READ_PAUSE: Duration = Duration::from_millis(100);

/// Controller for the CP power-on probe cycle
///
/// Drives `Idle -> ProbeSent -> Ready` over an injected transport.
/// One attempt is live at a time; a new attempt starts only after the
/// previous one resolved. The cycle is deliberately unbounded: the
/// CP's cold-boot time has no upper bound from the host's point of
/// view, so only external process teardown abandons the flow.
#[derive(Debug)]
pub struct HandshakeController {
    state: HandshakeState,
    budget: Duration,
}

impl HandshakeController {
    pub fn new() -> Self {
        Self {
            state: HandshakeState::Idle,
            budget: RESPONSE_BUDGET,
        }
    }

    /// Current handshake state
    pub fn state(&self) -> HandshakeState {
        self.state
    }

    /// Run the probe cycle until the CP answers.
    ///
    /// Resolves with the parsed activity status once any response
    /// arrives. The status is informational: per the long-standing
    /// policy, the mere presence of a parseable response proves the
    /// CP has powered up enough to answer, so even `unavailable` and
    /// `unknown` codes (and responses with a surprising token count)
    /// complete the handshake. Only transport failures escalate as
    /// errors.
    pub async fn run<T>(&mut self, link: &mut T) -> VmodemResult<CpActivityStatus>
    where
        T: ChannelAccessor + ?Sized,
    {
        loop {
            self.send_probe(link).await?;

            let mut pending = BytesMut::new();
            let mut chunk = [0u8; 256];
            let mut deadline = tokio::time::Instant::now() + self.budget;

            // One handshake attempt: wait for a complete response
            // line, resending the identical probe on every timeout.
            loop {
                match tokio::time::timeout_at(deadline, link.read(&mut chunk)).await {
                    Err(_) => {
                        // Keepalive, not a new attempt: retransmit
                        // directly, bypassing any command queue.
                        log::debug!("no CPAS response within budget, resending probe");
                        self.send_probe(link).await?;
                        deadline = tokio::time::Instant::now() + self.budget;
                    }
                    Ok(Err(e)) => {
                        log::error!("transport failure during CP handshake: [{}]", e);
                        return Err(e);
                    }
                    Ok(Ok(0)) => {
                        // Nothing usable yet; let the budget elapse
                        // rather than spinning on an idle channel.
                        tokio::time::sleep(ZERO_READ_PAUSE).await;
                    }
                    Ok(Ok(n)) => {
                        pending.extend_from_slice(&chunk[..n]);
                        let Some(line) = at::first_line(&pending) else {
                            continue;
                        };

                        let tokens = at::tokenize(line);
                        if tokens.is_empty() {
                            log::error!("malformed CPAS response [{}], starting new attempt", line);
                            break;
                        }
                        if tokens.len() != 1 {
                            log::error!(
                                "unexpected CPAS token count [{}] - CP answered, proceeding",
                                tokens.len()
                            );
                        }

                        let status = tokens[0]
                            .parse::<u32>()
                            .map(CpActivityStatus::from_code)
                            .unwrap_or(CpActivityStatus::Unknown);

                        match status {
                            CpActivityStatus::Unavailable | CpActivityStatus::Unknown => {
                                log::error!(
                                    "CPAS reports {} - but CP responded, proceeding with power on",
                                    status
                                );
                            }
                            _ => log::debug!("CPAS reports {}", status),
                        }

                        self.state = HandshakeState::Ready;
                        return Ok(status);
                    }
                }
            }
        }
    }

    async fn send_probe<T>(&mut self, link: &mut T) -> VmodemResult<()>
    where
        T: ChannelAccessor + ?Sized,
    {
        let n = link.write(PROBE_COMMAND).await?;
        if n != PROBE_COMMAND.len() {
            // A short write means the command was not delivered; the
            // handshake cannot proceed on a half-sent probe.
            return Err(VmodemError::Connection(io::Error::new(
                io::ErrorKind::WriteZero,
                "status probe not fully delivered",
            )));
        }
        self.state = HandshakeState::ProbeSent;
        Ok(())
    }
}

impl Default for HandshakeController {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use tokio::time::Instant;

    enum ScriptedRead {
        Data(Vec<u8>),
        Empty,
        Silent,
        Fail,
    }

    struct FakeLink {
        reads: VecDeque<ScriptedRead>,
        writes: Vec<Vec<u8>>,
    }

    impl FakeLink {
        fn new(reads: Vec<ScriptedRead>) -> Self {
            Self {
                reads: reads.into(),
                writes: Vec::new(),
            }
        }
    }

    #[async_trait]
    impl ChannelAccessor for FakeLink {
        async fn read(&mut self, buf: &mut [u8]) -> VmodemResult<usize> {
            match self.reads.pop_front() {
                Some(ScriptedRead::Data(data)) => {
                    buf[..data.len()].copy_from_slice(&data);
                    Ok(data.len())
                }
                Some(ScriptedRead::Empty) => Ok(0),
                Some(ScriptedRead::Fail) => Err(VmodemError::Connection(io::Error::from(
                    io::ErrorKind::BrokenPipe,
                ))),
                Some(ScriptedRead::Silent) | None => {
                    std::future::pending::<()>().await;
                    unreachable!()
                }
            }
        }

        async fn write(&mut self, buf: &[u8]) -> VmodemResult<usize> {
            self.writes.push(buf.to_vec());
            Ok(buf.len())
        }

        fn is_open(&self) -> bool {
            true
        }
    }

    #[tokio::test]
    async fn test_ready_after_single_round_trip() {
        let mut link = FakeLink::new(vec![ScriptedRead::Data(b"+CPAS: 0\r\n".to_vec())]);
        let mut controller = HandshakeController::new();

        let status = controller.run(&mut link).await.unwrap();

        assert_eq!(status, CpActivityStatus::Ready);
        assert!(controller.state().is_ready());
        assert_eq!(link.writes, vec![PROBE_COMMAND.to_vec()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_resends_identical_probe() {
        let mut link = FakeLink::new(vec![
            ScriptedRead::Silent,
            ScriptedRead::Data(b"+CPAS: 0\r\n".to_vec()),
        ]);
        let mut controller = HandshakeController::new();

        let started = Instant::now();
        let status = controller.run(&mut link).await.unwrap();

        assert_eq!(status, CpActivityStatus::Ready);
        // One keepalive retransmission, no second concurrent request.
        assert_eq!(link.writes.len(), 2);
        assert!(link.writes.iter().all(|w| w == PROBE_COMMAND));
        assert!(started.elapsed() >= RESPONSE_BUDGET);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_length_reads_pause_until_data() {
        let mut link = FakeLink::new(vec![
            ScriptedRead::Empty,
            ScriptedRead::Empty,
            ScriptedRead::Data(b"+CPAS: 0\r\n".to_vec()),
        ]);
        let mut controller = HandshakeController::new();

        let started = Instant::now();
        let status = controller.run(&mut link).await.unwrap();

        assert_eq!(status, CpActivityStatus::Ready);
        assert_eq!(link.writes.len(), 1);
        // Each empty read parks the task instead of re-polling hot.
        assert_eq!(started.elapsed(), ZERO_READ_PAUSE * 2);
    }

    #[tokio::test]
    async fn test_unavailable_status_still_completes() {
        let mut link = FakeLink::new(vec![ScriptedRead::Data(b"+CPAS: 1\r\n".to_vec())]);
        let mut controller = HandshakeController::new();

        let status = controller.run(&mut link).await.unwrap();

        assert_eq!(status, CpActivityStatus::Unavailable);
        assert!(controller.state().is_ready());
    }

    #[tokio::test]
    async fn test_token_count_mismatch_still_completes() {
        let mut link = FakeLink::new(vec![ScriptedRead::Data(b"+CPAS: 0,1\r\n".to_vec())]);
        let mut controller = HandshakeController::new();

        assert!(controller.run(&mut link).await.is_ok());
        assert!(controller.state().is_ready());
    }

    #[tokio::test]
    async fn test_malformed_response_starts_new_attempt() {
        let mut link = FakeLink::new(vec![
            ScriptedRead::Data(b"+CPAS: ,,\r\n".to_vec()),
            ScriptedRead::Data(b"+CPAS: 0\r\n".to_vec()),
        ]);
        let mut controller = HandshakeController::new();

        let status = controller.run(&mut link).await.unwrap();

        assert_eq!(status, CpActivityStatus::Ready);
        assert_eq!(link.writes.len(), 2);
    }

    #[tokio::test]
    async fn test_fragmented_response_is_accumulated() {
        let mut link = FakeLink::new(vec![
            ScriptedRead::Data(b"+CPA".to_vec()),
            ScriptedRead::Data(b"S: 3\r\n".to_vec()),
        ]);
        let mut controller = HandshakeController::new();

        let status = controller.run(&mut link).await.unwrap();

        assert_eq!(status, CpActivityStatus::Ringing);
        assert_eq!(link.writes.len(), 1);
    }

    #[tokio::test]
    async fn test_transport_failure_escalates() {
        let mut link = FakeLink::new(vec![ScriptedRead::Fail]);
        let mut controller = HandshakeController::new();

        assert!(controller.run(&mut link).await.is_err());
        assert!(!controller.state().is_ready());
    }
}
