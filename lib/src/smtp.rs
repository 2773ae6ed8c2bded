//! C3: one SMTP probe against one MX host.
//!
//! An explicit forward-only state machine over a raw TCP socket:
//! `Connect -> AwaitBanner -> AwaitHeloAck -> AwaitMailAck -> AwaitRcptAck -> Done`.
//! A single wall-clock deadline covers the whole conversation; on expiry the
//! prober sends a best-effort `QUIT` and closes the socket. Every probe
//! resolves exactly once; bytes observed after resolution are never read.

use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::{self, Instant};
use tracing::{debug, trace};

/// Parameters for a single probe, independent of which MX host it targets.
#[derive(Debug, Clone)]
pub struct ProbeConfig {
    pub port: u16,
    pub helo_domain: String,
    pub sender_address: String,
    pub timeout: Duration,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            port: 25,
            helo_domain: "email-validator.com".to_string(),
            sender_address: "check@email-validator.com".to_string(),
            timeout: Duration::from_secs(15),
        }
    }
}

/// Terminal outcome of one SMTP probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    Valid,
    NotExisting,
    MailboxError,
    TemporaryError,
    /// Carries the server's own response line.
    SmtpError(String),
    SmtpTimeout,
    ConnectionError(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    AwaitBanner,
    AwaitHeloAck,
    AwaitMailAck,
    AwaitRcptAck,
}

/// Run one probe: connect to `host:port`, HELO, MAIL FROM, RCPT TO `recipient`.
pub async fn probe(host: &str, recipient: &str, config: &ProbeConfig) -> ProbeOutcome {
    let deadline = Instant::now() + config.timeout;

    let connect = TcpStream::connect((host, config.port));
    let mut stream = match time::timeout_at(deadline, connect).await {
        Ok(Ok(stream)) => stream,
        Ok(Err(e)) => return ProbeOutcome::ConnectionError(e.to_string()),
        Err(_) => return ProbeOutcome::SmtpTimeout,
    };

    trace!(host, "connected, awaiting banner");

    let outcome = converse(&mut stream, recipient, config, deadline).await;
    cleanup(&mut stream, deadline).await;
    debug!(host, ?outcome, "probe resolved");
    outcome
}

async fn converse(
    stream: &mut TcpStream,
    recipient: &str,
    config: &ProbeConfig,
    deadline: Instant,
) -> ProbeOutcome {
    let mut state = State::AwaitBanner;
    let mut pending = Vec::new();
    let mut read_buf = [0u8; 4096];

    loop {
        let n = match time::timeout_at(deadline, stream.read(&mut read_buf)).await {
            Err(_) => return ProbeOutcome::SmtpTimeout,
            Ok(Err(e)) => return ProbeOutcome::ConnectionError(e.to_string()),
            Ok(Ok(0)) => return ProbeOutcome::ConnectionError("connection closed by peer".to_string()),
            Ok(Ok(n)) => n,
        };
        pending.extend_from_slice(&read_buf[..n]);

        while let Some(line) = take_line(&mut pending) {
            if let Some(outcome) = classify(&line) {
                return outcome;
            }

            let next_command = match (state, line_code(&line)) {
                (State::AwaitBanner, Some(220)) => {
                    state = State::AwaitHeloAck;
                    Some(format!("HELO {}\r\n", config.helo_domain))
                }
                (State::AwaitHeloAck, Some(250)) if contains_token(&line, "HELO") => {
                    state = State::AwaitMailAck;
                    Some(format!("MAIL FROM: <{}>\r\n", config.sender_address))
                }
                (State::AwaitMailAck, Some(250)) if contains_token(&line, "MAIL") => {
                    state = State::AwaitRcptAck;
                    Some(format!("RCPT TO: <{recipient}>\r\n"))
                }
                (State::AwaitRcptAck, Some(250)) if contains_token(&line, "RCPT") => {
                    return ProbeOutcome::Valid;
                }
                _ => None,
            };

            if let Some(command) = next_command {
                if let Err(outcome) = send(stream, &command, deadline).await {
                    return outcome;
                }
            }
            // A 250 line lacking the expected verb echo (or any other
            // unrecognised line) is silently dropped; the state stalls
            // until the conversation deadline expires.
        }
    }
}

/// Codes that resolve the conversation regardless of current state.
fn classify(line: &str) -> Option<ProbeOutcome> {
    match line_code(line)? {
        550 | 551 => Some(ProbeOutcome::NotExisting),
        552 | 553 => Some(ProbeOutcome::MailboxError),
        421 | 450 => Some(ProbeOutcome::TemporaryError),
        code if (500..=599).contains(&code) => Some(ProbeOutcome::SmtpError(line.to_string())),
        _ => None,
    }
}

fn line_code(line: &str) -> Option<u16> {
    line.get(0..3)?.parse().ok()
}

fn contains_token(line: &str, token: &str) -> bool {
    line.to_ascii_uppercase().contains(token)
}

/// Pop one complete CRLF-terminated line off `buf`, retaining any trailing fragment.
fn take_line(buf: &mut Vec<u8>) -> Option<String> {
    let pos = buf.windows(2).position(|w| w == b"\r\n")?;
    let rest = buf.split_off(pos + 2);
    let mut line = std::mem::replace(buf, rest);
    line.truncate(line.len() - 2);
    Some(String::from_utf8_lossy(&line).into_owned())
}

async fn send(stream: &mut TcpStream, command: &str, deadline: Instant) -> Result<(), ProbeOutcome> {
    match time::timeout_at(deadline, stream.write_all(command.as_bytes())).await {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(ProbeOutcome::ConnectionError(e.to_string())),
        Err(_) => Err(ProbeOutcome::SmtpTimeout),
    }
}

/// Best-effort `QUIT` before the socket is dropped. Errors are suppressed:
/// the probe has already resolved, cleanup failures must not change the
/// outcome or hang the caller.
async fn cleanup(stream: &mut TcpStream, deadline: Instant) {
    let quit_deadline = Instant::now() + Duration::from_millis(500).min(
        deadline.saturating_duration_since(Instant::now()),
    );
    let _ = time::timeout_at(quit_deadline, stream.write_all(b"QUIT\r\n")).await;
}
