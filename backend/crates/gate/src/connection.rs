//! Per-Connection Protocol State Machine
//!
//! Drives exactly one exchange over an accepted connection:
//! `AwaitHello -> ChallengeIssued -> AwaitSolution -> Resolved -> Closed`.
//! Any deviation (wrong token, wrong token count, oversized line, timeout)
//! aborts with no response line at all; a well-formed but wrong solution
//! gets `ERROR`.
//!
//! The handler is generic over the stream so tests can drive it with
//! `tokio::io::duplex`.

use std::net::IpAddr;

use kernel::error::app_error::{AppError, AppResult};
use kernel::protocol::Message;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::time::timeout;

use crate::config::GateConfig;
use crate::ports::{MetricsCollector, PowService, QuoteProvider};

/// How the exchange ended, for logging.
#[derive(Debug)]
enum Outcome {
    QuoteSent,
    SolutionRejected,
}

/// Run one exchange on an accepted, admitted connection. All failures are
/// contained here; nothing escapes to the supervisor.
pub async fn handle<S, P, Q, M>(
    stream: S,
    peer: IpAddr,
    pow: &P,
    quotes: &Q,
    metrics: &M,
    config: &GateConfig,
) where
    S: AsyncRead + AsyncWrite + Unpin,
    P: PowService,
    Q: QuoteProvider,
    M: MetricsCollector + Sync,
{
    // One deadline spans the whole exchange from connection start.
    let result = match timeout(
        config.read_timeout,
        exchange(stream, pow, quotes, metrics, config),
    )
    .await
    {
        Ok(result) => result,
        Err(_) => Err(AppError::timeout("exchange deadline exceeded")),
    };

    match result {
        Ok(Outcome::QuoteSent) => {
            tracing::debug!(addr = %peer, "quote sent");
        }
        Ok(Outcome::SolutionRejected) => {
            tracing::info!(addr = %peer, "solution rejected");
        }
        Err(err) if err.is_operational() => {
            tracing::error!(addr = %peer, error = %err, "connection failed");
        }
        Err(err) if err.kind().closes_silently() => {
            tracing::info!(addr = %peer, error = %err, "connection aborted without response");
        }
        Err(err) => {
            tracing::warn!(addr = %peer, error = %err, "connection aborted");
        }
    }
}

async fn exchange<S, P, Q, M>(
    stream: S,
    pow: &P,
    quotes: &Q,
    metrics: &M,
    config: &GateConfig,
) -> AppResult<Outcome>
where
    S: AsyncRead + AsyncWrite + Unpin,
    P: PowService,
    Q: QuoteProvider,
    M: MetricsCollector + Sync,
{
    let (read_half, mut write_half) = tokio::io::split(stream);
    let mut reader = BufReader::with_capacity(config.buffer_size, read_half);

    // AwaitHello
    let line = read_line_bounded(&mut reader, config.max_message_size).await?;
    if Message::parse(&line) != Some(Message::Hello) {
        return Err(AppError::protocol_violation("expected HELLO"));
    }

    // ChallengeIssued
    let challenge = pow.generate_challenge(config.challenge_length)?;
    write_line(
        &mut write_half,
        &Message::Challenge(challenge.clone()),
        config,
    )
    .await?;

    // AwaitSolution
    let line = read_line_bounded(&mut reader, config.max_message_size).await?;
    let solution = match Message::parse(&line) {
        Some(Message::Solution(solution)) => solution,
        _ => return Err(AppError::protocol_violation("malformed SOLUTION line")),
    };

    // Resolved
    if pow.verify_solution(&challenge, &solution) {
        metrics.inc_success_challenges();
        let quote = quotes.random_quote();
        write_line(&mut write_half, &Message::Quote(quote), config).await?;
        metrics.inc_quotes_sent();
        Ok(Outcome::QuoteSent)
    } else {
        metrics.inc_failed_challenges();
        write_line(&mut write_half, &Message::Error, config).await?;
        Ok(Outcome::SolutionRejected)
    }
}

/// Read one newline-terminated line of at most `max_len` bytes (terminator
/// included). A longer line or a closed connection is a protocol
/// violation.
async fn read_line_bounded<R>(reader: &mut R, max_len: usize) -> AppResult<String>
where
    R: AsyncBufRead + Unpin,
{
    let mut buf = Vec::new();
    let n = (&mut *reader)
        .take(max_len as u64 + 1)
        .read_until(b'\n', &mut buf)
        .await?;
    if n == 0 {
        return Err(AppError::protocol_violation("connection closed mid-exchange"));
    }
    if buf.len() > max_len {
        return Err(AppError::protocol_violation("message exceeds size limit"));
    }
    Ok(String::from_utf8(buf)?)
}

async fn write_line<W>(writer: &mut W, message: &Message, config: &GateConfig) -> AppResult<()>
where
    W: AsyncWrite + Unpin,
{
    let frame = format!("{message}\n");
    timeout(config.write_timeout, writer.write_all(frame.as_bytes()))
        .await
        .map_err(|_| AppError::timeout("write deadline exceeded"))??;
    Ok(())
}
