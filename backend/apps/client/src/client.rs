//! Quote Client
//!
//! Drives one full exchange against a quote server: greet, receive the
//! challenge, search for a solution, submit it, read the verdict. One
//! deadline covers the whole exchange including the solution search.

use std::time::Duration;

use kernel::protocol::Message;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::time::timeout;

use crate::solver::Solver;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("i/o failure: {0}")]
    Io(#[from] std::io::Error),
    #[error("entropy source unavailable: {0}")]
    Entropy(#[from] platform::crypto::CryptoError),
    #[error("server rejected the solution")]
    Rejected,
    #[error("unexpected server response: {0:?}")]
    Protocol(String),
    #[error("exchange timed out")]
    Timeout,
}

pub struct QuoteClient {
    addr: String,
    solver: Solver,
    deadline: Duration,
}

impl QuoteClient {
    pub fn new(addr: String, difficulty_bits: u8, deadline: Duration) -> Self {
        Self {
            addr,
            solver: Solver::new(difficulty_bits),
            deadline,
        }
    }

    pub async fn fetch_quote(&self) -> Result<String, ClientError> {
        timeout(self.deadline, self.exchange())
            .await
            .map_err(|_| ClientError::Timeout)?
    }

    async fn exchange(&self) -> Result<String, ClientError> {
        let stream = TcpStream::connect(&self.addr).await?;
        let (read_half, mut write_half) = stream.into_split();
        let mut reader = BufReader::new(read_half);

        write_half
            .write_all(format!("{}\n", Message::Hello).as_bytes())
            .await?;

        let line = read_line(&mut reader).await?;
        let challenge = match Message::parse(&line) {
            Some(Message::Challenge(challenge)) => challenge,
            _ => return Err(ClientError::Protocol(line.trim_end().to_string())),
        };
        tracing::debug!(challenge = %challenge, "challenge received");

        let solution = self.solver.solve(&challenge)?;
        write_half
            .write_all(format!("{}\n", Message::Solution(solution)).as_bytes())
            .await?;

        let line = read_line(&mut reader).await?;
        match Message::parse(&line) {
            Some(Message::Quote(quote)) => Ok(quote),
            Some(Message::Error) => Err(ClientError::Rejected),
            _ => Err(ClientError::Protocol(line.trim_end().to_string())),
        }
    }
}

async fn read_line(
    reader: &mut BufReader<tokio::net::tcp::OwnedReadHalf>,
) -> Result<String, ClientError> {
    let mut line = String::new();
    let n = reader.read_line(&mut line).await?;
    if n == 0 {
        return Err(ClientError::Protocol("connection closed".to_string()));
    }
    Ok(line)
}
