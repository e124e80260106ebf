//! Wire-protocol vocabulary
//!
//! The protocol is newline-terminated ASCII, one message per line:
//!
//! ```text
//! C->S: HELLO
//! S->C: CHALLENGE <hex-string>
//! C->S: SOLUTION <hex-string>
//! S->C: QUOTE <text>      (success)
//! S->C: ERROR             (verification failed)
//! ```
//!
//! Parsing is strict: a wrong literal token or a wrong token count yields
//! `None`, and the caller aborts the connection with no response line.

use std::fmt;

pub const CMD_HELLO: &str = "HELLO";
pub const CMD_CHALLENGE: &str = "CHALLENGE";
pub const CMD_SOLUTION: &str = "SOLUTION";
pub const CMD_QUOTE: &str = "QUOTE";
pub const CMD_ERROR: &str = "ERROR";

/// One protocol message, either direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    Hello,
    Challenge(String),
    Solution(String),
    Quote(String),
    Error,
}

impl Message {
    /// Parse one line (without requiring the trailing newline).
    ///
    /// Surrounding whitespace is trimmed first. `HELLO` and `ERROR` must be
    /// the only token on the line; `CHALLENGE` and `SOLUTION` take exactly
    /// one whitespace-separated argument; `QUOTE` takes the rest of the
    /// line as free text.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        let mut parts = line.split_whitespace();
        let command = parts.next()?;
        match command {
            CMD_HELLO => parts.next().is_none().then_some(Message::Hello),
            CMD_ERROR => parts.next().is_none().then_some(Message::Error),
            CMD_CHALLENGE => {
                let payload = parts.next()?;
                parts
                    .next()
                    .is_none()
                    .then(|| Message::Challenge(payload.to_string()))
            }
            CMD_SOLUTION => {
                let payload = parts.next()?;
                parts
                    .next()
                    .is_none()
                    .then(|| Message::Solution(payload.to_string()))
            }
            CMD_QUOTE => {
                let text = line[CMD_QUOTE.len()..].trim_start();
                (!text.is_empty()).then(|| Message::Quote(text.to_string()))
            }
            _ => None,
        }
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Message::Hello => write!(f, "{CMD_HELLO}"),
            Message::Challenge(hex) => write!(f, "{CMD_CHALLENGE} {hex}"),
            Message::Solution(hex) => write!(f, "{CMD_SOLUTION} {hex}"),
            Message::Quote(text) => write!(f, "{CMD_QUOTE} {text}"),
            Message::Error => write!(f, "{CMD_ERROR}"),
        }
    }
}
