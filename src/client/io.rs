//! Low-level control-channel I/O: command transmission and reply parsing
//! (spec §4.1 "Reply framing")

use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt};
use tokio::time::timeout;
use tracing::trace;

use crate::error::{FtpError, Result};
use crate::response::Reply;

use super::FtpClient;

const LINE_INITIAL_CAPACITY: usize = 256;

/// Parse a reply's leading `"NNN"` code and whether the separator is `-`
/// (continuation) or ` `/`=` (final line).
fn parse_code_prefix(line: &str) -> Result<(u16, bool)> {
    if line.len() < 4 {
        return Err(FtpError::MalformedReply(format!("reply line too short: {line:?}")));
    }
    let (code_str, rest) = line.split_at(3);
    let code = code_str
        .parse::<u16>()
        .map_err(|_| FtpError::MalformedReply(format!("non-numeric reply code: {line:?}")))?;
    if !(100..600).contains(&code) {
        return Err(FtpError::MalformedReply(format!("reply code out of range: {code}")));
    }
    let continuation = rest.starts_with('-');
    Ok((code, continuation))
}

impl FtpClient {
    /// Borrow the control stream, panicking only if called during the brief
    /// window an `AUTH TLS`/`CCC` upgrade is swapping it — that window never
    /// spans an `.await` back into client code, so this is never observed.
    pub(crate) fn control_mut(&mut self) -> &mut tokio::io::BufReader<super::ControlStream> {
        self.stream.as_mut().expect("control stream missing outside an upgrade")
    }

    /// Send a raw command line, appending `\r\n`.
    pub(crate) async fn send_command(&mut self, command: &str) -> Result<()> {
        trace!("-> {}", command);
        self.control_mut().get_mut().write_all(command.as_bytes()).await?;
        self.control_mut().get_mut().write_all(b"\r\n").await?;
        self.control_mut().get_mut().flush().await?;
        Ok(())
    }

    /// Read one complete reply, transparently following RFC 959 §4.2
    /// multi-line continuation (`NNN-...` lines until a final `NNN ...`
    /// line with the same code).
    pub(crate) async fn read_reply(&mut self) -> Result<Reply> {
        self.read_reply_with_timeout(self.config.timeouts.so_timeout).await
    }

    pub(crate) async fn read_reply_with_timeout(&mut self, duration: Duration) -> Result<Reply> {
        let read_future = async {
            let first = self.read_raw_line().await?;
            let (code, continuation) = parse_code_prefix(&first)?;

            if !continuation {
                return Ok(Reply { code, lines: vec![first] });
            }

            let mut lines = vec![first];
            let end_prefix = format!("{code} ");
            let end_prefix_eq = format!("{code}=");
            loop {
                let line = self.read_raw_line().await?;
                let is_end = line.starts_with(&end_prefix) || line.starts_with(&end_prefix_eq);
                lines.push(line);
                if is_end {
                    break;
                }
            }
            Ok(Reply { code, lines })
        };

        timeout(duration, read_future).await.map_err(|_| FtpError::Timeout)?
    }

    async fn read_raw_line(&mut self) -> Result<String> {
        let mut buf = Vec::with_capacity(LINE_INITIAL_CAPACITY);
        let n = self.control_mut().read_until(b'\n', &mut buf).await?;
        if n == 0 {
            return Err(FtpError::ConnectionClosed);
        }
        let line = String::from_utf8_lossy(&buf).trim_end().to_string();
        trace!("<- {}", line);
        Ok(line)
    }

    /// Send a command and read its reply in one step, without interpreting
    /// success/failure. Callers that care about the reply category use
    /// [`FtpClient::expect_success`] on the result.
    pub(crate) async fn command(&mut self, command: &str) -> Result<Reply> {
        self.send_command(command).await?;
        self.read_reply().await
    }

    /// Send a command and require a `2xx` reply, turning anything else into
    /// [`FtpError::Protocol`].
    pub(crate) async fn command_expect_success(&mut self, command: &str) -> Result<Reply> {
        let reply = self.command(command).await?;
        if reply.is_success() {
            Ok(reply)
        } else {
            Err(FtpError::Protocol { code: reply.code, message: reply.message().to_string() })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_single_line_reply_prefix() {
        let (code, continuation) = parse_code_prefix("220 Welcome").unwrap();
        assert_eq!(code, 220);
        assert!(!continuation);
    }

    #[test]
    fn parses_continuation_reply_prefix() {
        let (code, continuation) = parse_code_prefix("211-Features:").unwrap();
        assert_eq!(code, 211);
        assert!(continuation);
    }

    #[test]
    fn rejects_non_numeric_code() {
        assert!(parse_code_prefix("abc message").is_err());
    }

    #[test]
    fn rejects_short_line() {
        assert!(parse_code_prefix("22").is_err());
    }

    #[test]
    fn accepts_equals_separator_as_final_line() {
        // some servers (e.g. after MLST) use "=" rather than " " on the final line
        let (code, continuation) = parse_code_prefix("250=final").unwrap();
        assert_eq!(code, 250);
        assert!(!continuation);
    }
}
