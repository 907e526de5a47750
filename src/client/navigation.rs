//! Directory and file management commands: CWD/CDUP/PWD/MKD/RMD/DELE/RNFR+RNTO
//! (RFC 959 §4.1.1, spec §4.7)

use crate::commands;
use crate::error::{FtpError, Result};

use super::FtpClient;

/// Extract a quoted pathname from a `257`/`250` reply, e.g. `257 "/pub" created`.
fn extract_quoted_path(message: &str) -> Result<String> {
    let start = message
        .find('"')
        .ok_or_else(|| FtpError::MalformedReply(format!("no quoted path in reply: {message}")))?;
    let rest = &message[start + 1..];
    let mut result = String::new();
    let mut chars = rest.char_indices().peekable();
    while let Some((_, c)) = chars.next() {
        if c == '"' {
            if chars.peek().map(|&(_, next)| next) == Some('"') {
                result.push('"');
                chars.next();
                continue;
            }
            return Ok(result);
        }
        result.push(c);
    }
    Err(FtpError::MalformedReply(format!("unterminated quoted path in reply: {message}")))
}

impl FtpClient {
    /// `CWD`.
    pub async fn change_dir(&mut self, path: &str) -> Result<()> {
        self.command_expect_success(&commands::cwd(path)).await?;
        Ok(())
    }

    /// `CDUP`.
    pub async fn change_dir_up(&mut self) -> Result<()> {
        self.command_expect_success(commands::cdup()).await?;
        Ok(())
    }

    /// `PWD`.
    pub async fn current_dir(&mut self) -> Result<String> {
        let reply = self.command_expect_success(commands::pwd()).await?;
        extract_quoted_path(reply.message())
    }

    /// `MKD`.
    pub async fn make_dir(&mut self, path: &str) -> Result<String> {
        let reply = self.command_expect_success(&commands::mkd(path)).await?;
        extract_quoted_path(reply.message())
    }

    /// `RMD`.
    pub async fn remove_dir(&mut self, path: &str) -> Result<()> {
        self.command_expect_success(&commands::rmd(path)).await?;
        Ok(())
    }

    /// `DELE`.
    pub async fn delete_file(&mut self, path: &str) -> Result<()> {
        self.command_expect_success(&commands::dele(path)).await?;
        Ok(())
    }

    /// `RNFR` + `RNTO` as a single atomic-looking operation; if `RNTO` fails
    /// the rename has still been aborted server-side per RFC 959 §4.1.1.
    pub async fn rename(&mut self, from: &str, to: &str) -> Result<()> {
        self.command_expect_success(&commands::rnfr(from)).await?;
        self.command_expect_success(&commands::rnto(to)).await?;
        Ok(())
    }

    /// `ABOR`: abort an in-progress transfer.
    pub async fn abort(&mut self) -> Result<()> {
        self.send_command(commands::abor()).await?;
        // Some servers answer with a 426 for the aborted transfer followed
        // by a 226; accept either ordering by reading until a 2xx arrives
        // or the control connection looks settled.
        let reply = self.read_reply().await?;
        if reply.is_negative() && reply.code != crate::response::codes::CONNECTION_CLOSED_TRANSFER_ABORTED {
            return Err(FtpError::Protocol { code: reply.code, message: reply.message().to_string() });
        }
        if !reply.is_success() {
            let _ = self.read_reply().await;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_simple_quoted_path() {
        assert_eq!(extract_quoted_path(r#"257 "/home/alice" is the current directory"#).unwrap(), "/home/alice");
    }

    #[test]
    fn extracts_quoted_path_with_escaped_quote() {
        assert_eq!(extract_quoted_path(r#"257 "/weird""name" created"#).unwrap(), r#"/weird"name"#);
    }

    #[test]
    fn errors_without_quotes() {
        assert!(extract_quoted_path("257 no quotes here").is_err());
    }
}
