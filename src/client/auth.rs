//! Login sequence: USER/PASS/ACCT (RFC 959 §4.1.1, spec §4.8)

use crate::commands;
use crate::error::Result;
use crate::response::codes;

use super::state::ConnectionState;
use super::FtpClient;

impl FtpClient {
    /// Run the login sequence using the credentials from [`ClientConfig`](crate::ClientConfig).
    ///
    /// Unlike most operations, a rejected login is not an error: it returns
    /// `Ok(false)` so callers can retry with different credentials without
    /// unwinding. Protocol-level failures (timeouts, connection loss,
    /// malformed replies) still surface as `Err`.
    pub async fn login(&mut self) -> Result<bool> {
        let username = self.config.credentials.username.clone();
        let reply = self.command(&commands::user(&username)).await?;

        match reply.code {
            codes::USER_LOGGED_IN => {
                self.state = ConnectionState::Authenticated;
                return Ok(true);
            }
            codes::NEED_PASSWORD | codes::NEED_ACCOUNT => {}
            _ => return Ok(false),
        }

        let password = self.config.credentials.password.clone();
        let reply = self.command(&commands::pass(&password)).await?;

        match reply.code {
            codes::USER_LOGGED_IN => {
                self.state = ConnectionState::Authenticated;
                Ok(true)
            }
            codes::NEED_ACCOUNT => {
                let Some(account) = self.config.credentials.account.clone() else {
                    return Ok(false);
                };
                let reply = self.command(&commands::acct(&account)).await?;
                if reply.code == codes::USER_LOGGED_IN {
                    self.state = ConnectionState::Authenticated;
                    Ok(true)
                } else {
                    Ok(false)
                }
            }
            _ => Ok(false),
        }
    }

    /// Re-initialize the connection (`REIN`) so a new login can follow
    /// without reconnecting.
    pub async fn reset_login(&mut self) -> Result<()> {
        self.command_expect_success(commands::rein()).await?;
        self.state = ConnectionState::Ready;
        self.feature_cache_state = crate::capabilities::FeatureCacheState::Unfetched;
        self.system_type = None;
        self.dialect = None;
        Ok(())
    }
}
