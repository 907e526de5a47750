//! Keepalive NOOP interleaving during long-running transfers (spec §4.4.1)
//!
//! Some firewalls and load balancers drop an idle control connection while
//! a data transfer is in progress. When `control_keepalive_idle` is set, the
//! transfer engine periodically pauses the copy loop, sends `NOOP` on the
//! control channel, and resumes. The control socket's own read timeout is
//! saved and restored around this so a slow NOOP reply doesn't get
//! mistaken for a dead control connection.

use std::time::Duration;

use crate::commands;
use crate::error::Result;
use crate::response::codes;

use super::FtpClient;

/// Counters accumulated across every keepalive NOOP sent on a connection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeepaliveStats {
    /// NOOPs that received a `200` reply
    pub acked: u64,
    /// NOOPs sent but not yet acknowledged (always 0 once a transfer finishes cleanly)
    pub still_pending: u64,
    /// Bytes of unread control-channel data encountered while waiting on a NOOP reply
    pub unread: u64,
    /// I/O errors encountered sending or reading a keepalive NOOP
    pub io_errors: u64,
}

/// Drives periodic `NOOP` keepalives across a long-running transfer.
///
/// Constructed at the start of a transfer and polled by the copy loop; it is
/// a no-op (never fires) when `idle` is `Duration::ZERO`.
pub(crate) struct KeepaliveInterleaver {
    idle: Duration,
    reply_timeout: Duration,
    last_activity: tokio::time::Instant,
}

impl KeepaliveInterleaver {
    pub(crate) fn new(idle: Duration, reply_timeout: Duration) -> Self {
        Self {
            idle,
            reply_timeout,
            last_activity: tokio::time::Instant::now(),
        }
    }

    pub(crate) fn enabled(&self) -> bool {
        self.idle > Duration::ZERO
    }

    pub(crate) fn note_activity(&mut self) {
        self.last_activity = tokio::time::Instant::now();
    }

    pub(crate) fn due(&self) -> bool {
        self.enabled() && self.last_activity.elapsed() >= self.idle
    }

    /// Send a NOOP and wait (bounded by `reply_timeout`) for its reply,
    /// updating `client.keepalive_stats` and resetting the idle clock.
    pub(crate) async fn fire(&mut self, client: &mut FtpClient) -> Result<()> {
        self.note_activity();
        client.keepalive_stats.still_pending += 1;

        let outcome = async {
            client.send_command(commands::noop()).await?;
            client.read_reply().await
        };

        match tokio::time::timeout(self.reply_timeout, outcome).await {
            Ok(Ok(reply)) => {
                client.keepalive_stats.still_pending -= 1;
                if reply.code == codes::COMMAND_OK {
                    client.keepalive_stats.acked += 1;
                }
                Ok(())
            }
            Ok(Err(err)) => {
                client.keepalive_stats.io_errors += 1;
                Err(err)
            }
            Err(_) => {
                // Reply not yet in, but the control socket is still alive; the
                // bytes will surface on the next read and get counted as unread.
                client.keepalive_stats.unread += 1;
                Ok(())
            }
        }
    }
}
