//! Async FTP client implementation with FTPS, listing parsing and keepalive support

pub(crate) mod auth;
pub(crate) mod connection;
pub(crate) mod data;
mod ftps;
pub(crate) mod io;
pub(crate) mod keepalive;
pub(crate) mod listing;
mod metadata;
mod navigation;
pub(crate) mod state;
pub(crate) mod transfer;

use crate::capabilities::{FeatureCacheState, FeatureMap};
use crate::config::ClientConfig;
use crate::parsers::Dialect;
use crate::response::Reply;
use data::DataConnectionMode;
use keepalive::KeepaliveStats;
use state::{ConnectionState, ControlEncoding, DataProtection, FileFormat, FileStructure, FileType, TransferMode};
use std::net::IpAddr;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::io::{AsyncRead, AsyncWrite, BufReader, ReadBuf};
use tokio::net::TcpStream;
use tokio_rustls::client::TlsStream;
use tracing::debug;

/// The control connection socket, plain or TLS-wrapped (spec §4.9).
pub(crate) enum ControlStream {
    Plain(TcpStream),
    Tls(Box<TlsStream<TcpStream>>),
}

impl AsyncRead for ControlStream {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<std::io::Result<()>> {
        match self.get_mut() {
            ControlStream::Plain(s) => Pin::new(s).poll_read(cx, buf),
            ControlStream::Tls(s) => Pin::new(s.as_mut()).poll_read(cx, buf),
        }
    }
}

impl AsyncWrite for ControlStream {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<std::io::Result<usize>> {
        match self.get_mut() {
            ControlStream::Plain(s) => Pin::new(s).poll_write(cx, buf),
            ControlStream::Tls(s) => Pin::new(s.as_mut()).poll_write(cx, buf),
        }
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<std::io::Result<()>> {
        match self.get_mut() {
            ControlStream::Plain(s) => Pin::new(s).poll_flush(cx),
            ControlStream::Tls(s) => Pin::new(s.as_mut()).poll_flush(cx),
        }
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<std::io::Result<()>> {
        match self.get_mut() {
            ControlStream::Plain(s) => Pin::new(s).poll_shutdown(cx),
            ControlStream::Tls(s) => Pin::new(s.as_mut()).poll_shutdown(cx),
        }
    }
}

/// Async FTP client, implementing RFC 959 plus the RFC 2228/2389/2428/3659
/// extensions a modern server advertises via `FEAT`.
///
/// # Example
///
/// ```no_run
/// use ftp_rs::{ClientConfig, FtpClient};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = ClientConfig::plain("ftp.example.com", "anonymous", "anonymous@");
/// let mut client = FtpClient::connect(config).await?;
/// client.login().await?;
/// client.retrieve_file("/pub/readme.txt", &mut tokio::io::sink()).await?;
/// client.disconnect().await?;
/// # Ok(())
/// # }
/// ```
#[must_use]
pub struct FtpClient {
    /// Control channel (reader and writer). `None` only for the instant
    /// during an `AUTH TLS`/`CCC` upgrade where the stream is being swapped
    /// for a wrapped/unwrapped version of itself.
    pub(crate) stream: Option<BufReader<ControlStream>>,
    /// Login/authentication state
    pub(crate) state: ConnectionState,
    /// Client configuration
    pub(crate) config: Arc<ClientConfig>,
    /// Resolved address of the control channel peer, used to validate data
    /// connection peers and to substitute for private PASV/EPSV literals
    pub(crate) control_peer: IpAddr,
    /// Most recently received reply, kept for diagnostics
    pub(crate) last_reply: Option<Reply>,
    /// Control-channel text encoding (spec §4.2)
    pub(crate) control_encoding: ControlEncoding,
    /// Current `TYPE`
    pub(crate) file_type: FileType,
    /// Current `TYPE` format qualifier
    pub(crate) file_format: FileFormat,
    /// Current `STRU`
    pub(crate) file_structure: FileStructure,
    /// Current `MODE`
    pub(crate) transfer_mode: TransferMode,
    /// Data connection negotiation mode, may be overridden per-call
    pub(crate) data_mode: DataConnectionMode,
    /// Pending `REST` offset, consumed by the next transfer command
    pub(crate) restart_offset: Option<u64>,
    /// `SYST` reply, cached after first successful query
    pub(crate) system_type: Option<String>,
    /// Listing dialect, cached after first detection
    pub(crate) dialect: Option<Dialect>,
    /// `FEAT` feature map and its cache state
    pub(crate) features: FeatureMap,
    pub(crate) feature_cache_state: FeatureCacheState,
    /// Keepalive NOOP counters accumulated across transfers
    pub(crate) keepalive_stats: KeepaliveStats,
    /// Current `PROT` level (RFC 2228 §3)
    pub(crate) data_protection: DataProtection,
    /// Whether `PBSZ 0` has been sent on this connection
    pub(crate) pbsz_sent: bool,
}

impl FtpClient {
    /// The server's cached `SYST` reply, if queried.
    pub fn system_type(&self) -> Option<&str> {
        self.system_type.as_deref()
    }

    /// Whether the control channel is currently authenticated.
    pub fn is_authenticated(&self) -> bool {
        matches!(self.state, ConnectionState::Authenticated)
    }

    /// The server's `FEAT` feature map, fetching and caching it first if needed.
    pub async fn features(&mut self) -> crate::error::Result<&FeatureMap> {
        self.ensure_features_loaded().await?;
        Ok(&self.features)
    }

    /// Current `TYPE`.
    pub fn file_type(&self) -> FileType {
        self.file_type
    }

    /// Current `MODE`.
    pub fn transfer_mode(&self) -> TransferMode {
        self.transfer_mode
    }

    /// Accumulated keepalive statistics across all transfers on this connection.
    pub fn keepalive_stats(&self) -> KeepaliveStats {
        self.keepalive_stats
    }

    /// Send `QUIT` and consume the client.
    pub async fn disconnect(mut self) -> crate::error::Result<()> {
        if self.state != ConnectionState::Closed {
            let _ = self.send_command(crate::commands::quit()).await;
            let _ = self.read_reply().await;
            self.state = ConnectionState::Closed;
        }
        Ok(())
    }
}

impl Drop for FtpClient {
    fn drop(&mut self) {
        debug!("FtpClient dropped");
    }
}
