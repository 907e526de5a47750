//! Data-connection setup and the RETR/STOR/APPE/STOU transfer engine
//! (spec §4.4 "Transfer engine")

use std::net::{IpAddr, SocketAddr};
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, ReadBuf};
use tokio::net::{TcpListener, TcpStream};

use crate::codec::{NetAsciiDecoder, NetAsciiEncoder};
use crate::commands;
use crate::error::{FtpError, Result};
use crate::response::codes;

use super::data::{
    format_eprt_command, format_port_command, is_private_or_site_local, parse_epsv_reply,
    parse_pasv_reply, DataConnectionMode, DataStream,
};
use super::keepalive::KeepaliveInterleaver;
use super::state::{DataProtection, FileType};
use super::FtpClient;

#[cfg(feature = "deflate")]
use super::state::TransferMode;
#[cfg(feature = "deflate")]
use crate::compression::{DeflateDecoder, DeflateEncoder};

/// Which command establishes the data connection.
pub(crate) enum Listener {
    /// Client listens (active mode); server will connect to us.
    Active(TcpListener),
    /// Client connects (passive mode) to this address.
    Passive(SocketAddr),
}

impl FtpClient {
    /// Negotiate the data connection for the next transfer command, without
    /// yet sending that command. Returns a listener/target the caller
    /// connects (or accepts on) only after the transfer command has been
    /// sent and its preliminary reply received, per RFC 959 §3.2.
    pub(crate) async fn negotiate_data_connection(&mut self) -> Result<Listener> {
        match self.data_mode {
            DataConnectionMode::ActiveLocal | DataConnectionMode::ActiveRemote => {
                let bind_ip = self
                    .config
                    .data
                    .active_external_host
                    .unwrap_or_else(|| local_bind_address(self.control_peer));
                let (lo, hi) = self.config.data.active_port_range;
                let listener = bind_active_listener(bind_ip, lo, hi).await?;

                let report_ip = self.config.data.report_external_host.unwrap_or(bind_ip);
                let local_port = listener.local_addr()?.port();
                let report_addr = SocketAddr::new(report_ip, local_port);

                let use_eprt = report_addr.is_ipv6();
                if use_eprt {
                    self.command_expect_success(&commands::eprt(&format_eprt_command(report_addr))).await?;
                } else {
                    self.command_expect_success(&commands::port(&format_port_command(report_addr)?)).await?;
                }
                Ok(Listener::Active(listener))
            }
            DataConnectionMode::PassiveLocal | DataConnectionMode::PassiveRemote => {
                let use_epsv = self.control_peer.is_ipv6() || self.config.data.use_epsv_with_ipv4;
                let addr = if use_epsv {
                    let reply = self.command_expect_success(commands::epsv()).await?;
                    let port = parse_epsv_reply(reply.message())?;
                    SocketAddr::new(self.control_peer, port)
                } else {
                    let reply = self.command_expect_success(commands::pasv()).await?;
                    let mut addr = parse_pasv_reply(reply.message())?;
                    if !self.config.data.trust_pasv_ip_literal && is_private_or_site_local(addr.ip()) {
                        addr = SocketAddr::new(self.control_peer, addr.port());
                    }
                    addr
                };
                Ok(Listener::Passive(addr))
            }
        }
    }

    /// Complete the data connection after the server's preliminary reply,
    /// verifying the peer address unless remote verification is disabled.
    pub(crate) async fn establish_data_connection(&mut self, listener: Listener) -> Result<DataStream> {
        let tcp = match listener {
            Listener::Active(listener) => {
                let (stream, peer) = tokio::time::timeout(self.config.timeouts.data_timeout, listener.accept())
                    .await
                    .map_err(|_| FtpError::Timeout)??;
                self.verify_data_peer(peer.ip())?;
                stream
            }
            Listener::Passive(addr) => {
                self.verify_data_peer(addr.ip())?;
                let bind_addr = self.config.data.passive_local_host.map(|ip| SocketAddr::new(ip, 0));
                let stream = match bind_addr {
                    Some(bind) => {
                        let socket = if bind.is_ipv4() {
                            tokio::net::TcpSocket::new_v4()?
                        } else {
                            tokio::net::TcpSocket::new_v6()?
                        };
                        socket.bind(bind)?;
                        tokio::time::timeout(self.config.timeouts.data_timeout, socket.connect(addr))
                            .await
                            .map_err(|_| FtpError::Timeout)??
                    }
                    None => tokio::time::timeout(self.config.timeouts.data_timeout, TcpStream::connect(addr))
                        .await
                        .map_err(|_| FtpError::Timeout)??,
                };
                stream
            }
        };
        tune_data_socket(&tcp, &self.config.data)?;

        if self.data_protection == DataProtection::Private {
            let connector = super::connection::build_tls_connector(self.config.tls.allow_insecure());
            let server_name = tokio_rustls::rustls::pki_types::ServerName::try_from(self.config.host.clone())
                .map_err(|e| FtpError::Tls(format!("invalid domain name: {e}")))?;
            let tls = connector
                .connect(server_name, tcp)
                .await
                .map_err(|e| FtpError::Tls(e.to_string()))?;
            Ok(DataStream::Tls(Box::new(tls)))
        } else {
            Ok(DataStream::Plain(tcp))
        }
    }

    fn verify_data_peer(&self, peer: IpAddr) -> Result<()> {
        if self.config.data.remote_verification_enabled && peer != self.control_peer {
            return Err(FtpError::UntrustedDataConnection { control_peer: self.control_peer, data_peer: peer });
        }
        Ok(())
    }

    /// Consume a pending `REST` offset by sending it, if one was set via
    /// [`FtpClient::set_restart_offset`].
    async fn send_pending_restart(&mut self) -> Result<()> {
        if let Some(offset) = self.restart_offset.take() {
            self.command_expect_success(&commands::rest(offset)).await?;
        }
        Ok(())
    }

    /// Set the byte offset the next transfer should resume from (RFC 959
    /// §4.1.3 `REST`). Consumed (and cleared) by the next transfer call.
    pub fn set_restart_offset(&mut self, offset: u64) {
        self.restart_offset = Some(offset);
    }

    /// `RETR`: download a file into `writer`, returning the byte count.
    pub async fn retrieve_file(&mut self, path: &str, writer: &mut (dyn AsyncWrite + Unpin + Send)) -> Result<u64> {
        let listener = self.negotiate_data_connection().await?;
        self.send_pending_restart().await?;
        self.send_command(&commands::retr(path)).await?;

        let preliminary = self.read_reply().await?;
        if !preliminary.is_preliminary() {
            return Err(FtpError::Protocol { code: preliminary.code, message: preliminary.message().to_string() });
        }

        let data_stream = self.establish_data_connection(listener).await?;
        let ascii = self.file_type == FileType::Ascii;
        let bytes = self.copy_from_data_connection(data_stream, writer, ascii).await?;

        let completion = self.read_reply().await?;
        if !completion.is_success() {
            return Err(FtpError::TransferError {
                bytes_transferred: bytes,
                source: std::io::Error::other(format!("{}: {}", completion.code, completion.message())),
            });
        }
        Ok(bytes)
    }

    /// `STOR`: upload a file from `reader`, returning the byte count sent.
    pub async fn store_file(&mut self, path: &str, reader: &mut (dyn AsyncRead + Unpin + Send)) -> Result<u64> {
        self.store_with_command(&commands::stor(path), reader).await
    }

    /// `APPE`: append to (or create) a file, returning the byte count sent.
    pub async fn append_file(&mut self, path: &str, reader: &mut (dyn AsyncRead + Unpin + Send)) -> Result<u64> {
        self.store_with_command(&commands::appe(path), reader).await
    }

    /// `STOU`: store under a server-chosen unique name, returning that name
    /// and the byte count sent.
    pub async fn store_unique(&mut self, reader: &mut (dyn AsyncRead + Unpin + Send)) -> Result<(String, u64)> {
        let listener = self.negotiate_data_connection().await?;
        self.send_command(commands::stou()).await?;
        let preliminary = self.read_reply().await?;
        if !preliminary.is_preliminary() {
            return Err(FtpError::Protocol { code: preliminary.code, message: preliminary.message().to_string() });
        }
        let name = extract_unique_name(preliminary.message());

        let data_stream = self.establish_data_connection(listener).await?;
        let ascii = self.file_type == FileType::Ascii;
        let bytes = self.copy_to_data_connection(data_stream, reader, ascii).await?;

        let completion = self.read_reply().await?;
        if !completion.is_success() {
            return Err(FtpError::TransferError {
                bytes_transferred: bytes,
                source: std::io::Error::other(format!("{}: {}", completion.code, completion.message())),
            });
        }
        Ok((name, bytes))
    }

    async fn store_with_command(&mut self, command: &str, reader: &mut (dyn AsyncRead + Unpin + Send)) -> Result<u64> {
        let listener = self.negotiate_data_connection().await?;
        self.send_pending_restart().await?;
        self.send_command(command).await?;

        let preliminary = self.read_reply().await?;
        if !preliminary.is_preliminary() {
            return Err(FtpError::Protocol { code: preliminary.code, message: preliminary.message().to_string() });
        }

        let data_stream = self.establish_data_connection(listener).await?;
        let ascii = self.file_type == FileType::Ascii;
        let bytes = self.copy_to_data_connection(data_stream, reader, ascii).await?;

        let completion = self.read_reply().await?;
        if !completion.is_success() {
            return Err(FtpError::TransferError {
                bytes_transferred: bytes,
                source: std::io::Error::other(format!("{}: {}", completion.code, completion.message())),
            });
        }
        Ok(bytes)
    }

    /// Copy bytes from the data connection to `writer`, interleaving
    /// keepalive NOOPs on the control channel when configured (spec §4.4.1).
    async fn copy_from_data_connection(
        &mut self,
        mut data: DataStream,
        writer: &mut (dyn AsyncWrite + Unpin + Send),
        ascii: bool,
    ) -> Result<u64> {
        let mut keepalive = KeepaliveInterleaver::new(
            self.config.timeouts.control_keepalive_idle,
            self.config.timeouts.control_keepalive_reply_timeout,
        );
        let buffer_size = self.config.data.buffer_size;
        let mut buf = vec![0u8; buffer_size];
        let mut decoder = NetAsciiDecoder::new();
        let mut total = 0u64;
        #[cfg(feature = "deflate")]
        let deflate = self.transfer_mode == TransferMode::Deflate;
        #[cfg(feature = "deflate")]
        let mut inflate = DeflateDecoder::new();

        loop {
            if keepalive.due() {
                keepalive.fire(self).await?;
            }

            let n = data.read(&mut buf).await.map_err(|e| FtpError::TransferError { bytes_transferred: total, source: e })?;
            if n == 0 {
                break;
            }
            #[cfg(feature = "deflate")]
            let raw = if deflate { inflate.decode_chunk(&buf[..n]) } else { buf[..n].to_vec() };
            #[cfg(not(feature = "deflate"))]
            let raw = buf[..n].to_vec();
            let chunk = if ascii { decoder.decode_chunk(&raw) } else { raw };
            writer.write_all(&chunk).await.map_err(|e| FtpError::TransferError { bytes_transferred: total, source: e })?;
            total += n as u64;
        }
        #[cfg(feature = "deflate")]
        if deflate {
            let tail = inflate.finish();
            if !tail.is_empty() {
                let chunk = if ascii { decoder.decode_chunk(&tail) } else { tail };
                writer.write_all(&chunk).await.map_err(|e| FtpError::TransferError { bytes_transferred: total, source: e })?;
            }
        }
        if ascii {
            let tail = decoder.finish();
            if !tail.is_empty() {
                writer.write_all(&tail).await.map_err(|e| FtpError::TransferError { bytes_transferred: total, source: e })?;
            }
        }
        writer.flush().await.map_err(|e| FtpError::TransferError { bytes_transferred: total, source: e })?;
        Ok(total)
    }

    /// Copy bytes from `reader` to the data connection, interleaving
    /// keepalive NOOPs on the control channel when configured.
    async fn copy_to_data_connection(
        &mut self,
        mut data: DataStream,
        reader: &mut (dyn AsyncRead + Unpin + Send),
        ascii: bool,
    ) -> Result<u64> {
        let mut keepalive = KeepaliveInterleaver::new(
            self.config.timeouts.control_keepalive_idle,
            self.config.timeouts.control_keepalive_reply_timeout,
        );
        let buffer_size = self.config.data.buffer_size;
        let mut buf = vec![0u8; buffer_size];
        let mut encoder = NetAsciiEncoder::new();
        let mut total = 0u64;
        #[cfg(feature = "deflate")]
        let deflate = self.transfer_mode == TransferMode::Deflate;
        #[cfg(feature = "deflate")]
        let mut compress = DeflateEncoder::new();

        loop {
            if keepalive.due() {
                keepalive.fire(self).await?;
            }

            let n = reader.read(&mut buf).await.map_err(|e| FtpError::TransferError { bytes_transferred: total, source: e })?;
            if n == 0 {
                break;
            }
            let plain = if ascii { encoder.encode_chunk(&buf[..n]) } else { buf[..n].to_vec() };
            #[cfg(feature = "deflate")]
            let chunk = if deflate { compress.encode_chunk(&plain) } else { plain };
            #[cfg(not(feature = "deflate"))]
            let chunk = plain;
            data.write_all(&chunk).await.map_err(|e| FtpError::TransferError { bytes_transferred: total, source: e })?;
            total += n as u64;
        }
        if ascii {
            let tail = encoder.finish();
            #[cfg(feature = "deflate")]
            let tail = if deflate { compress.encode_chunk(&tail) } else { tail };
            if !tail.is_empty() {
                data.write_all(&tail).await.map_err(|e| FtpError::TransferError { bytes_transferred: total, source: e })?;
            }
        }
        #[cfg(feature = "deflate")]
        if deflate {
            let tail = compress.finish();
            if !tail.is_empty() {
                data.write_all(&tail).await.map_err(|e| FtpError::TransferError { bytes_transferred: total, source: e })?;
            }
        }
        data.flush().await.map_err(|e| FtpError::TransferError { bytes_transferred: total, source: e })?;
        data.shutdown().await.map_err(|e| FtpError::TransferError { bytes_transferred: total, source: e })?;
        Ok(total)
    }
}

/// A streaming handle for a transfer, returned by
/// [`FtpClient::retrieve_file_stream`]/[`FtpClient::store_file_stream`].
/// Dropping this without calling [`TransferStream::finish`] leaves the
/// control channel out of sync with the server; callers must finish it.
pub struct TransferStream<'a> {
    data: DataStream,
    client: &'a mut FtpClient,
    bytes: u64,
}

impl AsyncRead for TransferStream<'_> {
    fn poll_read(self: Pin<&mut Self>, cx: &mut Context<'_>, buf: &mut ReadBuf<'_>) -> Poll<std::io::Result<()>> {
        let before = buf.filled().len();
        let this = self.get_mut();
        let res = Pin::new(&mut this.data).poll_read(cx, buf);
        if let Poll::Ready(Ok(())) = &res {
            this.bytes += (buf.filled().len() - before) as u64;
        }
        res
    }
}

impl AsyncWrite for TransferStream<'_> {
    fn poll_write(self: Pin<&mut Self>, cx: &mut Context<'_>, buf: &[u8]) -> Poll<std::io::Result<usize>> {
        let this = self.get_mut();
        let res = Pin::new(&mut this.data).poll_write(cx, buf);
        if let Poll::Ready(Ok(n)) = &res {
            this.bytes += *n as u64;
        }
        res
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<std::io::Result<()>> {
        Pin::new(&mut self.get_mut().data).poll_flush(cx)
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<std::io::Result<()>> {
        Pin::new(&mut self.get_mut().data).poll_shutdown(cx)
    }
}

impl TransferStream<'_> {
    /// Read the server's completion reply and return the byte count moved.
    /// Must be called (after shutting down a STOR-side stream) to keep the
    /// control channel in sync.
    pub async fn finish(self) -> Result<u64> {
        let reply = self.client.read_reply().await?;
        if !reply.is_success() {
            return Err(FtpError::TransferError {
                bytes_transferred: self.bytes,
                source: std::io::Error::other(format!("{}: {}", reply.code, reply.message())),
            });
        }
        Ok(self.bytes)
    }
}

impl FtpClient {
    /// Streaming variant of [`FtpClient::retrieve_file`]: returns a handle
    /// implementing `AsyncRead` instead of copying into a caller-supplied
    /// writer. Does not apply NETASCII translation; callers doing ASCII
    /// transfers should use [`FtpClient::retrieve_file`].
    pub async fn retrieve_file_stream(&mut self, path: &str) -> Result<TransferStream<'_>> {
        let listener = self.negotiate_data_connection().await?;
        self.send_pending_restart().await?;
        self.send_command(&commands::retr(path)).await?;
        let preliminary = self.read_reply().await?;
        if !preliminary.is_preliminary() {
            return Err(FtpError::Protocol { code: preliminary.code, message: preliminary.message().to_string() });
        }
        let data = self.establish_data_connection(listener).await?;
        Ok(TransferStream { data, client: self, bytes: 0 })
    }

    /// Streaming variant of [`FtpClient::store_file`].
    pub async fn store_file_stream(&mut self, path: &str) -> Result<TransferStream<'_>> {
        let listener = self.negotiate_data_connection().await?;
        self.send_pending_restart().await?;
        self.send_command(&commands::stor(path)).await?;
        let preliminary = self.read_reply().await?;
        if !preliminary.is_preliminary() {
            return Err(FtpError::Protocol { code: preliminary.code, message: preliminary.message().to_string() });
        }
        let data = self.establish_data_connection(listener).await?;
        Ok(TransferStream { data, client: self, bytes: 0 })
    }
}

fn local_bind_address(control_peer: IpAddr) -> IpAddr {
    if control_peer.is_ipv4() {
        IpAddr::V4(std::net::Ipv4Addr::UNSPECIFIED)
    } else {
        IpAddr::V6(std::net::Ipv6Addr::UNSPECIFIED)
    }
}

async fn bind_active_listener(ip: IpAddr, lo: u16, hi: u16) -> Result<TcpListener> {
    if lo == 0 && hi == 0 {
        return Ok(TcpListener::bind(SocketAddr::new(ip, 0)).await?);
    }
    use rand::seq::SliceRandom;
    let mut ports: Vec<u16> = (lo..=hi).collect();
    ports.shuffle(&mut rand::thread_rng());
    for port in ports {
        if let Ok(listener) = TcpListener::bind(SocketAddr::new(ip, port)).await {
            return Ok(listener);
        }
    }
    Err(FtpError::Io(std::io::Error::new(
        std::io::ErrorKind::AddrInUse,
        format!("no free port in active range {lo}-{hi}"),
    )))
}

fn tune_data_socket(stream: &TcpStream, config: &crate::config::DataConfig) -> Result<()> {
    let socket_ref = socket2::SockRef::from(stream);
    if let Some(size) = config.send_buffer_size {
        socket_ref.set_send_buffer_size(size)?;
    }
    if let Some(size) = config.recv_buffer_size {
        socket_ref.set_recv_buffer_size(size)?;
    }
    Ok(())
}

/// Extract the server-chosen filename from a `STOU` preliminary reply, e.g.
/// `150 FILE: unique.txt` or `125 unique.txt`.
fn extract_unique_name(message: &str) -> String {
    message
        .rsplit(|c: char| c == ':' || c.is_whitespace())
        .next()
        .unwrap_or(message)
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_unique_name_with_file_prefix() {
        assert_eq!(extract_unique_name("150 FILE: unique.txt"), "unique.txt");
    }

    #[test]
    fn extracts_unique_name_without_prefix() {
        assert_eq!(extract_unique_name("125 unique.txt"), "unique.txt");
    }

    #[test]
    fn local_bind_address_matches_family() {
        assert_eq!(local_bind_address("10.0.0.1".parse().unwrap()), IpAddr::V4(std::net::Ipv4Addr::UNSPECIFIED));
        assert_eq!(local_bind_address("::1".parse().unwrap()), IpAddr::V6(std::net::Ipv6Addr::UNSPECIFIED));
    }
}
