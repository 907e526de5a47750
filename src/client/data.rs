//! Data-connection negotiation: PASV/EPSV/PORT/EPRT and the data stream type
//! (spec §4.3, RFC 959 §§3.2/4.1.2, RFC 2428)

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};
use tokio::net::TcpStream;
use tokio_rustls::client::TlsStream;

use crate::error::{FtpError, Result};

/// How the data connection is established (spec §3 "Mode").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DataConnectionMode {
    /// `PORT`: client listens, server connects, address chosen from the local interface
    ActiveLocal,
    /// `PORT`: client listens, server connects, address overridden (NAT/firewall traversal)
    ActiveRemote,
    /// `PASV`/`EPSV`: server listens, client connects, using the literal address it announces
    PassiveLocal,
    /// `PASV`/`EPSV`: server listens, client connects, substituting the control peer's
    /// address for the one the server announced (spec §4.3.4 "Passive NAT workaround")
    PassiveRemote,
}

impl DataConnectionMode {
    /// Whether this mode has the client listening and the server connecting.
    pub fn is_active(&self) -> bool {
        matches!(self, DataConnectionMode::ActiveLocal | DataConnectionMode::ActiveRemote)
    }

    /// Whether a successful PASV/EPSV reply's literal address should be trusted as-is.
    pub fn trusts_passive_literal(&self) -> bool {
        matches!(self, DataConnectionMode::PassiveLocal)
    }
}

/// An established data connection, plain or TLS-wrapped under `PROT P`.
///
/// Both variants are `Unpin`, so `AsyncRead`/`AsyncWrite` are implemented by
/// delegating through `Pin::new` rather than requiring callers to pin this
/// type themselves.
pub(crate) enum DataStream {
    Plain(TcpStream),
    Tls(Box<TlsStream<TcpStream>>),
}

impl DataStream {
    pub(crate) fn peer_addr(&self) -> std::io::Result<SocketAddr> {
        match self {
            DataStream::Plain(s) => s.peer_addr(),
            DataStream::Tls(s) => s.get_ref().0.peer_addr(),
        }
    }
}

impl AsyncRead for DataStream {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<std::io::Result<()>> {
        match self.get_mut() {
            DataStream::Plain(s) => Pin::new(s).poll_read(cx, buf),
            DataStream::Tls(s) => Pin::new(s.as_mut()).poll_read(cx, buf),
        }
    }
}

impl AsyncWrite for DataStream {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<std::io::Result<usize>> {
        match self.get_mut() {
            DataStream::Plain(s) => Pin::new(s).poll_write(cx, buf),
            DataStream::Tls(s) => Pin::new(s.as_mut()).poll_write(cx, buf),
        }
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<std::io::Result<()>> {
        match self.get_mut() {
            DataStream::Plain(s) => Pin::new(s).poll_flush(cx),
            DataStream::Tls(s) => Pin::new(s.as_mut()).poll_flush(cx),
        }
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<std::io::Result<()>> {
        match self.get_mut() {
            DataStream::Plain(s) => Pin::new(s).poll_shutdown(cx),
            DataStream::Tls(s) => Pin::new(s.as_mut()).poll_shutdown(cx),
        }
    }
}

/// Parse a `227 Entering Passive Mode (h1,h2,h3,h4,p1,p2)` reply (RFC 959 §4.1.2).
pub(crate) fn parse_pasv_reply(message: &str) -> Result<SocketAddr> {
    let start = message
        .find('(')
        .ok_or_else(|| FtpError::MalformedReply(format!("no '(' in PASV reply: {message}")))?;
    let end = message[start..]
        .find(')')
        .map(|i| i + start)
        .ok_or_else(|| FtpError::MalformedReply(format!("no ')' in PASV reply: {message}")))?;

    let fields: Vec<&str> = message[start + 1..end].split(',').collect();
    if fields.len() != 6 {
        return Err(FtpError::MalformedReply(format!(
            "expected 6 comma-separated fields in PASV reply, got {}: {message}",
            fields.len()
        )));
    }

    let mut octets = [0u8; 6];
    for (slot, field) in octets.iter_mut().zip(fields.iter()) {
        *slot = field
            .trim()
            .parse::<u8>()
            .map_err(|_| FtpError::MalformedReply(format!("bad octet in PASV reply: {message}")))?;
    }

    let ip = IpAddr::V4(Ipv4Addr::new(octets[0], octets[1], octets[2], octets[3]));
    let port = ((octets[4] as u16) << 8) | (octets[5] as u16);
    Ok(SocketAddr::new(ip, port))
}

/// Parse a `229 Entering Extended Passive Mode (|||port|)` reply (RFC 2428 §3).
///
/// Only the port is carried; the address is always the control connection's
/// peer address per RFC 2428.
pub(crate) fn parse_epsv_reply(message: &str) -> Result<u16> {
    let start = message
        .find('(')
        .ok_or_else(|| FtpError::MalformedReply(format!("no '(' in EPSV reply: {message}")))?;
    let end = message[start..]
        .find(')')
        .map(|i| i + start)
        .ok_or_else(|| FtpError::MalformedReply(format!("no ')' in EPSV reply: {message}")))?;

    let body = &message[start + 1..end];
    let delim = body
        .chars()
        .next()
        .ok_or_else(|| FtpError::MalformedReply(format!("empty EPSV reply body: {message}")))?;
    let mut parts = body.split(delim);
    // body is "|||port|" so splitting on '|' yields ["", "", "", "port", ""]
    let port_str = parts
        .nth(3)
        .ok_or_else(|| FtpError::MalformedReply(format!("malformed EPSV reply: {message}")))?;

    port_str
        .parse::<u16>()
        .map_err(|_| FtpError::MalformedReply(format!("bad port in EPSV reply: {message}")))
}

/// Build a `PORT h1,h2,h3,h4,p1,p2` command argument (RFC 959 §4.1.2). IPv4 only.
pub(crate) fn format_port_command(addr: SocketAddr) -> Result<String> {
    let SocketAddr::V4(v4) = addr else {
        return Err(FtpError::Other(
            "PORT requires an IPv4 address; use EPRT for IPv6".to_string(),
        ));
    };
    let octets = v4.ip().octets();
    let port = v4.port();
    Ok(format!(
        "{},{},{},{},{},{}",
        octets[0],
        octets[1],
        octets[2],
        octets[3],
        port >> 8,
        port & 0xff
    ))
}

/// Build an `EPRT |af|addr|port|` command argument (RFC 2428 §2).
pub(crate) fn format_eprt_command(addr: SocketAddr) -> String {
    let af = if addr.is_ipv4() { 1 } else { 2 };
    format!("|{af}|{}|{}|", addr.ip(), addr.port())
}

/// Whether an address is a private (RFC 1918) or link-local range, used to
/// decide when a PASV literal should be replaced by the control peer's
/// address (spec §4.3.4 "Passive NAT workaround").
pub(crate) fn is_private_or_site_local(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => {
            v4.is_private() || v4.is_link_local() || v4.is_loopback()
        }
        IpAddr::V6(v6) => v6.is_loopback() || (v6.segments()[0] & 0xffc0) == 0xfe80,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_standard_pasv_reply() {
        let addr = parse_pasv_reply("227 Entering Passive Mode (192,168,1,5,200,13)").unwrap();
        assert_eq!(addr, SocketAddr::new(IpAddr::V4(Ipv4Addr::new(192, 168, 1, 5)), 200 * 256 + 13));
    }

    #[test]
    fn rejects_pasv_reply_with_wrong_field_count() {
        assert!(parse_pasv_reply("227 Entering Passive Mode (1,2,3,4,5)").is_err());
    }

    #[test]
    fn parses_epsv_reply_with_pipe_delimiter() {
        let port = parse_epsv_reply("229 Entering Extended Passive Mode (|||64281|)").unwrap();
        assert_eq!(port, 64281);
    }

    #[test]
    fn parses_epsv_reply_with_alternate_delimiter() {
        let port = parse_epsv_reply("229 Entering Extended Passive Mode (!!!64281!)").unwrap();
        assert_eq!(port, 64281);
    }

    #[test]
    fn formats_port_command_from_ipv4() {
        let addr: SocketAddr = "10.0.0.5:5000".parse().unwrap();
        assert_eq!(format_port_command(addr).unwrap(), "10,0,0,5,19,136");
    }

    #[test]
    fn port_command_rejects_ipv6() {
        let addr: SocketAddr = "[::1]:21".parse().unwrap();
        assert!(format_port_command(addr).is_err());
    }

    #[test]
    fn formats_eprt_for_ipv4_and_ipv6() {
        let v4: SocketAddr = "10.0.0.5:5000".parse().unwrap();
        assert_eq!(format_eprt_command(v4), "|1|10.0.0.5|5000|");
        let v6: SocketAddr = "[::1]:5000".parse().unwrap();
        assert_eq!(format_eprt_command(v6), "|2|::1|5000|");
    }

    #[test]
    fn identifies_private_and_loopback_addresses() {
        assert!(is_private_or_site_local(IpAddr::V4(Ipv4Addr::new(10, 1, 2, 3))));
        assert!(is_private_or_site_local(IpAddr::V4(Ipv4Addr::new(192, 168, 0, 1))));
        assert!(is_private_or_site_local(IpAddr::V4(Ipv4Addr::LOCALHOST)));
        assert!(!is_private_or_site_local(IpAddr::V4(Ipv4Addr::new(8, 8, 8, 8))));
    }

    #[test]
    fn data_connection_mode_classification() {
        assert!(DataConnectionMode::ActiveLocal.is_active());
        assert!(DataConnectionMode::ActiveRemote.is_active());
        assert!(!DataConnectionMode::PassiveLocal.is_active());
        assert!(DataConnectionMode::PassiveLocal.trusts_passive_literal());
        assert!(!DataConnectionMode::PassiveRemote.trusts_passive_literal());
    }
}
