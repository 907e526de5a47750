//! FTP client error types

use thiserror::Error;

/// FTP protocol and connection errors
#[derive(Error, Debug)]
pub enum FtpError {
    /// IO error during network operations
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TLS error during FTPS handshake
    #[error("TLS error: {0}")]
    Tls(String),

    /// Socket-level read/accept exceeded its configured timeout
    #[error("operation timed out")]
    Timeout,

    /// A reply line violated the FTP reply grammar (spec §4.1)
    #[error("malformed reply: {0}")]
    MalformedReply(String),

    /// The control connection was closed, or the server sent 421
    #[error("connection closed")]
    ConnectionClosed,

    /// A command the state machine cannot recover from returned 4xx/5xx
    #[error("FTP error {code}: {message}")]
    Protocol {
        /// Three-digit reply code
        code: u16,
        /// First line of the server's reply message
        message: String,
    },

    /// The data-connection peer address did not match the control peer
    #[error("untrusted data connection: control peer {control_peer}, data peer {data_peer}")]
    UntrustedDataConnection {
        /// Address of the control channel peer
        control_peer: std::net::IpAddr,
        /// Address the data connection actually came from / went to
        data_peer: std::net::IpAddr,
    },

    /// I/O error while copying bytes between the data socket and the caller's stream
    #[error("transfer error after {bytes_transferred} bytes: {source}")]
    TransferError {
        /// Bytes successfully copied before the error
        bytes_transferred: u64,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// A listing line could not be parsed by the active dialect parser
    #[error("failed to parse listing line: {0}")]
    ParseError(String),

    /// SYST failed and no `default_system_type` was configured
    #[error("server system type unknown and no default configured")]
    SystemTypeUnknown,

    /// FTPS handshake, PROT negotiation, or CCC downgrade failed
    #[error("secure channel error: {0}")]
    SecureChannelError(String),

    /// Generic error for conditions not covered by a dedicated variant
    #[error("{0}")]
    Other(String),
}

/// Result type alias using [`FtpError`]
pub type Result<T> = std::result::Result<T, FtpError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_error_converts_via_from() {
        let io_err = std::io::Error::new(std::io::ErrorKind::Other, "boom");
        let err: FtpError = io_err.into();
        assert!(matches!(err, FtpError::Io(_)));
    }

    #[test]
    fn protocol_error_display_includes_code_and_message() {
        let err = FtpError::Protocol {
            code: 550,
            message: "No such file".to_string(),
        };
        assert_eq!(err.to_string(), "FTP error 550: No such file");
    }

    #[test]
    fn untrusted_data_connection_displays_both_addresses() {
        use std::net::{IpAddr, Ipv4Addr};
        let err = FtpError::UntrustedDataConnection {
            control_peer: IpAddr::V4(Ipv4Addr::new(10, 0, 0, 2)),
            data_peer: IpAddr::V4(Ipv4Addr::new(10, 0, 0, 3)),
        };
        let msg = err.to_string();
        assert!(msg.contains("10.0.0.2"));
        assert!(msg.contains("10.0.0.3"));
    }
}
