//! FTP client configuration (spec §6: "Configuration surface")

use std::net::IpAddr;
use std::time::Duration;

/// How (if at all) the control channel is secured.
///
/// Replaces the separate `tls: bool` / `allow_insecure_tls: bool` pair the
/// teacher crate carries for its NNTP server config with a single enum —
/// the cleanup the teacher's own doc comment flags as overdue for 0.2.0+.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TlsMode {
    /// Plain control channel; FTPS may still be layered in later via `AUTH TLS`.
    None,
    /// Wrap the control socket in TLS immediately on connect (spec §4.9.1).
    Implicit {
        /// Accept self-signed/expired/mismatched certificates.
        allow_insecure: bool,
    },
    /// Connect in plaintext, then send `AUTH TLS`/`AUTH SSL` before login (spec §4.9.2).
    Explicit {
        /// Accept self-signed/expired/mismatched certificates.
        allow_insecure: bool,
    },
}

impl TlsMode {
    /// Whether this mode eventually results in a TLS-wrapped control channel.
    pub fn is_secure(&self) -> bool {
        !matches!(self, TlsMode::None)
    }

    /// Whether invalid certificates should be accepted (testing / self-signed servers).
    pub fn allow_insecure(&self) -> bool {
        match self {
            TlsMode::None => false,
            TlsMode::Implicit { allow_insecure } | TlsMode::Explicit { allow_insecure } => {
                *allow_insecure
            }
        }
    }
}

/// Login credentials (USER/PASS/ACCT, spec §4.8).
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Credentials {
    /// Username sent with USER
    pub username: String,
    /// Password sent with PASS
    pub password: String,
    /// Account string sent with ACCT, only if the server asks (3xx after PASS)
    pub account: Option<String>,
}

impl Credentials {
    /// Credentials with no account string.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            account: None,
        }
    }

    /// The conventional anonymous-FTP login.
    pub fn anonymous() -> Self {
        Self::new("anonymous", "anonymous@")
    }
}

/// Data-connection negotiation settings (spec §3 "Mode", "Active bind range",
/// "Passive NAT policy").
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DataConfig {
    /// `ACTIVE_LOCAL` / `ACTIVE_REMOTE` / `PASSIVE_LOCAL` / `PASSIVE_REMOTE`
    pub mode: crate::client::data::DataConnectionMode,
    /// Use EPSV even when the peer is IPv4
    pub use_epsv_with_ipv4: bool,
    /// Inclusive local port range for active-mode binds; `(0, 0)` means "any free port"
    pub active_port_range: (u16, u16),
    /// Local address to bind the active-mode listener to, if not the control socket's address
    pub active_external_host: Option<IpAddr>,
    /// Address to announce in PORT/EPRT, if different from the bind address
    pub report_external_host: Option<IpAddr>,
    /// Local address to bind the outgoing passive-mode data socket to
    pub passive_local_host: Option<IpAddr>,
    /// Trust the PASV/EPSV literal IP as-is instead of substituting the control peer
    pub trust_pasv_ip_literal: bool,
    /// Verify that the data-connection peer matches the control-connection peer
    pub remote_verification_enabled: bool,
    /// Byte-copy chunk size for transfers
    pub buffer_size: usize,
    /// `SO_SNDBUF` for data sockets, if set
    pub send_buffer_size: Option<usize>,
    /// `SO_RCVBUF` for data sockets, if set
    pub recv_buffer_size: Option<usize>,
    /// Prepend `-a` to LIST so hidden entries are included (Unix convention)
    pub list_hidden_files: bool,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            mode: crate::client::data::DataConnectionMode::ActiveLocal,
            use_epsv_with_ipv4: false,
            active_port_range: (0, 0),
            active_external_host: None,
            report_external_host: None,
            passive_local_host: None,
            trust_pasv_ip_literal: false,
            remote_verification_enabled: true,
            buffer_size: 64 * 1024,
            send_buffer_size: None,
            recv_buffer_size: None,
            list_hidden_files: false,
        }
    }
}

/// Socket and keepalive timeouts (spec §6 "Durations"). `Duration::ZERO` means unset.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimeoutConfig {
    /// TCP connect timeout for the control channel
    pub connect_timeout: Duration,
    /// Control-channel read timeout
    pub so_timeout: Duration,
    /// Data-channel connect/accept/read timeout
    pub data_timeout: Duration,
    /// Idle interval that triggers a keepalive NOOP during a transfer
    pub control_keepalive_idle: Duration,
    /// Timeout for reading the reply to a keepalive NOOP
    pub control_keepalive_reply_timeout: Duration,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(60),
            so_timeout: Duration::from_secs(60),
            data_timeout: Duration::from_secs(60),
            control_keepalive_idle: Duration::ZERO,
            control_keepalive_reply_timeout: Duration::from_secs(5),
        }
    }
}

/// Listing-dialect parser configuration (spec §6 "Parser configuration").
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ParserConfig {
    /// Force a dialect key instead of auto-detecting from SYST
    pub server_system_key: Option<String>,
    /// Dialect to use if SYST fails and no override table entry matches
    pub default_system_type: Option<String>,
    /// Override format for non-recent Unix listing dates
    pub default_date_format: Option<String>,
    /// Override format for recent (current-year) Unix listing dates
    pub recent_date_format: Option<String>,
    /// Locale code used to select a month-name table (e.g. "fr", "ja")
    pub server_language_code: Option<String>,
    /// Pipe-delimited month names overriding the locale table (`"Jan|Feb|..."`)
    pub short_month_names: Option<String>,
    /// Time zone the server's listing timestamps are expressed in
    pub server_time_zone: Option<chrono::FixedOffset>,
    /// Roll a `MMM d HH:mm` date back a year if it would otherwise be more
    /// than one day in the future (default: true)
    pub lenient_future_dates: bool,
    /// Keep unparseable listing lines as `FileEntry { valid: false, .. }`
    /// instead of dropping them
    pub save_unparseable_entries: bool,
}

/// Complete FTP client configuration.
///
/// Mirrors the teacher crate's `ServerConfig` role, grouped into nested
/// structs once the field count crossed the point where a flat struct
/// stops being readable (spec §6's configuration surface is large).
#[must_use]
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClientConfig {
    /// Server hostname or IP literal
    pub host: String,
    /// Server port (21 for plain FTP, 990 for implicit FTPS)
    pub port: u16,
    /// Control-channel security mode
    pub tls: TlsMode,
    /// Login credentials
    pub credentials: Credentials,
    /// Data-connection negotiation settings
    pub data: DataConfig,
    /// Socket timeouts
    pub timeouts: TimeoutConfig,
    /// Listing-parser configuration
    pub parser: ParserConfig,
    /// Switch the control encoding to UTF-8 when FEAT advertises it
    pub auto_detect_utf8: bool,
}

impl ClientConfig {
    /// Plaintext control channel on the standard FTP port (21).
    pub fn plain(
        host: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            port: 21,
            tls: TlsMode::None,
            credentials: Credentials::new(username, password),
            data: DataConfig::default(),
            timeouts: TimeoutConfig::default(),
            parser: ParserConfig {
                lenient_future_dates: true,
                ..ParserConfig::default()
            },
            auto_detect_utf8: true,
        }
    }

    /// Implicit FTPS on the standard secure port (990).
    pub fn implicit_tls(
        host: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        let mut config = Self::plain(host, username, password);
        config.port = 990;
        config.tls = TlsMode::Implicit {
            allow_insecure: false,
        };
        config
    }

    /// Explicit FTPS (`AUTH TLS`) on the standard FTP port (21).
    pub fn explicit_tls(
        host: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        let mut config = Self::plain(host, username, password);
        config.tls = TlsMode::Explicit {
            allow_insecure: false,
        };
        config
    }
}
