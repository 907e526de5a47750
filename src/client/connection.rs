//! Connection establishment: TCP/TLS setup, socket tuning, and greeting
//! validation (spec §4.9.1 "Implicit TLS")

use std::net::ToSocketAddrs;
use std::sync::Arc;
use std::time::Duration;

use socket2::{Domain, Protocol, Socket, Type};
use tokio::io::BufReader;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_rustls::TlsConnector;
use tokio_rustls::rustls::client::danger::{
    HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier,
};
use tokio_rustls::rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use tokio_rustls::rustls::{ClientConfig as RustlsClientConfig, DigitallySignedStruct, RootCertStore, SignatureScheme};
use tracing::{debug, warn};

use crate::capabilities::{FeatureCacheState, FeatureMap};
use crate::config::{ClientConfig, TlsMode};
use crate::error::{FtpError, Result};

use super::state::{ConnectionState, ControlEncoding, DataProtection};
use super::{ControlStream, FtpClient};

const BUFREADER_CAPACITY: usize = 16 * 1024;

/// Certificate verifier that accepts any certificate, for `allow_insecure`
/// connections to self-signed or otherwise unverifiable servers.
///
/// **Security warning:** disables certificate validation entirely. Only use
/// against servers you trust on a network you trust.
#[derive(Debug)]
pub(super) struct DangerousAcceptAnyCertificate;

impl ServerCertVerifier for DangerousAcceptAnyCertificate {
    fn verify_server_cert(
        &self,
        _end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> std::result::Result<ServerCertVerified, tokio_rustls::rustls::Error> {
        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        _message: &[u8],
        _cert: &CertificateDer<'_>,
        _dss: &DigitallySignedStruct,
    ) -> std::result::Result<HandshakeSignatureValid, tokio_rustls::rustls::Error> {
        Ok(HandshakeSignatureValid::assertion())
    }

    fn verify_tls13_signature(
        &self,
        _message: &[u8],
        _cert: &CertificateDer<'_>,
        _dss: &DigitallySignedStruct,
    ) -> std::result::Result<HandshakeSignatureValid, tokio_rustls::rustls::Error> {
        Ok(HandshakeSignatureValid::assertion())
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        vec![
            SignatureScheme::RSA_PKCS1_SHA256,
            SignatureScheme::RSA_PKCS1_SHA384,
            SignatureScheme::RSA_PKCS1_SHA512,
            SignatureScheme::ECDSA_NISTP256_SHA256,
            SignatureScheme::ECDSA_NISTP384_SHA384,
            SignatureScheme::ECDSA_NISTP521_SHA512,
            SignatureScheme::RSA_PSS_SHA256,
            SignatureScheme::RSA_PSS_SHA384,
            SignatureScheme::RSA_PSS_SHA512,
            SignatureScheme::ED25519,
            SignatureScheme::ED448,
        ]
    }
}

pub(super) fn build_tls_connector(allow_insecure: bool) -> TlsConnector {
    use tokio_rustls::rustls::crypto::{CryptoProvider, ring};
    let _ = CryptoProvider::install_default(ring::default_provider());

    let tls_config = if allow_insecure {
        warn!("TLS certificate validation disabled for this connection");
        RustlsClientConfig::builder()
            .dangerous()
            .with_custom_certificate_verifier(Arc::new(DangerousAcceptAnyCertificate))
            .with_no_client_auth()
    } else {
        let mut root_store = RootCertStore::empty();
        root_store.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
        RustlsClientConfig::builder()
            .with_root_certificates(root_store)
            .with_no_client_auth()
    };

    TlsConnector::from(Arc::new(tls_config))
}

async fn connect_tcp(host: &str, port: u16, connect_timeout: Duration) -> Result<TcpStream> {
    let addr = format!("{host}:{port}");
    let socket_addr = addr
        .to_socket_addrs()
        .map_err(|e| FtpError::Io(std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string())))?
        .next()
        .ok_or_else(|| FtpError::Io(std::io::Error::new(std::io::ErrorKind::InvalidInput, "no address resolved")))?;

    let domain = if socket_addr.is_ipv4() { Domain::IPV4 } else { Domain::IPV6 };
    let socket = Socket::new(domain, Type::STREAM, Some(Protocol::TCP))?;
    socket.set_nodelay(true)?;

    let std_stream = timeout(
        connect_timeout,
        tokio::task::spawn_blocking(move || -> std::io::Result<std::net::TcpStream> {
            socket.connect(&socket_addr.into())?;
            socket.set_nonblocking(true)?;
            Ok(socket.into())
        }),
    )
    .await
    .map_err(|_| FtpError::Timeout)?
    .map_err(|e| FtpError::Io(std::io::Error::other(e.to_string())))??;

    Ok(TcpStream::from_std(std_stream)?)
}

impl FtpClient {
    /// Connect to the control channel, optionally wrapping it in TLS
    /// immediately (implicit FTPS, spec §4.9.1), and validate the greeting.
    pub async fn connect(config: ClientConfig) -> Result<Self> {
        let config = Arc::new(config);
        debug!("connecting to {}:{}", config.host, config.port);

        let tcp = connect_tcp(&config.host, config.port, config.timeouts.connect_timeout).await?;
        let control_peer = tcp.peer_addr()?.ip();

        let control_stream = match config.tls {
            TlsMode::Implicit { allow_insecure } => {
                let connector = build_tls_connector(allow_insecure);
                let server_name = ServerName::try_from(config.host.clone())
                    .map_err(|e| FtpError::Tls(format!("invalid domain name: {e}")))?;
                let tls = timeout(config.timeouts.connect_timeout, connector.connect(server_name, tcp))
                    .await
                    .map_err(|_| FtpError::Timeout)?
                    .map_err(|e| FtpError::Tls(e.to_string()))?;
                ControlStream::Tls(Box::new(tls))
            }
            TlsMode::None | TlsMode::Explicit { .. } => ControlStream::Plain(tcp),
        };

        let data_mode = config.data.mode;
        let mut client = Self {
            stream: Some(BufReader::with_capacity(BUFREADER_CAPACITY, control_stream)),
            state: ConnectionState::Ready,
            config,
            control_peer,
            last_reply: None,
            control_encoding: ControlEncoding::Ascii,
            file_type: super::state::FileType::Ascii,
            file_format: super::state::FileFormat::default(),
            file_structure: super::state::FileStructure::default(),
            transfer_mode: super::state::TransferMode::default(),
            data_mode,
            restart_offset: None,
            system_type: None,
            dialect: None,
            features: FeatureMap::new(),
            feature_cache_state: FeatureCacheState::Unfetched,
            keepalive_stats: super::keepalive::KeepaliveStats::default(),
            data_protection: DataProtection::Clear,
            pbsz_sent: false,
        };

        let greeting = client.read_reply().await?;
        debug!("greeting: {} {}", greeting.code, greeting.message());
        if !greeting.is_success() {
            return Err(FtpError::Protocol { code: greeting.code, message: greeting.message().to_string() });
        }
        client.last_reply = Some(greeting);

        // TYPE I is the practical default for most real-world transfers;
        // ASCII is negotiated explicitly by callers that need it.
        client.set_binary_type().await?;

        Ok(client)
    }
}
