//! AUTH TLS / PBSZ / PROT sequencing against a loopback mock server.
//!
//! The TLS handshake itself needs a real certificate and isn't exercised
//! here; these cover the reachable control-channel sequencing around it.

mod common;

use ftp_rs::{DataProtection, FtpClient, FtpError};

#[tokio::test]
async fn auth_tls_requires_explicit_tls_config() {
    let (config, handle) = common::mock_server(|mut control| async move {
        common::handshake(&mut control).await;
        assert_eq!(control.recv().await, "QUIT");
        control.send("221 Goodbye").await;
    })
    .await;

    let mut client = FtpClient::connect(config).await.unwrap();
    let err = client.auth_tls().await.unwrap_err();
    assert!(matches!(err, FtpError::SecureChannelError(_)));

    client.disconnect().await.unwrap();
    handle.await.unwrap();
}

#[tokio::test]
async fn set_data_protection_sends_pbsz_once_then_prot_each_call() {
    let (config, handle) = common::mock_server(|mut control| async move {
        common::handshake(&mut control).await;
        assert_eq!(control.recv().await, "PBSZ 0");
        control.send("200 PBSZ set to 0").await;
        assert_eq!(control.recv().await, "PROT P");
        control.send("200 Protection level set to Private").await;
        assert_eq!(control.recv().await, "PROT C");
        control.send("200 Protection level set to Clear").await;
        assert_eq!(control.recv().await, "QUIT");
        control.send("221 Goodbye").await;
    })
    .await;

    let mut client = FtpClient::connect(config).await.unwrap();
    client.set_data_protection(DataProtection::Private).await.unwrap();
    client.set_data_protection(DataProtection::Clear).await.unwrap();

    client.disconnect().await.unwrap();
    handle.await.unwrap();
}
