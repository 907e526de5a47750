//! End-to-end login sequencing against a loopback mock server.

mod common;

use ftp_rs::{Credentials, FtpClient};

#[tokio::test]
async fn login_succeeds_with_correct_credentials() {
    let (config, handle) = common::mock_server(|mut control| async move {
        common::handshake(&mut control).await;
        assert_eq!(control.recv().await, "USER anonymous");
        control.send("331 Please specify the password").await;
        assert_eq!(control.recv().await, "PASS anonymous@");
        control.send("230 Login successful").await;
        assert_eq!(control.recv().await, "QUIT");
        control.send("221 Goodbye").await;
    })
    .await;

    let mut client = FtpClient::connect(config).await.unwrap();
    assert!(client.login().await.unwrap());
    assert!(client.is_authenticated());

    client.disconnect().await.unwrap();
    handle.await.unwrap();
}

#[tokio::test]
async fn login_succeeds_immediately_after_user_command() {
    let (config, handle) = common::mock_server(|mut control| async move {
        common::handshake(&mut control).await;
        assert_eq!(control.recv().await, "USER anonymous");
        control.send("230 Already logged in").await;
        assert_eq!(control.recv().await, "QUIT");
        control.send("221 Goodbye").await;
    })
    .await;

    let mut client = FtpClient::connect(config).await.unwrap();
    assert!(client.login().await.unwrap());
    assert!(client.is_authenticated());

    client.disconnect().await.unwrap();
    handle.await.unwrap();
}

#[tokio::test]
async fn login_rejected_password_returns_false_without_error() {
    let (mut config, handle) = common::mock_server(|mut control| async move {
        common::handshake(&mut control).await;
        assert_eq!(control.recv().await, "USER bob");
        control.send("331 Please specify the password").await;
        assert_eq!(control.recv().await, "PASS wrong");
        control.send("530 Login incorrect").await;
        assert_eq!(control.recv().await, "QUIT");
        control.send("221 Goodbye").await;
    })
    .await;
    config.credentials = Credentials::new("bob", "wrong");

    let mut client = FtpClient::connect(config).await.unwrap();
    assert!(!client.login().await.unwrap());
    assert!(!client.is_authenticated());

    client.disconnect().await.unwrap();
    handle.await.unwrap();
}

#[tokio::test]
async fn login_rejected_username_returns_false_without_sending_pass() {
    let (mut config, handle) = common::mock_server(|mut control| async move {
        common::handshake(&mut control).await;
        assert_eq!(control.recv().await, "USER nobody");
        control.send("530 No such user").await;
        assert_eq!(control.recv().await, "QUIT");
        control.send("221 Goodbye").await;
    })
    .await;
    config.credentials = Credentials::new("nobody", "irrelevant");

    let mut client = FtpClient::connect(config).await.unwrap();
    assert!(!client.login().await.unwrap());

    client.disconnect().await.unwrap();
    handle.await.unwrap();
}

#[tokio::test]
async fn login_requiring_account_sends_acct() {
    let (mut config, handle) = common::mock_server(|mut control| async move {
        common::handshake(&mut control).await;
        assert_eq!(control.recv().await, "USER acctuser");
        control.send("331 Please specify the password").await;
        assert_eq!(control.recv().await, "PASS secret");
        control.send("332 Need account for login").await;
        assert_eq!(control.recv().await, "ACCT finance");
        control.send("230 Login successful").await;
        assert_eq!(control.recv().await, "QUIT");
        control.send("221 Goodbye").await;
    })
    .await;
    config.credentials = Credentials {
        username: "acctuser".to_string(),
        password: "secret".to_string(),
        account: Some("finance".to_string()),
    };

    let mut client = FtpClient::connect(config).await.unwrap();
    assert!(client.login().await.unwrap());

    client.disconnect().await.unwrap();
    handle.await.unwrap();
}

#[tokio::test]
async fn login_needing_account_without_one_configured_returns_false() {
    let (mut config, handle) = common::mock_server(|mut control| async move {
        common::handshake(&mut control).await;
        assert_eq!(control.recv().await, "USER acctuser");
        control.send("331 Please specify the password").await;
        assert_eq!(control.recv().await, "PASS secret");
        control.send("332 Need account for login").await;
        assert_eq!(control.recv().await, "QUIT");
        control.send("221 Goodbye").await;
    })
    .await;
    config.credentials = Credentials::new("acctuser", "secret");

    let mut client = FtpClient::connect(config).await.unwrap();
    assert!(!client.login().await.unwrap());

    client.disconnect().await.unwrap();
    handle.await.unwrap();
}

#[tokio::test]
async fn reset_login_sends_rein_and_reverts_authentication_state() {
    let (config, handle) = common::mock_server(|mut control| async move {
        common::handshake(&mut control).await;
        assert_eq!(control.recv().await, "USER anonymous");
        control.send("331 Please specify the password").await;
        assert_eq!(control.recv().await, "PASS anonymous@");
        control.send("230 Login successful").await;
        assert_eq!(control.recv().await, "REIN");
        control.send("220 Ready for new user").await;
        assert_eq!(control.recv().await, "QUIT");
        control.send("221 Goodbye").await;
    })
    .await;

    let mut client = FtpClient::connect(config).await.unwrap();
    assert!(client.login().await.unwrap());
    client.reset_login().await.unwrap();
    assert!(!client.is_authenticated());

    client.disconnect().await.unwrap();
    handle.await.unwrap();
}
