//! SIZE/MDTM/SYST/FEAT reply handling against a loopback mock server.

mod common;

use ftp_rs::FtpClient;

#[tokio::test]
async fn system_type_is_cached_after_first_query() {
    let (config, handle) = common::mock_server(|mut control| async move {
        common::handshake(&mut control).await;
        assert_eq!(control.recv().await, "SYST");
        control.send("215 UNIX Type: L8").await;
        assert_eq!(control.recv().await, "QUIT");
        control.send("221 Goodbye").await;
    })
    .await;

    let mut client = FtpClient::connect(config).await.unwrap();
    let first = client.system().await.unwrap().to_string();
    assert!(first.contains("UNIX"));
    // A second query must not hit the wire again; the mock server would
    // fail on an unexpected extra command if it did.
    let second = client.system().await.unwrap().to_string();
    assert_eq!(first, second);

    client.disconnect().await.unwrap();
    handle.await.unwrap();
}

#[tokio::test]
async fn size_parses_trailing_integer() {
    let (config, handle) = common::mock_server(|mut control| async move {
        common::handshake(&mut control).await;
        assert_eq!(control.recv().await, "SIZE /pub/readme.txt");
        control.send("213 4096").await;
        assert_eq!(control.recv().await, "QUIT");
        control.send("221 Goodbye").await;
    })
    .await;

    let mut client = FtpClient::connect(config).await.unwrap();
    assert_eq!(client.size("/pub/readme.txt").await.unwrap(), 4096);

    client.disconnect().await.unwrap();
    handle.await.unwrap();
}

#[tokio::test]
async fn mdtm_parses_rfc3659_timestamp() {
    let (config, handle) = common::mock_server(|mut control| async move {
        common::handshake(&mut control).await;
        assert_eq!(control.recv().await, "MDTM /pub/readme.txt");
        control.send("213 20230615143000").await;
        assert_eq!(control.recv().await, "QUIT");
        control.send("221 Goodbye").await;
    })
    .await;

    let mut client = FtpClient::connect(config).await.unwrap();
    let modified = client.mdtm("/pub/readme.txt").await.unwrap();
    assert_eq!(modified.to_string(), "2023-06-15 14:30:00 UTC");

    client.disconnect().await.unwrap();
    handle.await.unwrap();
}

#[tokio::test]
async fn feat_reply_continuation_is_parsed_into_feature_map() {
    let (config, handle) = common::mock_server(|mut control| async move {
        common::handshake(&mut control).await;
        assert_eq!(control.recv().await, "FEAT");
        control.send("211-Features:").await;
        control.send(" UTF8").await;
        control.send(" MDTM").await;
        control.send(" MLST type*;size*;modify*;").await;
        control.send("211 End").await;
        assert_eq!(control.recv().await, "QUIT");
        control.send("221 Goodbye").await;
    })
    .await;

    let mut client = FtpClient::connect(config).await.unwrap();
    let features = client.features().await.unwrap();
    assert!(features.has("UTF8"));
    assert!(features.has_value("MLST", "type*;size*;modify*;"));
    assert!(!features.has("NONEXISTENT"));

    client.disconnect().await.unwrap();
    handle.await.unwrap();
}

#[tokio::test]
async fn feat_failure_before_login_permits_retry_after_login() {
    let (config, handle) = common::mock_server(|mut control| async move {
        common::handshake(&mut control).await;
        assert_eq!(control.recv().await, "FEAT");
        control.send("530 Please login with USER and PASS").await;
        assert_eq!(control.recv().await, "USER anonymous");
        control.send("331 Please specify the password").await;
        assert_eq!(control.recv().await, "PASS anonymous@");
        control.send("230 Login successful").await;
        assert_eq!(control.recv().await, "FEAT");
        control.send("211-Features:").await;
        control.send(" SIZE").await;
        control.send("211 End").await;
        assert_eq!(control.recv().await, "QUIT");
        control.send("221 Goodbye").await;
    })
    .await;

    let mut client = FtpClient::connect(config).await.unwrap();
    let had_size_before_login = client.features().await.unwrap().has("SIZE");
    assert!(!had_size_before_login);

    assert!(client.login().await.unwrap());
    let has_size_after_login = client.features().await.unwrap().has("SIZE");
    assert!(has_size_after_login);

    client.disconnect().await.unwrap();
    handle.await.unwrap();
}
