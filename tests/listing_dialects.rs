//! LIST/MLSD/MLST dialect parsing driven end-to-end through the public API.

mod common;

use ftp_rs::{DataConnectionMode, Dialect, EntryType, FtpClient};
use tokio::io::AsyncWriteExt;

#[tokio::test]
async fn list_files_parses_unix_dialect_listing() {
    let (mut config, handle) = common::mock_server(|mut control| async move {
        common::handshake(&mut control).await;
        assert_eq!(control.recv().await, "USER anonymous");
        control.send("331 Please specify the password").await;
        assert_eq!(control.recv().await, "PASS anonymous@");
        control.send("230 Login successful").await;

        let (data_listener, pasv_reply) = common::pasv_listener().await;
        assert_eq!(control.recv().await, "PASV");
        control.send(&pasv_reply).await;
        assert_eq!(control.recv().await, "LIST");
        control.send("150 Here comes the directory listing").await;

        let (mut data, _) = data_listener.accept().await.unwrap();
        data.write_all(
            b"total 12\r\n\
              -rw-r--r--   1 alice    staff       4096 Jan 15  2023 readme.txt\r\n\
              drwxr-xr-x   4 root     root        4096 May 20 14:30 pub\r\n",
        )
        .await
        .unwrap();
        data.shutdown().await.unwrap();

        control.send("226 Directory send OK").await;
        assert_eq!(control.recv().await, "QUIT");
        control.send("221 Goodbye").await;
    })
    .await;
    config.data.mode = DataConnectionMode::PassiveLocal;

    let mut client = FtpClient::connect(config).await.unwrap();
    assert!(client.login().await.unwrap());
    client.set_dialect(Dialect::Unix);

    let entries = client.list_files(None).await.unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].name, "readme.txt");
    assert_eq!(entries[0].entry_type, EntryType::File);
    assert_eq!(entries[0].size, Some(4096));
    assert_eq!(entries[1].name, "pub");
    assert_eq!(entries[1].entry_type, EntryType::Directory);

    client.disconnect().await.unwrap();
    handle.await.unwrap();
}

#[tokio::test]
async fn mlsd_parses_machine_readable_facts() {
    let (mut config, handle) = common::mock_server(|mut control| async move {
        common::handshake(&mut control).await;
        assert_eq!(control.recv().await, "USER anonymous");
        control.send("331 Please specify the password").await;
        assert_eq!(control.recv().await, "PASS anonymous@");
        control.send("230 Login successful").await;

        let (data_listener, pasv_reply) = common::pasv_listener().await;
        assert_eq!(control.recv().await, "PASV");
        control.send(&pasv_reply).await;
        assert_eq!(control.recv().await, "MLSD");
        control.send("150 Here comes the directory listing").await;

        let (mut data, _) = data_listener.accept().await.unwrap();
        data.write_all(
            b"type=file;size=1234;modify=20230615143000; readme.txt\r\n\
              type=dir;modify=20230101000000; pub\r\n",
        )
        .await
        .unwrap();
        data.shutdown().await.unwrap();

        control.send("226 Directory send OK").await;
        assert_eq!(control.recv().await, "QUIT");
        control.send("221 Goodbye").await;
    })
    .await;
    config.data.mode = DataConnectionMode::PassiveLocal;

    let mut client = FtpClient::connect(config).await.unwrap();
    assert!(client.login().await.unwrap());

    let entries = client.mlsd(None).await.unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].name, "readme.txt");
    assert_eq!(entries[0].size, Some(1234));
    assert_eq!(entries[1].entry_type, EntryType::Directory);

    client.disconnect().await.unwrap();
    handle.await.unwrap();
}

#[tokio::test]
async fn mlst_parses_single_fact_line_from_control_channel() {
    let (config, handle) = common::mock_server(|mut control| async move {
        common::handshake(&mut control).await;
        assert_eq!(control.recv().await, "USER anonymous");
        control.send("331 Please specify the password").await;
        assert_eq!(control.recv().await, "PASS anonymous@");
        control.send("230 Login successful").await;

        assert_eq!(control.recv().await, "MLST /pub/readme.txt");
        control.send("250-Listing /pub/readme.txt").await;
        control.send(" type=file;size=1234;modify=20230615143000; readme.txt").await;
        control.send("250 End").await;

        assert_eq!(control.recv().await, "QUIT");
        control.send("221 Goodbye").await;
    })
    .await;

    let mut client = FtpClient::connect(config).await.unwrap();
    assert!(client.login().await.unwrap());

    let entry = client.mlst("/pub/readme.txt").await.unwrap();
    assert_eq!(entry.name, "readme.txt");
    assert_eq!(entry.size, Some(1234));

    client.disconnect().await.unwrap();
    handle.await.unwrap();
}
