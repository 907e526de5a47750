//! Loopback mock-server harness shared by the integration tests.
//!
//! Each test spins up a plain `TcpListener` on an ephemeral port and drives
//! the accepted connection with a small scripted exchange, then points a
//! real [`FtpClient`](ftp_rs::FtpClient) at it. This exercises the actual
//! wire behavior (command framing, reply parsing, data-connection setup)
//! without depending on a real FTP server.

#![allow(dead_code)]

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};

use ftp_rs::ClientConfig;

/// A control-channel connection inside a scripted mock server, split into
/// a buffered reader half and a writer half.
pub struct MockControl {
    reader: BufReader<tokio::net::tcp::OwnedReadHalf>,
    writer: tokio::net::tcp::OwnedWriteHalf,
}

impl MockControl {
    fn new(stream: TcpStream) -> Self {
        let (read_half, write_half) = stream.into_split();
        Self { reader: BufReader::new(read_half), writer: write_half }
    }

    /// Read one client command line, without its trailing CRLF.
    pub async fn recv(&mut self) -> String {
        let mut line = String::new();
        self.reader.read_line(&mut line).await.unwrap();
        line.trim_end().to_string()
    }

    /// Send one reply line, appending CRLF.
    pub async fn send(&mut self, line: &str) {
        self.writer.write_all(line.as_bytes()).await.unwrap();
        self.writer.write_all(b"\r\n").await.unwrap();
        self.writer.flush().await.unwrap();
    }
}

/// Start a mock control-channel server bound to `127.0.0.1` on an ephemeral
/// port, returning a [`ClientConfig`] pre-pointed at it (`tls: None`,
/// `anonymous`/`anonymous@` credentials) and a handle the caller `.await`s
/// to run the server-side script to completion.
pub async fn mock_server<F, Fut>(script: F) -> (ClientConfig, tokio::task::JoinHandle<()>)
where
    F: FnOnce(MockControl) -> Fut + Send + 'static,
    Fut: std::future::Future<Output = ()> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let handle = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        script(MockControl::new(stream)).await;
    });

    let mut config = ClientConfig::plain("127.0.0.1", "anonymous", "anonymous@");
    config.port = addr.port();
    (config, handle)
}

/// Standard greeting + `TYPE I` exchange every `FtpClient::connect` performs
/// before handing control back to the caller's script.
pub async fn handshake(control: &mut MockControl) {
    control.send("220 mock FTP ready").await;
    assert_eq!(control.recv().await, "TYPE I");
    control.send("200 Type set to I").await;
}

/// Bind a one-shot passive-mode data listener on `127.0.0.1` and return its
/// port together with the PASV reply text to send back on the control
/// channel.
pub async fn pasv_listener() -> (TcpListener, String) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let p1 = port / 256;
    let p2 = port % 256;
    let reply = format!("227 Entering Passive Mode (127,0,0,1,{p1},{p2})");
    (listener, reply)
}
