//! Basic FTP client example: connect, log in, download a file.
//!
//! Run with: cargo run --example basic

use ftp_rs::{ClientConfig, FtpClient};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let host = std::env::var("FTP_HOST").unwrap_or_else(|_| "ftp.example.com".to_string());
    let user = std::env::var("FTP_USER").unwrap_or_else(|_| "anonymous".to_string());
    let pass = std::env::var("FTP_PASS").unwrap_or_else(|_| "anonymous@".to_string());

    println!("Connecting to {host}:21...");
    let config = ClientConfig::plain(&host, &user, &pass);
    let mut client = FtpClient::connect(config).await?;
    println!("Connected!");

    if !client.login().await? {
        eprintln!("Login rejected for user {user}");
        client.disconnect().await?;
        return Ok(());
    }
    println!("Logged in as {user}");

    if let Ok(system) = client.system().await {
        println!("Server system: {system}");
    }

    let path = std::env::var("FTP_PATH").unwrap_or_else(|_| "/pub/readme.txt".to_string());
    println!("Fetching {path}...");

    let mut buf = Vec::new();
    match client.retrieve_file(&path, &mut buf).await {
        Ok(bytes) => println!("Downloaded {bytes} bytes"),
        Err(err) => eprintln!("RETR failed: {err}"),
    }

    client.disconnect().await?;
    println!("Connection closed.");

    Ok(())
}
