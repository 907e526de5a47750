//! Directory listing example: auto-detect the server's listing dialect and
//! page through the parsed entries.
//!
//! Run with: cargo run --example listing

use ftp_rs::{ClientConfig, EntryType, FtpClient};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let host = std::env::var("FTP_HOST").unwrap_or_else(|_| "ftp.example.com".to_string());
    let user = std::env::var("FTP_USER").unwrap_or_else(|_| "anonymous".to_string());
    let pass = std::env::var("FTP_PASS").unwrap_or_else(|_| "anonymous@".to_string());
    let path = std::env::var("FTP_PATH").ok();

    let config = ClientConfig::plain(&host, &user, &pass);
    let mut client = FtpClient::connect(config).await?;
    client.login().await?;

    let mut cursor = client.initiate_list_parsing(path.as_deref()).await?;
    let mut page_number = 1;
    while cursor.has_next() {
        println!("-- page {page_number} --");
        for entry in cursor.next(10) {
            let kind = match entry.entry_type {
                EntryType::Directory => "dir",
                EntryType::File => "file",
                EntryType::Symlink => "link",
                EntryType::Other => "other",
            };
            let size = entry.size.map(|s| s.to_string()).unwrap_or_else(|| "-".to_string());
            println!("{kind:>5} {size:>10}  {}", entry.name);
        }
        page_number += 1;
    }

    client.disconnect().await?;
    Ok(())
}
