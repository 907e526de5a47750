//! `LIST`/`NLST`/`MLSD`/`MLST` directory listing and dialect parsing (spec §4.6, §4.7)

use std::collections::VecDeque;

use chrono::Utc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

use crate::commands;
use crate::error::{FtpError, Result};
use crate::parsers::{self, Dialect, FileEntry};
use crate::response::codes;

use super::FtpClient;

impl FtpClient {
    /// Resolve and cache the listing dialect for this connection (spec §4.7.1).
    async fn ensure_dialect(&mut self) -> Result<&Dialect> {
        if self.dialect.is_none() {
            let syst = self.system().await.ok().map(str::to_string);
            let dialect = parsers::detect_dialect(&self.config.parser, syst.as_deref())?;
            self.dialect = Some(dialect);
        }
        Ok(self.dialect.as_ref().unwrap())
    }

    /// Force the dialect used for the next listing, bypassing SYST detection.
    pub fn set_dialect(&mut self, dialect: Dialect) {
        self.dialect = Some(dialect);
    }

    /// Run a `LIST`/`NLST`/`MLSD`-shaped command over a fresh data connection
    /// and return its raw lines, decoded in the control encoding.
    async fn collect_listing_lines(&mut self, command: &str) -> Result<Vec<String>> {
        let listener = self.negotiate_data_connection().await?;
        self.send_command(command).await?;

        let preliminary = self.read_reply().await?;
        if !preliminary.is_preliminary() {
            return Err(FtpError::Protocol { code: preliminary.code, message: preliminary.message().to_string() });
        }

        let mut data = self.establish_data_connection(listener).await?;
        let mut raw = Vec::new();
        data.read_to_end(&mut raw).await.map_err(FtpError::Io)?;
        data.shutdown().await.ok();

        let completion = self.read_reply().await?;
        if !completion.is_success() {
            return Err(FtpError::Protocol { code: completion.code, message: completion.message().to_string() });
        }

        let text = String::from_utf8_lossy(&raw);
        Ok(text
            .split("\r\n")
            .flat_map(|line| line.split('\n'))
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect())
    }

    /// `LIST` (RFC 959 §4.1.1): parsed directory entries for `path` (or the
    /// current directory if `None`), using the auto-detected or
    /// caller-forced dialect.
    pub async fn list_files(&mut self, path: Option<&str>) -> Result<Vec<FileEntry>> {
        self.ensure_dialect().await?;
        let dialect = self.dialect.clone().expect("dialect resolved above");

        let target = match (self.config.data.list_hidden_files, path) {
            (true, Some(path)) => Some(format!("-a {path}")),
            (true, None) => Some("-a".to_string()),
            (false, Some(path)) => Some(path.to_string()),
            (false, None) => None,
        };
        let argument = commands::list(target.as_deref());

        let lines = self.collect_listing_lines(&argument).await?;
        Ok(parsers::parse_listing(&dialect, &lines, &self.config.parser, Utc::now()))
    }

    /// `NLST` (RFC 959 §4.1.1): bare file names, one per line, no parsing.
    pub async fn list_names(&mut self, path: Option<&str>) -> Result<Vec<String>> {
        self.collect_listing_lines(&commands::nlst(path)).await
    }

    /// `MLSD` (RFC 3659 §7): machine-parseable directory listing.
    pub async fn mlsd(&mut self, path: Option<&str>) -> Result<Vec<FileEntry>> {
        let lines = self.collect_listing_lines(&commands::mlsd(path)).await?;
        Ok(lines.iter().filter_map(|line| parsers::parse_entry_line(&Dialect::Mlsd, line, &self.config.parser, Utc::now())).collect())
    }

    /// `MLST` (RFC 3659 §7): machine-parseable facts for a single path, read
    /// from the control channel rather than a data connection.
    pub async fn mlst(&mut self, path: &str) -> Result<FileEntry> {
        let reply = self.command_expect_success(&commands::mlst(path)).await?;
        if reply.code != codes::SYSTEM_STATUS && reply.lines.len() < 2 {
            return Err(FtpError::MalformedReply(format!("MLST reply too short: {:?}", reply.lines)));
        }
        let fact_line = reply.lines.get(1).ok_or_else(|| FtpError::MalformedReply("MLST reply missing fact line".to_string()))?;
        parsers::parse_entry_line(&Dialect::Mlsd, fact_line, &self.config.parser, Utc::now())
            .ok_or_else(|| FtpError::ParseError(format!("could not parse MLST fact line: {fact_line:?}")))
    }

    /// Begin a paginated listing walk (spec §4.8): fetches and parses the
    /// full listing up front, then hands it out page by page.
    pub async fn initiate_list_parsing(&mut self, path: Option<&str>) -> Result<ListingCursor> {
        let entries = self.list_files(path).await?;
        Ok(ListingCursor { remaining: entries.into() })
    }
}

/// Paginated view over a previously fetched and parsed directory listing.
pub struct ListingCursor {
    remaining: VecDeque<FileEntry>,
}

impl ListingCursor {
    /// Whether any entries remain.
    pub fn has_next(&self) -> bool {
        !self.remaining.is_empty()
    }

    /// Take up to `page_size` entries, in listing order.
    pub fn next(&mut self, page_size: usize) -> Vec<FileEntry> {
        let take = page_size.min(self.remaining.len());
        self.remaining.drain(..take).collect()
    }
}
