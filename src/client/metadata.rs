//! File metadata and session parameter commands: TYPE/STRU/MODE, SIZE/MDTM/MFMT,
//! ALLO, SITE, NOOP, FEAT/OPTS, SYST (spec §4.6, §4.7)

use chrono::{DateTime, NaiveDateTime, Utc};

use crate::capabilities::FeatureCacheState;
use crate::commands;
use crate::error::{FtpError, Result};
use crate::response::codes;

use super::state::{FileFormat, FileStructure, FileType, TransferMode};
use super::FtpClient;

/// Parse an RFC 3659 `YYYYMMDDHHMMSS[.sss]` timestamp (used by MDTM/MFMT and MLSx `modify`/`create`).
pub(crate) fn parse_ftp_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    let digits = raw.split('.').next().unwrap_or(raw);
    let naive = NaiveDateTime::parse_from_str(digits, "%Y%m%d%H%M%S")
        .map_err(|e| FtpError::ParseError(format!("bad timestamp {raw:?}: {e}")))?;
    Ok(DateTime::from_naive_utc_and_offset(naive, Utc))
}

impl FtpClient {
    /// Switch to `TYPE I` (binary), the default this client negotiates on connect.
    pub async fn set_binary_type(&mut self) -> Result<()> {
        self.command_expect_success(&commands::type_("I")).await?;
        self.file_type = FileType::Binary;
        Ok(())
    }

    /// Switch to `TYPE A` (NETASCII), triggering line-ending translation on transfers.
    pub async fn set_ascii_type(&mut self) -> Result<()> {
        self.command_expect_success(&commands::type_("A")).await?;
        self.file_type = FileType::Ascii;
        Ok(())
    }

    /// Send `TYPE` with an explicit type/format pair.
    pub async fn set_type(&mut self, file_type: FileType, format: FileFormat) -> Result<()> {
        let mut argument = file_type.command_argument();
        if !matches!(format, FileFormat::NonPrint) && matches!(file_type, FileType::Ascii) {
            argument.push(' ');
            argument.push(match format {
                FileFormat::NonPrint => 'N',
                FileFormat::Telnet => 'T',
                FileFormat::CarriageControl => 'C',
            });
        }
        self.command_expect_success(&commands::type_(&argument)).await?;
        self.file_type = file_type;
        self.file_format = format;
        Ok(())
    }

    /// Send `STRU` (only `File` structure is implemented).
    pub async fn set_structure(&mut self, structure: FileStructure) -> Result<()> {
        self.command_expect_success(commands::stru_file()).await?;
        self.file_structure = structure;
        Ok(())
    }

    /// Send `MODE`.
    pub async fn set_transfer_mode(&mut self, mode: TransferMode) -> Result<()> {
        let arg = match mode {
            TransferMode::Stream => "S",
            TransferMode::Deflate => "Z",
        };
        self.command_expect_success(&commands::mode(arg)).await?;
        self.transfer_mode = mode;
        Ok(())
    }

    /// `SIZE` (RFC 3659 §4): file size in the currently negotiated `TYPE`.
    pub async fn size(&mut self, path: &str) -> Result<u64> {
        let reply = self.command_expect_success(&commands::size(path)).await?;
        reply
            .message()
            .trim()
            .rsplit(' ')
            .next()
            .and_then(|s| s.parse::<u64>().ok())
            .ok_or_else(|| FtpError::MalformedReply(format!("bad SIZE reply: {}", reply.message())))
    }

    /// `MDTM` (RFC 3659 §3): last-modified time.
    pub async fn mdtm(&mut self, path: &str) -> Result<DateTime<Utc>> {
        let reply = self.command_expect_success(&commands::mdtm(path)).await?;
        let raw = reply
            .message()
            .trim()
            .rsplit(' ')
            .next()
            .ok_or_else(|| FtpError::MalformedReply(format!("bad MDTM reply: {}", reply.message())))?;
        parse_ftp_timestamp(raw)
    }

    /// `MFMT` (draft extension): set last-modified time.
    pub async fn mfmt(&mut self, path: &str, timestamp: DateTime<Utc>) -> Result<()> {
        let stamp = timestamp.format("%Y%m%d%H%M%S").to_string();
        self.command_expect_success(&commands::mfmt(&stamp, path)).await?;
        Ok(())
    }

    /// `ALLO` (RFC 959 §4.1.3): pre-allocate storage on the server.
    pub async fn allocate(&mut self, size: u64) -> Result<()> {
        self.command_expect_success(&commands::allo(size)).await?;
        Ok(())
    }

    /// `SITE` (RFC 959 §4.1.3): server-specific command, passed through verbatim.
    pub async fn site(&mut self, argument: &str) -> Result<String> {
        let reply = self.command_expect_success(&commands::site(argument)).await?;
        Ok(reply.message().to_string())
    }

    /// `NOOP`: does not count toward keepalive statistics (use during idle
    /// periods outside a transfer; [`KeepaliveInterleaver`](super::keepalive::KeepaliveInterleaver)
    /// handles in-transfer keepalives).
    pub async fn noop(&mut self) -> Result<()> {
        self.command_expect_success(commands::noop()).await?;
        Ok(())
    }

    /// `SYST` (RFC 959 §4.1.3), cached after the first successful query.
    pub async fn system(&mut self) -> Result<&str> {
        if self.system_type.is_none() {
            let reply = self.command_expect_success(commands::syst()).await?;
            self.system_type = Some(reply.message().trim().to_string());
        }
        Ok(self.system_type.as_deref().unwrap())
    }

    /// Ensure `FEAT` has been fetched and cached (spec §3 "Feature map").
    pub(crate) async fn ensure_features_loaded(&mut self) -> Result<()> {
        match self.feature_cache_state {
            FeatureCacheState::Fetched => return Ok(()),
            FeatureCacheState::Disabled => return Ok(()),
            FeatureCacheState::Unfetched | FeatureCacheState::NotLoggedInYet => {}
        }

        let reply = self.command(commands::feat()).await?;
        match reply.code {
            codes::SYSTEM_STATUS => {
                // Body is every line except the first ("211-Features:") and
                // last ("211 End") framing lines.
                let body: Vec<String> = reply
                    .lines
                    .iter()
                    .skip(1)
                    .take(reply.lines.len().saturating_sub(2))
                    .cloned()
                    .collect();
                self.features = crate::capabilities::FeatureMap::parse(&body);
                self.feature_cache_state = FeatureCacheState::Fetched;
            }
            codes::NOT_LOGGED_IN | codes::BAD_SEQUENCE => {
                self.feature_cache_state = FeatureCacheState::NotLoggedInYet;
            }
            _ => {
                self.feature_cache_state = FeatureCacheState::Disabled;
            }
        }
        Ok(())
    }

    /// `OPTS` (RFC 2389 §4): set an option on a feature, e.g. `OPTS UTF8 ON`.
    pub async fn opts(&mut self, feature: &str, argument: &str) -> Result<()> {
        self.command_expect_success(&commands::opts(feature, argument)).await?;
        Ok(())
    }
}
