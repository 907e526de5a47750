//! Connection and transfer-mode state for the FTP client

/// Authentication state of the control connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum ConnectionState {
    /// Connected, greeting received, not yet logged in
    Ready,
    /// USER sent, waiting on PASS (and possibly ACCT)
    InProgress,
    /// USER/PASS (/ACCT) accepted
    Authenticated,
    /// QUIT sent or the control socket is known dead
    Closed,
}

/// `TYPE` representation type (spec §4.5, RFC 959 §3.1.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    /// `TYPE A`: NETASCII text
    Ascii,
    /// `TYPE I`: raw bytes
    Binary,
    /// `TYPE L n`: local byte size, for hosts with non-8-bit bytes
    Local(u8),
}

impl FileType {
    pub(super) fn command_argument(&self) -> String {
        match self {
            FileType::Ascii => "A".to_string(),
            FileType::Binary => "I".to_string(),
            FileType::Local(bits) => format!("L {bits}"),
        }
    }
}

/// `TYPE` format qualifier for ASCII/EBCDIC transfers (RFC 959 §3.1.1.1).
/// Servers overwhelmingly default to `NonPrint`; the others exist for
/// completeness but are rarely negotiated by real clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FileFormat {
    /// No vertical format information (the default)
    #[default]
    NonPrint,
    /// Telnet format effectors embedded in the data
    Telnet,
    /// ASA carriage-control characters
    CarriageControl,
}

/// `STRU` file structure (RFC 959 §3.1.2). Only `File` is in real use today;
/// `Record`/`Page` structures are not implemented (see design notes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FileStructure {
    /// No internal structure (the default, and the only one this client sends)
    #[default]
    File,
}

/// `MODE` transfer mode (RFC 959 §3.4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransferMode {
    /// `MODE S`: the default byte stream
    #[default]
    Stream,
    /// `MODE Z`: DEFLATE-compressed stream (MODE Z draft, `deflate` feature)
    Deflate,
}

/// Control-channel text encoding, switched to UTF-8 when FEAT advertises it
/// (spec §4.2 "UTF8 auto-negotiation").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(super) enum ControlEncoding {
    #[default]
    Ascii,
    Utf8,
}

/// `PROT` data-channel protection level (RFC 2228 §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DataProtection {
    /// `PROT C`: clear, no protection
    #[default]
    Clear,
    /// `PROT S`: safe (integrity only)
    Safe,
    /// `PROT E`: confidential (privacy only)
    Confidential,
    /// `PROT P`: private (integrity and privacy; TLS-wrapped data channel)
    Private,
}

impl DataProtection {
    pub(super) fn command_argument(&self) -> &'static str {
        match self {
            DataProtection::Clear => "C",
            DataProtection::Safe => "S",
            DataProtection::Confidential => "E",
            DataProtection::Private => "P",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_type_command_arguments() {
        assert_eq!(FileType::Ascii.command_argument(), "A");
        assert_eq!(FileType::Binary.command_argument(), "I");
        assert_eq!(FileType::Local(36).command_argument(), "L 36");
    }

    #[test]
    fn data_protection_command_arguments() {
        assert_eq!(DataProtection::Clear.command_argument(), "C");
        assert_eq!(DataProtection::Private.command_argument(), "P");
    }

    #[test]
    fn defaults_match_rfc_959_baseline() {
        assert_eq!(FileFormat::default(), FileFormat::NonPrint);
        assert_eq!(FileStructure::default(), FileStructure::File);
        assert_eq!(TransferMode::default(), TransferMode::Stream);
        assert_eq!(DataProtection::default(), DataProtection::Clear);
    }
}
