//! FTP reply types and status codes

/// A complete FTP reply: a three-digit code and its (possibly multi-line) text.
///
/// Invariant (spec §3): `lines` is never empty, and for a multi-line reply
/// every intermediate line is preserved verbatim, including lines that
/// happen to start with three digits that differ from `code`.
#[derive(Debug, Clone)]
pub struct Reply {
    /// Three-digit FTP reply code
    pub code: u16,
    /// Raw reply lines in the order received; the first line carries the
    /// code's own text, continuation lines follow.
    pub lines: Vec<String>,
}

/// Reply category, derived from the first digit (spec §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyCategory {
    /// 1xx: command accepted, action pending
    Preliminary,
    /// 2xx: command completed successfully
    Completion,
    /// 3xx: command accepted, more input required
    Intermediate,
    /// 4xx: command rejected, may succeed if retried
    TransientNegative,
    /// 5xx: command rejected, retrying will not help
    PermanentNegative,
    /// 6xx: reply is protected per RFC 2228
    Protected,
}

impl Reply {
    /// First line of the reply, with the leading `"NNN-"`/`"NNN "` prefix stripped.
    pub fn message(&self) -> &str {
        self.lines.first().map(String::as_str).unwrap_or("")
    }

    /// Derive this reply's category from its code's leading digit.
    pub fn category(&self) -> ReplyCategory {
        match self.code / 100 {
            1 => ReplyCategory::Preliminary,
            2 => ReplyCategory::Completion,
            3 => ReplyCategory::Intermediate,
            4 => ReplyCategory::TransientNegative,
            5 => ReplyCategory::PermanentNegative,
            6 => ReplyCategory::Protected,
            _ => ReplyCategory::PermanentNegative,
        }
    }

    /// `true` for 1xx replies.
    pub fn is_preliminary(&self) -> bool {
        self.category() == ReplyCategory::Preliminary
    }

    /// `true` for 2xx replies.
    pub fn is_success(&self) -> bool {
        self.category() == ReplyCategory::Completion
    }

    /// `true` for 3xx replies.
    pub fn is_intermediate(&self) -> bool {
        self.category() == ReplyCategory::Intermediate
    }

    /// `true` for 4xx or 5xx replies.
    pub fn is_negative(&self) -> bool {
        matches!(
            self.category(),
            ReplyCategory::TransientNegative | ReplyCategory::PermanentNegative
        )
    }

    /// `true` for 5xx replies.
    pub fn is_permanent_negative(&self) -> bool {
        self.category() == ReplyCategory::PermanentNegative
    }
}

/// FTP reply codes referenced directly by the client state machine
/// (spec §1: "we reference them only by category and by the handful of
/// codes the state machine branches on").
#[allow(dead_code)]
pub mod codes {
    /// Restart marker reply
    pub const RESTART_MARKER: u16 = 110;
    /// Service ready in nnn minutes
    pub const SERVICE_READY_SOON: u16 = 120;
    /// Data connection already open; transfer starting
    pub const DATA_CONNECTION_ALREADY_OPEN: u16 = 125;
    /// File status okay; about to open data connection
    pub const FILE_STATUS_OKAY: u16 = 150;

    /// Command okay
    pub const COMMAND_OK: u16 = 200;
    /// System status / help reply
    pub const SYSTEM_STATUS: u16 = 211;
    /// Directory status
    pub const DIRECTORY_STATUS: u16 = 212;
    /// File status
    pub const FILE_STATUS: u16 = 213;
    /// Help message
    pub const HELP_MESSAGE: u16 = 214;
    /// NAME system type
    pub const SYSTEM_TYPE: u16 = 215;
    /// Service ready for new user
    pub const SERVICE_READY: u16 = 220;
    /// Service closing control connection
    pub const SERVICE_CLOSING: u16 = 221;
    /// Data connection open; no transfer in progress
    pub const DATA_CONNECTION_OPEN: u16 = 225;
    /// Closing data connection; transfer successful
    pub const CLOSING_DATA_CONNECTION: u16 = 226;
    /// Entering Passive Mode (PASV, RFC 959)
    pub const ENTERING_PASSIVE_MODE: u16 = 227;
    /// Entering Long Passive Mode
    pub const ENTERING_LONG_PASSIVE_MODE: u16 = 228;
    /// Entering Extended Passive Mode (EPSV, RFC 2428)
    pub const ENTERING_EXTENDED_PASSIVE_MODE: u16 = 229;
    /// User logged in, proceed
    pub const USER_LOGGED_IN: u16 = 230;
    /// User logged out
    pub const LOGGED_OUT: u16 = 231;
    /// AUTH TLS/SSL accepted
    pub const AUTH_OK: u16 = 234;
    /// File action okay, completed
    pub const FILE_ACTION_OK: u16 = 250;
    /// PATHNAME created (MKD, PWD)
    pub const PATHNAME_CREATED: u16 = 257;

    /// User name okay, need password
    pub const NEED_PASSWORD: u16 = 331;
    /// Need account for login
    pub const NEED_ACCOUNT: u16 = 332;
    /// Requested file action pending further information (REST)
    pub const PENDING_FURTHER_INFO: u16 = 350;

    /// Service not available, closing control connection
    pub const SERVICE_NOT_AVAILABLE: u16 = 421;
    /// Can't open data connection
    pub const CANT_OPEN_DATA_CONNECTION: u16 = 425;
    /// Connection closed; transfer aborted
    pub const CONNECTION_CLOSED_TRANSFER_ABORTED: u16 = 426;
    /// File unavailable (busy)
    pub const FILE_UNAVAILABLE_TRANSIENT: u16 = 450;
    /// Action aborted, local error
    pub const ACTION_ABORTED_LOCAL_ERROR: u16 = 451;
    /// Insufficient storage space
    pub const INSUFFICIENT_STORAGE: u16 = 452;

    /// Syntax error, command unrecognized
    pub const SYNTAX_ERROR: u16 = 500;
    /// Syntax error in parameters or arguments
    pub const SYNTAX_ERROR_PARAMETERS: u16 = 501;
    /// Command not implemented
    pub const NOT_IMPLEMENTED: u16 = 502;
    /// Bad sequence of commands
    pub const BAD_SEQUENCE: u16 = 503;
    /// Command not implemented for that parameter
    pub const NOT_IMPLEMENTED_FOR_PARAMETER: u16 = 504;
    /// Not logged in
    pub const NOT_LOGGED_IN: u16 = 530;
    /// Need account for storing files
    pub const NEED_ACCOUNT_FOR_STORING: u16 = 532;
    /// File unavailable (not found, no access)
    pub const FILE_UNAVAILABLE: u16 = 550;
    /// Page type unknown
    pub const PAGE_TYPE_UNKNOWN: u16 = 551;
    /// Exceeded storage allocation
    pub const EXCEEDED_STORAGE_ALLOCATION: u16 = 552;
    /// File name not allowed
    pub const FILE_NAME_NOT_ALLOWED: u16 = 553;
}
