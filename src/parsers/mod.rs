//! Listing-dialect parsers and the SYST-driven dialect detector (spec §4.7)

mod custom;
mod date;
mod entry;
mod mlsx;
mod mvs;
mod os400;
mod unix;
mod vms;
mod windows_nt;

use std::collections::HashMap;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};

pub use custom::CustomParser;
pub use entry::{EntryType, FileEntry, Permissions};

use crate::config::ParserConfig;

/// Canonical listing dialect keys (spec §4.7.1).
///
/// `UnixLtrim` and `MacOsPeter`/`NetWare` are distinguished from `Unix` only
/// in pre-processing (trim-leading-whitespace, or none at all); none of
/// them need a distinct grammar, so the Unix parser backs all four.
#[derive(Debug, Clone)]
pub enum Dialect {
    Unix,
    UnixLtrim,
    Windows,
    Vms,
    Os400,
    As400,
    Mvs,
    NetWare,
    MacOsPeter,
    Mlsd,
    Custom(CustomParser),
}

impl PartialEq for Dialect {
    fn eq(&self, other: &Self) -> bool {
        matches!(
            (self, other),
            (Dialect::Unix, Dialect::Unix)
                | (Dialect::UnixLtrim, Dialect::UnixLtrim)
                | (Dialect::Windows, Dialect::Windows)
                | (Dialect::Vms, Dialect::Vms)
                | (Dialect::Os400, Dialect::Os400)
                | (Dialect::As400, Dialect::As400)
                | (Dialect::Mvs, Dialect::Mvs)
                | (Dialect::NetWare, Dialect::NetWare)
                | (Dialect::MacOsPeter, Dialect::MacOsPeter)
                | (Dialect::Mlsd, Dialect::Mlsd)
        )
        // Two `Custom` variants are never considered equal: the closures
        // they wrap aren't comparable.
    }
}

/// Process-wide SYST-string overrides (spec §6 "Environment"): a system-type
/// override and a fallback used when SYST itself fails. Read once per
/// process and immutable thereafter, mirroring the teacher's note that such
/// overrides "are read at session creation and are immutable thereafter."
struct SystOverrides {
    table: HashMap<String, String>,
}

fn syst_overrides() -> &'static SystOverrides {
    static OVERRIDES: OnceLock<SystOverrides> = OnceLock::new();
    OVERRIDES.get_or_init(|| {
        let mut table = HashMap::new();
        table.insert("PLAN 9".to_string(), "UNIX".to_string());
        if let Ok(raw) = std::env::var("FTP_SYST_OVERRIDES") {
            for pair in raw.split(',') {
                if let Some((from, to)) = pair.split_once('=') {
                    table.insert(from.trim().to_uppercase(), to.trim().to_uppercase());
                }
            }
        }
        SystOverrides { table }
    })
}

fn dialect_from_key(key: &str) -> Option<Dialect> {
    match key.to_uppercase().as_str() {
        "UNIX" => Some(Dialect::Unix),
        "UNIX_LTRIM" => Some(Dialect::UnixLtrim),
        "WINDOWS" => Some(Dialect::Windows),
        "VMS" => Some(Dialect::Vms),
        "OS/400" => Some(Dialect::Os400),
        "AS/400" => Some(Dialect::As400),
        "MVS" => Some(Dialect::Mvs),
        "NETWARE" => Some(Dialect::NetWare),
        "MACOS_PETER" => Some(Dialect::MacOsPeter),
        "L8" => Some(Dialect::Unix),
        "MLSD" => Some(Dialect::Mlsd),
        _ => None,
    }
}

/// Resolve the dialect key for the next `LIST`, per spec §4.7.1's four-step
/// resolution order. `syst_reply` is the raw text of a prior `SYST` reply
/// (without the reply code), if one succeeded.
pub(crate) fn detect_dialect(
    config: &ParserConfig,
    syst_reply: Option<&str>,
) -> crate::Result<Dialect> {
    if let Some(key) = &config.server_system_key {
        if let Some(dialect) = dialect_from_key(key) {
            return Ok(dialect);
        }
    }

    let raw = match syst_reply {
        Some(raw) => raw,
        None => {
            return config
                .default_system_type
                .as_deref()
                .and_then(dialect_from_key)
                .ok_or(crate::FtpError::SystemTypeUnknown);
        }
    };

    // SYST replies look like "UNIX Type: L8" — take the leading token(s)
    // up to the first punctuation that isn't part of a known key.
    let normalized = raw.trim().to_uppercase();
    let overrides = syst_overrides();
    if let Some(mapped) = overrides.table.get(&normalized) {
        if let Some(dialect) = dialect_from_key(mapped) {
            return Ok(dialect);
        }
    }

    for (prefix, key) in [
        ("WINDOWS_NT", "WINDOWS"),
        ("WINDOWS", "WINDOWS"),
        ("VMS", "VMS"),
        ("OS/400", "OS/400"),
        ("AS/400", "AS/400"),
        ("MVS", "MVS"),
        ("NETWARE", "NETWARE"),
        ("MACOS", "MACOS_PETER"),
        ("UNIX TYPE: L8", "L8"),
        ("UNIX", "UNIX"),
    ] {
        if normalized.starts_with(prefix) {
            if let Some(dialect) = dialect_from_key(key) {
                return Ok(dialect);
            }
        }
    }

    config
        .default_system_type
        .as_deref()
        .and_then(dialect_from_key)
        .ok_or(crate::FtpError::SystemTypeUnknown)
}

/// Parse one listing line with the given dialect, applying
/// `save_unparseable_entries` (spec §4.7.8) to lines the dialect rejects.
pub(crate) fn parse_entry_line(
    dialect: &Dialect,
    line: &str,
    config: &ParserConfig,
    now: DateTime<Utc>,
) -> Option<FileEntry> {
    if line.trim().is_empty() {
        return None;
    }

    let parsed = match dialect {
        Dialect::Unix | Dialect::UnixLtrim | Dialect::NetWare | Dialect::MacOsPeter => {
            let line = if *dialect == Dialect::UnixLtrim { line.trim_start() } else { line };
            unix::parse_line(line, config, now)
        }
        Dialect::Windows => windows_nt::parse_line(line),
        Dialect::Vms => vms::parse_line(line),
        Dialect::Os400 | Dialect::As400 => os400::parse_line(line),
        Dialect::Mvs => mvs::parse_line(line),
        Dialect::Mlsd => mlsx::parse_line(line),
        Dialect::Custom(parser) => parser.parse_line(line),
    };

    match parsed {
        Some(entry) => Some(entry),
        None if config.save_unparseable_entries => Some(FileEntry::unparseable(line)),
        None => None,
    }
}

/// Drop known non-entry header/total lines before the per-line parser sees
/// them (spec §4.7.8's "preprocessing pass").
pub(crate) fn strip_preamble<'a>(dialect: &Dialect, lines: &'a [String]) -> Vec<&'a str> {
    lines
        .iter()
        .map(String::as_str)
        .filter(|line| match dialect {
            Dialect::Unix | Dialect::UnixLtrim | Dialect::NetWare | Dialect::MacOsPeter => {
                !line.starts_with("total ")
            }
            Dialect::Mvs => !(line.contains("Dsname") || line.contains(" Id") || line.contains("Spool Files")),
            _ => true,
        })
        .collect()
}

/// Parse a full listing (the lines returned by `LIST`/`MLSD`) under the
/// given dialect.
pub(crate) fn parse_listing(
    dialect: &Dialect,
    lines: &[String],
    config: &ParserConfig,
    now: DateTime<Utc>,
) -> Vec<FileEntry> {
    strip_preamble(dialect, lines)
        .into_iter()
        .filter_map(|line| parse_entry_line(dialect, line, config, now))
        .collect()
}
