//! Unix `ls -l` style listing parser (spec §4.6.1)

use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;

use crate::config::ParserConfig;

use super::entry::{EntryType, FileEntry, Permissions};

fn pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(concat!(
            r"^(?P<type>[-dlbcps])(?P<perms>[rwxstST-]{9})",
            r"\s+\d+",
            r"\s+(?P<owner>\S+)\s+(?P<group>\S+)",
            r"\s+(?P<size>\d+)",
            r"\s+(?P<month>[A-Za-z]{3})\s+(?P<day>\d{1,2})\s+(?P<yeartime>[\d:]+)",
            r"\s+(?P<name>.+)$",
        ))
        .expect("static unix listing regex is valid")
    })
}

/// Parse one `LIST`/`NLST` line in Unix long-listing format.
pub(crate) fn parse_line(line: &str, config: &ParserConfig, now: DateTime<Utc>) -> Option<FileEntry> {
    let caps = pattern().captures(line)?;

    let entry_type = match &caps["type"] {
        "d" => EntryType::Directory,
        "l" => EntryType::Symlink,
        "-" => EntryType::File,
        _ => EntryType::Other,
    };

    let permissions = Permissions::parse(&caps["perms"]);
    let size = caps["size"].parse::<u64>().ok();
    let modified = super::date::parse_unix_style_date(config, &caps["month"], caps["day"].parse().ok()?, &caps["yeartime"], now);

    let raw_name = caps["name"].to_string();
    let (name, symlink_target) = if entry_type == EntryType::Symlink {
        match raw_name.split_once(" -> ") {
            Some((n, target)) => (n.to_string(), Some(target.to_string())),
            None => (raw_name, None),
        }
    } else {
        (raw_name, None)
    };

    Some(FileEntry {
        name,
        entry_type,
        size,
        modified,
        permissions,
        owner: Some(caps["owner"].to_string()),
        group: Some(caps["group"].to_string()),
        symlink_target,
        valid: true,
        raw_line: line.to_string(),
    })
}
