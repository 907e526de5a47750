//! OpenVMS `DIRECTORY/DATE/SIZE` style listing parser (spec §4.6.3)
//!
//! Format: `NAME.TYPE;VERSION   SIZE   DD-MMM-YYYY HH:MM[:SS]`

use std::sync::OnceLock;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use regex::Regex;

use super::entry::{EntryType, FileEntry};

fn pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(concat!(
            r"^(?P<name>\S+)\.(?P<ext>\S+?);(?P<version>\d+)\s+",
            r"(?P<size>\d+)\s+",
            r"(?P<day>\d{1,2})-(?P<month>[A-Za-z]{3})-(?P<year>\d{4})\s+",
            r"(?P<hour>\d{1,2}):(?P<minute>\d{2})(?::(?P<second>\d{2}))?",
        ))
        .expect("static vms listing regex is valid")
    })
}

const MONTHS: [&str; 12] = [
    "JAN", "FEB", "MAR", "APR", "MAY", "JUN", "JUL", "AUG", "SEP", "OCT", "NOV", "DEC",
];

pub(crate) fn parse_line(line: &str) -> Option<FileEntry> {
    let caps = pattern().captures(line)?;

    let month = MONTHS
        .iter()
        .position(|m| m.eq_ignore_ascii_case(&caps["month"]))
        .map(|i| i as u32 + 1)?;
    let day: u32 = caps["day"].parse().ok()?;
    let year: i32 = caps["year"].parse().ok()?;
    let hour: u32 = caps["hour"].parse().ok()?;
    let minute: u32 = caps["minute"].parse().ok()?;
    let second: u32 = caps.name("second").and_then(|m| m.as_str().parse().ok()).unwrap_or(0);

    let date = NaiveDate::from_ymd_opt(year, month, day)?;
    let time = NaiveTime::from_hms_opt(hour, minute, second)?;
    let modified = Some(Utc.from_utc_datetime(&NaiveDateTime::new(date, time)));

    // VMS has no directory entry marker distinct from a file; `.DIR` is the
    // conventional extension used for directories.
    let entry_type = if caps["ext"].eq_ignore_ascii_case("DIR") {
        EntryType::Directory
    } else {
        EntryType::File
    };

    let name = format!("{}.{};{}", &caps["name"], &caps["ext"], &caps["version"]);

    Some(FileEntry {
        name,
        entry_type,
        size: caps["size"].parse::<u64>().ok(),
        modified,
        permissions: None,
        owner: None,
        group: None,
        symlink_target: None,
        valid: true,
        raw_line: line.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_regular_file() {
        let entry = parse_line("README.TXT;1         5  15-JAN-2023 09:00").unwrap();
        assert_eq!(entry.entry_type, EntryType::File);
        assert_eq!(entry.size, Some(5));
        assert_eq!(entry.name, "README.TXT;1");
    }

    #[test]
    fn directory_extension_is_recognized() {
        let entry = parse_line("PUB.DIR;1            1  01-MAR-2022 12:00:00").unwrap();
        assert_eq!(entry.entry_type, EntryType::Directory);
    }

    #[test]
    fn rejects_non_matching_line() {
        assert!(parse_line("Directory DISK$USER:[ALICE]").is_none());
    }
}
