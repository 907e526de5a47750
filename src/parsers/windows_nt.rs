//! Windows (IIS/FileZilla) `dir`-style listing parser (spec §4.6.2)
//!
//! Format: `MM-DD-YY  HH:MMAM|PM       <size-or-"<DIR>">      name`

use std::sync::OnceLock;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use regex::Regex;

use super::entry::{EntryType, FileEntry};

fn pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(concat!(
            r"^(?P<month>\d{2})-(?P<day>\d{2})-(?P<year>\d{2,4})\s+",
            r"(?P<hour>\d{2}):(?P<minute>\d{2})(?P<ampm>AM|PM)\s+",
            r"(?P<sizeordir><DIR>|\d+)\s+(?P<name>.+)$",
        ))
        .expect("static windows-nt listing regex is valid")
    })
}

pub(crate) fn parse_line(line: &str) -> Option<FileEntry> {
    let caps = pattern().captures(line)?;

    let year: i32 = caps["year"].parse().ok()?;
    let year = if year < 100 { 2000 + year } else { year };
    let month: u32 = caps["month"].parse().ok()?;
    let day: u32 = caps["day"].parse().ok()?;
    let mut hour: u32 = caps["hour"].parse().ok()?;
    let minute: u32 = caps["minute"].parse().ok()?;
    if &caps["ampm"] == "PM" && hour != 12 {
        hour += 12;
    } else if &caps["ampm"] == "AM" && hour == 12 {
        hour = 0;
    }

    let date = NaiveDate::from_ymd_opt(year, month, day)?;
    let time = NaiveTime::from_hms_opt(hour, minute, 0)?;
    let modified = Some(Utc.from_utc_datetime(&NaiveDateTime::new(date, time)));

    let size_or_dir = &caps["sizeordir"];
    let (entry_type, size) = if size_or_dir == "<DIR>" {
        (EntryType::Directory, None)
    } else {
        (EntryType::File, size_or_dir.parse::<u64>().ok())
    };

    Some(FileEntry {
        name: caps["name"].to_string(),
        entry_type,
        size,
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
    fn parses_directory_entry() {
        let entry = parse_line("10-23-20  02:15PM       <DIR>          pub").unwrap();
        assert_eq!(entry.entry_type, EntryType::Directory);
        assert_eq!(entry.name, "pub");
    }

    #[test]
    fn parses_file_entry_with_four_digit_year() {
        let entry = parse_line("03-05-2023  09:00AM             1024 readme.txt").unwrap();
        assert_eq!(entry.entry_type, EntryType::File);
        assert_eq!(entry.size, Some(1024));
        assert_eq!(entry.modified.unwrap().format("%Y-%m-%d %H:%M").to_string(), "2023-03-05 09:00");
    }

    #[test]
    fn handles_noon_and_midnight_correctly() {
        let noon = parse_line("01-01-2023  12:00PM             1 noon.txt").unwrap();
        assert_eq!(noon.modified.unwrap().format("%H:%M").to_string(), "12:00");
        let midnight = parse_line("01-01-2023  12:00AM             1 midnight.txt").unwrap();
        assert_eq!(midnight.modified.unwrap().format("%H:%M").to_string(), "00:00");
    }
}
