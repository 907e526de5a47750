//! IBM MVS (z/OS) partitioned-dataset listing parser (spec §4.6.5)
//!
//! PDS member format: `NAME VV.MM MM/DD/YY MM/DD/YY HH:MM SIZE INIT MOD ID`
//! Dataset-level format has a different column set; only member listings
//! (the common case for `LIST` inside a PDS) are parsed here.

use std::sync::OnceLock;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use regex::Regex;

use super::entry::{EntryType, FileEntry};

fn pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(concat!(
            r"^(?P<name>\S+)\s+\S+\s+",
            r"\d{2}/\d{2}/\d{2}\s+",
            r"(?P<month>\d{2})/(?P<day>\d{2})/(?P<year>\d{2})\s+",
            r"(?P<hour>\d{2}):(?P<minute>\d{2})\s+",
            r"(?P<size>\d+)\s+\d+\s+\d+\s+\S+$",
        ))
        .expect("static mvs listing regex is valid")
    })
}

pub(crate) fn parse_line(line: &str) -> Option<FileEntry> {
    let caps = pattern().captures(line)?;

    let year: i32 = 2000 + caps["year"].parse::<i32>().ok()?;
    let month: u32 = caps["month"].parse().ok()?;
    let day: u32 = caps["day"].parse().ok()?;
    let hour: u32 = caps["hour"].parse().ok()?;
    let minute: u32 = caps["minute"].parse().ok()?;

    let date = NaiveDate::from_ymd_opt(year, month, day)?;
    let time = NaiveTime::from_hms_opt(hour, minute, 0)?;
    let modified = Some(Utc.from_utc_datetime(&NaiveDateTime::new(date, time)));

    Some(FileEntry {
        name: caps["name"].to_string(),
        entry_type: EntryType::File,
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
    fn parses_pds_member_line() {
        let line = "MEMBER1  01.02 23/01/15 23/06/10 14:22    120    150    12 USER01";
        let entry = parse_line(line).unwrap();
        assert_eq!(entry.name, "MEMBER1");
        assert_eq!(entry.size, Some(120));
        assert_eq!(entry.modified.unwrap().format("%Y-%m-%d").to_string(), "2023-06-10");
    }

    #[test]
    fn rejects_header_line() {
        assert!(parse_line("Name     VV.MM   Created       Changed      Size  Init   Mod   Id").is_none());
    }
}
