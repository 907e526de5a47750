//! IBM OS/400 (QTCP FTP server) listing parser (spec §4.6.4)
//!
//! Format: `owner  size  MM/DD/YY HH:MM:SS <*STMF|*DIR|*FILE> name`

use std::sync::OnceLock;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use regex::Regex;

use super::entry::{EntryType, FileEntry};

fn pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(concat!(
            r"^(?P<owner>\S+)\s+(?P<size>\d+)\s+",
            r"(?P<month>\d{2})/(?P<day>\d{2})/(?P<year>\d{2,4})\s+",
            r"(?P<hour>\d{2}):(?P<minute>\d{2}):(?P<second>\d{2})\s+",
            r"(?P<kind>\*STMF|\*DIR|\*FILE|\*MEM)\s+(?P<name>.+)$",
        ))
        .expect("static os400 listing regex is valid")
    })
}

pub(crate) fn parse_line(line: &str) -> Option<FileEntry> {
    let caps = pattern().captures(line)?;

    let year: i32 = caps["year"].parse().ok()?;
    let year = if year < 100 { 2000 + year } else { year };
    let month: u32 = caps["month"].parse().ok()?;
    let day: u32 = caps["day"].parse().ok()?;
    let hour: u32 = caps["hour"].parse().ok()?;
    let minute: u32 = caps["minute"].parse().ok()?;
    let second: u32 = caps["second"].parse().ok()?;

    let date = NaiveDate::from_ymd_opt(year, month, day)?;
    let time = NaiveTime::from_hms_opt(hour, minute, second)?;
    let modified = Some(Utc.from_utc_datetime(&NaiveDateTime::new(date, time)));

    let entry_type = match &caps["kind"] {
        "*DIR" => EntryType::Directory,
        "*STMF" | "*FILE" | "*MEM" => EntryType::File,
        _ => EntryType::Other,
    };

    Some(FileEntry {
        name: caps["name"].to_string(),
        entry_type,
        size: caps["size"].parse::<u64>().ok(),
        modified,
        permissions: None,
        owner: Some(caps["owner"].to_string()),
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
    fn parses_stream_file_entry() {
        let line = "QPGMR        1024 06/15/23 10:30:00 *STMF      readme.txt";
        let entry = parse_line(line).unwrap();
        assert_eq!(entry.entry_type, EntryType::File);
        assert_eq!(entry.size, Some(1024));
        assert_eq!(entry.owner.as_deref(), Some("QPGMR"));
    }

    #[test]
    fn parses_directory_entry() {
        let line = "QPGMR           8 06/15/23 10:30:00 *DIR       mylib";
        let entry = parse_line(line).unwrap();
        assert_eq!(entry.entry_type, EntryType::Directory);
        assert_eq!(entry.name, "mylib");
    }

    #[test]
    fn rejects_unrelated_line() {
        assert!(parse_line("Members in file MYLIB/MYFILE").is_none());
    }
}
