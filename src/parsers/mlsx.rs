//! MLSD/MLST machine-parseable listing parser (RFC 3659 §7, spec §4.6.6)
//!
//! Format: `fact=value;fact=value; filename` — one semicolon-terminated
//! fact per field, then a single space, then the filename (which may itself
//! contain spaces and is never escaped, per RFC 3659 §7.1).

use chrono::{NaiveDateTime, TimeZone, Utc};

use super::entry::{EntryType, FileEntry};

fn parse_facts(facts: &str) -> std::collections::HashMap<String, String> {
    facts
        .split(';')
        .filter_map(|field| {
            let field = field.trim();
            if field.is_empty() {
                return None;
            }
            let (name, value) = field.split_once('=')?;
            Some((name.to_lowercase(), value.to_string()))
        })
        .collect()
}

fn parse_mlsx_timestamp(raw: &str) -> Option<chrono::DateTime<Utc>> {
    // RFC 3659 §2.3: "YYYYMMDDHHMMSS[.sss]"
    let base = raw.split('.').next().unwrap_or(raw);
    let naive = NaiveDateTime::parse_from_str(base, "%Y%m%d%H%M%S").ok()?;
    Some(Utc.from_utc_datetime(&naive))
}

/// Parse a single MLSD/MLST entry line.
///
/// Returns `None` only if the line has no `<space>`-delimited filename at
/// all (a genuinely malformed fact line); unknown or malformed individual
/// facts are simply omitted from the result rather than failing the whole line.
pub(crate) fn parse_line(line: &str) -> Option<FileEntry> {
    let line = line.strip_prefix(' ').unwrap_or(line);
    let (facts_part, name) = line.split_once(' ')?;
    let facts = parse_facts(facts_part);

    let entry_type = match facts.get("type").map(String::as_str) {
        Some("dir") | Some("cdir") | Some("pdir") => EntryType::Directory,
        Some("file") => EntryType::File,
        Some(other) if other.starts_with("os.unix=slink") => EntryType::Symlink,
        _ => EntryType::Other,
    };

    let size = facts.get("size").and_then(|s| s.parse::<u64>().ok());
    let modified = facts.get("modify").and_then(|m| parse_mlsx_timestamp(m));

    Some(FileEntry {
        name: name.to_string(),
        entry_type,
        size,
        modified,
        permissions: None,
        owner: facts.get("unix.owner").or_else(|| facts.get("unix.uid")).cloned(),
        group: facts.get("unix.group").or_else(|| facts.get("unix.gid")).cloned(),
        symlink_target: None,
        valid: true,
        raw_line: line.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_file_entry_with_size_and_modify() {
        let line = "type=file;size=1234;modify=20230615143000; readme.txt";
        let entry = parse_line(line).unwrap();
        assert_eq!(entry.entry_type, EntryType::File);
        assert_eq!(entry.size, Some(1234));
        assert_eq!(entry.modified.unwrap().format("%Y-%m-%d %H:%M:%S").to_string(), "2023-06-15 14:30:00");
        assert_eq!(entry.name, "readme.txt");
    }

    #[test]
    fn parses_directory_entry() {
        let line = "type=dir;sizd=4096;modify=20230101000000; pub";
        let entry = parse_line(line).unwrap();
        assert_eq!(entry.entry_type, EntryType::Directory);
        assert_eq!(entry.name, "pub");
    }

    #[test]
    fn filename_with_spaces_is_preserved() {
        let line = "type=file;size=1; my file name.txt";
        let entry = parse_line(line).unwrap();
        assert_eq!(entry.name, "my file name.txt");
    }

    #[test]
    fn unknown_facts_are_ignored_not_fatal() {
        let line = "type=file;size=1;x.vendor-fact=weird; name.txt";
        let entry = parse_line(line).unwrap();
        assert_eq!(entry.size, Some(1));
    }
}
