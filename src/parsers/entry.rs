//! The dialect-independent listing entry shape (spec §4.6 "Parsed entry")

use chrono::{DateTime, Utc};

/// What kind of directory entry a [`FileEntry`] represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EntryType {
    File,
    Directory,
    Symlink,
    /// Device nodes, sockets, and anything else a dialect can report but
    /// this client has no richer representation for.
    Other,
}

/// Unix-style rwxrwxrwx permission bits, kept both as the raw ten-character
/// string and decoded owner/group/other flags.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Permissions {
    /// The raw permission string as it appeared in the listing, e.g. `"rwxr-xr-x"`
    pub raw: String,
    pub owner_read: bool,
    pub owner_write: bool,
    pub owner_execute: bool,
    pub group_read: bool,
    pub group_write: bool,
    pub group_execute: bool,
    pub other_read: bool,
    pub other_write: bool,
    pub other_execute: bool,
}

impl Permissions {
    /// Parse a 9-character `rwxrwxrwx` string (the type/sticky-bit
    /// character, if present, is stripped by the caller beforehand).
    pub fn parse(raw: &str) -> Option<Self> {
        let chars: Vec<char> = raw.chars().collect();
        if chars.len() != 9 {
            return None;
        }
        let bit = |c: char, expected: char| c == expected;
        Some(Self {
            raw: raw.to_string(),
            owner_read: bit(chars[0], 'r'),
            owner_write: bit(chars[1], 'w'),
            owner_execute: chars[2] == 'x' || chars[2] == 's',
            group_read: bit(chars[3], 'r'),
            group_write: bit(chars[4], 'w'),
            group_execute: chars[5] == 'x' || chars[5] == 's',
            other_read: bit(chars[6], 'r'),
            other_write: bit(chars[7], 'w'),
            other_execute: chars[8] == 'x' || chars[8] == 't',
        })
    }
}

/// A single parsed directory entry, uniform across every listing dialect
/// (spec §4.6).
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FileEntry {
    pub name: String,
    pub entry_type: EntryType,
    pub size: Option<u64>,
    pub modified: Option<DateTime<Utc>>,
    pub permissions: Option<Permissions>,
    pub owner: Option<String>,
    pub group: Option<String>,
    /// Present when `entry_type` is `Symlink` and the listing included `-> target`
    pub symlink_target: Option<String>,
    /// `false` when `save_unparseable_entries` kept a line the active
    /// dialect parser could not interpret (spec §4.6 "Unparseable lines")
    pub valid: bool,
    /// The original, unmodified listing line
    pub raw_line: String,
}

impl FileEntry {
    pub(crate) fn unparseable(raw_line: &str) -> Self {
        Self {
            name: String::new(),
            entry_type: EntryType::Other,
            size: None,
            modified: None,
            permissions: None,
            owner: None,
            group: None,
            symlink_target: None,
            valid: false,
            raw_line: raw_line.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_permission_string() {
        let perms = Permissions::parse("rwxr-xr--").unwrap();
        assert!(perms.owner_read && perms.owner_write && perms.owner_execute);
        assert!(perms.group_read && !perms.group_write && perms.group_execute);
        assert!(perms.other_read && !perms.other_write && !perms.other_execute);
    }

    #[test]
    fn rejects_wrong_length_permission_string() {
        assert!(Permissions::parse("rwx").is_none());
    }

    #[test]
    fn unparseable_entry_is_invalid_and_keeps_raw_line() {
        let entry = FileEntry::unparseable("garbage line");
        assert!(!entry.valid);
        assert_eq!(entry.raw_line, "garbage line");
    }
}
