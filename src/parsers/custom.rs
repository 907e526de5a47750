//! User-supplied listing parser override (spec §4.6.7 "Custom dialect")

use std::fmt;
use std::sync::Arc;

use super::entry::FileEntry;

/// A user-supplied line parser, installed in place of the built-in dialect
/// parsers when the server's listing format matches none of them.
///
/// Wraps a closure rather than exposing a trait so callers can install one
/// with a plain `CustomParser::new(|line| ...)` instead of defining a type.
#[derive(Clone)]
pub struct CustomParser {
    parse: Arc<dyn Fn(&str) -> Option<FileEntry> + Send + Sync>,
}

impl CustomParser {
    /// Wrap a line-parsing closure. Return `None` from it for lines the
    /// parser cannot interpret; the caller decides (via
    /// `ParserConfig::save_unparseable_entries`) whether that becomes a
    /// dropped line or an `FileEntry { valid: false, .. }` placeholder.
    pub fn new(parse: impl Fn(&str) -> Option<FileEntry> + Send + Sync + 'static) -> Self {
        Self { parse: Arc::new(parse) }
    }

    pub(crate) fn parse_line(&self, line: &str) -> Option<FileEntry> {
        (self.parse)(line)
    }
}

impl fmt::Debug for CustomParser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomParser").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::EntryType;

    #[test]
    fn wraps_and_invokes_closure() {
        let parser = CustomParser::new(|line| {
            if line.starts_with("F ") {
                Some(FileEntry {
                    name: line[2..].to_string(),
                    entry_type: EntryType::File,
                    size: None,
                    modified: None,
                    permissions: None,
                    owner: None,
                    group: None,
                    symlink_target: None,
                    valid: true,
                    raw_line: line.to_string(),
                })
            } else {
                None
            }
        });
        let entry = parser.parse_line("F hello.txt").unwrap();
        assert_eq!(entry.name, "hello.txt");
        assert!(parser.parse_line("garbage").is_none());
    }

    #[test]
    fn debug_impl_does_not_panic() {
        let parser = CustomParser::new(|_| None);
        assert!(format!("{:?}", parser).contains("CustomParser"));
    }
}
