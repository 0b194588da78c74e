//! Length-prefixed string lookups.

use super::section::SharedSection;

/// View over the string-table region: a sequence of
/// `{u16 big-endian length, UTF-8 bytes}` entries addressed by byte
/// offset.
#[derive(Debug, Clone)]
pub struct StringTable {
    section: SharedSection,
}

impl StringTable {
    pub fn new(section: SharedSection) -> Self {
        Self { section }
    }

    /// Read the entry at `offset`: the length prefix, then that many
    /// bytes as a string view into the section. Fails if either read
    /// falls outside the section or the bytes are not UTF-8.
    pub fn get(&self, offset: u32) -> Option<&str> {
        let offset = offset as usize;
        let length = self.section.get_u16(offset)? as usize;
        let start = offset.checked_add(2)?;
        let end = start.checked_add(length)?;
        if end > self.section.len() {
            return None;
        }
        std::str::from_utf8(&self.section.bytes()[start..end]).ok()
    }
}
