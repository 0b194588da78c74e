//! Instruction-stream view.

use super::cursor::BytecodeCursor;
use super::section::SharedSection;

/// View over the code region; hands out cursors at byte offsets.
#[derive(Debug, Clone)]
pub struct CodeView {
    section: SharedSection,
}

impl CodeView {
    pub fn new(section: SharedSection) -> Self {
        Self { section }
    }

    /// A cursor positioned at `offset`, or `None` past the end.
    pub fn cursor_at(&self, offset: usize) -> Option<BytecodeCursor> {
        if offset >= self.section.len() {
            return None;
        }
        Some(BytecodeCursor::new(self.section.clone(), offset))
    }
}
