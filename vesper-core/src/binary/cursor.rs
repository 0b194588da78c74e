//! Position-tracking reader over a code section.

use crate::core::opcode::{RawOpcode, EXTENDED_ESCAPE};

use super::section::SharedSection;

/// Decodes opcodes and operands from an instruction stream.
///
/// Fetches advance the position and fail with `None` when fewer bytes
/// remain than the operand width, leaving the position unchanged.
#[derive(Debug, Clone)]
pub struct BytecodeCursor {
    section: SharedSection,
    position: usize,
}

impl BytecodeCursor {
    pub fn new(section: SharedSection, position: usize) -> Self {
        Self { section, position }
    }

    pub fn size(&self) -> usize {
        self.section.len()
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn remaining(&self) -> usize {
        self.section.len() - self.position
    }

    /// Add a signed delta to the position. Fails if the result would
    /// land outside the section; negative deltas implement backward
    /// branches and loops.
    pub fn skip(&mut self, delta: i64) -> bool {
        let Some(target) = (self.position as i64).checked_add(delta) else {
            return false;
        };
        if target < 0 || target as usize > self.section.len() {
            return false;
        }
        self.position = target as usize;
        true
    }

    pub fn fetch_u8(&mut self) -> Option<u8> {
        let value = self.section.get_u8(self.position)?;
        self.position += 1;
        Some(value)
    }

    pub fn fetch_u16(&mut self) -> Option<u16> {
        let value = self.section.get_u16(self.position)?;
        self.position += 2;
        Some(value)
    }

    pub fn fetch_u32(&mut self) -> Option<u32> {
        let value = self.section.get_u32(self.position)?;
        self.position += 4;
        Some(value)
    }

    pub fn fetch_u64(&mut self) -> Option<u64> {
        let value = self.section.get_u64(self.position)?;
        self.position += 8;
        Some(value)
    }

    pub fn fetch_i8(&mut self) -> Option<i8> {
        self.fetch_u8().map(|v| v as i8)
    }

    pub fn fetch_i16(&mut self) -> Option<i16> {
        self.fetch_u16().map(|v| v as i16)
    }

    pub fn fetch_i32(&mut self) -> Option<i32> {
        self.fetch_u32().map(|v| v as i32)
    }

    pub fn fetch_i64(&mut self) -> Option<i64> {
        self.fetch_u64().map(|v| v as i64)
    }

    pub fn fetch_f32(&mut self) -> Option<f32> {
        self.fetch_u32().map(f32::from_bits)
    }

    pub fn fetch_f64(&mut self) -> Option<f64> {
        self.fetch_u64().map(f64::from_bits)
    }

    /// Fetch one opcode: a single byte, or the escape byte followed by a
    /// big-endian u16 extended opcode. On failure the position is left
    /// where it was before the fetch.
    pub fn fetch_opcode(&mut self) -> Option<RawOpcode> {
        let mark = self.position;
        let byte = self.fetch_u8()?;
        if byte != EXTENDED_ESCAPE {
            return Some(RawOpcode::Primary(byte));
        }

        match self.fetch_u16() {
            Some(extended) => Some(RawOpcode::Extended(extended)),
            None => {
                self.position = mark;
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn cursor(bytes: &[u8]) -> BytecodeCursor {
        let shared = SharedSection::new(Arc::from(bytes.to_vec().into_boxed_slice()));
        BytecodeCursor::new(shared, 0)
    }

    #[test]
    fn fetches_advance_position() {
        let mut c = cursor(&[0x01, 0x02, 0x03, 0x04, 0x05]);
        assert_eq!(c.fetch_u8(), Some(0x01));
        assert_eq!(c.fetch_u16(), Some(0x0203));
        assert_eq!(c.position(), 3);
        assert_eq!(c.remaining(), 2);
    }

    #[test]
    fn truncated_fetch_leaves_position() {
        let mut c = cursor(&[0x01, 0x02]);
        assert_eq!(c.fetch_u32(), None);
        assert_eq!(c.position(), 0);
        assert_eq!(c.fetch_u16(), Some(0x0102));
        assert_eq!(c.fetch_u8(), None);
    }

    #[test]
    fn skip_validates_both_directions() {
        let mut c = cursor(&[0; 8]);
        assert!(c.skip(5));
        assert_eq!(c.position(), 5);
        assert!(c.skip(-5));
        assert_eq!(c.position(), 0);
        assert!(!c.skip(-1));
        assert!(!c.skip(9));
        assert!(c.skip(8));
        assert_eq!(c.position(), 8);
    }

    #[test]
    fn primary_opcode_is_one_byte() {
        let mut c = cursor(&[0x42]);
        assert_eq!(c.fetch_opcode(), Some(RawOpcode::Primary(0x42)));
        assert_eq!(c.remaining(), 0);
    }

    #[test]
    fn escape_reads_extended_opcode() {
        let mut c = cursor(&[0xFF, 0x12, 0x34]);
        assert_eq!(c.fetch_opcode(), Some(RawOpcode::Extended(0x1234)));
    }

    #[test]
    fn truncated_extended_opcode_fails_cleanly() {
        let mut c = cursor(&[0xFF, 0x12]);
        assert_eq!(c.fetch_opcode(), None);
        assert_eq!(c.position(), 0);
    }

    #[test]
    fn float_operands_are_bit_identical() {
        let bits = 1.25f32.to_bits().to_be_bytes();
        let mut c = cursor(&bits);
        assert_eq!(c.fetch_f32(), Some(1.25));
    }
}
