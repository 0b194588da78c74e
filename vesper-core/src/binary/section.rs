//! Bounds-checked byte-buffer view with big-endian accessors.
//!
//! `Section` is generic over its storage: `Section<Vec<u8>>` exclusively
//! owns a writable buffer, `Section<&[u8]>` borrows, and
//! [`SharedSection`] (`Section<Arc<[u8]>>`) is the cheap-clone form the
//! runtime threads through cursors and views.
//!
//! Every accessor fails with `None`/`false` when `offset + width` would
//! leave the window; nothing clamps, wraps, or panics, and a failed
//! write leaves the buffer untouched. Sections never resize.

use std::ops::Range;
use std::sync::Arc;

/// Shared read-only section view over refcounted bytes.
pub type SharedSection = Section<Arc<[u8]>>;

/// A contiguous byte window over some storage.
#[derive(Debug, Clone)]
pub struct Section<B> {
    buf: B,
    start: usize,
    len: usize,
}

/// Extension point for composite records (e.g. call entries) so they can
/// be read and written without the section knowing their layout.
pub trait SectionRecord: Sized {
    fn read_from<B: AsRef<[u8]>>(section: &Section<B>, offset: usize) -> Option<Self>;
    fn write_to<B: AsRef<[u8]> + AsMut<[u8]>>(&self, section: &mut Section<B>, offset: usize) -> bool;
}

impl<B: AsRef<[u8]>> Section<B> {
    /// Section spanning the whole buffer.
    pub fn new(buf: B) -> Self {
        let len = buf.as_ref().len();
        Self { buf, start: 0, len }
    }

    /// Section over `range` within the buffer; `None` if the range does
    /// not lie inside it.
    pub fn with_range(buf: B, range: Range<usize>) -> Option<Self> {
        if range.start > range.end || range.end > buf.as_ref().len() {
            return None;
        }
        Some(Self {
            buf,
            start: range.start,
            len: range.end - range.start,
        })
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The window as a slice.
    pub fn bytes(&self) -> &[u8] {
        &self.buf.as_ref()[self.start..self.start + self.len]
    }

    pub fn get_bytes<const N: usize>(&self, offset: usize) -> Option<[u8; N]> {
        let end = offset.checked_add(N)?;
        if end > self.len {
            return None;
        }
        let mut out = [0u8; N];
        out.copy_from_slice(&self.bytes()[offset..end]);
        Some(out)
    }

    pub fn get_u8(&self, offset: usize) -> Option<u8> {
        self.bytes().get(offset).copied()
    }

    pub fn get_u16(&self, offset: usize) -> Option<u16> {
        self.get_bytes::<2>(offset).map(u16::from_be_bytes)
    }

    pub fn get_u32(&self, offset: usize) -> Option<u32> {
        self.get_bytes::<4>(offset).map(u32::from_be_bytes)
    }

    pub fn get_u64(&self, offset: usize) -> Option<u64> {
        self.get_bytes::<8>(offset).map(u64::from_be_bytes)
    }

    // Signed counterparts reinterpret the same bits.

    pub fn get_i8(&self, offset: usize) -> Option<i8> {
        self.get_u8(offset).map(|v| v as i8)
    }

    pub fn get_i16(&self, offset: usize) -> Option<i16> {
        self.get_u16(offset).map(|v| v as i16)
    }

    pub fn get_i32(&self, offset: usize) -> Option<i32> {
        self.get_u32(offset).map(|v| v as i32)
    }

    pub fn get_i64(&self, offset: usize) -> Option<i64> {
        self.get_u64(offset).map(|v| v as i64)
    }

    // Floats are bit-identical reinterpretations of the big-endian forms.

    pub fn get_f32(&self, offset: usize) -> Option<f32> {
        self.get_u32(offset).map(f32::from_bits)
    }

    pub fn get_f64(&self, offset: usize) -> Option<f64> {
        self.get_u64(offset).map(f64::from_bits)
    }

    /// Read a composite record at `offset`.
    pub fn get_record<T: SectionRecord>(&self, offset: usize) -> Option<T> {
        T::read_from(self, offset)
    }
}

impl<B: AsRef<[u8]> + AsMut<[u8]>> Section<B> {
    fn bytes_mut(&mut self) -> &mut [u8] {
        let (start, len) = (self.start, self.len);
        &mut self.buf.as_mut()[start..start + len]
    }

    pub fn set_bytes<const N: usize>(&mut self, offset: usize, value: [u8; N]) -> bool {
        let Some(end) = offset.checked_add(N) else {
            return false;
        };
        if end > self.len {
            return false;
        }
        self.bytes_mut()[offset..end].copy_from_slice(&value);
        true
    }

    pub fn set_u8(&mut self, offset: usize, value: u8) -> bool {
        self.set_bytes(offset, [value])
    }

    pub fn set_u16(&mut self, offset: usize, value: u16) -> bool {
        self.set_bytes(offset, value.to_be_bytes())
    }

    pub fn set_u32(&mut self, offset: usize, value: u32) -> bool {
        self.set_bytes(offset, value.to_be_bytes())
    }

    pub fn set_u64(&mut self, offset: usize, value: u64) -> bool {
        self.set_bytes(offset, value.to_be_bytes())
    }

    pub fn set_i8(&mut self, offset: usize, value: i8) -> bool {
        self.set_u8(offset, value as u8)
    }

    pub fn set_i16(&mut self, offset: usize, value: i16) -> bool {
        self.set_u16(offset, value as u16)
    }

    pub fn set_i32(&mut self, offset: usize, value: i32) -> bool {
        self.set_u32(offset, value as u32)
    }

    pub fn set_i64(&mut self, offset: usize, value: i64) -> bool {
        self.set_u64(offset, value as u64)
    }

    pub fn set_f32(&mut self, offset: usize, value: f32) -> bool {
        self.set_u32(offset, value.to_bits())
    }

    pub fn set_f64(&mut self, offset: usize, value: f64) -> bool {
        self.set_u64(offset, value.to_bits())
    }

    /// Write a composite record at `offset`.
    pub fn set_record<T: SectionRecord>(&mut self, offset: usize, record: &T) -> bool {
        record.write_to(self, offset)
    }
}
