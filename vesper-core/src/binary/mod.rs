//! Binary section/format layer.
//!
//! A loaded module is raw bytes split into three contiguous regions:
//! data (fixed-offset constants and 16-byte call/string slots), string
//! table (u16-length-prefixed UTF-8 entries), and code (the instruction
//! stream). All multi-byte scalars are big-endian.

pub mod code;
pub mod cursor;
pub mod data;
pub mod image;
pub mod section;
pub mod strtab;
