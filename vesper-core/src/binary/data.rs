//! Constant/call-pool view and the call-slot record.

use super::section::{Section, SectionRecord, SharedSection};
use super::strtab::StringTable;

/// Sentinel meaning "not yet bound" for both the module and address
/// fields of a call entry.
pub const UNRESOLVED: u32 = 0xFFFF_FFFF;

/// Marker introducing a string-table indirection in an 8-byte name slot.
const STR_MARKER: [u8; 4] = *b"@STR";

/// A call slot inside the data section.
///
/// Wire layout is 16 bytes: `module:u32, address:u32, name:u8[8]`. The
/// name field is meaningful only while `address == UNRESOLVED`; it is
/// either an inline NUL-padded symbol of up to 8 bytes, or `@STR`
/// followed by a big-endian u32 offset into the module's string table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallEntry {
    pub module: u32,
    pub address: u32,
    pub name: Option<[u8; 8]>,
}

impl SectionRecord for CallEntry {
    fn read_from<B: AsRef<[u8]>>(section: &Section<B>, offset: usize) -> Option<Self> {
        let module = section.get_u32(offset)?;
        let address = section.get_u32(offset.checked_add(4)?)?;

        let name = if address == UNRESOLVED {
            Some(section.get_bytes::<8>(offset.checked_add(8)?)?)
        } else {
            None
        };

        Some(CallEntry {
            module,
            address,
            name,
        })
    }

    fn write_to<B: AsRef<[u8]> + AsMut<[u8]>>(&self, section: &mut Section<B>, offset: usize) -> bool {
        if !section.set_u32(offset, self.module) {
            return false;
        }
        if !section.set_u32(offset + 4, self.address) {
            return false;
        }
        if let Some(name) = self.name {
            if !section.set_bytes::<8>(offset + 8, name) {
                return false;
            }
        }
        true
    }
}

/// Resolve an 8-byte name slot to a symbol string: either the bytes are
/// a literal NUL-padded symbol, or `@STR` plus a string-table offset.
pub fn resolve_symbol(bytes: &[u8; 8], strtab: &StringTable) -> Option<String> {
    if bytes[..4] == STR_MARKER {
        let offset = u32::from_be_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
        return strtab.get(offset).map(str::to_owned);
    }

    let len = bytes.iter().position(|&b| b == 0).unwrap_or(8);
    std::str::from_utf8(&bytes[..len]).ok().map(str::to_owned)
}

/// View over the data region: fixed-offset constants of every scalar
/// width plus 16-byte call/string slots.
#[derive(Debug, Clone)]
pub struct DataView {
    section: SharedSection,
}

impl DataView {
    pub fn new(section: SharedSection) -> Self {
        Self { section }
    }

    pub fn byte(&self, offset: u32) -> Option<i8> {
        self.section.get_i8(offset as usize)
    }

    pub fn short(&self, offset: u32) -> Option<i16> {
        self.section.get_i16(offset as usize)
    }

    pub fn int(&self, offset: u32) -> Option<i32> {
        self.section.get_i32(offset as usize)
    }

    pub fn long(&self, offset: u32) -> Option<i64> {
        self.section.get_i64(offset as usize)
    }

    pub fn float(&self, offset: u32) -> Option<f32> {
        self.section.get_f32(offset as usize)
    }

    pub fn double(&self, offset: u32) -> Option<f64> {
        self.section.get_f64(offset as usize)
    }

    /// Resolve the 8-byte string slot at `offset` against `strtab`.
    pub fn string(&self, offset: u32, strtab: &StringTable) -> Option<String> {
        let bytes = self.section.get_bytes::<8>(offset as usize)?;
        resolve_symbol(&bytes, strtab)
    }

    /// Read the call entry at `offset`.
    pub fn call_entry(&self, offset: u32) -> Option<CallEntry> {
        self.section.get_record::<CallEntry>(offset as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn shared(bytes: Vec<u8>) -> SharedSection {
        SharedSection::new(Arc::from(bytes.into_boxed_slice()))
    }

    fn strtab_with(entries: &[&str]) -> (StringTable, Vec<u32>) {
        let mut bytes = Vec::new();
        let mut offsets = Vec::new();
        for s in entries {
            offsets.push(bytes.len() as u32);
            bytes.extend((s.len() as u16).to_be_bytes());
            bytes.extend(s.as_bytes());
        }
        (StringTable::new(shared(bytes)), offsets)
    }

    #[test]
    fn call_entry_roundtrip() {
        let mut s = Section::new(vec![0u8; 16]);
        let entry = CallEntry {
            module: UNRESOLVED,
            address: UNRESOLVED,
            name: Some(*b"test\0\0\0\0"),
        };
        assert!(s.set_record(0, &entry));
        assert_eq!(s.get_record::<CallEntry>(0), Some(entry));
    }

    #[test]
    fn resolved_entry_has_no_name() {
        let mut s = Section::new(vec![0u8; 16]);
        assert!(s.set_record(
            0,
            &CallEntry {
                module: UNRESOLVED,
                address: 0x20,
                name: None,
            }
        ));
        let back = s.get_record::<CallEntry>(0).unwrap();
        assert_eq!(back.address, 0x20);
        assert_eq!(back.name, None);
    }

    #[test]
    fn truncated_entry_fails() {
        // unresolved sentinel forces a name read that falls outside
        let s = Section::new(vec![0xFFu8; 8]);
        assert!(s.get_record::<CallEntry>(0).is_none());
        // address itself out of range
        let s2 = Section::new(vec![0u8; 8]);
        assert!(s2.get_record::<CallEntry>(4).is_none());
    }

    #[test]
    fn inline_symbol_resolves() {
        let (strtab, _) = strtab_with(&[]);
        assert_eq!(
            resolve_symbol(b"main\0\0\0\0", &strtab).as_deref(),
            Some("main")
        );
        // full 8 bytes, no NUL
        assert_eq!(
            resolve_symbol(b"addeight", &strtab).as_deref(),
            Some("addeight")
        );
    }

    #[test]
    fn str_marker_resolves_through_table() {
        let (strtab, offsets) = strtab_with(&["main", "a_very_long_symbol_name"]);
        let mut slot = *b"@STR\0\0\0\0";
        slot[4..].copy_from_slice(&offsets[1].to_be_bytes());
        assert_eq!(
            resolve_symbol(&slot, &strtab).as_deref(),
            Some("a_very_long_symbol_name")
        );
    }

    #[test]
    fn str_marker_with_bad_offset_fails() {
        let (strtab, _) = strtab_with(&["main"]);
        let mut slot = *b"@STR\0\0\0\0";
        slot[4..].copy_from_slice(&0xFFFF_u32.to_be_bytes());
        assert_eq!(resolve_symbol(&slot, &strtab), None);
    }

    #[test]
    fn typed_constants_read_big_endian() {
        let mut bytes = vec![0u8; 16];
        bytes[0..4].copy_from_slice(&0x1234_5678u32.to_be_bytes());
        bytes[8..16].copy_from_slice(&2.5f64.to_bits().to_be_bytes());
        let data = DataView::new(shared(bytes));
        assert_eq!(data.int(0), Some(0x1234_5678));
        assert_eq!(data.double(8), Some(2.5));
        assert_eq!(data.long(9), None);
    }
}
