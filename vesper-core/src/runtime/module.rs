//! A loaded module: shared bytes, three region views, call-site cache.

use std::collections::HashMap;
use std::ops::Range;
use std::sync::Arc;

use crate::binary::code::CodeView;
use crate::binary::data::DataView;
use crate::binary::section::SharedSection;
use crate::binary::strtab::StringTable;

use super::call::CallableTarget;

/// Module identity for linking: the module's index in the VM's list.
pub type ModuleHandle = u32;

/// One compiled unit. The raw bytes are refcounted so cursors and views
/// handed to the interpreter outlive any borrow of the module itself.
///
/// The call cache maps data-section offsets of call slots to resolved
/// targets; resolution happens at most once per offset and the module
/// bytes are never rewritten.
#[derive(Debug, Clone)]
pub struct Module {
    data: SharedSection,
    strtab: SharedSection,
    code: SharedSection,
    call_cache: HashMap<u32, CallableTarget>,
    link_count: u64,
}

impl Module {
    /// Build a module from one byte buffer and its three region ranges.
    /// Ranges outside the buffer are clamped to empty.
    pub fn from_regions(
        bytes: Vec<u8>,
        data: Range<usize>,
        strtab: Range<usize>,
        code: Range<usize>,
    ) -> Self {
        let bytes: Arc<[u8]> = bytes.into();
        Self {
            data: region(&bytes, data),
            strtab: region(&bytes, strtab),
            code: region(&bytes, code),
            call_cache: HashMap::new(),
            link_count: 0,
        }
    }

    /// Assemble a module from separate region buffers.
    pub fn from_parts(data: &[u8], strtab: &[u8], code: &[u8]) -> Self {
        let mut bytes = Vec::with_capacity(data.len() + strtab.len() + code.len());
        bytes.extend_from_slice(data);
        bytes.extend_from_slice(strtab);
        bytes.extend_from_slice(code);

        let data_range = 0..data.len();
        let strtab_range = data_range.end..data_range.end + strtab.len();
        let code_range = strtab_range.end..strtab_range.end + code.len();
        Self::from_regions(bytes, data_range, strtab_range, code_range)
    }

    pub fn data(&self) -> DataView {
        DataView::new(self.data.clone())
    }

    pub fn strtab(&self) -> StringTable {
        StringTable::new(self.strtab.clone())
    }

    pub fn code(&self) -> CodeView {
        CodeView::new(self.code.clone())
    }

    pub(crate) fn cached_call(&self, offset: u32) -> Option<&CallableTarget> {
        self.call_cache.get(&offset)
    }

    pub(crate) fn cache_call(&mut self, offset: u32, target: CallableTarget) {
        self.link_count += 1;
        self.call_cache.insert(offset, target);
    }

    /// Number of call-site resolutions performed so far. Stays flat on
    /// cache hits.
    pub fn link_count(&self) -> u64 {
        self.link_count
    }

    /// Number of call sites with a cached target.
    pub fn cached_calls(&self) -> usize {
        self.call_cache.len()
    }
}

fn region(bytes: &Arc<[u8]>, range: Range<usize>) -> SharedSection {
    let start = range.start.min(bytes.len());
    let end = range.end.clamp(start, bytes.len());
    match SharedSection::with_range(Arc::clone(bytes), start..end) {
        Some(section) => section,
        None => SharedSection::new(Arc::from(Vec::<u8>::new().into_boxed_slice())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn regions_are_windowed_views() {
        let module = Module::from_parts(
            &42i64.to_be_bytes(),
            &[0x00, 0x04, b'm', b'a', b'i', b'n'],
            &[0x00, 0x01],
        );
        assert_eq!(module.data().long(0), Some(42));
        assert_eq!(module.strtab().get(0), Some("main"));
        assert!(module.code().cursor_at(1).is_some());
        assert!(module.code().cursor_at(2).is_none());
    }

    #[test]
    fn out_of_buffer_regions_clamp_to_empty() {
        let module = Module::from_regions(vec![1, 2, 3], 0..3, 10..20, 3..3);
        assert_eq!(module.data().byte(2), Some(3));
        assert_eq!(module.strtab().get(0), None);
        assert!(module.code().cursor_at(0).is_none());
    }
}
