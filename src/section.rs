//! DWARF section identities, the container seam and the memoized store.

use std::cell::OnceCell;
use std::collections::HashMap;
use std::fmt;

use tracing::debug;

use crate::core::{DwarfError, Result};

/// The DWARF sections this layer reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SectionId {
    DebugInfo,
    DebugTypes,
    DebugStr,
    DebugLineStr,
    DebugStrOffsets,
    DebugAddr,
}

impl SectionId {
    pub(crate) const ALL: [SectionId; 6] = [
        SectionId::DebugInfo,
        SectionId::DebugTypes,
        SectionId::DebugStr,
        SectionId::DebugLineStr,
        SectionId::DebugStrOffsets,
        SectionId::DebugAddr,
    ];

    /// On-disk section name.
    pub fn name(self) -> &'static str {
        match self {
            SectionId::DebugInfo => ".debug_info",
            SectionId::DebugTypes => ".debug_types",
            SectionId::DebugStr => ".debug_str",
            SectionId::DebugLineStr => ".debug_line_str",
            SectionId::DebugStrOffsets => ".debug_str_offsets",
            SectionId::DebugAddr => ".debug_addr",
        }
    }

    fn index(self) -> usize {
        match self {
            SectionId::DebugInfo => 0,
            SectionId::DebugTypes => 1,
            SectionId::DebugStr => 2,
            SectionId::DebugLineStr => 3,
            SectionId::DebugStrOffsets => 4,
            SectionId::DebugAddr => 5,
        }
    }
}

impl fmt::Display for SectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Seam to the object-file container: produces raw section bytes on demand.
///
/// Returning `Ok(None)` means the object simply does not carry that section;
/// whether that is an error depends on what the decoder needs it for.
pub trait SectionSource {
    fn read_section(&self, id: SectionId) -> Result<Option<Vec<u8>>>;
}

/// A [`SectionSource`] over section buffers already extracted from the
/// container, e.g. by an ELF loader or a test fixture.
#[derive(Debug, Default)]
pub struct BufferSource {
    sections: HashMap<SectionId, Vec<u8>>,
}

impl BufferSource {
    pub fn new() -> Self {
        Self {
            sections: HashMap::new(),
        }
    }

    pub fn insert(&mut self, id: SectionId, bytes: Vec<u8>) {
        self.sections.insert(id, bytes);
    }
}

impl SectionSource for BufferSource {
    fn read_section(&self, id: SectionId) -> Result<Option<Vec<u8>>> {
        Ok(self.sections.get(&id).cloned())
    }
}

/// An immutable, loaded section buffer.
#[derive(Debug)]
pub(crate) struct SectionData {
    data: Vec<u8>,
}

impl SectionData {
    pub(crate) fn data(&self) -> &[u8] {
        &self.data
    }

    pub(crate) fn size(&self) -> u64 {
        self.data.len() as u64
    }
}

/// Lazily loaded, memoized section buffers.
///
/// Each slot is written at most once for the lifetime of the owning handle;
/// concurrent first-load is not serialized here (the handle is single-thread
/// by construction, see the crate docs).
pub(crate) struct SectionStore {
    source: Box<dyn SectionSource>,
    slots: [OnceCell<Option<SectionData>>; SectionId::ALL.len()],
}

impl SectionStore {
    pub(crate) fn new(source: Box<dyn SectionSource>) -> Self {
        Self {
            source,
            slots: Default::default(),
        }
    }

    /// Load a section on first use; `Ok(None)` when the object lacks it.
    pub(crate) fn load(&self, id: SectionId) -> Result<Option<&SectionData>> {
        let slot = &self.slots[id.index()];
        if slot.get().is_none() {
            let bytes = self.source.read_section(id)?;
            debug!(
                section = id.name(),
                present = bytes.is_some(),
                size = bytes.as_ref().map_or(0, Vec::len),
                "loaded DWARF section"
            );
            let _ = slot.set(bytes.map(|data| SectionData { data }));
        }
        Ok(slot.get().and_then(Option::as_ref))
    }

    /// Load a section that must be present, else `MissingSection`.
    pub(crate) fn require(&self, id: SectionId) -> Result<&SectionData> {
        self.load(id)?.ok_or(DwarfError::MissingSection(id))
    }
}

impl fmt::Debug for SectionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SectionStore").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    struct CountingSource {
        reads: Rc<Cell<usize>>,
    }

    impl SectionSource for CountingSource {
        fn read_section(&self, id: SectionId) -> Result<Option<Vec<u8>>> {
            self.reads.set(self.reads.get() + 1);
            match id {
                SectionId::DebugStr => Ok(Some(b"hi\0".to_vec())),
                _ => Ok(None),
            }
        }
    }

    #[test]
    fn test_load_is_memoized() {
        let reads = Rc::new(Cell::new(0));
        let store = SectionStore::new(Box::new(CountingSource {
            reads: Rc::clone(&reads),
        }));
        for _ in 0..3 {
            let section = store.load(SectionId::DebugStr).unwrap().unwrap();
            assert_eq!(section.data(), b"hi\0");
        }
        // Absent sections are memoized too.
        assert!(store.load(SectionId::DebugAddr).unwrap().is_none());
        assert!(store.load(SectionId::DebugAddr).unwrap().is_none());

        // One source read per section kind, regardless of call count.
        assert_eq!(reads.get(), 2);
    }

    #[test]
    fn test_require_missing_section() {
        let store = SectionStore::new(Box::new(CountingSource {
            reads: Rc::new(Cell::new(0)),
        }));
        assert!(matches!(
            store.require(SectionId::DebugStrOffsets).unwrap_err(),
            DwarfError::MissingSection(SectionId::DebugStrOffsets)
        ));
        assert_eq!(store.require(SectionId::DebugStr).unwrap().size(), 3);
    }

    #[test]
    fn test_buffer_source() {
        let mut source = BufferSource::new();
        source.insert(SectionId::DebugInfo, vec![1, 2, 3]);
        assert_eq!(
            source.read_section(SectionId::DebugInfo).unwrap(),
            Some(vec![1, 2, 3])
        );
        assert_eq!(source.read_section(SectionId::DebugTypes).unwrap(), None);
    }
}
