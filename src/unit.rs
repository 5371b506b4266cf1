//! Per-unit decoding context: header parameters, package-file offsets and
//! the write-once base caches.

use std::cell::OnceCell;
use std::collections::HashMap;

use crate::core::DwpSection;
use crate::section::SectionId;

/// Handle to a [`UnitContext`] registered with a [`Dwarf`](crate::Dwarf)
/// handle. Attributes carry this instead of a direct reference so they can
/// never outlive the unit that owns them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UnitId(pub(crate) usize);

/// Extra base offsets for units living in a DWP package file, keyed by
/// section kind. Absent kinds contribute zero.
#[derive(Debug, Clone, Default)]
pub struct DwpOffsets {
    offsets: HashMap<DwpSection, u64>,
}

impl DwpOffsets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, kind: DwpSection, extra_offset: u64) {
        self.offsets.insert(kind, extra_offset);
    }

    pub(crate) fn extra_offset(&self, kind: DwpSection) -> u64 {
        self.offsets.get(&kind).copied().unwrap_or(0)
    }
}

/// Encoding parameters of one compilation or type unit.
///
/// Created by the external unit-header parser and immutable afterwards,
/// apart from the two write-once base caches filled in when the walker
/// encounters the corresponding base attributes on the unit DIE.
#[derive(Debug)]
pub struct UnitContext {
    version: u16,
    address_size: u8,
    /// Offset/length size of this unit: 4 (32-bit DWARF) or 8 (64-bit).
    offset_size: u8,
    /// Unit length as stamped in the header, excluding the length field.
    length: u64,
    /// Size of the 64-bit-DWARF initial escape, when present.
    extension_size: u8,
    /// Base offset of this unit within its section.
    section_offset: u64,
    /// Whether the unit lives in `.debug_info` (true) or `.debug_types`.
    is_info: bool,
    dwp_offsets: Option<DwpOffsets>,
    str_offsets_base: OnceCell<u64>,
    addr_base: OnceCell<u64>,
}

impl UnitContext {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        version: u16,
        address_size: u8,
        offset_size: u8,
        length: u64,
        extension_size: u8,
        section_offset: u64,
        is_info: bool,
    ) -> Self {
        Self {
            version,
            address_size,
            offset_size,
            length,
            extension_size,
            section_offset,
            is_info,
            dwp_offsets: None,
            str_offsets_base: OnceCell::new(),
            addr_base: OnceCell::new(),
        }
    }

    /// Attach the package-file extra-offset table for split/DWP units.
    pub fn with_dwp_offsets(mut self, offsets: DwpOffsets) -> Self {
        self.dwp_offsets = Some(offsets);
        self
    }

    pub fn version(&self) -> u16 {
        self.version
    }

    pub fn address_size(&self) -> u8 {
        self.address_size
    }

    pub fn offset_size(&self) -> u8 {
        self.offset_size
    }

    pub fn section_offset(&self) -> u64 {
        self.section_offset
    }

    /// Byte extent of the unit: length plus the length field itself plus
    /// the 64-bit escape. Reference offsets are checked against this.
    pub fn extent(&self) -> u64 {
        self.length + u64::from(self.offset_size) + u64::from(self.extension_size)
    }

    /// One past the unit's last byte, as a section-relative offset.
    pub(crate) fn end_offset(&self) -> u64 {
        self.section_offset + self.extent()
    }

    pub(crate) fn section_id(&self) -> SectionId {
        if self.is_info {
            SectionId::DebugInfo
        } else {
            SectionId::DebugTypes
        }
    }

    /// Record `DW_AT_str_offsets_base` once seen on the unit DIE.
    /// Later writes are ignored; the first value wins.
    pub fn set_str_offsets_base(&self, base: u64) {
        let _ = self.str_offsets_base.set(base);
    }

    pub(crate) fn str_offsets_base(&self) -> Option<u64> {
        self.str_offsets_base.get().copied()
    }

    /// Record `DW_AT_addr_base` once seen on the unit DIE.
    pub fn set_addr_base(&self, base: u64) {
        let _ = self.addr_base.set(base);
    }

    pub(crate) fn addr_base(&self) -> Option<u64> {
        self.addr_base.get().copied()
    }

    pub(crate) fn dwp_extra_offset(&self, kind: DwpSection) -> u64 {
        self.dwp_offsets
            .as_ref()
            .map_or(0, |offsets| offsets.extra_offset(kind))
    }
}
