//! The per-object debug handle: owns every loaded section and unit context,
//! plus an optional tied (supplementary) handle for split-object strings.

use tracing::debug;

use crate::attr::Attribute;
use crate::core::{DwarfError, Endianness, Result};
use crate::section::{SectionData, SectionId, SectionSource, SectionStore};
use crate::unit::{UnitContext, UnitId};

/// A loaded debug object.
///
/// Created once per open object file; all sections and unit contexts live
/// and die with it. Decoding is synchronous and read-only apart from the
/// one-shot section and base-offset caches, so the handle is `&self`
/// end to end.
#[derive(Debug)]
pub struct Dwarf {
    endian: Endianness,
    sections: SectionStore,
    units: Vec<UnitContext>,
    tied: Option<Box<Dwarf>>,
}

impl Dwarf {
    pub fn new(source: Box<dyn SectionSource>, endian: Endianness) -> Self {
        Self {
            endian,
            sections: SectionStore::new(source),
            units: Vec::new(),
            tied: None,
        }
    }

    /// Attach a supplementary debug object for `strp_sup`/`GNU_strp_alt`
    /// string lookups.
    pub fn set_tied(&mut self, tied: Dwarf) {
        debug!("attached tied debug object");
        self.tied = Some(Box::new(tied));
    }

    pub fn tied(&self) -> Option<&Dwarf> {
        self.tied.as_deref()
    }

    /// Register a unit context parsed from a unit header; the returned id
    /// is what [`Attribute`]s reference.
    pub fn add_unit(&mut self, unit: UnitContext) -> UnitId {
        self.units.push(unit);
        UnitId(self.units.len() - 1)
    }

    /// Look up a registered unit; an unknown id is the handle-level analog
    /// of an attribute without a unit context.
    pub fn unit(&self, id: UnitId) -> Result<&UnitContext> {
        self.units.get(id.0).ok_or(DwarfError::InvalidAttribute)
    }

    pub fn endian(&self) -> Endianness {
        self.endian
    }

    pub(crate) fn unit_of(&self, attr: &Attribute) -> Result<&UnitContext> {
        self.unit(attr.unit_id())
    }

    pub(crate) fn section(&self, id: SectionId) -> Result<&SectionData> {
        self.sections.require(id)
    }

    pub(crate) fn section_if_present(&self, id: SectionId) -> Result<Option<&SectionData>> {
        self.sections.load(id)
    }
}
