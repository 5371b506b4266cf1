//! String resolution: inline strings, `.debug_str`/`.debug_line_str`
//! offsets, the string-offsets table, and the tied-object fallback.

use tracing::warn;

use crate::attr::Attribute;
use crate::core::{DwForm, DwarfError, DwpSection, Result};
use crate::dwarf::Dwarf;
use crate::reader::{read_uleb128, read_unsigned};
use crate::section::SectionId;

const STRP_ALT_PLACEHOLDER: &[u8] = b"<DW_FORM_GNU_strp_alt-no-tied-file>";
const STRP_SUP_PLACEHOLDER: &[u8] = b"<DW_FORM_strp_sup-no-tied-file>";

impl Dwarf {
    /// Resolve any string-family form to a borrowed, NUL-validated byte
    /// slice (terminator excluded).
    ///
    /// Supplementary forms (`strp_sup`, `GNU_strp_alt`) degrade to a fixed
    /// placeholder when the tied object or its string is unavailable; that
    /// is the one recoverable condition in the crate, every other error
    /// propagates.
    pub fn attr_string(&self, attr: &Attribute) -> Result<&[u8]> {
        let unit = self.unit_of(attr)?;
        let section = self.section(unit.section_id())?;
        let data = section.data();
        let form = attr.form()?;
        match form {
            DwForm::String => {
                // Inline strings must terminate inside the unit as well as
                // the section.
                let bound = unit.end_offset().min(section.size()) as usize;
                let offset = attr.offset();
                if offset >= bound {
                    return Err(DwarfError::OutOfBounds {
                        offset: offset as u64,
                        len: 1,
                        size: bound as u64,
                    });
                }
                match data[offset..bound].iter().position(|&b| b == 0) {
                    Some(len) => Ok(&data[offset..offset + len]),
                    None => Err(DwarfError::StringValidationFailed {
                        section: unit.section_id(),
                        offset: offset as u64,
                    }),
                }
            }
            DwForm::StrpSup | DwForm::GnuStrpAlt => {
                let offset = self.attr_global_ref(attr)?;
                match self.string_from_tied(offset) {
                    Ok(bytes) => Ok(bytes),
                    Err(DwarfError::NoTiedFileAvailable)
                    | Err(DwarfError::NoTiedStringAvailable(_)) => {
                        warn!(
                            form = ?form,
                            offset,
                            "supplementary string unavailable, returning placeholder"
                        );
                        Ok(if form == DwForm::GnuStrpAlt {
                            STRP_ALT_PLACEHOLDER
                        } else {
                            STRP_SUP_PLACEHOLDER
                        })
                    }
                    Err(other) => Err(other),
                }
            }
            DwForm::Strx | DwForm::GnuStrIndex => {
                let offset = self.string_offset_via_str_offsets(attr)?;
                self.string_at(SectionId::DebugStr, offset)
            }
            DwForm::Strp => {
                let offset = read_unsigned(
                    data,
                    attr.offset(),
                    usize::from(unit.offset_size()),
                    self.endian(),
                )?;
                self.string_at(SectionId::DebugStr, offset)
            }
            DwForm::LineStrp => {
                let offset = read_unsigned(
                    data,
                    attr.offset(),
                    usize::from(unit.offset_size()),
                    self.endian(),
                )?;
                self.string_at(SectionId::DebugLineStr, offset)
            }
            form => Err(DwarfError::FormMismatch {
                form,
                requested: "a string",
            }),
        }
    }

    /// Turn a `strx`/`GNU_str_index` attribute into a `.debug_str` offset
    /// through the string-offsets table.
    pub fn string_offset_via_str_offsets(&self, attr: &Attribute) -> Result<u64> {
        let unit = self.unit_of(attr)?;
        let info = self.section(unit.section_id())?;
        let table = self.section(SectionId::DebugStrOffsets)?;
        let (index, _) = read_uleb128(info.data(), attr.offset())?;
        // DW_FORM_GNU_str_index predates the base attribute; only strx
        // consults the unit's cached DW_AT_str_offsets_base. A missing
        // base is tolerated as 0 per the DWARF5 draft allowance; later
        // revisions may tighten this.
        let base = if attr.form()? == DwForm::Strx {
            unit.str_offsets_base().unwrap_or(0)
        } else {
            0
        };
        let entry_size = u64::from(unit.offset_size());
        let table_offset = index
            .checked_mul(entry_size)
            .and_then(|entry| entry.checked_add(base))
            .and_then(|entry| entry.checked_add(unit.dwp_extra_offset(DwpSection::StrOffsets)))
            .ok_or(DwarfError::OutOfBounds {
                offset: index,
                len: entry_size,
                size: table.size(),
            })?;
        // The last table entry ends exactly at the section end, so == is
        // legal and only > is an error.
        match table_offset.checked_add(entry_size) {
            Some(end) if end <= table.size() => {}
            _ => {
                return Err(DwarfError::OutOfBounds {
                    offset: table_offset,
                    len: entry_size,
                    size: table.size(),
                })
            }
        }
        read_unsigned(
            table.data(),
            table_offset as usize,
            entry_size as usize,
            self.endian(),
        )
    }

    /// Look a string up in the tied (supplementary) object's `.debug_str`.
    ///
    /// `NoTiedFileAvailable` when no tied handle is configured; a missing,
    /// short or unterminated tied string section is
    /// `NoTiedStringAvailable`. Callers that can tolerate an absent
    /// supplementary file catch these and substitute a placeholder.
    pub fn string_from_tied(&self, offset: u64) -> Result<&[u8]> {
        let tied = self.tied().ok_or(DwarfError::NoTiedFileAvailable)?;
        let Some(section) = tied.section_if_present(SectionId::DebugStr)? else {
            return Err(DwarfError::NoTiedStringAvailable(offset));
        };
        if offset >= section.size() {
            return Err(DwarfError::NoTiedStringAvailable(offset));
        }
        let data = section.data();
        let start = offset as usize;
        match data[start..].iter().position(|&b| b == 0) {
            Some(len) => Ok(&data[start..start + len]),
            None => Err(DwarfError::NoTiedStringAvailable(offset)),
        }
    }

    /// Resolve an already-global offset against a string section, exactly
    /// as `strp`/`line_strp` do.
    fn string_at(&self, id: SectionId, offset: u64) -> Result<&[u8]> {
        let section = self.section(id)?;
        if offset >= section.size() {
            return Err(DwarfError::OffsetOutOfRange {
                offset,
                extent: section.size(),
            });
        }
        let data = section.data();
        let start = offset as usize;
        match data[start..].iter().position(|&b| b == 0) {
            Some(len) => Ok(&data[start..start + len]),
            None => Err(DwarfError::StringValidationFailed {
                section: id,
                offset,
            }),
        }
    }
}
