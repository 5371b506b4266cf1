//! Attribute records handed over by the DIE tree walker.

use crate::core::{DwAt, DwForm, DwTag, DwarfError, Result};
use crate::unit::UnitId;

/// One raw attribute: a form code plus the offset of its value bytes inside
/// the owning unit's section.
///
/// Immutable once constructed. The attribute and tag codes are carried so
/// the resolver can honor the `DW_AT_sibling`-on-compile-unit boundary rule.
#[derive(Debug, Clone, Copy)]
pub struct Attribute {
    at: DwAt,
    form: u16,
    unit: UnitId,
    /// Offset of the value within the unit's section buffer.
    offset: usize,
    die_tag: DwTag,
}

impl Attribute {
    pub fn new(at: DwAt, form: u16, unit: UnitId, offset: usize, die_tag: DwTag) -> Self {
        Self {
            at,
            form,
            unit,
            offset,
            die_tag,
        }
    }

    pub fn at(&self) -> DwAt {
        self.at
    }

    /// The raw form code as stamped in the abbreviation table.
    pub fn form_raw(&self) -> u16 {
        self.form
    }

    /// The form as a legal DWARF form, or `BadForm`.
    pub fn form(&self) -> Result<DwForm> {
        DwForm::from_raw(self.form).ok_or(DwarfError::BadForm(self.form))
    }

    pub fn has_form(&self, form: DwForm) -> bool {
        self.form == form.raw()
    }

    pub fn die_tag(&self) -> DwTag {
        self.die_tag
    }

    pub(crate) fn unit_id(&self) -> UnitId {
        self.unit
    }

    pub(crate) fn offset(&self) -> usize {
        self.offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_form_lookup() {
        let attr = Attribute::new(
            DwAt::NAME,
            DwForm::Strp.raw(),
            UnitId(0),
            16,
            DwTag::SUBPROGRAM,
        );
        assert_eq!(attr.form().unwrap(), DwForm::Strp);
        assert!(attr.has_form(DwForm::Strp));
        assert!(!attr.has_form(DwForm::String));
    }

    #[test]
    fn test_illegal_form_is_bad_form() {
        let attr = Attribute::new(DwAt::NAME, 0x02, UnitId(0), 0, DwTag::SUBPROGRAM);
        assert!(matches!(attr.form().unwrap_err(), DwarfError::BadForm(0x02)));
    }
}
