//! DWARF attribute, tag and form codes consumed by the decoder.
//!
//! Forms are a closed enum: the resolver dispatches on them exhaustively and
//! the set is fixed by the DWARF standard. Attributes and tags arrive from
//! the external DIE walker and may carry vendor codes this layer never
//! interprets, so they stay thin newtypes over the raw value.

/// DWARF form codes (DWARF v2-v5 plus the GNU extensions we resolve).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum DwForm {
    Addr = 0x01,
    Block2 = 0x03,
    Block4 = 0x04,
    Data2 = 0x05,
    Data4 = 0x06,
    Data8 = 0x07,
    String = 0x08,
    Block = 0x09,
    Block1 = 0x0a,
    Data1 = 0x0b,
    Flag = 0x0c,
    Sdata = 0x0d,
    Strp = 0x0e,
    Udata = 0x0f,
    RefAddr = 0x10,
    Ref1 = 0x11,
    Ref2 = 0x12,
    Ref4 = 0x13,
    Ref8 = 0x14,
    RefUdata = 0x15,
    Indirect = 0x16,
    SecOffset = 0x17,
    Exprloc = 0x18,
    FlagPresent = 0x19,
    Strx = 0x1a,
    Addrx = 0x1b,
    RefSup4 = 0x1c,
    StrpSup = 0x1d,
    Data16 = 0x1e,
    LineStrp = 0x1f,
    RefSig8 = 0x20,
    ImplicitConst = 0x21,
    Loclistx = 0x22,
    Rnglistx = 0x23,
    RefSup8 = 0x24,
    GnuAddrIndex = 0x1f01,
    GnuStrIndex = 0x1f02,
    GnuRefAlt = 0x1f20,
    GnuStrpAlt = 0x1f21,
}

impl DwForm {
    /// Map a raw on-disk form code to the closed enum.
    ///
    /// Returns `None` for values that are not legal DWARF forms; callers
    /// turn that into [`DwarfError::BadForm`](crate::DwarfError::BadForm).
    pub fn from_raw(raw: u16) -> Option<DwForm> {
        Some(match raw {
            0x01 => DwForm::Addr,
            0x03 => DwForm::Block2,
            0x04 => DwForm::Block4,
            0x05 => DwForm::Data2,
            0x06 => DwForm::Data4,
            0x07 => DwForm::Data8,
            0x08 => DwForm::String,
            0x09 => DwForm::Block,
            0x0a => DwForm::Block1,
            0x0b => DwForm::Data1,
            0x0c => DwForm::Flag,
            0x0d => DwForm::Sdata,
            0x0e => DwForm::Strp,
            0x0f => DwForm::Udata,
            0x10 => DwForm::RefAddr,
            0x11 => DwForm::Ref1,
            0x12 => DwForm::Ref2,
            0x13 => DwForm::Ref4,
            0x14 => DwForm::Ref8,
            0x15 => DwForm::RefUdata,
            0x16 => DwForm::Indirect,
            0x17 => DwForm::SecOffset,
            0x18 => DwForm::Exprloc,
            0x19 => DwForm::FlagPresent,
            0x1a => DwForm::Strx,
            0x1b => DwForm::Addrx,
            0x1c => DwForm::RefSup4,
            0x1d => DwForm::StrpSup,
            0x1e => DwForm::Data16,
            0x1f => DwForm::LineStrp,
            0x20 => DwForm::RefSig8,
            0x21 => DwForm::ImplicitConst,
            0x22 => DwForm::Loclistx,
            0x23 => DwForm::Rnglistx,
            0x24 => DwForm::RefSup8,
            0x1f01 => DwForm::GnuAddrIndex,
            0x1f02 => DwForm::GnuStrIndex,
            0x1f20 => DwForm::GnuRefAlt,
            0x1f21 => DwForm::GnuStrpAlt,
            _ => return None,
        })
    }

    /// The raw on-disk code.
    pub fn raw(self) -> u16 {
        self as u16
    }
}

/// DWARF attribute code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DwAt(pub u16);

impl DwAt {
    pub const SIBLING: DwAt = DwAt(0x01);
    pub const LOCATION: DwAt = DwAt(0x02);
    pub const NAME: DwAt = DwAt(0x03);
    pub const COMP_DIR: DwAt = DwAt(0x1b);
    pub const TYPE: DwAt = DwAt(0x49);
    pub const STR_OFFSETS_BASE: DwAt = DwAt(0x72);
    pub const ADDR_BASE: DwAt = DwAt(0x73);
}

/// DWARF tag code of the DIE owning an attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DwTag(pub u16);

impl DwTag {
    pub const COMPILE_UNIT: DwTag = DwTag(0x11);
    pub const PARTIAL_UNIT: DwTag = DwTag(0x3c);
    pub const TYPE_UNIT: DwTag = DwTag(0x41);
    pub const SUBPROGRAM: DwTag = DwTag(0x2e);
    pub const VARIABLE: DwTag = DwTag(0x34);
}

/// Section kinds of a DWP package file's extra-offset table (`DW_SECT_*`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DwpSection {
    Info,
    Types,
    Abbrev,
    Line,
    Loclists,
    StrOffsets,
    Macro,
    Rnglists,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_form_raw_round_trip() {
        for raw in [0x01u16, 0x0d, 0x19, 0x20, 0x1f01, 0x1f21] {
            let form = DwForm::from_raw(raw).unwrap();
            assert_eq!(form.raw(), raw);
        }
    }

    #[test]
    fn test_illegal_form_codes_rejected() {
        assert_eq!(DwForm::from_raw(0x00), None);
        assert_eq!(DwForm::from_raw(0x02), None); // gap in the standard table
        assert_eq!(DwForm::from_raw(0x25), None);
        assert_eq!(DwForm::from_raw(0xffff), None);
    }
}
