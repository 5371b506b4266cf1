//! The form resolver: turns a raw attribute into a typed value.
//!
//! One accessor per value family, each validating the attribute's unit
//! context first and dispatching on the form; a form outside the accessor's
//! family is a `FormMismatch`, an illegal form code is `BadForm`. All reads
//! go through [`crate::reader`], so every returned value has been bounds
//! checked against the owning section.

use tracing::trace;

use crate::attr::Attribute;
use crate::core::{
    Block, DecodedValue, DwAt, DwForm, DwTag, DwarfError, ExprLoc, Result, Sig8,
};
use crate::dwarf::Dwarf;
use crate::reader::{read_sleb128, read_uleb128, read_unsigned, sign_extend};
use crate::section::SectionId;
use crate::unit::{UnitContext, UnitId};

impl Dwarf {
    fn unit_and_data(&self, attr: &Attribute) -> Result<(&UnitContext, &[u8])> {
        let unit = self.unit_of(attr)?;
        let section = self.section(unit.section_id())?;
        Ok((unit, section.data()))
    }

    /// Decode any attribute into its natural typed value.
    ///
    /// Index forms resolve per their family: `strx`-family strings are
    /// looked up through the string-offsets table, while `addrx`-family
    /// addresses come back as [`DecodedValue::AddressIndex`] for the caller
    /// to feed to [`Dwarf::lookup_address_index`].
    pub fn resolve(&self, attr: &Attribute) -> Result<DecodedValue<'_>> {
        let form = attr.form()?;
        trace!(form = ?form, "resolving attribute");
        match form {
            DwForm::Addr => self.attr_address(attr).map(DecodedValue::Address),
            DwForm::Addrx | DwForm::GnuAddrIndex => self
                .attr_address_index(attr)
                .map(DecodedValue::AddressIndex),
            DwForm::Flag | DwForm::FlagPresent => self.attr_flag(attr).map(DecodedValue::Flag),
            DwForm::Data1 | DwForm::Data2 | DwForm::Data4 | DwForm::Data8 | DwForm::Udata => {
                self.attr_udata(attr).map(DecodedValue::UnsignedConstant)
            }
            DwForm::Sdata => self.attr_sdata(attr).map(DecodedValue::SignedConstant),
            DwForm::Block | DwForm::Block1 | DwForm::Block2 | DwForm::Block4 => {
                self.attr_block(attr).map(DecodedValue::Block)
            }
            DwForm::Exprloc => self.attr_exprloc(attr).map(DecodedValue::ExprLoc),
            DwForm::String
            | DwForm::Strp
            | DwForm::LineStrp
            | DwForm::Strx
            | DwForm::GnuStrIndex
            | DwForm::StrpSup
            | DwForm::GnuStrpAlt => self.attr_string(attr).map(DecodedValue::String),
            DwForm::Ref1 | DwForm::Ref2 | DwForm::Ref4 | DwForm::Ref8 | DwForm::RefUdata => {
                self.attr_ref(attr).map(DecodedValue::LocalOffset)
            }
            DwForm::RefAddr | DwForm::SecOffset | DwForm::GnuRefAlt => {
                self.attr_global_ref(attr).map(DecodedValue::GlobalOffset)
            }
            DwForm::RefSig8 => self.attr_type_signature(attr).map(DecodedValue::TypeSignature),
            form => Err(DwarfError::FormMismatch {
                form,
                requested: "a decoded value",
            }),
        }
    }

    /// Resolve an address attribute.
    ///
    /// `DW_FORM_addr` is a fixed read at the unit's address size; the index
    /// forms decode their ULEB128 index and chain through the
    /// `.debug_addr` lookup.
    pub fn attr_address(&self, attr: &Attribute) -> Result<u64> {
        let (unit, data) = self.unit_and_data(attr)?;
        match attr.form()? {
            DwForm::Addr => read_unsigned(
                data,
                attr.offset(),
                usize::from(unit.address_size()),
                self.endian(),
            ),
            DwForm::Addrx | DwForm::GnuAddrIndex => {
                let (index, _) = read_uleb128(data, attr.offset())?;
                self.lookup_address_index(attr.unit_id(), index)
            }
            form => Err(DwarfError::FormMismatch {
                form,
                requested: "an address",
            }),
        }
    }

    /// Look an address-table index up in `.debug_addr`.
    ///
    /// The unit's cached `DW_AT_addr_base` participates when set; producers
    /// that omit it get base 0.
    pub fn lookup_address_index(&self, unit: UnitId, index: u64) -> Result<u64> {
        let unit = self.unit(unit)?;
        let section = self.section(SectionId::DebugAddr)?;
        let addr_size = u64::from(unit.address_size());
        let base = unit.addr_base().unwrap_or(0);
        let offset = index
            .checked_mul(addr_size)
            .and_then(|entry| entry.checked_add(base))
            .filter(|offset| {
                offset
                    .checked_add(addr_size)
                    .is_some_and(|end| end <= section.size())
            })
            .ok_or(DwarfError::OutOfBounds {
                offset: index,
                len: addr_size,
                size: section.size(),
            })?;
        read_unsigned(
            section.data(),
            offset as usize,
            addr_size as usize,
            self.endian(),
        )
    }

    /// Index-only accessor for the `addrx`/`GNU_addr_index` family.
    pub fn attr_address_index(&self, attr: &Attribute) -> Result<u64> {
        let (_, data) = self.unit_and_data(attr)?;
        match attr.form()? {
            DwForm::Addrx | DwForm::GnuAddrIndex => {
                read_uleb128(data, attr.offset()).map(|(index, _)| index)
            }
            form => Err(DwarfError::FormMismatch {
                form,
                requested: "an address-table index",
            }),
        }
    }

    /// Index-only accessor for the `strx`/`GNU_str_index` family.
    pub fn attr_string_index(&self, attr: &Attribute) -> Result<u64> {
        let (_, data) = self.unit_and_data(attr)?;
        match attr.form()? {
            DwForm::Strx | DwForm::GnuStrIndex => {
                read_uleb128(data, attr.offset()).map(|(index, _)| index)
            }
            form => Err(DwarfError::FormMismatch {
                form,
                requested: "a string-table index",
            }),
        }
    }

    /// Resolve a flag attribute.
    pub fn attr_flag(&self, attr: &Attribute) -> Result<bool> {
        let (_, data) = self.unit_and_data(attr)?;
        match attr.form()? {
            // The form's presence alone carries the value; no bytes read.
            DwForm::FlagPresent => Ok(true),
            DwForm::Flag => Ok(read_unsigned(data, attr.offset(), 1, self.endian())? != 0),
            form => Err(DwarfError::FormMismatch {
                form,
                requested: "a flag",
            }),
        }
    }

    /// Resolve an unsigned constant. Signed encodings are not
    /// reinterpreted; `sdata` through this accessor is a `FormMismatch` and
    /// the caller may retry with [`Dwarf::attr_sdata`].
    pub fn attr_udata(&self, attr: &Attribute) -> Result<u64> {
        let (_, data) = self.unit_and_data(attr)?;
        let offset = attr.offset();
        let endian = self.endian();
        match attr.form()? {
            DwForm::Data1 => read_unsigned(data, offset, 1, endian),
            DwForm::Data2 => read_unsigned(data, offset, 2, endian),
            DwForm::Data4 => read_unsigned(data, offset, 4, endian),
            DwForm::Data8 => read_unsigned(data, offset, 8, endian),
            DwForm::Udata => read_uleb128(data, offset).map(|(value, _)| value),
            form => Err(DwarfError::FormMismatch {
                form,
                requested: "an unsigned constant",
            }),
        }
    }

    /// Resolve a signed constant. Fixed-width reads never sign-extend on
    /// their own, so the declared width's sign bit is extended here.
    pub fn attr_sdata(&self, attr: &Attribute) -> Result<i64> {
        let (_, data) = self.unit_and_data(attr)?;
        let offset = attr.offset();
        let endian = self.endian();
        match attr.form()? {
            DwForm::Data1 => Ok(sign_extend(read_unsigned(data, offset, 1, endian)?, 1)),
            DwForm::Data2 => Ok(sign_extend(read_unsigned(data, offset, 2, endian)?, 2)),
            DwForm::Data4 => Ok(sign_extend(read_unsigned(data, offset, 4, endian)?, 4)),
            DwForm::Data8 => Ok(sign_extend(read_unsigned(data, offset, 8, endian)?, 8)),
            DwForm::Sdata => read_sleb128(data, offset).map(|(value, _)| value),
            form => Err(DwarfError::FormMismatch {
                form,
                requested: "a signed constant",
            }),
        }
    }

    /// Resolve a block attribute: a length field (fixed or ULEB128 per
    /// form) followed by that many raw bytes.
    pub fn attr_block(&self, attr: &Attribute) -> Result<Block<'_>> {
        let (_, data) = self.unit_and_data(attr)?;
        let offset = attr.offset();
        let endian = self.endian();
        let (length, len_field) = match attr.form()? {
            DwForm::Block1 => (read_unsigned(data, offset, 1, endian)?, 1),
            DwForm::Block2 => (read_unsigned(data, offset, 2, endian)?, 2),
            DwForm::Block4 => (read_unsigned(data, offset, 4, endian)?, 4),
            DwForm::Block => {
                let (length, consumed) = read_uleb128(data, offset)?;
                (length, consumed)
            }
            form => {
                return Err(DwarfError::FormMismatch {
                    form,
                    requested: "a block",
                })
            }
        };
        let section_size = data.len() as u64;
        // Wraparound sanity check: a declared length this large could wrap
        // once added to the start offset and dodge the end checks below.
        if length >= section_size {
            return Err(DwarfError::BlockLengthError { length });
        }
        if offset as u64 + length > section_size {
            return Err(DwarfError::BlockLengthError { length });
        }
        let data_offset = offset + len_field;
        if data_offset as u64 + length > section_size {
            return Err(DwarfError::BlockLengthError { length });
        }
        Ok(Block {
            data: &data[data_offset..data_offset + length as usize],
            section_offset: data_offset as u64,
        })
    }

    /// Resolve a `DW_FORM_exprloc` expression block. The whole span,
    /// length field included, must lie within the owning unit's extent.
    pub fn attr_exprloc(&self, attr: &Attribute) -> Result<ExprLoc<'_>> {
        let (unit, data) = self.unit_and_data(attr)?;
        match attr.form()? {
            DwForm::Exprloc => {}
            form => {
                return Err(DwarfError::FormMismatch {
                    form,
                    requested: "an expression block",
                })
            }
        }
        let (length, leb_len) = read_uleb128(data, attr.offset())?;
        let section_size = data.len() as u64;
        if length > section_size {
            return Err(DwarfError::BlockLengthError { length });
        }
        let data_offset = attr.offset() + leb_len;
        let bound = unit.end_offset().min(section_size);
        if data_offset as u64 + length > bound {
            return Err(DwarfError::BlockLengthError { length });
        }
        Ok(ExprLoc {
            data: &data[data_offset..data_offset + length as usize],
        })
    }

    /// Resolve a unit-local reference offset (`ref1/2/4/8`, `ref_udata`).
    ///
    /// The offset stays unit-relative; see [`Dwarf::attr_global_ref`] for
    /// the globalized variant.
    pub fn attr_ref(&self, attr: &Attribute) -> Result<u64> {
        let (unit, data) = self.unit_and_data(attr)?;
        let local = self.read_local_ref(attr, data)?;
        Self::check_unit_local_offset(unit, attr, local)?;
        Ok(local)
    }

    /// Globalize a reference: unit-local forms get the unit's base offset
    /// added; `ref_addr`, `sec_offset` and the supplementary forms are
    /// stored global already. Which section a global offset points into is
    /// the caller's business.
    pub fn attr_global_ref(&self, attr: &Attribute) -> Result<u64> {
        let (unit, data) = self.unit_and_data(attr)?;
        let endian = self.endian();
        let version = unit.version();
        let form = attr.form()?;
        match form {
            DwForm::Ref1 | DwForm::Ref2 | DwForm::Ref4 | DwForm::Ref8 | DwForm::RefUdata => {
                let local = self.read_local_ref(attr, data)?;
                Self::check_unit_local_offset(unit, attr, local)?;
                let global = local.checked_add(unit.section_offset()).ok_or(
                    DwarfError::OffsetOutOfRange {
                        offset: local,
                        extent: data.len() as u64,
                    },
                )?;
                if global > data.len() as u64 {
                    return Err(DwarfError::OffsetOutOfRange {
                        offset: global,
                        extent: data.len() as u64,
                    });
                }
                Ok(global)
            }
            // DWARF2/3 allowed data4/data8 as global reference forms;
            // DWARF4 redefined them as plain constants, so from version 4
            // on they are not references.
            DwForm::Data4 | DwForm::Data8 => {
                if version >= 4 {
                    return Err(DwarfError::NotAReferenceForm { form, version });
                }
                let width = if form == DwForm::Data4 { 4 } else { 8 };
                read_unsigned(data, attr.offset(), width, endian)
            }
            DwForm::RefAddr => {
                // DWARF2 stored ref_addr at address size; v3 corrected the
                // width to offset size.
                let width = if version == 2 {
                    usize::from(unit.address_size())
                } else {
                    usize::from(unit.offset_size())
                };
                read_unsigned(data, attr.offset(), width, endian)
            }
            DwForm::SecOffset | DwForm::StrpSup | DwForm::GnuRefAlt | DwForm::GnuStrpAlt => {
                read_unsigned(data, attr.offset(), usize::from(unit.offset_size()), endian)
            }
            DwForm::RefSig8 => Err(DwarfError::TypeSignatureUnsupported),
            form => Err(DwarfError::FormMismatch {
                form,
                requested: "a global reference",
            }),
        }
    }

    /// Copy the 8 opaque bytes of a `DW_FORM_ref_sig8` type signature.
    pub fn attr_type_signature(&self, attr: &Attribute) -> Result<Sig8> {
        let (_, data) = self.unit_and_data(attr)?;
        match attr.form()? {
            DwForm::RefSig8 => {
                let offset = attr.offset();
                let end = offset
                    .checked_add(8)
                    .filter(|&end| end <= data.len())
                    .ok_or(DwarfError::OutOfBounds {
                        offset: offset as u64,
                        len: 8,
                        size: data.len() as u64,
                    })?;
                let mut sig: Sig8 = [0; 8];
                sig.copy_from_slice(&data[offset..end]);
                Ok(sig)
            }
            form => Err(DwarfError::FormMismatch {
                form,
                requested: "a type signature",
            }),
        }
    }

    fn read_local_ref(&self, attr: &Attribute, data: &[u8]) -> Result<u64> {
        let offset = attr.offset();
        let endian = self.endian();
        match attr.form()? {
            DwForm::Ref1 => read_unsigned(data, offset, 1, endian),
            DwForm::Ref2 => read_unsigned(data, offset, 2, endian),
            DwForm::Ref4 => read_unsigned(data, offset, 4, endian),
            DwForm::Ref8 => read_unsigned(data, offset, 8, endian),
            DwForm::RefUdata => read_uleb128(data, offset).map(|(value, _)| value),
            // ref_sig8 names a type unit, not a unit-local offset.
            DwForm::RefSig8 => Err(DwarfError::TypeSignatureUnsupported),
            form => Err(DwarfError::FormMismatch {
                form,
                requested: "a unit-local reference",
            }),
        }
    }

    /// A unit-local offset must fall inside the unit's byte extent. The
    /// one sanctioned exception: a compile unit's `DW_AT_sibling` may equal
    /// the extent exactly, pointing one past the unit's end to mark "no
    /// more children" (precompiled-header layout).
    fn check_unit_local_offset(unit: &UnitContext, attr: &Attribute, offset: u64) -> Result<()> {
        let extent = unit.extent();
        if offset < extent {
            return Ok(());
        }
        if offset == extent
            && attr.die_tag() == DwTag::COMPILE_UNIT
            && attr.at() == DwAt::SIBLING
        {
            return Ok(());
        }
        Err(DwarfError::OffsetOutOfRange { offset, extent })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Endianness;
    use crate::section::BufferSource;

    const INFO_LEN: usize = 64;

    /// A handle over one 64-byte `.debug_info` section with the given
    /// payload spliced in at `at`, and one unit spanning the whole section.
    fn fixture(version: u16, at: usize, payload: &[u8]) -> (Dwarf, UnitId) {
        let mut info = vec![0u8; INFO_LEN];
        info[at..at + payload.len()].copy_from_slice(payload);
        let mut source = BufferSource::new();
        source.insert(SectionId::DebugInfo, info);
        let mut dwarf = Dwarf::new(Box::new(source), Endianness::Little);
        // extent = length + offset_size = 60 + 4 = 64 = whole section
        let unit = dwarf.add_unit(UnitContext::new(
            version,
            8,
            4,
            (INFO_LEN - 4) as u64,
            0,
            0,
            true,
        ));
        (dwarf, unit)
    }

    fn attr(form: DwForm, unit: UnitId, offset: usize) -> Attribute {
        Attribute::new(DwAt::TYPE, form.raw(), unit, offset, DwTag::VARIABLE)
    }

    #[test]
    fn test_address_fixed_read() {
        let (dwarf, unit) = fixture(4, 8, &0x1122_3344_5566_7788u64.to_le_bytes());
        let a = attr(DwForm::Addr, unit, 8);
        assert_eq!(dwarf.attr_address(&a).unwrap(), 0x1122_3344_5566_7788);
        assert!(matches!(
            dwarf.attr_address(&attr(DwForm::Data8, unit, 8)).unwrap_err(),
            DwarfError::FormMismatch { .. }
        ));
    }

    #[test]
    fn test_address_truncated_at_section_end() {
        let (dwarf, unit) = fixture(4, 0, &[]);
        let a = attr(DwForm::Addr, unit, INFO_LEN - 4);
        assert!(matches!(
            dwarf.attr_address(&a).unwrap_err(),
            DwarfError::OutOfBounds { .. }
        ));
    }

    #[test]
    fn test_address_index_lookup() {
        let mut addrs = Vec::new();
        for addr in [0x1000u64, 0x2000, 0x3000] {
            addrs.extend_from_slice(&addr.to_le_bytes());
        }
        let mut info = vec![0u8; INFO_LEN];
        info[8] = 0x02; // ULEB128 index 2
        let mut source = BufferSource::new();
        source.insert(SectionId::DebugInfo, info);
        source.insert(SectionId::DebugAddr, addrs);
        let mut dwarf = Dwarf::new(Box::new(source), Endianness::Little);
        let unit = dwarf.add_unit(UnitContext::new(5, 8, 4, 60, 0, 0, true));

        assert_eq!(dwarf.lookup_address_index(unit, 2).unwrap(), 0x3000);
        // addrx chains the index decode into the table lookup.
        assert_eq!(
            dwarf.attr_address(&attr(DwForm::Addrx, unit, 8)).unwrap(),
            0x3000
        );
        assert!(matches!(
            dwarf.lookup_address_index(unit, 3).unwrap_err(),
            DwarfError::OutOfBounds { .. }
        ));
        // Overflowing index * address_size must not wrap around.
        assert!(matches!(
            dwarf.lookup_address_index(unit, u64::MAX / 4).unwrap_err(),
            DwarfError::OutOfBounds { .. }
        ));
    }

    #[test]
    fn test_address_index_missing_debug_addr() {
        let (dwarf, unit) = fixture(5, 4, &[0x02]);
        let a = attr(DwForm::Addrx, unit, 4);
        // The index itself is still retrievable for printing.
        assert_eq!(dwarf.attr_address_index(&a).unwrap(), 2);
        assert!(matches!(
            dwarf.attr_address(&a).unwrap_err(),
            DwarfError::MissingSection(SectionId::DebugAddr)
        ));
    }

    #[test]
    fn test_flag_forms() {
        let (dwarf, unit) = fixture(4, 10, &[0x00, 0x05]);
        assert!(!dwarf.attr_flag(&attr(DwForm::Flag, unit, 10)).unwrap());
        assert!(dwarf.attr_flag(&attr(DwForm::Flag, unit, 11)).unwrap());
        // flag_present reads zero bytes, even at the section end.
        assert!(dwarf
            .attr_flag(&attr(DwForm::FlagPresent, unit, INFO_LEN))
            .unwrap());
        assert!(matches!(
            dwarf.attr_flag(&attr(DwForm::Data1, unit, 10)).unwrap_err(),
            DwarfError::FormMismatch { .. }
        ));
    }

    #[test]
    fn test_unsigned_constants() {
        let (dwarf, unit) = fixture(4, 16, &[0xfe, 0xff, 0xff, 0xff, 0xac, 0x02]);
        assert_eq!(dwarf.attr_udata(&attr(DwForm::Data1, unit, 16)).unwrap(), 0xfe);
        assert_eq!(
            dwarf.attr_udata(&attr(DwForm::Data2, unit, 16)).unwrap(),
            0xfffe
        );
        assert_eq!(
            dwarf.attr_udata(&attr(DwForm::Data4, unit, 16)).unwrap(),
            0xffff_fffe
        );
        assert_eq!(dwarf.attr_udata(&attr(DwForm::Udata, unit, 20)).unwrap(), 300);
        // No signed/unsigned reinterpretation.
        assert!(matches!(
            dwarf.attr_udata(&attr(DwForm::Sdata, unit, 20)).unwrap_err(),
            DwarfError::FormMismatch { .. }
        ));
    }

    #[test]
    fn test_signed_constants_sign_extend_by_declared_width() {
        let (dwarf, unit) = fixture(4, 16, &[0xfe, 0xff, 0xff, 0xff]);
        assert_eq!(dwarf.attr_sdata(&attr(DwForm::Data1, unit, 16)).unwrap(), -2);
        assert_eq!(dwarf.attr_sdata(&attr(DwForm::Data2, unit, 16)).unwrap(), -2);
        assert_eq!(dwarf.attr_sdata(&attr(DwForm::Data4, unit, 16)).unwrap(), -2);
        // 0x7f sleb128 is -1
        let (dwarf, unit) = fixture(4, 16, &[0x7f]);
        assert_eq!(dwarf.attr_sdata(&attr(DwForm::Sdata, unit, 16)).unwrap(), -1);
        assert!(matches!(
            dwarf.attr_sdata(&attr(DwForm::Udata, unit, 16)).unwrap_err(),
            DwarfError::FormMismatch { .. }
        ));
    }

    #[test]
    fn test_block_forms() {
        let (dwarf, unit) = fixture(4, 8, &[0x03, 0xaa, 0xbb, 0xcc]);
        let block = dwarf.attr_block(&attr(DwForm::Block1, unit, 8)).unwrap();
        assert_eq!(block.data, &[0xaa, 0xbb, 0xcc]);
        assert_eq!(block.section_offset, 9);

        let (dwarf, unit) = fixture(4, 8, &[0x02, 0x00, 0xaa, 0xbb]);
        let block = dwarf.attr_block(&attr(DwForm::Block2, unit, 8)).unwrap();
        assert_eq!(block.data, &[0xaa, 0xbb]);

        // ULEB128-prefixed block
        let (dwarf, unit) = fixture(4, 8, &[0x02, 0xaa, 0xbb]);
        let block = dwarf.attr_block(&attr(DwForm::Block, unit, 8)).unwrap();
        assert_eq!(block.data, &[0xaa, 0xbb]);
        assert_eq!(block.section_offset, 9);
    }

    #[test]
    fn test_block_length_bounds_exhaustive() {
        // Block1 at offset 8: remaining bytes after the length field = 55.
        let remaining = (INFO_LEN - 9) as u64;
        for declared in [remaining + 1, remaining + 7] {
            let (dwarf, unit) = fixture(4, 8, &[declared as u8]);
            assert!(matches!(
                dwarf.attr_block(&attr(DwForm::Block1, unit, 8)).unwrap_err(),
                DwarfError::BlockLengthError { .. }
            ));
        }
        // Declared lengths near u64::MAX must hit the wraparound check.
        for huge in [(INFO_LEN as u64) + 1000, u64::MAX] {
            let mut payload = vec![0u8; 4];
            payload.copy_from_slice(&(huge as u32).to_le_bytes());
            let (dwarf, unit) = fixture(4, 8, &payload);
            assert!(matches!(
                dwarf.attr_block(&attr(DwForm::Block4, unit, 8)).unwrap_err(),
                DwarfError::BlockLengthError { .. }
            ));
        }
        let mut uleb_max = vec![0xffu8; 9];
        uleb_max.push(0x01); // u64::MAX as ULEB128
        let (dwarf, unit) = fixture(4, 8, &uleb_max);
        assert!(matches!(
            dwarf.attr_block(&attr(DwForm::Block, unit, 8)).unwrap_err(),
            DwarfError::BlockLengthError { length: u64::MAX }
        ));
    }

    #[test]
    fn test_exprloc() {
        let (dwarf, unit) = fixture(4, 8, &[0x02, 0x91, 0x00]);
        let expr = dwarf.attr_exprloc(&attr(DwForm::Exprloc, unit, 8)).unwrap();
        assert_eq!(expr.data, &[0x91, 0x00]);

        // Span crossing the unit end is rejected.
        let (dwarf, unit) = fixture(4, INFO_LEN - 2, &[0x05]);
        assert!(matches!(
            dwarf
                .attr_exprloc(&attr(DwForm::Exprloc, unit, INFO_LEN - 2))
                .unwrap_err(),
            DwarfError::BlockLengthError { length: 5 }
        ));
        // Only the exprloc form is accepted.
        assert!(matches!(
            dwarf.attr_exprloc(&attr(DwForm::Block, unit, 8)).unwrap_err(),
            DwarfError::FormMismatch { .. }
        ));
    }

    #[test]
    fn test_local_ref_forms() {
        let (dwarf, unit) = fixture(4, 8, &[0x20, 0x00, 0x00, 0x00]);
        assert_eq!(dwarf.attr_ref(&attr(DwForm::Ref1, unit, 8)).unwrap(), 0x20);
        assert_eq!(dwarf.attr_ref(&attr(DwForm::Ref4, unit, 8)).unwrap(), 0x20);
        assert_eq!(
            dwarf.attr_ref(&attr(DwForm::RefUdata, unit, 8)).unwrap(),
            0x20
        );
        assert!(matches!(
            dwarf.attr_ref(&attr(DwForm::RefSig8, unit, 8)).unwrap_err(),
            DwarfError::TypeSignatureUnsupported
        ));
        assert!(matches!(
            dwarf.attr_ref(&attr(DwForm::Strp, unit, 8)).unwrap_err(),
            DwarfError::FormMismatch { .. }
        ));
    }

    #[test]
    fn test_sibling_boundary_exception() {
        // Local offset exactly equal to the unit extent (64).
        let payload = 64u32.to_le_bytes();
        let (dwarf, unit) = fixture(4, 8, &payload);

        let plain = Attribute::new(
            DwAt::TYPE,
            DwForm::Ref4.raw(),
            unit,
            8,
            DwTag::VARIABLE,
        );
        assert!(matches!(
            dwarf.attr_ref(&plain).unwrap_err(),
            DwarfError::OffsetOutOfRange { offset: 64, extent: 64 }
        ));

        // Sibling attribute alone is not enough; the DIE must be the
        // compile unit itself.
        let sibling_on_var = Attribute::new(
            DwAt::SIBLING,
            DwForm::Ref4.raw(),
            unit,
            8,
            DwTag::VARIABLE,
        );
        assert!(dwarf.attr_ref(&sibling_on_var).is_err());

        let sibling_on_cu = Attribute::new(
            DwAt::SIBLING,
            DwForm::Ref4.raw(),
            unit,
            8,
            DwTag::COMPILE_UNIT,
        );
        assert_eq!(dwarf.attr_ref(&sibling_on_cu).unwrap(), 64);

        // One past the extent fails even for the compile unit's sibling.
        let (dwarf, unit) = fixture(4, 8, &65u32.to_le_bytes());
        let past = Attribute::new(
            DwAt::SIBLING,
            DwForm::Ref4.raw(),
            unit,
            8,
            DwTag::COMPILE_UNIT,
        );
        assert!(matches!(
            dwarf.attr_ref(&past).unwrap_err(),
            DwarfError::OffsetOutOfRange { .. }
        ));
    }

    #[test]
    fn test_global_ref_adds_unit_base() {
        let mut info = vec![0u8; 128];
        info[72..76].copy_from_slice(&0x10u32.to_le_bytes());
        let mut source = BufferSource::new();
        source.insert(SectionId::DebugInfo, info);
        let mut dwarf = Dwarf::new(Box::new(source), Endianness::Little);
        // Second unit based at 64, extent 64.
        let unit = dwarf.add_unit(UnitContext::new(4, 8, 4, 60, 0, 64, true));
        let a = attr(DwForm::Ref4, unit, 72);
        assert_eq!(dwarf.attr_ref(&a).unwrap(), 0x10);
        assert_eq!(dwarf.attr_global_ref(&a).unwrap(), 64 + 0x10);
    }

    #[test]
    fn test_data4_reference_version_gate() {
        let payload = 0x24u32.to_le_bytes();
        for version in [2u16, 3] {
            let (dwarf, unit) = fixture(version, 8, &payload);
            assert_eq!(
                dwarf.attr_global_ref(&attr(DwForm::Data4, unit, 8)).unwrap(),
                0x24
            );
        }
        for version in [4u16, 5] {
            let (dwarf, unit) = fixture(version, 8, &payload);
            assert!(matches!(
                dwarf
                    .attr_global_ref(&attr(DwForm::Data4, unit, 8))
                    .unwrap_err(),
                DwarfError::NotAReferenceForm { form: DwForm::Data4, version: v } if v == version
            ));
        }
    }

    #[test]
    fn test_ref_addr_width_is_version_dependent() {
        // Same bytes, different widths: v2 reads address_size (8), v4
        // reads offset_size (4).
        let payload = 0x0000_0055_0000_0044u64.to_le_bytes();
        let (dwarf, unit) = fixture(2, 8, &payload);
        assert_eq!(
            dwarf.attr_global_ref(&attr(DwForm::RefAddr, unit, 8)).unwrap(),
            0x0000_0055_0000_0044
        );
        let (dwarf, unit) = fixture(4, 8, &payload);
        assert_eq!(
            dwarf.attr_global_ref(&attr(DwForm::RefAddr, unit, 8)).unwrap(),
            0x44
        );
    }

    #[test]
    fn test_sec_offset_reads_offset_size() {
        let (dwarf, unit) = fixture(5, 8, &0x68u32.to_le_bytes());
        assert_eq!(
            dwarf
                .attr_global_ref(&attr(DwForm::SecOffset, unit, 8))
                .unwrap(),
            0x68
        );
        assert!(matches!(
            dwarf
                .attr_global_ref(&attr(DwForm::RefSig8, unit, 8))
                .unwrap_err(),
            DwarfError::TypeSignatureUnsupported
        ));
    }

    #[test]
    fn test_type_signature_copies_raw_bytes() {
        let sig = [1u8, 2, 3, 4, 5, 6, 7, 8];
        let (dwarf, unit) = fixture(5, 8, &sig);
        assert_eq!(
            dwarf
                .attr_type_signature(&attr(DwForm::RefSig8, unit, 8))
                .unwrap(),
            sig
        );
        assert!(matches!(
            dwarf
                .attr_type_signature(&attr(DwForm::RefSig8, unit, INFO_LEN - 4))
                .unwrap_err(),
            DwarfError::OutOfBounds { .. }
        ));
    }

    #[test]
    fn test_resolve_dispatch() {
        let (dwarf, unit) = fixture(5, 8, &[0x2a]);
        assert!(matches!(
            dwarf.resolve(&attr(DwForm::Data1, unit, 8)).unwrap(),
            DecodedValue::UnsignedConstant(0x2a)
        ));
        assert!(matches!(
            dwarf.resolve(&attr(DwForm::Sdata, unit, 8)).unwrap(),
            DecodedValue::SignedConstant(0x2a)
        ));
        assert!(matches!(
            dwarf.resolve(&attr(DwForm::FlagPresent, unit, 8)).unwrap(),
            DecodedValue::Flag(true)
        ));
        assert!(matches!(
            dwarf.resolve(&attr(DwForm::Addrx, unit, 8)).unwrap(),
            DecodedValue::AddressIndex(0x2a)
        ));
        assert!(matches!(
            dwarf.resolve(&attr(DwForm::Ref1, unit, 8)).unwrap(),
            DecodedValue::LocalOffset(0x2a)
        ));
        // An illegal form code is BadForm before any family logic runs.
        let bad = Attribute::new(DwAt::TYPE, 0x02, unit, 8, DwTag::VARIABLE);
        assert!(matches!(
            dwarf.resolve(&bad).unwrap_err(),
            DwarfError::BadForm(0x02)
        ));
    }

    #[test]
    fn test_unknown_unit_is_invalid_attribute() {
        let (dwarf, _) = fixture(5, 8, &[0x2a]);
        let orphan = attr(DwForm::Data1, UnitId(7), 8);
        assert!(matches!(
            dwarf.resolve(&orphan).unwrap_err(),
            DwarfError::InvalidAttribute
        ));
    }

    #[test]
    fn test_failed_decode_leaves_handle_usable() {
        let (dwarf, unit) = fixture(5, 8, &[0x2a]);
        assert!(dwarf.attr_address(&attr(DwForm::Addr, unit, INFO_LEN)).is_err());
        // Subsequent unrelated decodes still succeed.
        assert_eq!(dwarf.attr_udata(&attr(DwForm::Data1, unit, 8)).unwrap(), 0x2a);
    }
}
