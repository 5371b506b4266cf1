//! Decoded attribute values and supporting value types.

/// Byte order of the object file the sections came from.
///
/// Fixed-width fields are stored in the object's native order and converted
/// to host order on every read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endianness {
    Little,
    Big,
}

/// A block attribute value: borrowed bytes plus their section offset.
///
/// The slice points into the owning handle's section buffer and is only
/// valid while that handle lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Block<'a> {
    pub data: &'a [u8],
    /// Offset of the first data byte within the unit's section.
    pub section_offset: u64,
}

/// A DWARF expression block (`DW_FORM_exprloc`), borrowed from the section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExprLoc<'a> {
    pub data: &'a [u8],
}

/// An 8-byte type-unit signature. Opaque at this layer; never dereferenced.
pub type Sig8 = [u8; 8];

/// A fully decoded attribute value.
///
/// String values are borrowed, NUL-validated slices into a section buffer
/// (terminator excluded); ownership never transfers to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodedValue<'a> {
    Address(u64),
    /// Index into `.debug_addr`; resolve via
    /// [`Dwarf::lookup_address_index`](crate::Dwarf::lookup_address_index).
    AddressIndex(u64),
    Flag(bool),
    UnsignedConstant(u64),
    SignedConstant(i64),
    Block(Block<'a>),
    ExprLoc(ExprLoc<'a>),
    String(&'a [u8]),
    /// Index into the string-offsets table, for callers that print the
    /// index rather than the resolved content.
    StringIndex(u64),
    /// Unit-relative reference offset.
    LocalOffset(u64),
    /// Section-global offset.
    GlobalOffset(u64),
    TypeSignature(Sig8),
}
