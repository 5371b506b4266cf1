//! Error types for the DWARF decoding library.

use crate::core::constants::DwForm;
use crate::section::SectionId;

/// Error types for the library.
///
/// Every decode failure is returned to the immediate caller and leaves the
/// owning [`Dwarf`](crate::Dwarf) handle fully usable; the only errors that
/// are ever recovered internally are the two `NoTied*` kinds, which string
/// resolution converts into a fixed placeholder once.
#[derive(thiserror::Error, Debug)]
pub enum DwarfError {
    #[error("attribute has no unit context registered with this handle")]
    InvalidAttribute,
    #[error("required section {0} is not present in this object")]
    MissingSection(SectionId),
    #[error("{0:#x} is not a DWARF form code")]
    BadForm(u16),
    #[error("form {form:?} cannot be read as {requested}")]
    FormMismatch { form: DwForm, requested: &'static str },
    #[error("reading {len} bytes at offset {offset:#x} crosses the section end ({size:#x} bytes)")]
    OutOfBounds { offset: u64, len: u64, size: u64 },
    #[error("reference offset {offset:#x} is outside the legal extent {extent:#x}")]
    OffsetOutOfRange { offset: u64, extent: u64 },
    #[error("block length {length:#x} overflows or exceeds the section")]
    BlockLengthError { length: u64 },
    #[error("string at {section} offset {offset:#x} has no NUL terminator within the section")]
    StringValidationFailed { section: SectionId, offset: u64 },
    #[error("form {form:?} is not a reference form under DWARF version {version}")]
    NotAReferenceForm { form: DwForm, version: u16 },
    #[error("DW_FORM_ref_sig8 names a type unit by signature, not by section offset")]
    TypeSignatureUnsupported,
    #[error("no tied object is configured for supplementary lookups")]
    NoTiedFileAvailable,
    #[error("tied object has no valid string at offset {0:#x}")]
    NoTiedStringAvailable(u64),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type used throughout the library.
pub type Result<T> = std::result::Result<T, DwarfError>;
