//! ScopeView DWARF attribute decoding library
//!
//! Decodes raw DWARF attributes (a form code plus an offset into a loaded
//! section) into typed, bounds-validated values: addresses, constants,
//! flags, blocks, strings and cross-references. The DIE tree walker, the
//! object-container loader and any rendering live above this crate; they
//! feed sections in through [`SectionSource`] and attributes in as
//! [`Attribute`] records.
//!
//! The input is an externally supplied, frequently malformed binary blob,
//! so every read is bounds-checked and malformed data always surfaces as a
//! typed [`DwarfError`], never as a panic or an unchecked read. A failed
//! decode never invalidates the [`Dwarf`] handle.
//!
//! The handle is synchronous and single-threaded: sections load lazily and
//! are memoized for the handle's lifetime, and the only mutable state (the
//! section slots and per-unit base caches) is written at most once. Callers
//! that want cross-thread decoding must warm the caches single-threaded
//! first or serialize first loads themselves.

// Core types: constants, errors, decoded values
pub mod core;

// Public data model
pub mod attr;
pub mod dwarf;
pub mod section;
pub mod unit;

// Internal implementation modules
pub(crate) mod reader;
pub(crate) mod resolver;
pub(crate) mod strings;

// Re-export the main public API
pub use attr::Attribute;
pub use crate::core::{
    Block, DecodedValue, DwAt, DwForm, DwTag, DwarfError, DwpSection, Endianness, ExprLoc,
    Result, Sig8,
};
pub use dwarf::Dwarf;
pub use section::{BufferSource, SectionId, SectionSource};
pub use unit::{DwpOffsets, UnitContext, UnitId};
