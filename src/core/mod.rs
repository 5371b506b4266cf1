//! Core types for scopeview-dwarf: form/attribute codes, decoded values
//! and the error taxonomy.

pub mod constants;
pub mod errors;
pub mod types;

pub use constants::*;
pub use errors::*;
pub use types::*;
