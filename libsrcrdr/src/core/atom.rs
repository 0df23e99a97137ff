// Copyright 2025 Neil Henderson, Blue Tarp Media.
//
//! The `atom` module defines the [AtomId] type.

use std::fmt;

/// The index of an interned atom, e.g. a file name or a module name.
///
/// The text of an atom is owned by the embedding compiler's atom table, see [AtomTable](crate::host::AtomTable).
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AtomId(pub u32);

impl AtomId {
    /// The atom for the empty text, reserved at index 0 by [Interner](super::Interner).
    pub const EMPTY: AtomId = AtomId(0);
}

impl fmt::Display for AtomId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "atom#{}", self.0)
    }
}
