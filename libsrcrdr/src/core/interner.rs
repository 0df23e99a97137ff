// Copyright 2025 Neil Henderson, Blue Tarp Media.
//
//! The `interner` module defines the [Interner] type, which stores each distinct atom text once and refers to it
//! by its [AtomId].

use std::collections::HashMap;

use crate::ICE;

use super::AtomId;

/// A table of interned atom texts.
///
/// Interning the same text twice returns the same [AtomId]. The empty text is always interned at
/// [AtomId::EMPTY].
#[derive(Debug)]
pub struct Interner {
    names: Vec<String>,
    lookup: HashMap<String, AtomId>, // Map of the atom text to its index in `names`.
}

impl Default for Interner {
    fn default() -> Self {
        Self::new()
    }
}

impl Interner {
    /// Creates a new interner holding only the empty atom.
    pub fn new() -> Self {
        let mut interner = Self { names: Vec::new(), lookup: HashMap::new() };
        let empty = interner.intern("");
        debug_assert_eq!(empty, AtomId::EMPTY);
        interner
    }

    /// The number of interned atoms, including the empty atom.
    pub fn atom_count(&self) -> usize {
        self.names.len()
    }

    /// Returns `true` if nothing but the reserved empty atom has been interned.
    pub fn has_only_empty_atom(&self) -> bool {
        self.names.len() == 1
    }

    /// Interns the given text and returns its atom, or returns the existing atom if the text was already interned.
    pub fn intern(&mut self, name: &str) -> AtomId {
        if let Some(&atom) = self.lookup.get(name) {
            return atom;
        }

        let Ok(index) = u32::try_from(self.names.len()) else {
            ICE!("Exhausted Interner atom indices");
        };

        let atom = AtomId(index);
        self.names.push(name.to_string());
        self.lookup.insert(name.to_string(), atom);

        atom
    }

    /// Finds the atom for the given text without interning it.
    pub fn find(&self, name: &str) -> Option<AtomId> {
        self.lookup.get(name).copied()
    }

    /// The text of the given atom, or `None` if the atom was not created by this interner.
    pub fn name(&self, atom: AtomId) -> Option<&str> {
        self.names.get(atom.0 as usize).map(String::as_str)
    }
}
