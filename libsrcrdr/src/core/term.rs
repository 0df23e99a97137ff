// Copyright 2025 Neil Henderson, Blue Tarp Media.
//
//! The `term` module defines the [Term] type.

use super::AtomId;

/// An already-validated value handed to the reader by the embedding compiler.
///
/// The reader never inspects terms: it threads them through to the collaborators that do (the operator table,
/// the flag store, the term writer and the message formatter).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Term {
    Atom(AtomId),
    Integer(i64),
    Char(char),
    Str(String),
    Compound { functor: AtomId, args: Vec<Term> },
}

impl Term {
    /// Creates a compound term.
    pub fn compound(functor: AtomId, args: Vec<Term>) -> Self {
        Term::Compound { functor, args }
    }

    /// The atom, if this term is an atom.
    pub fn as_atom(&self) -> Option<AtomId> {
        match self {
            Term::Atom(atom) => Some(*atom),
            _ => None,
        }
    }

    /// The integer, if this term is an integer.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Term::Integer(value) => Some(*value),
            _ => None,
        }
    }

    /// The character, if this term is a character.
    pub fn as_char(&self) -> Option<char> {
        match self {
            Term::Char(c) => Some(*c),
            _ => None,
        }
    }
}

impl From<AtomId> for Term {
    fn from(atom: AtomId) -> Self {
        Term::Atom(atom)
    }
}

impl From<i64> for Term {
    fn from(value: i64) -> Self {
        Term::Integer(value)
    }
}

impl From<char> for Term {
    fn from(c: char) -> Self {
        Term::Char(c)
    }
}
