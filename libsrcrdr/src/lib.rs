// Copyright 2025 Neil Henderson, Blue Tarp Media.
//
//! The SrcRdr library.
//!
//! SrcRdr holds the compile-time state of a source-file reading session for a language front end: the stack of
//! nested included files, a reversible log of side-effecting directives (operator definitions, flag changes and
//! character conversions), the module scopes discovered inside a source file, and the error/warning counters
//! updated by located diagnostic messages.
//!
//! Tokenizing, parsing, the operator table, the flag store, the character-conversion table and stream I/O belong
//! to the embedding compiler, which plugs them in through the traits in the [host] module.

#![doc(html_no_source)]

pub mod core;
pub mod diagnostics;
pub mod directive;
pub mod host;
pub mod source_reader;
