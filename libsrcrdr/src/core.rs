// Copyright 2025 Neil Henderson, Blue Tarp Media.
//
//! The `core` module provides foundational types shared by the reader, the directive log and the diagnostics.

mod atom;
mod internal_error;
mod interner;
mod location;
mod stream_id;
mod term;


pub use atom::AtomId;
pub use interner::Interner;
pub use location::{FileLine, LineSpan};
pub use stream_id::{StreamCounters, StreamId};
pub use term::Term;
