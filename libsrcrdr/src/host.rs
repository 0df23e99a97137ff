// Copyright 2025 Neil Henderson, Blue Tarp Media.
//
//! The `host` module defines the traits through which the reader calls into the embedding compiler.
//!
//! The reader owns none of the global environment it changes. Atoms, streams, the operator table, the flag store,
//! the character-conversion table, term writing and message formatting all belong to the host. The reader only
//! threads arguments through these traits, and assumes it has exclusive access to the host for the duration of
//! each call.
//!
//! [MemoryHost] is a complete in-memory implementation of every trait, useful for tools and tests.

mod memory;


use thiserror::Error;

use crate::core::{AtomId, StreamCounters, StreamId, Term};
use crate::directive::{CharConversionArgs, DirectiveError, FlagArgs, OpArgs};

pub use memory::{AppliedEffect, MemoryHost};

/// An error returned by the host's stream table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StreamError {
    #[error("stream {0} does not exist")]
    UnknownStream(StreamId),

    #[error("stream {0} is not an output stream")]
    NotOutput(StreamId),

    #[error("stream {0} is closed")]
    Closed(StreamId),
}

/// Interns and looks up atom texts.
pub trait AtomTable {
    /// Interns the given text and returns its atom.
    fn intern(&mut self, name: &str) -> AtomId;

    /// The text of the given atom. Unknown atoms have an empty name.
    fn atom_name(&self, atom: AtomId) -> &str;
}

/// The host's table of open streams.
pub trait StreamTable {
    /// The running char/line/column counters of a stream. Unknown streams report zero counters.
    fn counters(&self, stream: StreamId) -> StreamCounters;

    /// Closes a stream.
    fn close_stream(&mut self, stream: StreamId) -> Result<(), StreamError>;

    /// The stream that diagnostics go to when no other output is configured.
    fn standard_output(&self) -> StreamId;

    /// Checks that a stream exists, is open, and accepts output.
    fn check_output(&self, stream: StreamId) -> Result<(), StreamError>;

    /// Writes text to an output stream.
    fn put_str(&mut self, stream: StreamId, text: &str) -> Result<(), StreamError>;
}

/// Defines and redefines operators.
pub trait OperatorTable {
    fn define_op(&mut self, args: &OpArgs) -> Result<(), DirectiveError>;
}

/// Stores the compiler flags.
pub trait FlagStore {
    fn set_flag(&mut self, args: &FlagArgs) -> Result<(), DirectiveError>;
}

/// Maps input characters to the characters the tokenizer sees.
pub trait CharConversionTable {
    fn convert_char(&mut self, args: &CharConversionArgs) -> Result<(), DirectiveError>;
}

/// Writes a term to a stream.
pub trait TermWriter {
    fn write_term(&mut self, stream: StreamId, term: &Term) -> Result<(), StreamError>;
}

/// Writes a formatted message, e.g. `"undefined ~w"` with its argument list, to a stream.
pub trait MessageFormatter {
    fn format(&mut self, stream: StreamId, format: &str, args: &[Term]) -> Result<(), StreamError>;
}

/// Everything a directive can change.
pub trait DirectiveExecutor: OperatorTable + FlagStore + CharConversionTable {}

impl<T: OperatorTable + FlagStore + CharConversionTable + ?Sized> DirectiveExecutor for T {}

/// Every collaborator the reader needs.
pub trait Host: AtomTable + StreamTable + DirectiveExecutor + TermWriter + MessageFormatter {}

impl<T: AtomTable + StreamTable + DirectiveExecutor + TermWriter + MessageFormatter + ?Sized> Host for T {}
