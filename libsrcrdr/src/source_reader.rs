// Copyright 2025 Neil Henderson, Blue Tarp Media.
//
//! The `source_reader` module defines the reading sessions of the source reader and the table that owns them.
//!
//! A [Session] is opened on a master source file. While the embedding compiler reads terms from it, the session
//! tracks the files included from it ([IncludeStack]), records every directive that changed the global compile
//! environment ([DirectiveLog](crate::directive::DirectiveLog)), and follows the module scopes declared in the file
//! ([ModuleRegistry]). Several sessions can be open at once, e.g. when a compile is started from within another
//! compile; they are addressed by [SessionId] through a [SessionTable].
//!
//! There is no ambient "current session". Every operation names the session it applies to, and the embedding
//! compiler saves and restores whichever handle it considers current around nested compiles.

pub mod options;

mod include_stack;
mod module_scope;
mod session;
mod session_table;


use std::fmt;

use thiserror::Error;

use crate::directive::DirectiveError;
use crate::host::StreamError;

pub use include_stack::{IncludeFile, IncludeStack};
pub use module_scope::{Module, ModulePhase, ModuleRegistry, ModuleWarning};
pub use options::{OptionMask, SessionOptions};
pub use session::{EofStatus, ErrorCounters, Session, SizeCounters};
pub use session_table::{CloseSummary, OpenSessions, SessionCursor, SessionMatch, SessionTable};

/// The handle of a reading session: its index in the [SessionTable].
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SessionId(pub usize);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An error returned by the source reader.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReaderError {
    #[error("source reader session {0} does not exist")]
    UnknownSession(SessionId),

    #[error(transparent)]
    Directive(#[from] DirectiveError),

    #[error(transparent)]
    Stream(#[from] StreamError),
}
