// Copyright 2025 Neil Henderson, Blue Tarp Media.
//
//! The `diagnostics` module composes located diagnostic messages and keeps the sessions' error and warning
//! counters up to date.
//!
//! A message is written as
//!
//! ```text
//! In file included from outer.pl:3,
//!                  from main.pl:12:
//! inner.pl:7--9: warning: singleton variables [X]
//! ```
//!
//! The "included from" lines are only written when the message's file is an included one. The message body itself
//! is formatted by the host's [MessageFormatter](crate::host::MessageFormatter).

pub mod composer;
pub mod message;


use crate::core::{AtomId, LineSpan, Term};
use crate::host::Host;
use crate::source_reader::{ReaderError, SessionId, SessionTable};

pub use composer::{Composer, IncludeChain};
pub use message::{Message, MessageCategory};

/// Where a message is located.
#[derive(Debug, Copy, Clone)]
pub enum MessageLocation<'a> {
    /// The file being read and the position of the last term read.
    Current,

    /// The file being read, at the given lines.
    Lines(LineSpan),

    /// A caller-supplied include chain (terms written with the host's term writer), file and lines.
    Explicit { include_chain: &'a [Term], file: Option<AtomId>, lines: LineSpan },
}

/// Writes a located message for the given session, or for no session at all, and counts it.
///
/// The message goes to the session's output stream, or to the host's standard output if the session has none or if
/// `session` is `None`. Without a session there is no current file or position and no counter is updated.
pub fn write_message<H>(
    sessions: &mut SessionTable,
    session: Option<SessionId>,
    location: MessageLocation<'_>,
    message: &Message<'_>,
    host: &mut H,
) -> Result<(), ReaderError>
where
    H: Host + ?Sized,
{
    let mut session = match session {
        Some(id) => Some(sessions.session_mut(id)?),
        None => None,
    };

    let output = session.as_ref().and_then(|s| s.output()).unwrap_or_else(|| host.standard_output());
    let trace = session.as_ref().map(|s| s.include_trace()).unwrap_or_default();
    let current_file = session.as_ref().map(|s| s.current_file());

    let (chain, file, lines) = match location {
        MessageLocation::Current => {
            let position = session.as_ref().map(|s| s.position()).unwrap_or_default();
            (IncludeChain::Files(&trace), current_file, position)
        }
        MessageLocation::Lines(lines) => (IncludeChain::Files(&trace), current_file, lines),
        MessageLocation::Explicit { include_chain, file, lines } => (IncludeChain::Terms(include_chain), file, lines),
    };

    let mut composer = Composer::new(host, output)?;
    composer.write_location(chain, file, lines)?;
    composer.write_message_text(session.as_deref_mut(), message)?;

    Ok(())
}
