// Copyright 2025 Neil Henderson, Blue Tarp Media.
//
//! The `session_table` module defines [SessionTable], which owns every open reading session.

use tracing::debug;

use crate::core::{AtomId, StreamId};
use crate::host::{Host, StreamTable};

use super::{ReaderError, Session, SessionId, SessionOptions};

const INITIAL_SLOT_COUNT: usize = 8;

/// What closing a session could not do. Closing itself always succeeds.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct CloseSummary {
    pub streams_closed: usize,
    pub stream_failures: usize,
    pub undo_failures: usize,
}

/// A position from which to resume enumerating open sessions.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct SessionCursor(usize); // Next slot index to try

/// An open session found while enumerating.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct SessionMatch {
    pub id: SessionId,

    /// Where to resume, or `None` if this is the highest open session.
    pub resume: Option<SessionCursor>,
}

/// The table of reading sessions.
///
/// Sessions live in dense slots addressed by [SessionId]. Opening takes the first free slot, growing the table when
/// it is full, so handles are stable while a session is open and are reused after it is closed.
#[derive(Debug, Default)]
pub struct SessionTable {
    slots: Vec<Option<Session>>,
    highest_open: Option<usize>,
}

impl SessionTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self { slots: Vec::new(), highest_open: None }
    }

    /// Opens a session reading the given master file and returns its handle.
    ///
    /// If the options name an output stream, it must be a valid output stream.
    pub fn open<S>(
        &mut self,
        master_file: AtomId,
        master_stream: StreamId,
        options: SessionOptions,
        streams: &S,
    ) -> Result<SessionId, ReaderError>
    where
        S: StreamTable + ?Sized,
    {
        if let Some(output) = options.output {
            streams.check_output(output)?;
        }

        let index = self.first_free_slot();
        let id = SessionId(index);

        self.slots[index] = Some(Session::new(id, master_file, master_stream, options));
        self.highest_open = Some(self.highest_open.map_or(index, |highest| highest.max(index)));

        debug!(session = %id, %master_stream, "session opened");
        Ok(id)
    }

    /// Closes a session and frees its slot. See [CloseSummary] for what may go wrong while closing.
    pub fn close<H>(&mut self, id: SessionId, host: &mut H) -> Result<CloseSummary, ReaderError>
    where
        H: Host + ?Sized,
    {
        let Some(session) = self.slots.get_mut(id.0).and_then(Option::take) else {
            return Err(ReaderError::UnknownSession(id));
        };

        // Shrink the highest open index past any closed slots.
        while let Some(highest) = self.highest_open {
            if self.slots[highest].is_some() {
                break;
            }
            self.highest_open = highest.checked_sub(1);
        }

        Ok(session.close(host))
    }

    /// Checks that the handle refers to an open session.
    pub fn check(&self, id: SessionId) -> Result<(), ReaderError> {
        self.session(id).map(|_| ())
    }

    /// The session with the given handle.
    pub fn session(&self, id: SessionId) -> Result<&Session, ReaderError> {
        self.slots.get(id.0).and_then(Option::as_ref).ok_or(ReaderError::UnknownSession(id))
    }

    /// The session with the given handle, for mutation.
    pub fn session_mut(&mut self, id: SessionId) -> Result<&mut Session, ReaderError> {
        self.slots.get_mut(id.0).and_then(Option::as_mut).ok_or(ReaderError::UnknownSession(id))
    }

    /// Makes the given session the one the caller is working on and returns it.
    ///
    /// The table does not remember the activation: the caller holds the handle, and must restore its previous
    /// handle itself after a nested compile.
    pub fn activate(&mut self, id: SessionId) -> Result<&mut Session, ReaderError> {
        let session = self.session_mut(id)?;
        debug!(session = %id, mask = %session.options().mask, "session activated");
        Ok(session)
    }

    /// Is the given handle an open session?
    pub fn is_open(&self, id: SessionId) -> bool {
        self.session(id).is_ok()
    }

    /// The number of open sessions.
    pub fn open_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    /// The highest handle currently open.
    pub fn highest_open_id(&self) -> Option<SessionId> {
        self.highest_open.map(SessionId)
    }

    /// Finds the lowest open session.
    pub fn first_open_session(&self) -> Option<SessionMatch> {
        self.next_open_session(SessionCursor(0))
    }

    /// Finds the lowest open session at or above the cursor.
    ///
    /// The cursor is a plain value, so an enumeration can be resumed from any earlier point as long as the table
    /// has not changed in between.
    pub fn next_open_session(&self, cursor: SessionCursor) -> Option<SessionMatch> {
        let highest = self.highest_open?;

        let index = (cursor.0..=highest).find(|&index| self.slots[index].is_some())?;
        let resume = if index < highest { Some(SessionCursor(index + 1)) } else { None };

        Some(SessionMatch { id: SessionId(index), resume })
    }

    /// Iterates over the open sessions' handles in ascending order.
    pub fn open_sessions(&self) -> OpenSessions<'_> {
        OpenSessions { table: self, cursor: Some(SessionCursor(0)) }
    }

    fn first_free_slot(&mut self) -> usize {
        if let Some(index) = self.slots.iter().position(Option::is_none) {
            return index;
        }

        let index = self.slots.len();
        let new_len = if index == 0 { INITIAL_SLOT_COUNT } else { index * 2 };
        self.slots.resize_with(new_len, || None);

        index
    }
}

/// An iterator over the handles of the open sessions, in ascending order.
#[derive(Debug, Clone)]
pub struct OpenSessions<'a> {
    table: &'a SessionTable,
    cursor: Option<SessionCursor>,
}

impl Iterator for OpenSessions<'_> {
    type Item = SessionId;

    fn next(&mut self) -> Option<Self::Item> {
        let found = self.table.next_open_session(self.cursor?);

        self.cursor = found.and_then(|m| m.resume);
        found.map(|m| m.id)
    }
}
