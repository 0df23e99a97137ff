// Copyright 2025 Neil Henderson, Blue Tarp Media.
//
//! The `log` module defines the [DirectiveLog] type.

use tracing::debug;

use crate::host::DirectiveExecutor;

use super::{Direction, Directive, DirectiveError};

/// An ordered, append-only record of the directives that took effect, in the order they were applied.
///
/// Entries are only ever added by [DirectiveLog::record_and_apply], which executes the directive first; a directive
/// the collaborator rejects is never recorded, so the log always matches what actually took effect.
#[derive(Debug, Default, Clone)]
pub struct DirectiveLog {
    entries: Vec<Directive>,
}

impl DirectiveLog {
    /// Creates an empty log.
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    /// The number of recorded directives.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The recorded directives, in application order.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Directive> {
        self.entries.iter()
    }

    /// Applies the directive and, if the collaborator accepts it, appends it to the log.
    pub fn record_and_apply<E>(&mut self, directive: Directive, exec: &mut E) -> Result<(), DirectiveError>
    where
        E: DirectiveExecutor + ?Sized,
    {
        directive.execute(Direction::Apply, exec)?;

        debug!(kind = %directive.kind(), index = self.entries.len(), "directive recorded");
        self.entries.push(directive);

        Ok(())
    }

    /// Re-applies every directive, in recording order, stopping at the first one that fails.
    pub fn replay_forward<E>(&self, exec: &mut E) -> Result<(), DirectiveError>
    where
        E: DirectiveExecutor + ?Sized,
    {
        for directive in &self.entries {
            directive.execute(Direction::Apply, exec)?;
        }

        Ok(())
    }

    /// Undoes every directive, most recent first.
    ///
    /// Every directive is undone even if an earlier undo fails; the first failure is returned.
    pub fn replay_reverse<E>(&self, exec: &mut E) -> Result<(), DirectiveError>
    where
        E: DirectiveExecutor + ?Sized,
    {
        let mut first_error = None;

        self.undo_each(exec, |err| {
            if first_error.is_none() {
                first_error = Some(err);
            }
        });

        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Undoes every directive, most recent first, passing each failure to `on_error` and continuing.
    pub(crate) fn undo_each<E, F>(&self, exec: &mut E, mut on_error: F)
    where
        E: DirectiveExecutor + ?Sized,
        F: FnMut(DirectiveError),
    {
        for directive in self.entries.iter().rev() {
            if let Err(err) = directive.execute(Direction::Undo, exec) {
                on_error(err);
            }
        }
    }
}
