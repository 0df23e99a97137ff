// Copyright 2025 Neil Henderson, Blue Tarp Media.
//
//! The `session` module defines [Session], the state of one source-reading compilation unit.

use tracing::{debug, warn};

use crate::core::{AtomId, FileLine, LineSpan, StreamId};
use crate::directive::{Directive, DirectiveError, DirectiveLog};
use crate::host::{AtomTable, DirectiveExecutor, Host, StreamError, StreamTable};

use super::{
    CloseSummary, IncludeStack, Module, ModulePhase, ModuleRegistry, ModuleWarning, OptionMask, SessionId,
    SessionOptions,
};

/// What the caller should do after the tokenizer reached the end of the file being read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EofStatus {
    /// Should the end of file be reflected to the reader? Always `true` for the master file.
    pub reflect_eof: bool,

    /// Emitted if the master file ended while a module was still active.
    pub warning: Option<ModuleWarning>,
}

/// The number of chars and lines read by a session.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct SizeCounters {
    pub chars: i64,
    pub lines: i64,
}

/// The number of error and warning messages written for a session.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct ErrorCounters {
    pub errors: u32,
    pub warnings: u32,
}

/// A reading session.
///
/// Sessions are created by [SessionTable::open](super::SessionTable::open), which pushes the master file, so the
/// include stack of an open session is never empty.
#[derive(Debug)]
pub struct Session {
    id: SessionId,
    options: SessionOptions,
    includes: IncludeStack,
    position: LineSpan,       // Lines of the last term read
    popped: SizeCounters,     // Chars and lines of the included files already popped
    counters: ErrorCounters,
    directives: DirectiveLog, // Directives read outside any module
    modules: ModuleRegistry,
}

impl Session {
    /// Creates a session reading the given master file.
    pub(super) fn new(id: SessionId, master_file: AtomId, master_stream: StreamId, options: SessionOptions) -> Self {
        Self {
            id,
            options,
            includes: IncludeStack::new(master_file, master_stream),
            position: LineSpan::default(),
            popped: SizeCounters::default(),
            counters: ErrorCounters::default(),
            directives: DirectiveLog::new(),
            modules: ModuleRegistry::new(),
        }
    }

    /// The session's handle.
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// The session's options.
    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    /// Replaces the session's option bits.
    pub fn change_options(&mut self, mask: OptionMask) {
        debug!(session = %self.id, %mask, "options changed");
        self.options.mask = mask;
    }

    /// Is the given option bit set?
    pub fn is_bit_set(&self, bit: u32) -> bool {
        self.options.mask.is_bit_set(bit)
    }

    /// The stream diagnostics for this session are written to, if one was configured.
    pub fn output(&self) -> Option<StreamId> {
        self.options.output
    }

    //
    // Include stack
    //

    /// The stack of files being read.
    pub fn includes(&self) -> &IncludeStack {
        &self.includes
    }

    /// Pushes an included file. The position must already have been updated to the include directive, whose line
    /// is recorded as the include line of the including file.
    pub fn push_file(&mut self, file_name: AtomId, stream: StreamId) {
        self.includes.push(file_name, stream, self.position.line1);
        debug!(session = %self.id, depth = self.includes.depth(), %stream, "file pushed");
    }

    /// The name of the file being read.
    pub fn current_file(&self) -> AtomId {
        self.includes.current().file_name
    }

    /// The stream of the file being read.
    pub fn current_stream(&self) -> StreamId {
        self.includes.current().stream
    }

    /// The "included from" chain of the file being read, innermost first.
    pub fn include_trace(&self) -> Vec<FileLine> {
        self.includes.include_trace()
    }

    /// The streams of the "included from" chain, innermost first.
    pub fn include_streams(&self) -> Vec<StreamId> {
        self.includes.include_streams()
    }

    /// Records that the tokenizer reached the end of the file being read. The file is popped by the next call to
    /// [Session::advance_past_eof].
    ///
    /// When the master file ends, an active module is ended as if its end directive had been found.
    pub fn eof_reached<H>(&mut self, host: &mut H) -> EofStatus
    where
        H: DirectiveExecutor + AtomTable + ?Sized,
    {
        self.includes.mark_eof();

        if self.includes.is_master_current() {
            let warning = self.modules.assume_end(host);
            return EofStatus { reflect_eof: true, warning };
        }

        EofStatus { reflect_eof: self.is_bit_set(OptionMask::REFLECT_INCLUDE_EOF), warning: None }
    }

    /// Pops every finished included file and returns the stream to read the next term from.
    ///
    /// The counters of each popped file are added to the session's totals. Its stream is closed unless the
    /// [OptionMask::KEEP_INCLUDE_STREAMS] bit is set. The master file is never popped, even once finished.
    pub fn advance_past_eof<S>(&mut self, streams: &mut S) -> Result<StreamId, StreamError>
    where
        S: StreamTable + ?Sized,
    {
        while let Some(file) = self.includes.pop_finished() {
            let counters = streams.counters(file.stream);
            self.popped.chars += counters.char_count;
            self.popped.lines += counters.line_count;

            debug!(session = %self.id, depth = self.includes.depth(), stream = %file.stream, "file popped");

            if !self.is_bit_set(OptionMask::KEEP_INCLUDE_STREAMS) {
                streams.close_stream(file.stream)?;
            }
        }

        Ok(self.current_stream())
    }

    //
    // Position and counters
    //

    /// The lines of the last term read.
    pub fn position(&self) -> LineSpan {
        self.position
    }

    /// Overwrites the lines of the last term read.
    pub fn set_position(&mut self, position: LineSpan) {
        self.position = position;
    }

    /// Updates the position after a term was read: it started on `last_read_line` and ends on the current line of
    /// the stream being read.
    pub fn update_position<S>(&mut self, last_read_line: i32, streams: &S)
    where
        S: StreamTable + ?Sized,
    {
        let counters = streams.counters(self.current_stream());

        let mut line2 = i32::try_from(counters.line_count).unwrap_or(i32::MAX);

        // The term ended mid-line, which is one past the count of completed lines.
        if counters.line_pos > 0 {
            line2 = line2.saturating_add(1);
        }

        self.position = LineSpan::new(last_read_line, line2);
    }

    /// The number of chars and lines read, over the popped files and the files still open.
    pub fn size_counters<S>(&self, streams: &S) -> SizeCounters
    where
        S: StreamTable + ?Sized,
    {
        self.includes.iter().fold(self.popped, |mut totals, file| {
            let counters = streams.counters(file.stream);
            totals.chars += counters.char_count;
            totals.lines += counters.line_count;
            totals
        })
    }

    /// The number of error and warning messages written.
    pub fn error_counters(&self) -> ErrorCounters {
        self.counters
    }

    /// Overwrites the error and warning counters.
    pub fn set_error_counters(&mut self, errors: u32, warnings: u32) {
        self.counters = ErrorCounters { errors, warnings };
    }

    pub(crate) fn count_error(&mut self) {
        self.counters.errors = self.counters.errors.saturating_add(1);
    }

    pub(crate) fn count_warning(&mut self) {
        self.counters.warnings = self.counters.warnings.saturating_add(1);
    }

    //
    // Directives and modules
    //

    /// Applies a directive and records it in the active module's log, or in the top-level log outside any module.
    ///
    /// A directive the host rejects is not recorded.
    pub fn add_directive<E>(&mut self, directive: Directive, exec: &mut E) -> Result<(), DirectiveError>
    where
        E: DirectiveExecutor + ?Sized,
    {
        match self.modules.active_directives_mut() {
            Some(log) => log.record_and_apply(directive, exec),
            None => self.directives.record_and_apply(directive, exec),
        }
    }

    /// The directives read outside any module.
    pub fn top_directives(&self) -> &DirectiveLog {
        &self.directives
    }

    /// The modules found so far.
    pub fn modules(&self) -> &ModuleRegistry {
        &self.modules
    }

    /// The name and phase of the active module.
    pub fn active_module(&self) -> Option<(AtomId, ModulePhase)> {
        self.modules.active().map(|(module, phase)| (module.name(), phase))
    }

    /// Finds a module by name.
    pub fn module(&self, name: AtomId) -> Option<&Module> {
        self.modules.get(name)
    }

    /// Handles a module directive (`phase` is [ModulePhase::Interface]) or a body directive
    /// ([ModulePhase::Body]) read at the current position.
    pub fn start_module<H>(
        &mut self,
        name: AtomId,
        phase: ModulePhase,
        host: &mut H,
    ) -> Result<Vec<ModuleWarning>, DirectiveError>
    where
        H: DirectiveExecutor + AtomTable + ?Sized,
    {
        let at = FileLine::new(self.current_file(), self.position.line1);
        self.modules.start(name, phase, at, host)
    }

    /// Handles an end directive (`end_module` or `end_body`) for the given module.
    pub fn stop_module<H>(&mut self, name: AtomId, phase: ModulePhase, host: &mut H) -> Option<ModuleWarning>
    where
        H: DirectiveExecutor + AtomTable + ?Sized,
    {
        self.modules.stop(name, phase, host)
    }

    //
    // Close
    //

    /// Releases the session: closes its streams and, if [OptionMask::UNDO_DIRECTIVES_AT_CLOSE] is set, undoes the
    /// directives of the active module and then the top-level directives.
    ///
    /// Closing always completes. Individual failures are logged and counted in the returned summary.
    pub(super) fn close<H>(self, host: &mut H) -> CloseSummary
    where
        H: Host + ?Sized,
    {
        let mut summary = CloseSummary::default();
        let id = self.id;
        let undo = self.is_bit_set(OptionMask::UNDO_DIRECTIVES_AT_CLOSE);
        let close_master = self.options.close_master_at_end;

        // Innermost file first; the master file's stream belongs to the caller unless told otherwise.
        for (depth, file) in self.includes.into_files().into_iter().enumerate().rev() {
            if depth == 0 && !close_master {
                continue;
            }

            match host.close_stream(file.stream) {
                Ok(()) => summary.streams_closed += 1,
                Err(err) => {
                    warn!(session = %id, stream = %file.stream, error = %err, "cannot close stream");
                    summary.stream_failures += 1;
                }
            }
        }

        if undo {
            let mut on_error = |err: DirectiveError| {
                warn!(session = %id, error = %err, "cannot undo directive");
                summary.undo_failures += 1;
            };

            if let Some((module, _)) = self.modules.active() {
                module.directives().undo_each(host, &mut on_error);
            }

            self.directives.undo_each(host, &mut on_error);
        }

        debug!(session = %id, modules = self.modules.len(), "session closed");
        summary
    }
}
