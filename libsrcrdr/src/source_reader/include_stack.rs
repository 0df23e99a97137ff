// Copyright 2025 Neil Henderson, Blue Tarp Media.
//
//! The `include_stack` module defines the [IncludeStack] type, the stack of source files a session is reading.

use crate::ICE;
use crate::core::{AtomId, FileLine, StreamId};

/// A source file on the include stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncludeFile {
    pub file_name: AtomId,
    pub stream: StreamId,
    pub eof_reached: bool,

    /// The line at which this file included the file above it on the stack. Only meaningful while it has a child.
    pub include_line: i32,
}

impl IncludeFile {
    fn new(file_name: AtomId, stream: StreamId) -> Self {
        Self { file_name, stream, eof_reached: false, include_line: 0 }
    }
}

/// The stack of currently open source files.
///
/// The bottom entry is the session's master file and is never popped; the top entry is the file being read.
/// Popping a finished file is deferred until the next read so that trailing diagnostics can still refer to it.
#[derive(Debug, Clone)]
pub struct IncludeStack {
    files: Vec<IncludeFile>, // files[0] is the master file
}

impl IncludeStack {
    /// Creates a stack holding only the master file.
    pub fn new(master_file: AtomId, master_stream: StreamId) -> Self {
        Self { files: vec![IncludeFile::new(master_file, master_stream)] }
    }

    /// The number of open files, including the master file.
    pub fn depth(&self) -> usize {
        self.files.len()
    }

    /// The file being read.
    pub fn current(&self) -> &IncludeFile {
        let Some(file) = self.files.last() else {
            ICE!("Include stack has no master file");
        };
        file
    }

    /// The master file.
    pub fn master(&self) -> &IncludeFile {
        let Some(file) = self.files.first() else {
            ICE!("Include stack has no master file");
        };
        file
    }

    /// Is the master file the one being read?
    pub fn is_master_current(&self) -> bool {
        self.files.len() == 1
    }

    /// Pushes a newly opened included file. `include_line` is recorded on the file that includes it (the current
    /// top), so the caller must have updated the read position to the include directive first.
    pub fn push(&mut self, file_name: AtomId, stream: StreamId, include_line: i32) {
        if let Some(parent) = self.files.last_mut() {
            parent.include_line = include_line;
        }

        self.files.push(IncludeFile::new(file_name, stream));
    }

    /// Marks the file being read as finished. The file stays on the stack.
    pub fn mark_eof(&mut self) {
        let Some(file) = self.files.last_mut() else {
            ICE!("Include stack has no master file");
        };
        file.eof_reached = true;
    }

    /// Pops the file being read if it is finished and is not the master file.
    pub(super) fn pop_finished(&mut self) -> Option<IncludeFile> {
        if self.files.len() > 1 && self.current().eof_reached { self.files.pop() } else { None }
    }

    /// All open files, from the master file to the file being read.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &IncludeFile> {
        self.files.iter()
    }

    /// The files that include the file being read, innermost first, ending with the master file.
    pub fn ancestors(&self) -> impl Iterator<Item = &IncludeFile> {
        let end = self.files.len().saturating_sub(1);
        self.files[..end].iter().rev()
    }

    /// The "included from" chain of the file being read: each including file and the line of its include
    /// directive, innermost first. Empty while the master file is being read.
    pub fn include_trace(&self) -> Vec<FileLine> {
        self.ancestors().map(|file| FileLine::new(file.file_name, file.include_line)).collect()
    }

    /// The streams of the files in [IncludeStack::include_trace], in the same order.
    pub fn include_streams(&self) -> Vec<StreamId> {
        self.ancestors().map(|file| file.stream).collect()
    }

    /// Consumes the stack and returns its files, from the master file to the file being read.
    pub(super) fn into_files(self) -> Vec<IncludeFile> {
        self.files
    }
}
