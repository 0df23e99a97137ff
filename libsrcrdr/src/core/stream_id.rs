// Copyright 2025 Neil Henderson, Blue Tarp Media.
//
//! The `stream_id` module defines [StreamId] and [StreamCounters].

use std::fmt;

/// The handle of a stream owned by the embedding compiler's stream table.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StreamId(pub u32);

impl fmt::Display for StreamId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "'$stream'({})", self.0)
    }
}

/// The running counters of a stream.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct StreamCounters {
    pub char_count: i64,
    pub line_count: i64,
    pub line_pos: i64, // Column within the current line; 0 at the start of a line.
}
