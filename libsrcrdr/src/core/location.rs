// Copyright 2025 Neil Henderson, Blue Tarp Media.
//
//! The `location` module defines [FileLine] and [LineSpan], the positions recorded by a reading session.

use std::fmt;

use super::AtomId;

/// A line in a named source file.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct FileLine {
    pub file: AtomId,
    pub line: i32,
}

impl FileLine {
    /// Creates a new file/line pair.
    pub fn new(file: AtomId, line: i32) -> Self {
        Self { file, line }
    }
}

/// The lines spanned by the last term read.
///
/// `line1` is the line where the term starts. A positive `line2` is the line where the term ends. A negative
/// `line2` is instead a column on `line1`, written as `line1:column` in diagnostics.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct LineSpan {
    pub line1: i32,
    pub line2: i32,
}

impl LineSpan {
    /// Creates a new span.
    pub fn new(line1: i32, line2: i32) -> Self {
        Self { line1, line2 }
    }

    /// Creates a span covering a single line.
    pub fn single(line: i32) -> Self {
        Self { line1: line, line2: line }
    }

    /// Creates a span for a column on a line.
    pub fn column(line: i32, column: i32) -> Self {
        Self { line1: line, line2: -column }
    }
}

impl fmt::Display for LineSpan {
    /// Writes the span as `line1`, `line1--line2` or `line1:column`. Nothing is written if `line1` is not positive.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.line1 <= 0 {
            return Ok(());
        }

        write!(f, "{}", self.line1)?;

        if self.line2 != self.line1 {
            if self.line2 > 0 {
                write!(f, "--{}", self.line2)?;
            } else {
                write!(f, ":{}", self.line2.unsigned_abs())?;
            }
        }

        Ok(())
    }
}
