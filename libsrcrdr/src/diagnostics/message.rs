// Copyright 2025 Neil Henderson, Blue Tarp Media.
//
//! The `message` module defines [Message] and [MessageCategory].

use crate::core::Term;

/// The text of a diagnostic message.
#[derive(Debug, Copy, Clone)]
pub struct Message<'a> {
    /// The kind of message, e.g. `warning` or `syntax error`. Written before the body unless empty.
    pub kind: &'a str,

    /// The format string of the body, with its arguments.
    pub format: &'a str,
    pub args: &'a [Term],
}

impl<'a> Message<'a> {
    /// Creates a message.
    pub fn new(kind: &'a str, format: &'a str, args: &'a [Term]) -> Self {
        Self { kind, format, args }
    }

    /// The category the message is counted in.
    pub fn category(&self) -> MessageCategory {
        MessageCategory::of_kind(self.kind)
    }
}

/// Which counter a message increments.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum MessageCategory {
    Error,
    Warning,
    Uncounted,
}

impl MessageCategory {
    /// Classifies a message kind: any kind mentioning `error` or `exception` is an error, otherwise any kind
    /// mentioning `warning` is a warning.
    pub fn of_kind(kind: &str) -> Self {
        if kind.contains("error") || kind.contains("exception") {
            MessageCategory::Error
        } else if kind.contains("warning") {
            MessageCategory::Warning
        } else {
            MessageCategory::Uncounted
        }
    }
}
