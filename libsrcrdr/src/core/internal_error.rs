// Copyright 2025 Neil Henderson, Blue Tarp Media.
//
//! The `internal_error` module defines the [ICE!](crate::ICE) macro, which reports a broken internal invariant of
//! the reader (an "internal consistency error").
//!
//! Mistakes made by the embedding compiler, such as an unknown session handle, are never reported this way; they
//! are returned as errors.

/// Panics with an internal consistency error.
#[macro_export]
macro_rules! ICE {
    ($($arg:tt)*) => {
        std::panic!("SrcRdr ICE: {}", format_args!($($arg)*))
    }
}
