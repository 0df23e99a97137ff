// Copyright 2025 Neil Henderson, Blue Tarp Media.
//
//! The `options` module defines the options of a reading session.

use std::fmt;

use crate::core::StreamId;

/// Options that control a reading session's behavior.
#[derive(Debug, Default, Clone)]
pub struct SessionOptions {
    /// Option bits, see [OptionMask].
    pub mask: OptionMask,

    /// Close the master file's stream when the session is closed.
    pub close_master_at_end: bool,

    /// Where diagnostics are written. The host's standard output is used if `None`.
    pub output: Option<StreamId>,
}

/// The option bits of a reading session.
///
/// The embedding compiler is free to use the bits not named here for its own purposes; the session only stores
/// them and answers [OptionMask::is_bit_set].
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct OptionMask(pub u32);

impl OptionMask {
    /// Keep an included file's stream open when the file is popped from the include stack.
    pub const KEEP_INCLUDE_STREAMS: u32 = 16;

    /// Report the end of an included file to the caller as end-of-file.
    pub const REFLECT_INCLUDE_EOF: u32 = 17;

    /// Undo the top-level directives and those of the active module when the session is closed.
    pub const UNDO_DIRECTIVES_AT_CLOSE: u32 = 18;

    /// Creates a mask with the given bits set.
    pub fn with_bits(bits: &[u32]) -> Self {
        bits.iter().fold(OptionMask(0), |mask, &bit| mask.set_bit(bit))
    }

    /// Is the given bit set? Bits outside the mask are never set.
    pub fn is_bit_set(&self, bit: u32) -> bool {
        bit < u32::BITS && self.0 & (1 << bit) != 0
    }

    /// Returns a copy of the mask with the given bit set.
    pub fn set_bit(self, bit: u32) -> Self {
        if bit >= u32::BITS {
            return self;
        }
        OptionMask(self.0 | (1 << bit))
    }
}

impl fmt::Display for OptionMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}
