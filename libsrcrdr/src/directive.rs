// Copyright 2025 Neil Henderson, Blue Tarp Media.
//
//! The `directive` module defines the side-effecting compiler directives a reading session records, and the
//! [DirectiveLog] that applies them and later undoes them.
//!
//! A directive takes effect the moment it is read: its `apply` arguments are handed to the operator table, the
//! flag store or the character-conversion table. The paired `undo` arguments restore what was there before. Undoing
//! a log runs the `undo` arguments in reverse recording order, so a redefinition that shadowed an earlier one is
//! restored before the earlier one is itself undone.

mod log;


use std::fmt;

use thiserror::Error;

use crate::core::Term;
use crate::host::DirectiveExecutor;

pub use log::DirectiveLog;

/// The arguments of an operator definition: `op(Priority, Specifier, Operator)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpArgs {
    pub priority: Term,
    pub specifier: Term,
    pub operator: Term,
}

/// The arguments of a flag change: `set_prolog_flag(Flag, Value)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagArgs {
    pub flag: Term,
    pub value: Term,
}

/// The arguments of a character conversion: `char_conversion(InChar, OutChar)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharConversionArgs {
    pub in_char: Term,
    pub out_char: Term,
}

/// A recorded directive together with the arguments that apply it and the arguments that undo it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    Op { apply: OpArgs, undo: OpArgs },
    SetFlag { apply: FlagArgs, undo: FlagArgs },
    CharConversion { apply: CharConversionArgs, undo: CharConversionArgs },
}

/// The kind of a directive.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum DirectiveKind {
    Op,
    SetFlag,
    CharConversion,
}

impl fmt::Display for DirectiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DirectiveKind::Op => write!(f, "op/3"),
            DirectiveKind::SetFlag => write!(f, "set_prolog_flag/2"),
            DirectiveKind::CharConversion => write!(f, "char_conversion/2"),
        }
    }
}

/// Which set of a directive's arguments to execute.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Direction {
    Apply,
    Undo,
}

/// An error returned by a collaborator that refused a directive's arguments.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DirectiveError {
    #[error("{directive} rejected: {reason}")]
    Rejected { directive: DirectiveKind, reason: String },
}

impl DirectiveError {
    /// Creates a rejection error for the given kind of directive.
    pub fn rejected(directive: DirectiveKind, reason: impl Into<String>) -> Self {
        DirectiveError::Rejected { directive, reason: reason.into() }
    }
}

impl Directive {
    /// Creates an operator definition directive.
    ///
    /// `apply` and `undo` are `[priority, specifier, operator]`.
    pub fn op(apply: [Term; 3], undo: [Term; 3]) -> Self {
        let [priority, specifier, operator] = apply;
        let apply = OpArgs { priority, specifier, operator };

        let [priority, specifier, operator] = undo;
        let undo = OpArgs { priority, specifier, operator };

        Directive::Op { apply, undo }
    }

    /// Creates a flag change directive.
    ///
    /// `apply` and `undo` are `[flag, value]`.
    pub fn set_flag(apply: [Term; 2], undo: [Term; 2]) -> Self {
        let [flag, value] = apply;
        let apply = FlagArgs { flag, value };

        let [flag, value] = undo;
        let undo = FlagArgs { flag, value };

        Directive::SetFlag { apply, undo }
    }

    /// Creates a character conversion directive.
    ///
    /// `apply` and `undo` are `[in_char, out_char]`.
    pub fn char_conversion(apply: [Term; 2], undo: [Term; 2]) -> Self {
        let [in_char, out_char] = apply;
        let apply = CharConversionArgs { in_char, out_char };

        let [in_char, out_char] = undo;
        let undo = CharConversionArgs { in_char, out_char };

        Directive::CharConversion { apply, undo }
    }

    /// The kind of directive.
    pub fn kind(&self) -> DirectiveKind {
        match self {
            Directive::Op { .. } => DirectiveKind::Op,
            Directive::SetFlag { .. } => DirectiveKind::SetFlag,
            Directive::CharConversion { .. } => DirectiveKind::CharConversion,
        }
    }

    /// Executes the directive's `apply` or `undo` arguments against the collaborator that owns its effect.
    pub fn execute<E>(&self, direction: Direction, exec: &mut E) -> Result<(), DirectiveError>
    where
        E: DirectiveExecutor + ?Sized,
    {
        match self {
            Directive::Op { apply, undo } => exec.define_op(select(direction, apply, undo)),
            Directive::SetFlag { apply, undo } => exec.set_flag(select(direction, apply, undo)),
            Directive::CharConversion { apply, undo } => exec.convert_char(select(direction, apply, undo)),
        }
    }
}

fn select<'a, T>(direction: Direction, apply: &'a T, undo: &'a T) -> &'a T {
    match direction {
        Direction::Apply => apply,
        Direction::Undo => undo,
    }
}
