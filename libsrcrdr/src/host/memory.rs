// Copyright 2025 Neil Henderson, Blue Tarp Media.
//
//! The `memory` module defines [MemoryHost], an in-memory implementation of every host trait.

use std::collections::HashMap;

use crate::core::{AtomId, Interner, StreamCounters, StreamId, Term};
use crate::directive::{CharConversionArgs, DirectiveError, DirectiveKind, FlagArgs, OpArgs};

use super::{
    AtomTable, CharConversionTable, FlagStore, MessageFormatter, OperatorTable, StreamError, StreamTable,
    TermWriter,
};

const MAX_OP_PRIORITY: i64 = 1200;
const OP_SPECIFIERS: [&str; 7] = ["xfx", "xfy", "yfx", "fy", "fx", "xf", "yf"];

/// A directive effect that [MemoryHost] applied, recorded in application order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppliedEffect {
    Op { priority: i64, specifier: AtomId, operator: AtomId },
    SetFlag { flag: AtomId, value: Term },
    CharConversion { in_char: char, out_char: char },
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum StreamMode {
    Input,
    Output,
}

#[derive(Debug)]
struct MemoryStream {
    name: AtomId,
    mode: StreamMode,
    open: bool,
    text: String, // Output streams only
    counters: StreamCounters,
}

impl MemoryStream {
    fn advance(&mut self, text: &str) {
        for c in text.chars() {
            self.counters.char_count += 1;

            if c == '\n' {
                self.counters.line_count += 1;
                self.counters.line_pos = 0;
            } else {
                self.counters.line_pos += 1;
            }
        }
    }
}

/// An in-memory host.
///
/// Input streams do not hold text; the embedding tool calls [MemoryHost::read_text] to advance their counters as if
/// the text had been consumed by the tokenizer. Output streams capture everything written to them.
///
/// # Examples
///
/// ```
/// # use libsrcrdr::host::{MemoryHost, StreamTable};
/// let mut host = MemoryHost::new();
/// let input = host.open_input("main.pl");
/// host.read_text(input, ":- module(m).\n");
/// assert_eq!(host.counters(input).line_count, 1);
/// ```
#[derive(Debug)]
pub struct MemoryHost {
    atoms: Interner,
    streams: Vec<MemoryStream>,
    user_output: StreamId,
    operators: HashMap<(AtomId, AtomId), i64>, // (operator, specifier) -> priority
    flags: HashMap<AtomId, Term>,
    char_conversions: HashMap<char, char>,
    effects: Vec<AppliedEffect>,
}

impl Default for MemoryHost {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryHost {
    /// Creates a host with a single open output stream, `user_output`.
    pub fn new() -> Self {
        let mut host = Self {
            atoms: Interner::new(),
            streams: Vec::new(),
            user_output: StreamId(0),
            operators: HashMap::new(),
            flags: HashMap::new(),
            char_conversions: HashMap::new(),
            effects: Vec::new(),
        };

        host.user_output = host.open_output("user_output");
        host
    }

    /// The host's interner.
    pub fn atoms(&self) -> &Interner {
        &self.atoms
    }

    /// Opens an input stream for the named file.
    pub fn open_input(&mut self, name: &str) -> StreamId {
        self.add_stream(name, StreamMode::Input)
    }

    /// Opens an output stream that captures everything written to it.
    pub fn open_output(&mut self, name: &str) -> StreamId {
        self.add_stream(name, StreamMode::Output)
    }

    /// Advances an input stream's counters as if `text` had been read from it.
    pub fn read_text(&mut self, stream: StreamId, text: &str) {
        if let Some(s) = self.streams.get_mut(stream.0 as usize) {
            s.advance(text);
        }
    }

    /// The text captured by an output stream.
    pub fn output_text(&self, stream: StreamId) -> &str {
        self.streams.get(stream.0 as usize).map(|s| s.text.as_str()).unwrap_or("")
    }

    /// The name the stream was opened with.
    pub fn stream_name(&self, stream: StreamId) -> &str {
        self.streams.get(stream.0 as usize).map(|s| self.atom_name(s.name)).unwrap_or("")
    }

    /// Is the stream open?
    pub fn is_stream_open(&self, stream: StreamId) -> bool {
        self.streams.get(stream.0 as usize).is_some_and(|s| s.open)
    }

    /// The priority of the operator with the given name and specifier, if it is defined.
    pub fn operator_priority(&self, operator: &str, specifier: &str) -> Option<i64> {
        let operator = self.atoms.find(operator)?;
        let specifier = self.atoms.find(specifier)?;
        self.operators.get(&(operator, specifier)).copied()
    }

    /// The value of the named flag, if it was set.
    pub fn flag(&self, flag: &str) -> Option<&Term> {
        let flag = self.atoms.find(flag)?;
        self.flags.get(&flag)
    }

    /// The character that `in_char` is converted to, if a conversion is in place.
    pub fn char_conversion(&self, in_char: char) -> Option<char> {
        self.char_conversions.get(&in_char).copied()
    }

    /// Every directive effect applied so far, in application order.
    pub fn effects(&self) -> &[AppliedEffect] {
        &self.effects
    }

    /// Forgets the recorded effects, keeping the tables as they are.
    pub fn clear_effects(&mut self) {
        self.effects.clear();
    }

    /// Renders a term the way [TermWriter::write_term] writes it.
    pub fn render_term(&self, term: &Term) -> String {
        let mut text = String::new();
        self.render_into(term, &mut text);
        text
    }

    fn render_into(&self, term: &Term, text: &mut String) {
        match term {
            Term::Atom(atom) => text.push_str(self.atom_name(*atom)),
            Term::Integer(value) => text.push_str(&value.to_string()),
            Term::Char(c) => text.push(*c),
            Term::Str(s) => text.push_str(s),
            Term::Compound { functor, args } => {
                let name = self.atom_name(*functor);

                // Written infix, e.g. an include chain entry `file:line`.
                if name == ":" && args.len() == 2 {
                    self.render_into(&args[0], text);
                    text.push(':');
                    self.render_into(&args[1], text);
                    return;
                }

                text.push_str(name);
                text.push('(');
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        text.push(',');
                    }
                    self.render_into(arg, text);
                }
                text.push(')');
            }
        }
    }

    fn add_stream(&mut self, name: &str, mode: StreamMode) -> StreamId {
        let name = self.atoms.intern(name);
        let id = StreamId(self.streams.len() as u32);

        self.streams.push(MemoryStream {
            name,
            mode,
            open: true,
            text: String::new(),
            counters: StreamCounters::default(),
        });

        id
    }

    fn output_stream_mut(&mut self, stream: StreamId) -> Result<&mut MemoryStream, StreamError> {
        self.check_output(stream)?;
        Ok(&mut self.streams[stream.0 as usize])
    }
}

impl AtomTable for MemoryHost {
    fn intern(&mut self, name: &str) -> AtomId {
        self.atoms.intern(name)
    }

    fn atom_name(&self, atom: AtomId) -> &str {
        self.atoms.name(atom).unwrap_or("")
    }
}

impl StreamTable for MemoryHost {
    fn counters(&self, stream: StreamId) -> StreamCounters {
        self.streams.get(stream.0 as usize).map(|s| s.counters).unwrap_or_default()
    }

    fn close_stream(&mut self, stream: StreamId) -> Result<(), StreamError> {
        let s = self.streams.get_mut(stream.0 as usize).ok_or(StreamError::UnknownStream(stream))?;

        if !s.open {
            return Err(StreamError::Closed(stream));
        }

        s.open = false;
        Ok(())
    }

    fn standard_output(&self) -> StreamId {
        self.user_output
    }

    fn check_output(&self, stream: StreamId) -> Result<(), StreamError> {
        let s = self.streams.get(stream.0 as usize).ok_or(StreamError::UnknownStream(stream))?;

        if s.mode != StreamMode::Output {
            return Err(StreamError::NotOutput(stream));
        }

        if !s.open {
            return Err(StreamError::Closed(stream));
        }

        Ok(())
    }

    fn put_str(&mut self, stream: StreamId, text: &str) -> Result<(), StreamError> {
        let s = self.output_stream_mut(stream)?;
        s.text.push_str(text);
        s.advance(text);
        Ok(())
    }
}

impl OperatorTable for MemoryHost {
    /// Defines an operator, or removes it when the priority is 0.
    fn define_op(&mut self, args: &OpArgs) -> Result<(), DirectiveError> {
        let reject = |reason: &str| DirectiveError::rejected(DirectiveKind::Op, reason);

        let priority = args.priority.as_integer().ok_or_else(|| reject("priority must be an integer"))?;
        if !(0..=MAX_OP_PRIORITY).contains(&priority) {
            return Err(reject("priority must be between 0 and 1200"));
        }

        let specifier = args.specifier.as_atom().ok_or_else(|| reject("specifier must be an atom"))?;
        if !OP_SPECIFIERS.contains(&self.atom_name(specifier)) {
            return Err(reject("unknown operator specifier"));
        }

        let operator = args.operator.as_atom().ok_or_else(|| reject("operator must be an atom"))?;

        if priority == 0 {
            self.operators.remove(&(operator, specifier));
        } else {
            self.operators.insert((operator, specifier), priority);
        }

        self.effects.push(AppliedEffect::Op { priority, specifier, operator });
        Ok(())
    }
}

impl FlagStore for MemoryHost {
    fn set_flag(&mut self, args: &FlagArgs) -> Result<(), DirectiveError> {
        let flag = args
            .flag
            .as_atom()
            .ok_or_else(|| DirectiveError::rejected(DirectiveKind::SetFlag, "flag must be an atom"))?;

        self.flags.insert(flag, args.value.clone());

        self.effects.push(AppliedEffect::SetFlag { flag, value: args.value.clone() });
        Ok(())
    }
}

impl CharConversionTable for MemoryHost {
    /// Converts `in_char` to `out_char`, or removes the conversion when they are the same character.
    fn convert_char(&mut self, args: &CharConversionArgs) -> Result<(), DirectiveError> {
        let reject = |reason: &str| DirectiveError::rejected(DirectiveKind::CharConversion, reason);

        let in_char = args.in_char.as_char().ok_or_else(|| reject("input must be a character"))?;
        let out_char = args.out_char.as_char().ok_or_else(|| reject("output must be a character"))?;

        if in_char == out_char {
            self.char_conversions.remove(&in_char);
        } else {
            self.char_conversions.insert(in_char, out_char);
        }

        self.effects.push(AppliedEffect::CharConversion { in_char, out_char });
        Ok(())
    }
}

impl TermWriter for MemoryHost {
    fn write_term(&mut self, stream: StreamId, term: &Term) -> Result<(), StreamError> {
        let text = self.render_term(term);
        self.put_str(stream, &text)
    }
}

impl MessageFormatter for MemoryHost {
    /// Supports the directives `~w`, `~a`, `~p` and `~d` (the next argument), `~n` (newline) and `~~` (tilde).
    /// Any other directive is written verbatim, and a directive with no argument left writes nothing.
    fn format(&mut self, stream: StreamId, format: &str, args: &[Term]) -> Result<(), StreamError> {
        let mut text = String::new();
        let mut args = args.iter();
        let mut chars = format.chars();

        while let Some(c) = chars.next() {
            if c != '~' {
                text.push(c);
                continue;
            }

            match chars.next() {
                Some('w' | 'a' | 'p' | 'd') => {
                    if let Some(arg) = args.next() {
                        self.render_into(arg, &mut text);
                    }
                }
                Some('n') => text.push('\n'),
                Some('~') => text.push('~'),
                Some(other) => {
                    text.push('~');
                    text.push(other);
                }
                None => text.push('~'),
            }
        }

        self.put_str(stream, &text)
    }
}
