// Copyright 2025 Neil Henderson, Blue Tarp Media.
//
//! The `composer` module defines [Composer], which writes the parts of a located message to an output stream.

use crate::core::{AtomId, FileLine, LineSpan, StreamId, Term};
use crate::host::{Host, StreamError};
use crate::source_reader::Session;

use super::{Message, MessageCategory};

/// The "included from" chain written before a message's location.
#[derive(Debug, Copy, Clone)]
pub enum IncludeChain<'a> {
    /// Including files and the lines of their include directives, innermost first.
    Files(&'a [FileLine]),

    /// Entries already built by the caller.
    Terms(&'a [Term]),
}

impl IncludeChain<'_> {
    fn len(&self) -> usize {
        match self {
            IncludeChain::Files(files) => files.len(),
            IncludeChain::Terms(terms) => terms.len(),
        }
    }
}

/// Writes located messages to an output stream.
#[derive(Debug)]
pub struct Composer<'h, H: Host + ?Sized> {
    host: &'h mut H,
    output: StreamId,
}

impl<'h, H: Host + ?Sized> Composer<'h, H> {
    // Continuation lines of the include chain are aligned under the first "from".
    const CHAIN_INDENT: usize = 16;

    /// Creates a composer writing to the given stream, which must be a valid output stream.
    pub fn new(host: &'h mut H, output: StreamId) -> Result<Self, StreamError> {
        host.check_output(output)?;
        Ok(Self { host, output })
    }

    /// The stream being written to.
    pub fn output(&self) -> StreamId {
        self.output
    }

    /// Writes the include chain, if any, on lines of its own, then the `file:lines: ` prefix of the message line.
    ///
    /// `file` is omitted when `None`, and the lines when `lines.line1` is not positive. The trailing `": "` is only
    /// written if something was written on the message line.
    pub fn write_location(
        &mut self,
        chain: IncludeChain<'_>,
        file: Option<AtomId>,
        lines: LineSpan,
    ) -> Result<(), StreamError> {
        for i in 0..chain.len() {
            if i == 0 {
                self.puts("In file included from ")?;
            } else {
                self.puts(&format!(",\n{:indent$} from ", "", indent = Self::CHAIN_INDENT))?;
            }

            match chain {
                IncludeChain::Files(files) => {
                    let entry = format!("{}:{}", self.host.atom_name(files[i].file), files[i].line);
                    self.puts(&entry)?;
                }
                IncludeChain::Terms(terms) => self.host.write_term(self.output, &terms[i])?,
            }
        }

        if chain.len() > 0 {
            self.puts(":\n")?;
        }

        let mut prefix = match file {
            Some(file) => self.host.atom_name(file).to_string(),
            None => String::new(),
        };

        if lines.line1 > 0 {
            prefix.push_str(&format!(":{lines}"));
        }

        if !prefix.is_empty() {
            prefix.push_str(": ");
            self.puts(&prefix)?;
        }

        Ok(())
    }

    /// Writes the message kind and body, and counts the message against the session, if any.
    pub fn write_message_text(
        &mut self,
        session: Option<&mut Session>,
        message: &Message<'_>,
    ) -> Result<(), StreamError> {
        if !message.kind.is_empty() {
            self.puts(&format!("{}: ", message.kind))?;

            if let Some(session) = session {
                match message.category() {
                    MessageCategory::Error => session.count_error(),
                    MessageCategory::Warning => session.count_warning(),
                    MessageCategory::Uncounted => (),
                }
            }
        }

        self.host.format(self.output, message.format, message.args)
    }

    fn puts(&mut self, text: &str) -> Result<(), StreamError> {
        self.host.put_str(self.output, text)
    }
}
