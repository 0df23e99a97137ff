// Copyright 2025 Neil Henderson, Blue Tarp Media.

//! Integration tests that replay scenario scripts against a [MemoryHost] and compare the diagnostics written.
//!
//! A script has one command per line. Blank lines and lines starting with `#` are ignored.
//!
//! | Command                         | Effect                                                                    |
//! |---------------------------------|---------------------------------------------------------------------------|
//! | `open FILE [close_master] [bits=N,..]` | Opens a session on FILE and makes it current                       |
//! | `switch N`                      | Makes session N current                                                   |
//! | `close`                         | Closes the current session                                                |
//! | `sessions`                      | Writes the handles of the open sessions                                   |
//! | `read TEXT`                     | Pops finished files, then reads TEXT (`\n` escapes) from the current file |
//! | `next`                          | Pops finished files                                                       |
//! | `term LINE`                     | A term starting at LINE was read                                          |
//! | `include FILE`                  | Includes FILE at the current position                                     |
//! | `eof`                           | The current file ended                                                    |
//! | `module M`, `body M`            | Starts a module interface or body                                         |
//! | `end_module M`, `end_body M`    | Ends a module interface or body                                           |
//! | `op PRIORITY SPEC NAME`         | Records an op/3 directive                                                 |
//! | `flag NAME VALUE`               | Records a set_prolog_flag/2 directive                                     |
//! | `set NAME VALUE`                | Sets a flag in the host without recording it                              |
//! | `message [KIND] \| TEXT`        | Writes a message at the current position                                  |
//! | `expect op NAME SPEC PRIORITY`  | Checks an operator's priority (`none` if undefined)                       |
//! | `expect flag NAME VALUE`        | Checks a flag's value (`none` if unset)                                   |
//! | `expect stream FILE open`       | Checks whether FILE's stream is `open` or `closed`                        |
//!
//! Module warnings and the summary of each close are written to the same output as the messages.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use libsrcrdr::core::{StreamId, Term};
use libsrcrdr::diagnostics::{Message, MessageLocation, write_message};
use libsrcrdr::directive::{Directive, FlagArgs};
use libsrcrdr::host::{AtomTable, FlagStore, MemoryHost, StreamTable};
use libsrcrdr::source_reader::{
    ErrorCounters, ModulePhase, ModuleWarning, OptionMask, Session, SessionId, SessionOptions, SessionTable,
};

// Include the generated test case functions.
include!(concat!(env!("OUT_DIR"), "/generated_scenario_tests.rs"));

fn run_scenario_and_compare(script_filename: &str, expected_errors: u32, expected_warnings: u32) {
    let script = std::fs::read_to_string(script_filename).expect("Cannot read scenario script");

    let mut runner = ScenarioRunner::new();
    for (index, line) in script.lines().enumerate() {
        runner.run_line(index + 1, line);
    }
    let totals = runner.finish();

    let actual = runner.host.output_text(runner.output).to_string();

    let expected_file_path = get_expected_result_file_path(script_filename);
    let expected = std::fs::read_to_string(&expected_file_path).unwrap_or_else(|_| {
        eprintln!("Scenario wrote `{}`", actual);
        panic!("Cannot open file: {}", &expected_file_path);
    });

    if actual != expected {
        eprintln!("Actual:\n`{}`\n\nExpected:\n`{}`", actual, expected);
        assert!(false);
    }

    assert_eq!(totals, ErrorCounters { errors: expected_errors, warnings: expected_warnings });
}

struct ScenarioRunner {
    host: MemoryHost,
    table: SessionTable,
    output: StreamId,
    current: Option<SessionId>,
    streams: HashMap<String, StreamId>,
    totals: ErrorCounters,
}

impl ScenarioRunner {
    fn new() -> Self {
        let mut host = MemoryHost::new();
        let output = host.open_output("scenario_output");

        Self {
            host,
            table: SessionTable::new(),
            output,
            current: None,
            streams: HashMap::new(),
            totals: ErrorCounters::default(),
        }
    }

    fn run_line(&mut self, line_number: usize, line: &str) {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return;
        }

        let (command, rest) = line.split_once(' ').unwrap_or((line, ""));
        let args: Vec<&str> = rest.split_whitespace().collect();

        match command {
            "open" => self.open(&args),
            "switch" => self.current = Some(SessionId(parse(args[0], line_number))),
            "close" => self.close(),
            "sessions" => self.list_sessions(),
            "read" => {
                self.next();
                let stream = self.session().current_stream();
                self.host.read_text(stream, &rest.replace("\\n", "\n"));
            }
            "next" => self.next(),
            "term" => {
                let line = parse(args[0], line_number);
                let id = self.id();
                self.table.session_mut(id).unwrap().update_position(line, &self.host);
            }
            "include" => {
                let stream = self.open_input(args[0]);
                let file = self.host.intern(args[0]);
                let id = self.id();
                self.table.session_mut(id).unwrap().push_file(file, stream);
            }
            "eof" => {
                let id = self.id();
                let status = self.table.session_mut(id).unwrap().eof_reached(&mut self.host);
                if let Some(warning) = status.warning {
                    self.warn(&warning);
                }
            }
            "module" | "body" | "end_module" | "end_body" => self.module_directive(command, args[0]),
            "op" => self.define_op(args[0], args[1], args[2], line_number),
            "flag" => self.set_flag(args[0], args[1]),
            "set" => {
                let flag = Term::Atom(self.host.intern(args[0]));
                let value = Term::Atom(self.host.intern(args[1]));
                self.host.set_flag(&FlagArgs { flag, value }).unwrap();
            }
            "message" => {
                let (kind, text) = rest.split_once('|').expect("Expected `message KIND | TEXT`");
                self.message(kind.trim(), &format!("{}~n", text.trim()));
            }
            "expect" => self.expect(&args, line_number),
            _ => panic!("line {line_number}: unknown command `{command}`"),
        }
    }

    /// Adds up the counters of the sessions still open to those of the closed sessions.
    fn finish(&mut self) -> ErrorCounters {
        for id in self.table.open_sessions() {
            let counters = self.table.session(id).unwrap().error_counters();
            self.totals.errors += counters.errors;
            self.totals.warnings += counters.warnings;
        }
        self.totals
    }

    fn id(&self) -> SessionId {
        self.current.expect("No current session")
    }

    fn session(&self) -> &Session {
        self.table.session(self.id()).unwrap()
    }

    fn open_input(&mut self, file: &str) -> StreamId {
        let stream = self.host.open_input(file);
        self.streams.insert(file.to_string(), stream);
        stream
    }

    fn open(&mut self, args: &[&str]) {
        let stream = self.open_input(args[0]);
        let file = self.host.intern(args[0]);

        let mut options = SessionOptions { output: Some(self.output), ..Default::default() };
        for arg in &args[1..] {
            if *arg == "close_master" {
                options.close_master_at_end = true;
            } else if let Some(bits) = arg.strip_prefix("bits=") {
                let bits: Vec<u32> = bits.split(',').map(|bit| bit.parse().unwrap()).collect();
                options.mask = OptionMask::with_bits(&bits);
            }
        }

        let id = self.table.open(file, stream, options, &self.host).unwrap();
        self.current = Some(id);

        self.host.put_str(self.output, &format!("opened session {id}: {}\n", args[0])).unwrap();
    }

    fn close(&mut self) {
        let id = self.id();

        let counters = self.session().error_counters();
        self.totals.errors += counters.errors;
        self.totals.warnings += counters.warnings;

        let summary = self.table.close(id, &mut self.host).unwrap();
        self.current = None;

        let text = format!(
            "closed session {id}: {} streams closed, {} stream failures, {} undo failures\n",
            summary.streams_closed, summary.stream_failures, summary.undo_failures
        );
        self.host.put_str(self.output, &text).unwrap();
    }

    fn list_sessions(&mut self) {
        let ids: Vec<String> = self.table.open_sessions().map(|id| id.to_string()).collect();
        self.host.put_str(self.output, &format!("open sessions: {}\n", ids.join(" "))).unwrap();
    }

    fn next(&mut self) {
        let id = self.id();
        self.table.session_mut(id).unwrap().advance_past_eof(&mut self.host).unwrap();
    }

    fn module_directive(&mut self, command: &str, name: &str) {
        let id = self.id();
        let name = self.host.intern(name);
        let session = self.table.session_mut(id).unwrap();

        let (phase, starts) = match command {
            "module" => (ModulePhase::Interface, true),
            "body" => (ModulePhase::Body, true),
            "end_module" => (ModulePhase::Interface, false),
            _ => (ModulePhase::Body, false),
        };

        let warnings: Vec<ModuleWarning> = if starts {
            session.start_module(name, phase, &mut self.host).unwrap()
        } else {
            session.stop_module(name, phase, &mut self.host).into_iter().collect()
        };

        for warning in &warnings {
            self.warn(warning);
        }
    }

    fn define_op(&mut self, priority: &str, specifier: &str, name: &str, line_number: usize) {
        let previous = self.host.operator_priority(name, specifier).unwrap_or(0);
        let priority: i64 = parse(priority, line_number);

        let specifier = Term::Atom(self.host.intern(specifier));
        let name = Term::Atom(self.host.intern(name));
        let directive = Directive::op(
            [Term::Integer(priority), specifier.clone(), name.clone()],
            [Term::Integer(previous), specifier, name],
        );

        let id = self.id();
        self.table.session_mut(id).unwrap().add_directive(directive, &mut self.host).unwrap();
    }

    // Undoing restores the previous value, or sets the flag to itself if it had none.
    fn set_flag(&mut self, flag: &str, value: &str) {
        let value = Term::Atom(self.host.intern(value));
        let previous = self.host.flag(flag).cloned().unwrap_or_else(|| value.clone());

        let flag = Term::Atom(self.host.intern(flag));
        let directive = Directive::set_flag([flag.clone(), value], [flag, previous]);

        let id = self.id();
        self.table.session_mut(id).unwrap().add_directive(directive, &mut self.host).unwrap();
    }

    fn warn(&mut self, warning: &ModuleWarning) {
        let args = [Term::Str(warning.to_string())];
        let message = Message::new("warning", "~w~n", &args);
        write_message(&mut self.table, self.current, MessageLocation::Current, &message, &mut self.host).unwrap();
    }

    fn message(&mut self, kind: &str, format: &str) {
        let message = Message::new(kind, format, &[]);
        write_message(&mut self.table, self.current, MessageLocation::Current, &message, &mut self.host).unwrap();
    }

    fn expect(&mut self, args: &[&str], line_number: usize) {
        match args[0] {
            "op" => {
                let actual = self.host.operator_priority(args[1], args[2]);
                let expected = if args[3] == "none" { None } else { Some(parse::<i64>(args[3], line_number)) };
                assert_eq!(actual, expected, "line {line_number}: priority of {} {}", args[1], args[2]);
            }
            "flag" => {
                let actual = self.host.flag(args[1]).map(|value| self.host.render_term(value));
                let expected = if args[2] == "none" { None } else { Some(args[2].to_string()) };
                assert_eq!(actual, expected, "line {line_number}: value of flag {}", args[1]);
            }
            "stream" => {
                let stream = self.streams[args[1]];
                let expected = args[2] == "open";
                assert_eq!(self.host.is_stream_open(stream), expected, "line {line_number}: stream of {}", args[1]);
            }
            _ => panic!("line {line_number}: unknown expectation `{}`", args[0]),
        }
    }
}

fn parse<T: std::str::FromStr>(text: &str, line_number: usize) -> T {
    text.parse().unwrap_or_else(|_| panic!("line {line_number}: cannot parse `{text}`"))
}

fn get_expected_result_file_path(path: &str) -> String {
    let path = Path::new(path).with_extension("txt");
    let filename = path.file_name().unwrap();
    let mut resource_path = PathBuf::from(env!("CARGO_MANIFEST_DIR")); // Only set when using `cargo ...`
    resource_path.push("tests/scenarios/expected");
    resource_path.push(filename);
    resource_path.into_os_string().into_string().expect("Invalid path")
}
