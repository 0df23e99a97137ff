// Copyright 2025 Neil Henderson, Blue Tarp Media.

//! Integration tests for opening, enumerating and closing reading sessions.

use assert_matches::assert_matches;

use libsrcrdr::core::{LineSpan, Term};
use libsrcrdr::directive::Directive;
use libsrcrdr::host::{AtomTable, MemoryHost};
use libsrcrdr::source_reader::{ModulePhase, ReaderError, SessionId, SessionOptions, SessionTable};

fn open(table: &mut SessionTable, host: &mut MemoryHost, file: &str) -> SessionId {
    let stream = host.open_input(file);
    let file = host.intern(file);
    table.open(file, stream, SessionOptions::default(), &*host).unwrap()
}

#[test]
fn nested_compile_restores_outer_handle() {
    let mut host = MemoryHost::new();
    let mut table = SessionTable::new();

    let outer = open(&mut table, &mut host, "main.pl");
    let mut current = outer;

    table.activate(current).unwrap().set_position(LineSpan::single(4));

    // A directive in main.pl compiles another file, then carries on reading main.pl.
    let saved = current;
    current = open(&mut table, &mut host, "helper.pl");
    table.activate(current).unwrap().set_position(LineSpan::single(40));
    table.close(current, &mut host).unwrap();
    current = saved;

    let session = table.activate(current).unwrap();
    assert_eq!(session.id(), outer);
    assert_eq!(session.position(), LineSpan::single(4));
}

#[test]
fn reused_handle_starts_fresh() {
    let mut host = MemoryHost::new();
    let mut table = SessionTable::new();

    let id = open(&mut table, &mut host, "main.pl");
    let m = host.intern("m");
    let flag = Term::Atom(host.intern("unknown"));
    let (error, fail) = (Term::Atom(host.intern("error")), Term::Atom(host.intern("fail")));

    let session = table.session_mut(id).unwrap();
    session.start_module(m, ModulePhase::Interface, &mut host).unwrap();
    session.stop_module(m, ModulePhase::Interface, &mut host);
    session.add_directive(Directive::set_flag([flag.clone(), fail], [flag, error]), &mut host).unwrap();
    session.set_error_counters(2, 3);

    table.close(id, &mut host).unwrap();
    assert_matches!(table.session(id), Err(ReaderError::UnknownSession(_)));

    let reused = open(&mut table, &mut host, "other.pl");
    assert_eq!(reused, id);

    let session = table.session(reused).unwrap();
    assert!(session.modules().is_empty());
    assert!(session.top_directives().is_empty());
    assert_eq!(session.error_counters().errors, 0);
    assert_eq!(session.error_counters().warnings, 0);
    assert_eq!(session.current_file(), host.intern("other.pl"));
}

#[test]
fn enumeration_walks_open_sessions_in_order() {
    let mut host = MemoryHost::new();
    let mut table = SessionTable::new();

    for i in 0..10 {
        open(&mut table, &mut host, &format!("f{i}.pl"));
    }
    for i in [0, 4, 5, 9] {
        table.close(SessionId(i), &mut host).unwrap();
    }

    let mut found = Vec::new();
    let mut next = table.first_open_session();
    while let Some(m) = next {
        found.push(m.id.0);
        next = m.resume.and_then(|cursor| table.next_open_session(cursor));
    }

    assert_eq!(found, vec![1, 2, 3, 6, 7, 8]);
    assert_eq!(table.open_sessions().map(|id| id.0).collect::<Vec<_>>(), found);
    assert_eq!(table.highest_open_id(), Some(SessionId(8)));
}

#[test]
fn every_operation_rejects_unknown_handles() {
    let mut host = MemoryHost::new();
    let mut table = SessionTable::new();

    let id = SessionId(3);
    assert!(!table.is_open(id));
    assert_matches!(table.check(id), Err(ReaderError::UnknownSession(SessionId(3))));
    assert_matches!(table.session(id), Err(ReaderError::UnknownSession(_)));
    assert_matches!(table.session_mut(id), Err(ReaderError::UnknownSession(_)));
    assert_matches!(table.activate(id), Err(ReaderError::UnknownSession(_)));
    assert_matches!(table.close(id, &mut host), Err(ReaderError::UnknownSession(_)));
}
