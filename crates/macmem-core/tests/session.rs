//! Tests for the session façade: lifecycle, address operations, watch, and
//! result persistence.

mod common;

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use common::FakePort;
use macmem_core::{Address, CompareOp, MacmemError, ProcessId, Session, ValueType, WatchUpdate};

fn attached_session(port: FakePort) -> Session
{
    let mut session = Session::new();
    session
        .attach_with_port(ProcessId(4242), "fake-target".to_string(), Box::new(port))
        .unwrap();
    session
}

fn port_with_int(address: u64, value: i32) -> FakePort
{
    let mut data = vec![0xAAu8; 0x100];
    data[(address & 0xff) as usize..(address & 0xff) as usize + 4].copy_from_slice(&value.to_ne_bytes());
    let mut port = FakePort::new();
    port.add_region(address & !0xff, "rw-", data);
    port
}

#[test]
fn test_detached_operations_fail_without_side_effects()
{
    let mut session = Session::new();
    let cancel = AtomicBool::new(true);

    assert!(matches!(session.info(), Err(MacmemError::NotAttached)));
    assert!(matches!(session.regions(), Err(MacmemError::NotAttached)));
    assert!(matches!(session.refresh_regions(), Err(MacmemError::NotAttached)));
    assert!(matches!(
        session.first_scan(ValueType::Int, "1", CompareOp::Eq),
        Err(MacmemError::NotAttached)
    ));
    assert!(matches!(
        session.next_scan(ValueType::Int, "1", CompareOp::Eq),
        Err(MacmemError::NotAttached)
    ));
    assert!(matches!(session.results(20), Err(MacmemError::NotAttached)));
    assert!(matches!(
        session.read_value(Address::from(0x1000), ValueType::Int),
        Err(MacmemError::NotAttached)
    ));
    assert!(matches!(
        session.write_value(Address::from(0x1000), ValueType::Int, "1"),
        Err(MacmemError::NotAttached)
    ));
    assert!(matches!(
        session.watch(Address::from(0x1000), ValueType::Int, Duration::ZERO, &cancel, |_| {}),
        Err(MacmemError::NotAttached)
    ));
    assert!(matches!(
        session.save(std::path::Path::new("/nonexistent/results.txt")),
        Err(MacmemError::NotAttached)
    ));

    // Still cleanly detached afterwards.
    assert!(!session.is_attached());
    assert_eq!(session.detach(), None);
}

#[test]
fn test_attach_populates_target_state()
{
    let mut port = FakePort::new();
    port.add_region(0x1000, "rw-", vec![0u8; 0x100]);
    port.add_region(0x2000, "r-x", vec![0u8; 0x200]);

    let session = attached_session(port);

    assert!(session.is_attached());
    let (pid, name) = session.attached_process().unwrap();
    assert_eq!(pid, ProcessId(4242));
    assert_eq!(name, "fake-target");

    let info = session.info().unwrap();
    assert_eq!(info.region_count, 2);
    assert_eq!(info.result_count, 0);
    assert_eq!(info.mapped_bytes, 0x300);
}

#[test]
fn test_attach_twice_is_rejected()
{
    let mut session = attached_session(FakePort::new());

    let result = session.attach_with_port(ProcessId(1), "other".to_string(), Box::new(FakePort::new()));
    assert!(matches!(result, Err(MacmemError::AlreadyAttached(4242))));

    // The original attachment is untouched.
    assert_eq!(session.attached_process().unwrap().0, ProcessId(4242));
}

#[test]
fn test_detach_clears_scan_state()
{
    let mut session = attached_session(port_with_int(0x1010, 100));
    session.first_scan(ValueType::Int, "100", CompareOp::Eq).unwrap();
    assert_eq!(session.results(20).unwrap().1, 1);

    assert_eq!(session.detach(), Some(ProcessId(4242)));
    assert!(!session.is_attached());
    assert!(matches!(session.results(20), Err(MacmemError::NotAttached)));
}

#[test]
fn test_write_then_read_round_trip()
{
    // S4: write 999 at a writable address, read it back.
    let mut session = attached_session(port_with_int(0x1010, 0));

    let written = session
        .write_value(Address::from(0x1010), ValueType::Int, "999")
        .unwrap();
    assert_eq!(written, 4);

    let rendered = session.read_value(Address::from(0x1010), ValueType::Int).unwrap();
    assert_eq!(rendered, "999");
}

#[test]
fn test_write_rejects_unwritable_region()
{
    let mut data = vec![0u8; 0x100];
    data[0] = 1;
    let mut port = FakePort::new();
    port.add_region(0x1000, "r--", data);

    let mut session = attached_session(port);
    let result = session.write_value(Address::from(0x1000), ValueType::Byte, "2");
    assert!(matches!(result, Err(MacmemError::Unwritable(_))));
}

#[test]
fn test_read_unmapped_address()
{
    let session = attached_session(FakePort::new());
    let result = session.read_value(Address::from(0xdead_0000), ValueType::Int);
    assert!(matches!(result, Err(MacmemError::Unreadable(_))));
}

#[test]
fn test_scan_through_session()
{
    let mut session = attached_session(port_with_int(0x1010, 100));

    let outcome = session.first_scan(ValueType::Int, "100", CompareOp::Eq).unwrap();
    assert_eq!(outcome.matches, 1);

    let (rows, total) = session.results(20).unwrap();
    assert_eq!(total, 1);
    assert_eq!(rows[0].address, Address::from(0x1010));
    assert_eq!(rows[0].rendered, "100");
}

#[test]
fn test_watch_reports_initial_and_changes()
{
    let port = port_with_int(0x1010, 100);
    let memory = port.memory();
    let session = attached_session(port);

    let cancel = AtomicBool::new(false);
    let mut updates = Vec::new();

    let changes = session
        .watch(
            Address::from(0x1010),
            ValueType::Int,
            Duration::ZERO,
            &cancel,
            |update| {
                match &update {
                    WatchUpdate::Initial(_) => {
                        // The "target" moves after the baseline is taken.
                        memory.poke(0x1010, &250i32.to_ne_bytes());
                    }
                    WatchUpdate::Changed { .. } => {
                        cancel.store(true, Ordering::SeqCst);
                    }
                }
                updates.push(update);
            },
        )
        .unwrap();

    assert_eq!(changes, 1);
    assert_eq!(updates.len(), 2);
    assert_eq!(updates[0], WatchUpdate::Initial("100".to_string()));
    assert_eq!(
        updates[1],
        WatchUpdate::Changed {
            sequence: 1,
            old: "100".to_string(),
            new: "250".to_string(),
        }
    );
}

#[test]
fn test_watch_surfaces_read_failure()
{
    let port = port_with_int(0x1010, 100);
    let memory = port.memory();
    let session = attached_session(port);

    let cancel = AtomicBool::new(false);
    let result = session.watch(
        Address::from(0x1010),
        ValueType::Int,
        Duration::ZERO,
        &cancel,
        |update| {
            if matches!(update, WatchUpdate::Initial(_)) {
                memory.unmap(0x1000);
            }
        },
    );

    assert!(matches!(result, Err(MacmemError::Unreadable(_))));
}

#[test]
fn test_watch_honors_pre_set_cancel()
{
    let session = attached_session(port_with_int(0x1010, 100));

    let cancel = AtomicBool::new(true);
    let changes = session
        .watch(Address::from(0x1010), ValueType::Int, Duration::ZERO, &cancel, |_| {})
        .unwrap();

    assert_eq!(changes, 0);
}

#[test]
fn test_save_load_round_trip()
{
    let mut session = attached_session(port_with_int(0x1010, 100));
    session.first_scan(ValueType::Int, "100", CompareOp::Eq).unwrap();

    let path = std::env::temp_dir().join(format!("macmem-session-test-{}.txt", std::process::id()));
    let saved = session.save(&path).unwrap();
    assert_eq!(saved, 1);

    let before: Vec<_> = session.results(20).unwrap().0.to_vec();

    // Clobber the result set, then restore it from disk.
    session.detach();
    let mut session = attached_session(port_with_int(0x1010, 100));
    let loaded = session.load(&path).unwrap();
    assert_eq!(loaded, 1);

    let after = session.results(20).unwrap().0.to_vec();
    assert_eq!(after, before);

    let _ = std::fs::remove_file(&path);
}

#[test]
fn test_load_rejects_malformed_file()
{
    let path = std::env::temp_dir().join(format!("macmem-bad-results-{}.txt", std::process::id()));
    std::fs::write(&path, "# header\nnot,a,valid,line\n").unwrap();

    let mut session = attached_session(FakePort::new());
    let result = session.load(&path);
    assert!(matches!(result, Err(MacmemError::MalformedResults(_))));

    let _ = std::fs::remove_file(&path);
}

#[test]
fn test_loaded_results_feed_next_scan()
{
    // A loaded set can be refined like a scanned one.
    let port = port_with_int(0x1010, 100);
    let memory = port.memory();
    let mut session = attached_session(port);
    session.first_scan(ValueType::Int, "100", CompareOp::Eq).unwrap();

    let path = std::env::temp_dir().join(format!("macmem-reload-test-{}.txt", std::process::id()));
    session.save(&path).unwrap();
    session.load(&path).unwrap();

    memory.poke(0x1010, &5i32.to_ne_bytes());
    let outcome = session.next_scan(ValueType::Int, "x", CompareOp::Changed).unwrap();
    assert_eq!(outcome.matches, 1);
    assert_eq!(session.results(20).unwrap().0[0].rendered, "5");

    let _ = std::fs::remove_file(&path);
}
