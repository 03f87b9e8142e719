//! Integration tests for the Mach task port
//!
//! These tests require:
//! - Running on macOS (`#[cfg(target_os = "macos")]`)
//! - Special permissions for attaching to foreign processes (sudo or the
//!   debugger entitlement)
//!
//! Attaching to our own process usually works without sudo, so the live
//! tests target ourselves and tolerate a permission refusal.

#![cfg(target_os = "macos")]

use macmem_core::platform::macos::TaskPort;
use macmem_core::{MacmemError, MemoryPort, ProcessId};

#[test]
fn test_open_invalid_pid()
{
    let result = TaskPort::open(ProcessId(u32::MAX));
    assert!(result.is_err());

    match result.unwrap_err() {
        MacmemError::ProcessNotFound(_) | MacmemError::PermissionDenied(_) | MacmemError::Mach(_) => {
            // Expected: the Mach API refuses one way or another
        }
        other => panic!("unexpected error for invalid PID: {other}"),
    }
}

#[test]
fn test_regions_of_own_process()
{
    let pid = ProcessId(std::process::id());
    let port = match TaskPort::open(pid) {
        Ok(port) => port,
        // Hardened runtimes may refuse even task_for_pid(self).
        Err(MacmemError::PermissionDenied(_)) => return,
        Err(other) => panic!("unexpected open failure: {other}"),
    };

    let regions = port.regions().unwrap();
    assert!(!regions.is_empty());

    // Ascending address order, as the engine assumes.
    for pair in regions.windows(2) {
        assert!(pair[0].start <= pair[1].start);
    }
}

#[test]
fn test_read_own_memory()
{
    let pid = ProcessId(std::process::id());
    let port = match TaskPort::open(pid) {
        Ok(port) => port,
        Err(MacmemError::PermissionDenied(_)) => return,
        Err(other) => panic!("unexpected open failure: {other}"),
    };

    // A value at a known address in our own address space.
    let sentinel: u64 = 0xDEAD_BEEF_CAFE_BABE;
    let address = macmem_core::Address::from(&sentinel as *const u64 as u64);

    let bytes = port.read(address, 8).unwrap();
    assert_eq!(bytes, sentinel.to_ne_bytes().to_vec());
}
