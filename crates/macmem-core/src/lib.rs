//! # macmem-core
//!
//! Process memory scanning, reading, and writing primitives for macmem.
//!
//! This crate provides the scanner's engine room:
//! - Attaching to a target process and enumerating its memory regions
//! - Typed first-scan and refinement (next-scan) over those regions
//! - Single-address read, write, and watch operations
//! - Persistence of scan result sets
//!
//! ## Platform Support
//!
//! The OS boundary is the [`port::MemoryPort`] trait. The only
//! implementation ships in `platform/macos` and uses Mach task ports
//! (`task_for_pid`, `mach_vm_read_overwrite`, `mach_vm_write`,
//! `mach_vm_region`). Everything above the trait is platform-agnostic and is
//! exercised against fake ports in the test suite, so the crate builds and
//! tests on any host.
//!
//! ## Why unsafe code is needed
//!
//! The macOS backend calls low-level Mach APIs that read and write the
//! memory of other processes, which inherently bypasses Rust's safety
//! guarantees. Those calls are confined to `platform/macos` and wrapped in
//! safe abstractions; the rest of the crate is safe Rust.

#![allow(unsafe_code)] // Required for the Mach memory APIs

pub mod error;
pub mod platform;
pub mod port;
pub mod results;
pub mod scan;
pub mod session;
pub mod types;
pub mod value;

// Re-export commonly used types
pub use error::{MacmemError, Result};
pub use port::MemoryPort;
pub use scan::{ScanEngine, ScanOutcome, RESULT_CAP};
pub use session::{Session, SessionInfo, WatchUpdate, STRING_WATCH_WIDTH};
pub use types::{Address, MemoryRegion, ProcessId, ProcessInfo, ScanCandidate};
pub use value::{CompareOp, ValueType};
