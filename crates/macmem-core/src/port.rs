//! # Memory Port Trait
//!
//! The boundary between the scanner and the host's process-memory facility.
//!
//! Everything above this trait (scan engine, session, address operations) is
//! platform-agnostic; everything below it lives in `platform/`. On macOS the
//! implementation is [`TaskPort`](crate::platform::macos::TaskPort), built on
//! a Mach task port. Tests supply in-memory fakes.
//!
//! ## Guarantees
//!
//! Reads and writes are not atomic with respect to the target: the target
//! keeps running while we copy, so a torn observation is possible and callers
//! must tolerate it. What the trait does guarantee is all-or-nothing sizing:
//! a read either fills the requested length or fails, and a short transfer is
//! reported as [`MacmemError::SizeMismatch`](crate::error::MacmemError),
//! never as partial success.

use crate::error::Result;
use crate::types::{Address, MemoryRegion};

/// Read, write, and region access against one target address space
///
/// A port is owned exclusively by the session that opened it; no other
/// component holds one. Implementations release their underlying OS handle
/// on drop.
pub trait MemoryPort
{
    /// Enumerate the target's memory regions in ascending address order
    ///
    /// The walk stops at the first enumeration error and returns what was
    /// gathered; a snapshot is advisory and may be stale by the time it is
    /// used.
    fn regions(&self) -> Result<Vec<MemoryRegion>>;

    /// Read exactly `len` bytes at `address`
    ///
    /// ## Errors
    ///
    /// - `Unreadable`: the address range is not mapped readable
    /// - `SizeMismatch`: the OS transferred fewer bytes than requested
    fn read(&self, address: Address, len: usize) -> Result<Vec<u8>>
    {
        let mut buffer = vec![0u8; len];
        self.read_into(address, &mut buffer)?;
        Ok(buffer)
    }

    /// Read exactly `buf.len()` bytes at `address` into a caller buffer
    ///
    /// Used for large region reads so one buffer can be reused across an
    /// entire scan instead of allocating per region.
    fn read_into(&self, address: Address, buf: &mut [u8]) -> Result<()>;

    /// Write `bytes` at `address`
    ///
    /// ## Errors
    ///
    /// - `Unwritable`: the address range is not mapped writable
    fn write(&self, address: Address, bytes: &[u8]) -> Result<()>;
}
