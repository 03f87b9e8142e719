//! # Platform-Specific Implementations
//!
//! This module contains the platform-specific memory port implementations.
//!
//! Each platform gets its own submodule implementing the
//! [`MemoryPort`](crate::port::MemoryPort) trait with that platform's native
//! process-memory facility:
//!
//! - **macOS**: Mach task ports (`task_for_pid`, `mach_vm_read_overwrite`,
//!   `mach_vm_write`, `mach_vm_region`)
//! - Other hosts: none; the platform-agnostic core still builds and is
//!   exercised against fake ports in tests.

use crate::error::Result;
use crate::types::ProcessInfo;

#[cfg(target_os = "macos")]
pub mod macos;

/// List the running processes visible to the host facility.
pub fn list_processes() -> Result<Vec<ProcessInfo>>
{
    #[cfg(target_os = "macos")]
    {
        macos::list_processes()
    }

    #[cfg(not(target_os = "macos"))]
    {
        Err(crate::error::MacmemError::Unsupported("process listing requires macOS"))
    }
}
