//! # Mach Task Port
//!
//! The macOS implementation of [`MemoryPort`], wrapping the Mach task port
//! for one target process.
//!
//! A [`TaskPort`] is a scoped resource: opening it calls `task_for_pid()`,
//! and the port right is returned to the kernel in `Drop`, so the handle is
//! released on both explicit detach and any early-exit path.

use libc::{mach_msg_type_number_t, mach_port_t, vm_map_t, vm_offset_t};
use mach2::kern_return::KERN_SUCCESS;
use mach2::port::MACH_PORT_NULL;
use mach2::traps::mach_task_self;
use tracing::{debug, trace, warn};

use crate::error::{MacmemError, Result};
use crate::platform::macos::error::MachError;
use crate::platform::macos::ffi;
use crate::port::MemoryPort;
use crate::types::{Address, MemoryRegion, ProcessId};

/// Mach task port granting memory access to one target process
///
/// ## Lifecycle
///
/// 1. Open: `TaskPort::open(pid)` calls `task_for_pid()`
/// 2. Use: `regions()`, `read_into()`, `write()`
/// 3. Release: `close()` or drop; both deallocate the port right and are
///    idempotent
pub struct TaskPort
{
    /// Mach port to the target task; `MACH_PORT_NULL` once closed.
    task: mach_port_t,
    /// Target PID, kept for diagnostics.
    pid: ProcessId,
}

impl TaskPort
{
    /// Acquire a task port for the given PID
    ///
    /// ## Errors
    ///
    /// - `PermissionDenied`: `task_for_pid()` refused; run with sudo or sign
    ///   with the debugger entitlement. macOS sometimes reports this as
    ///   `KERN_FAILURE`, so when the PID is demonstrably alive we report the
    ///   permission problem instead of "not found".
    /// - `ProcessNotFound`: no live process has this PID
    pub fn open(pid: ProcessId) -> Result<Self>
    {
        debug!(pid = pid.0, "requesting task port");

        unsafe {
            let mut task: mach_port_t = MACH_PORT_NULL;
            let result = ffi::task_for_pid(mach_task_self(), pid.0 as libc::c_int, &mut task);

            if result != KERN_SUCCESS {
                let process_exists = libc::kill(pid.0 as libc::pid_t, 0) == 0;

                if result == libc::KERN_FAILURE && !process_exists {
                    return Err(MacmemError::ProcessNotFound(pid.0));
                }
                if process_exists {
                    return Err(MacmemError::PermissionDenied(format!(
                        "task_for_pid() refused for PID {}. Run with sudo, or sign the binary with the \
                         com.apple.security.cs.debugger entitlement.",
                        pid.0
                    )));
                }

                return Err(MacmemError::Mach(MachError::from(result)));
            }

            trace!(pid = pid.0, task, "task port acquired");
            Ok(Self { task, pid })
        }
    }

    /// Release the task port right; idempotent.
    pub fn close(&mut self)
    {
        if self.task == MACH_PORT_NULL {
            return;
        }

        unsafe {
            let result = ffi::mach_port_deallocate(mach_task_self(), self.task);
            if result != KERN_SUCCESS {
                warn!(pid = self.pid.0, result, "failed to deallocate task port");
            }
        }
        self.task = MACH_PORT_NULL;
    }
}

impl MemoryPort for TaskPort
{
    /// Walk the target's address space with `mach_vm_region()`
    ///
    /// Regions come back in ascending address order. The walk stops at the
    /// first enumeration error (normally `KERN_INVALID_ADDRESS` past the
    /// last mapping) and returns what was gathered.
    fn regions(&self) -> Result<Vec<MemoryRegion>>
    {
        let mut regions = Vec::new();
        let mut address: ffi::MachVmAddress = 0;

        unsafe {
            loop {
                let mut size: ffi::MachVmSize = 0;
                let mut info: ffi::VmRegionBasicInfo64 = std::mem::zeroed();
                let mut info_count = ffi::VmRegionBasicInfo64::count();
                let mut object_name: mach_port_t = MACH_PORT_NULL;

                let result = ffi::mach_vm_region(
                    self.task as vm_map_t,
                    &mut address,
                    &mut size,
                    ffi::VM_REGION_BASIC_INFO_64,
                    &mut info,
                    &mut info_count,
                    &mut object_name,
                );

                if result != KERN_SUCCESS {
                    break;
                }

                // Copy out of the packed struct before using the values.
                let protection = info.protection;
                let reserved = info.reserved;

                let mut permissions = String::with_capacity(3);
                permissions.push(if protection & libc::VM_PROT_READ as u32 != 0 { 'r' } else { '-' });
                permissions.push(if protection & libc::VM_PROT_WRITE as u32 != 0 { 'w' } else { '-' });
                permissions.push(if protection & libc::VM_PROT_EXECUTE as u32 != 0 { 'x' } else { '-' });

                let start = Address::from(address);
                let end = Address::from(address.saturating_add(size));
                regions.push(if reserved != 0 {
                    MemoryRegion::reserved(start, end, permissions)
                } else {
                    MemoryRegion::new(start, end, permissions)
                });

                // The next region starts right after this one ends.
                address = address.saturating_add(size);
            }
        }

        debug!(pid = self.pid.0, regions = regions.len(), "enumerated memory regions");
        Ok(regions)
    }

    fn read_into(&self, address: Address, buf: &mut [u8]) -> Result<()>
    {
        if buf.is_empty() {
            return Ok(());
        }

        unsafe {
            let mut out_size: ffi::MachVmSize = 0;
            let result = ffi::mach_vm_read_overwrite(
                self.task as vm_map_t,
                address.value(),
                buf.len() as ffi::MachVmSize,
                buf.as_mut_ptr() as ffi::MachVmAddress,
                &mut out_size,
            );

            if result != KERN_SUCCESS {
                return Err(MacmemError::Unreadable(address));
            }
            if out_size != buf.len() as ffi::MachVmSize {
                return Err(MacmemError::SizeMismatch {
                    expected: buf.len(),
                    actual: out_size as usize,
                });
            }
        }

        Ok(())
    }

    fn write(&self, address: Address, bytes: &[u8]) -> Result<()>
    {
        unsafe {
            let result = ffi::mach_vm_write(
                self.task as vm_map_t,
                address.value(),
                bytes.as_ptr() as vm_offset_t,
                bytes.len() as mach_msg_type_number_t,
            );

            if result != KERN_SUCCESS {
                return Err(MacmemError::Unwritable(address));
            }
        }

        Ok(())
    }
}

impl Drop for TaskPort
{
    fn drop(&mut self)
    {
        self.close();
    }
}
