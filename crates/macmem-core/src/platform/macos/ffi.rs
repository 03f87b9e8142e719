//! # macOS Mach API FFI Declarations
//!
//! This module contains all unsafe extern "C" function declarations for the
//! Mach and libproc APIs that are not provided by the `mach2` crate. Several
//! of these (notably `task_for_pid`) require special permissions and are
//! therefore not included in the standard Mach bindings.
//!
//! ## Why Centralize These?
//!
//! - **Visibility**: all FFI declarations in one place for easy review
//! - **Maintenance**: easier to update when macOS APIs change
//! - **Safety**: clear separation between safe Rust code and unsafe FFI
//!
//! Every function here is wrapped in a safe abstraction in
//! [`port`](super::port) or [`process`](super::process); nothing outside
//! this platform tree calls them directly.
//!
//! ## References
//!
//! - [Apple Mach Kernel Programming](https://developer.apple.com/library/archive/documentation/Darwin/Conceptual/KernelProgramming/Mach/Mach.html)
//! - [Mach System Calls](https://developer.apple.com/documentation/kernel)

use libc::{c_int, c_void, kern_return_t, mach_msg_type_number_t, mach_port_t, vm_map_t, vm_offset_t};

/// 64-bit virtual address in a target task (`mach_vm_address_t`).
pub type MachVmAddress = u64;

/// 64-bit size in a target task (`mach_vm_size_t`).
pub type MachVmSize = u64;

/// Region information flavor for `mach_vm_region()`
///
/// `VM_REGION_BASIC_INFO_64` from `<mach/vm_region.h>`; requests the
/// [`VmRegionBasicInfo64`] layout.
pub const VM_REGION_BASIC_INFO_64: c_int = 9;

/// Structure for vm_region_basic_info_64
///
/// This matches `vm_region_basic_info_data_64_t` from `<mach/vm_region.h>`,
/// which is declared under `#pragma pack(4)`; `packed(4)` reproduces that
/// layout (the 64-bit `offset` field sits at byte 20, not 24).
#[repr(C, packed(4))]
pub struct VmRegionBasicInfo64
{
    /// Current protection flags (VM_PROT_READ, VM_PROT_WRITE, VM_PROT_EXECUTE)
    pub protection: u32,
    /// Maximum allowed protection flags
    pub max_protection: u32,
    /// Inheritance behavior for child processes
    pub inheritance: u32,
    /// Whether the region is shared between processes
    pub shared: u32,
    /// Whether the region is reserved by the kernel
    pub reserved: u32,
    /// Offset into the mapped object (if applicable)
    pub offset: u64,
    /// Memory behavior hints (caching strategy, etc.)
    pub behavior: u32,
    /// Number of times the region is wired in user space
    pub user_wired_count: u16,
}

impl VmRegionBasicInfo64
{
    /// Element count for the `info_count` in/out parameter of
    /// `mach_vm_region()`, in `natural_t` units as the kernel expects.
    pub fn count() -> mach_msg_type_number_t
    {
        (std::mem::size_of::<Self>() / std::mem::size_of::<c_int>()) as mach_msg_type_number_t
    }
}

// Task access
//
// Obtaining and releasing the task port that grants memory access.
#[link(name = "c", kind = "dylib")]
extern "C" {
    /// Get a Mach port to a process by PID
    ///
    /// The returned task port allows reading and writing the process's
    /// memory.
    ///
    /// ## Security
    ///
    /// Requires running as root or the `com.apple.security.cs.debugger`
    /// entitlement; otherwise returns `KERN_FAILURE` or
    /// `KERN_PROTECTION_FAILURE`.
    ///
    /// ## Parameters
    ///
    /// - `target_task`: our own task port (use `mach_task_self()`)
    /// - `pid`: process ID of the target process
    /// - `task`: output parameter, receives the task port
    ///
    /// **Note**: `task_for_pid` is not publicly documented by Apple due to
    /// security restrictions. For implementation details see the XNU kernel
    /// source: [osfmk/kern/task.c](https://github.com/apple-oss-distributions/xnu)
    pub fn task_for_pid(target_task: mach_port_t, pid: c_int, task: *mut mach_port_t) -> kern_return_t;

    /// Release a Mach port right
    ///
    /// Releases the task port obtained from `task_for_pid()`. After
    /// deallocation the port is no longer valid.
    ///
    /// See: [mach_port_deallocate documentation](https://developer.apple.com/documentation/kernel/1578777-mach_port_deallocate/)
    pub fn mach_port_deallocate(target_task: mach_port_t, name: mach_port_t) -> kern_return_t;
}

// Virtual memory
//
// Bulk read/write against a target task and region enumeration.
#[link(name = "c", kind = "dylib")]
extern "C" {
    /// Read target memory into a caller-supplied buffer
    ///
    /// Unlike `vm_read()`, which allocates in our address space and must be
    /// paired with `vm_deallocate()`, this copies directly into `data`. That
    /// is exactly what a scanner wants: one buffer reused across every
    /// region of a sweep, no per-read allocation.
    ///
    /// ## Parameters
    ///
    /// - `target_task`: task port (from `task_for_pid()`)
    /// - `address`: virtual address in the target process
    /// - `size`: number of bytes to read
    /// - `data`: destination buffer address in our process
    /// - `outsize`: output parameter, bytes actually copied
    ///
    /// ## Returns
    ///
    /// - `KERN_SUCCESS` (0) on success
    /// - `KERN_INVALID_ADDRESS` if the range is not mapped
    /// - `KERN_PROTECTION_FAILURE` if the range is not readable
    ///
    /// See: [mach_vm_read_overwrite documentation](https://developer.apple.com/documentation/kernel/1402127-mach_vm_read_overwrite/)
    pub fn mach_vm_read_overwrite(
        target_task: vm_map_t,
        address: MachVmAddress,
        size: MachVmSize,
        data: MachVmAddress,
        outsize: *mut MachVmSize,
    ) -> kern_return_t;

    /// Write memory to a Mach task
    ///
    /// Copies `data_count` bytes from our address space into the target.
    /// Writing to read-only pages fails with `KERN_PROTECTION_FAILURE`;
    /// writing to code segments can corrupt the target.
    ///
    /// See: [mach_vm_write documentation](https://developer.apple.com/documentation/kernel/1402070-mach_vm_write/)
    pub fn mach_vm_write(
        target_task: vm_map_t,
        address: MachVmAddress,
        data: vm_offset_t,
        data_count: mach_msg_type_number_t,
    ) -> kern_return_t;

    /// Get information about the memory region containing an address
    ///
    /// On return, `address` is rounded to the actual region start and `size`
    /// holds the region length, so repeated calls with `address + size` walk
    /// the entire address space in ascending order. The walk ends when the
    /// call fails (`KERN_INVALID_ADDRESS` past the last region).
    ///
    /// ## Parameters
    ///
    /// - `target_task`: task port (from `task_for_pid()`)
    /// - `address`: in/out, query address in / region start out
    /// - `size`: output parameter, region size in bytes
    /// - `flavor`: information flavor ([`VM_REGION_BASIC_INFO_64`])
    /// - `info`: output buffer for region information
    /// - `info_count`: in/out, buffer capacity / elements written
    /// - `object_name`: output parameter, unused (always pass a dummy port)
    ///
    /// See: [mach_vm_region documentation](https://developer.apple.com/documentation/kernel/1402149-mach_vm_region/)
    pub fn mach_vm_region(
        target_task: vm_map_t,
        address: *mut MachVmAddress,
        size: *mut MachVmSize,
        flavor: c_int,
        info: *mut VmRegionBasicInfo64,
        info_count: *mut mach_msg_type_number_t,
        object_name: *mut mach_port_t,
    ) -> kern_return_t;
}

// Process listing (libproc)
//
// These are part of libSystem on macOS, so the same link attribute works.
#[link(name = "c", kind = "dylib")]
extern "C" {
    /// List PIDs known to the kernel
    ///
    /// With a null buffer, returns the byte count needed; with a buffer,
    /// fills it with `pid_t` values and returns the bytes written.
    ///
    /// See: `<libproc.h>` in the macOS SDK
    pub fn proc_listpids(proc_type: u32, typeinfo: u32, buffer: *mut c_void, buffersize: c_int) -> c_int;

    /// Get the short name of a process
    ///
    /// Fills `buffer` with the process name and returns its length, or 0 on
    /// failure (usually a zombie or permission issue).
    ///
    /// See: `<libproc.h>` in the macOS SDK
    pub fn proc_name(pid: c_int, buffer: *mut c_void, buffersize: u32) -> c_int;
}

/// Selector values for `proc_listpids()`
///
/// From `<libproc.h>`; we only ever list all processes.
pub mod proc_types
{
    /// All processes on the system.
    pub const PROC_ALL_PIDS: u32 = 1;

    /// Buffer size that always fits a process name (`PROC_PIDPATHINFO_MAXSIZE`).
    pub const PROC_NAME_MAXSIZE: usize = 4096;
}
