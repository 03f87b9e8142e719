//! # macOS Memory Access Implementation
//!
//! macOS-specific memory port built on Mach APIs.
//!
//! macOS uses the Mach microkernel, which exposes a process's address space
//! through its **task port**: a kernel handle obtained with `task_for_pid()`
//! that grants read/write access to the task's virtual memory.
//!
//! ## Permissions
//!
//! `task_for_pid()` is a restricted API. To attach to arbitrary processes
//! you need one of:
//!
//! 1. **Run with sudo** (simplest):
//!    ```bash
//!    sudo macmem
//!    ```
//! 2. **Code signing with the `com.apple.security.cs.debugger` entitlement**,
//!    useful for development workflows where you attach frequently.
//!
//! System Integrity Protection additionally blocks attachment to protected
//! system processes regardless of privileges.
//!
//! ## Key Mach APIs Used
//!
//! - `task_for_pid()`: get a task port for a PID (declared ourselves - not in mach2)
//! - `mach_vm_region()`: enumerate memory regions
//! - `mach_vm_read_overwrite()`: bulk read into a caller-supplied buffer
//! - `mach_vm_write()`: bulk write
//! - `mach_port_deallocate()`: release the task port
//! - `proc_listpids()` / `proc_name()`: process listing via libproc
//!
//! ## Dependencies
//!
//! We use a hybrid approach:
//! - **mach2 crate**: for well-maintained Mach APIs (`mach_task_self`, `KERN_SUCCESS`)
//! - **libc crate**: for type definitions (`mach_port_t`, `vm_map_t`, etc.)
//! - **ffi module**: centralized declarations for the restricted functions
//!   not in mach2
//!
//! ## References
//!
//! - [Apple Mach Kernel Programming](https://developer.apple.com/library/archive/documentation/Darwin/Conceptual/KernelProgramming/Mach/Mach.html)
//! - [XNU Kernel Source](https://github.com/apple-oss-distributions/xnu) (for `task_for_pid` implementation)
//! - [mach_vm_read_overwrite documentation](https://developer.apple.com/documentation/kernel/1402127-mach_vm_read_overwrite/)

pub mod error;
pub mod ffi;
pub mod port;
pub mod process;

pub use port::TaskPort;
pub use process::{list_processes, process_name};
