//! # Process Listing
//!
//! Enumerating running processes via libproc.

use libc::{c_int, c_void};

use crate::error::Result;
use crate::platform::macos::ffi::{self, proc_types};
use crate::types::{ProcessId, ProcessInfo};

/// List all processes visible to the caller
///
/// Processes whose name cannot be resolved (zombies, or targets the caller
/// may not inspect) are omitted, matching how the kernel reports them.
pub fn list_processes() -> Result<Vec<ProcessInfo>>
{
    unsafe {
        let needed = ffi::proc_listpids(proc_types::PROC_ALL_PIDS, 0, std::ptr::null_mut(), 0);
        if needed <= 0 {
            return Err(std::io::Error::last_os_error().into());
        }

        let mut pids = vec![0 as libc::pid_t; needed as usize / std::mem::size_of::<libc::pid_t>()];
        let written = ffi::proc_listpids(
            proc_types::PROC_ALL_PIDS,
            0,
            pids.as_mut_ptr() as *mut c_void,
            (pids.len() * std::mem::size_of::<libc::pid_t>()) as c_int,
        );
        if written <= 0 {
            return Err(std::io::Error::last_os_error().into());
        }

        let returned = written as usize / std::mem::size_of::<libc::pid_t>();
        let mut processes = Vec::with_capacity(returned);
        for &pid in &pids[..returned.min(pids.len())] {
            if pid <= 0 {
                continue;
            }
            let pid = ProcessId(pid as u32);
            if let Some(name) = process_name(pid) {
                processes.push(ProcessInfo { pid, name });
            }
        }

        Ok(processes)
    }
}

/// Get the short name of a process, or `None` if the kernel won't say.
pub fn process_name(pid: ProcessId) -> Option<String>
{
    let mut buffer = vec![0u8; proc_types::PROC_NAME_MAXSIZE];
    let length = unsafe { ffi::proc_name(pid.0 as c_int, buffer.as_mut_ptr() as *mut c_void, buffer.len() as u32) };
    if length <= 0 {
        return None;
    }
    Some(String::from_utf8_lossy(&buffer[..length as usize]).into_owned())
}
