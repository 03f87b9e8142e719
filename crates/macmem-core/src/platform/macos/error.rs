//! # macOS Mach API Errors
//!
//! Error types for macOS Mach API operations.
//!
//! Mach APIs return `kern_return_t` values, which are integer error codes.
//! This module converts those codes into Rust error types with descriptive
//! messages, so the rest of the crate can match on specific failures and use
//! `?` instead of threading raw integers around.
//!
//! ## References
//!
//! - [kern_return_t documentation](https://developer.apple.com/documentation/kernel/kern_return_t)

use thiserror::Error;

/// Mach kernel API error
///
/// Common `kern_return_t` values seen by this crate:
///
/// - `KERN_SUCCESS` (0): operation succeeded
/// - `KERN_INVALID_ADDRESS` (1): address is not mapped
/// - `KERN_PROTECTION_FAILURE` (2): blocked by memory protection or security policy
/// - `KERN_INVALID_ARGUMENT` (4): bad PID or argument
/// - `KERN_FAILURE` (5): general failure, often "process not found"
#[derive(Error, Debug)]
pub enum MachError
{
    /// `KERN_INVALID_ADDRESS`
    ///
    /// The address range is not mapped in the target's address space. Seen
    /// when a candidate's memory has been freed between scans.
    #[error("KERN_INVALID_ADDRESS: Address is not mapped")]
    InvalidAddress,

    /// `KERN_PROTECTION_FAILURE`
    ///
    /// The operation was blocked by macOS's security system. For
    /// `task_for_pid()` this means the caller needs `sudo` or the
    /// `com.apple.security.cs.debugger` entitlement; for memory access it
    /// means the page's protection forbids the operation.
    #[error("KERN_PROTECTION_FAILURE: Permission denied")]
    ProtectionFailure,

    /// `KERN_INVALID_ARGUMENT`
    ///
    /// One of the arguments passed to the Mach API was invalid, such as a
    /// stale task port or a nonsensical PID.
    #[error("KERN_INVALID_ARGUMENT: Invalid PID or argument")]
    InvalidArgument,

    /// `KERN_FAILURE`
    ///
    /// A general failure. For `task_for_pid()` this usually means the
    /// process does not exist, though macOS sometimes reports permission
    /// problems this way too; the attach path disambiguates by probing
    /// whether the PID is alive.
    #[error("KERN_FAILURE: Process not found")]
    ProcessNotFound,

    /// Unknown Mach error code
    ///
    /// The integer value is preserved so it can be looked up.
    #[error("Unknown Mach error: {0}")]
    Unknown(i32),
}

impl From<libc::kern_return_t> for MachError
{
    fn from(code: libc::kern_return_t) -> Self
    {
        match code {
            libc::KERN_INVALID_ADDRESS => MachError::InvalidAddress,
            libc::KERN_PROTECTION_FAILURE => MachError::ProtectionFailure,
            libc::KERN_INVALID_ARGUMENT => MachError::InvalidArgument,
            libc::KERN_FAILURE => MachError::ProcessNotFound,
            _ => MachError::Unknown(code),
        }
    }
}
