//! # Error Types
//!
//! General error handling for memory operations.
//!
//! We use `thiserror` to automatically generate `Error` trait implementations
//! and nice error messages.

use thiserror::Error;

use crate::types::Address;
use crate::value::{CompareOp, ValueType};

/// Main error type for memory operations
///
/// This enum represents all the ways a scanner operation can fail.
///
/// ## Error Categories
///
/// 1. **Lifecycle errors**: NotAttached, AlreadyAttached, NoPriorResults, TypeMismatch
/// 2. **OS errors**: PermissionDenied, ProcessNotFound, Unreadable, Unwritable, SizeMismatch
/// 3. **User input errors**: UnknownType, UnknownOp, MalformedLiteral, OutOfRange, MissingArgument
/// 4. **Platform errors**: Mach (macOS-specific)
/// 5. **I/O errors**: Io (for save/load of result files)
///
/// Result-set truncation during a scan is informational, not an error; it is
/// reported on [`crate::scan::ScanOutcome`].
#[derive(Error, Debug)]
pub enum MacmemError
{
    /// Operation requires an attached target process
    ///
    /// Returned by every attached-only operation (scan, read, write, watch,
    /// regions, info, save, load) when the session is detached. Attach with
    /// `attach <pid>` first.
    #[error("Not attached to a process")]
    NotAttached,

    /// Attach was called while a target is already attached
    ///
    /// The existing attachment is left untouched; detach first to switch
    /// targets.
    #[error("Already attached to process {0}")]
    AlreadyAttached(u32),

    /// Next-scan was requested but the current result set is empty
    ///
    /// This also covers a `changed`/`unchanged` comparison handed to a first
    /// scan: those operators filter against previously observed bytes, and
    /// there are none yet.
    #[error("No previous scan results to filter")]
    NoPriorResults,

    /// Next-scan was requested with a type other than the result set's type
    ///
    /// A refinement re-reads the addresses found by the previous scan, so the
    /// value width must stay the same across rounds.
    #[error("Result set holds {expected} values, cannot refine as {found}")]
    TypeMismatch
    {
        /// Type of the candidates currently held by the engine
        expected: ValueType,
        /// Type requested for the refinement
        found: ValueType,
    },

    /// Insufficient permissions to control the target process
    ///
    /// On macOS this typically means `task_for_pid()` was refused: run with
    /// `sudo`, or grant the `com.apple.security.cs.debugger` entitlement.
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// The process with the given PID doesn't exist or has exited
    #[error("Process not found: PID {0}")]
    ProcessNotFound(u32),

    /// The target address could not be read
    ///
    /// The memory may be unmapped, protected, or freed since it was found.
    #[error("Memory at {0} is not readable")]
    Unreadable(Address),

    /// The target address could not be written
    #[error("Memory at {0} is not writable")]
    Unwritable(Address),

    /// A read or write moved fewer bytes than requested
    ///
    /// Torn transfers are failures, never partial successes: callers either
    /// get the full width of the requested type or an error.
    #[error("Size mismatch: expected {expected} bytes, got {actual}")]
    SizeMismatch
    {
        /// Bytes requested
        expected: usize,
        /// Bytes actually transferred
        actual: usize,
    },

    /// Unrecognized value type token (expected byte, short, int, long, float, double, or string)
    #[error("Unknown value type '{0}'")]
    UnknownType(String),

    /// Unrecognized comparison token (expected exact, greater, less, changed, or unchanged)
    #[error("Unknown comparison '{0}'")]
    UnknownOp(String),

    /// A value or address literal that could not be parsed at all
    #[error("Malformed literal: {0}")]
    MalformedLiteral(String),

    /// A numeric literal that parsed but does not fit the requested type
    ///
    /// Overflow is always reported; values are never silently truncated.
    #[error("Out of range: {0}")]
    OutOfRange(String),

    /// A command was invoked without a required argument
    #[error("Missing argument: {0}")]
    MissingArgument(&'static str),

    /// The comparison is not defined for the value type
    ///
    /// `greater` and `less` are numeric-only; strings support `exact`,
    /// `changed`, and `unchanged`.
    #[error("Comparison '{op}' is not supported for {ty} values")]
    UnsupportedOp
    {
        /// Requested comparison
        op: CompareOp,
        /// Value type it was applied to
        ty: ValueType,
    },

    /// The operation is not available on this host platform
    #[error("{0}")]
    Unsupported(&'static str),

    /// A saved results file that does not match the expected line format
    #[error("Malformed results file: {0}")]
    MalformedResults(String),

    /// macOS-specific Mach API error
    ///
    /// Wraps `kern_return_t` codes from the Mach kernel APIs.
    #[cfg(target_os = "macos")]
    #[error("Mach API error: {0}")]
    Mach(#[from] crate::platform::macos::error::MachError),

    /// I/O error (for result file operations)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for `Result<T, MacmemError>`
pub type Result<T> = std::result::Result<T, MacmemError>;
