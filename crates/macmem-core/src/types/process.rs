//! Process and memory region types.

use std::fmt;

use super::Address;

/// Process identifier (PID)
///
/// Using a newtype (`struct ProcessId(u32)`) instead of a raw `u32` prevents
/// accidentally passing a random number where a PID is expected and keeps
/// call sites self-documenting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProcessId(pub u32);

impl From<u32> for ProcessId
{
    fn from(pid: u32) -> Self
    {
        ProcessId(pid)
    }
}

impl From<ProcessId> for u32
{
    fn from(pid: ProcessId) -> Self
    {
        pid.0
    }
}

impl fmt::Display for ProcessId
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "{}", self.0)
    }
}

/// A running process, as reported by the host's process listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessInfo
{
    /// Process identifier
    pub pid: ProcessId,
    /// Executable name
    pub name: String,
}

/// Memory region in a target process
///
/// Represents a maximal contiguous run of virtual addresses with uniform
/// permissions, such as a stack, heap, or code segment. A region is a
/// point-in-time observation: between enumeration and use, the target may
/// unmap it or lower its permissions, so every consumer treats regions as
/// advisory and tolerates reads that no longer succeed.
///
/// ## Examples
///
/// ```
/// use macmem_core::types::{Address, MemoryRegion};
///
/// let heap = MemoryRegion::new(Address::from(0x2000), Address::from(0x3000), "rw-".to_string());
/// assert!(heap.is_readable());
/// assert!(heap.is_writable());
/// assert_eq!(heap.size(), 0x1000);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryRegion
{
    /// Start address of the memory region (inclusive)
    pub start: Address,

    /// End address of the memory region (exclusive)
    ///
    /// The region covers `start` (inclusive) to `end` (exclusive); its size
    /// is `end - start`.
    pub end: Address,

    /// Memory permissions as a string
    ///
    /// Three characters in `rwx` order, with `-` for a missing permission:
    /// `"rwx"`, `"r-x"`, `"rw-"`, `"r--"`, `"---"`.
    pub permissions: String,

    /// Display label for the region
    ///
    /// `Reserved` for kernel-reserved regions, `No access` when the
    /// protection is empty, otherwise an uppercase `R`/`W`/`X` triplet.
    pub label: String,
}

impl MemoryRegion
{
    /// Create a new memory region, deriving its label from the permissions.
    pub fn new(start: Address, end: Address, permissions: String) -> Self
    {
        let label = if permissions.chars().all(|c| c == '-') {
            "No access".to_string()
        } else {
            permissions
                .chars()
                .map(|c| c.to_ascii_uppercase())
                .collect()
        };

        Self {
            start,
            end,
            permissions,
            label,
        }
    }

    /// Create a region the kernel has marked reserved.
    pub fn reserved(start: Address, end: Address, permissions: String) -> Self
    {
        Self {
            start,
            end,
            permissions,
            label: "Reserved".to_string(),
        }
    }

    /// Get the size of the memory region in bytes
    ///
    /// Returns `end - start`, or 0 if `end <= start` (using saturating
    /// subtraction to prevent underflow).
    pub fn size(&self) -> u64
    {
        self.end.value().saturating_sub(self.start.value())
    }

    /// Check if the region is readable
    pub fn is_readable(&self) -> bool
    {
        self.permissions.contains('r')
    }

    /// Check if the region is writable
    pub fn is_writable(&self) -> bool
    {
        self.permissions.contains('w')
    }

    /// Check if the region is executable
    pub fn is_executable(&self) -> bool
    {
        self.permissions.contains('x')
    }

    /// Check if an address lies within this memory region
    ///
    /// ## Example
    ///
    /// ```rust
    /// use macmem_core::types::{Address, MemoryRegion};
    ///
    /// let region = MemoryRegion::new(Address::from(0x1000), Address::from(0x2000), "rwx".to_string());
    ///
    /// assert!(region.contains(Address::from(0x1000))); // Start (inclusive)
    /// assert!(!region.contains(Address::from(0x2000))); // End (exclusive)
    /// ```
    pub fn contains(&self, address: Address) -> bool
    {
        address >= self.start && address < self.end
    }
}
