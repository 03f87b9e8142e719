//! # Types
//!
//! Platform-agnostic types used throughout the scanner.
//!
//! These types abstract away platform-specific details, allowing the rest of
//! the crate to work with concepts like "process ID" and "memory region"
//! without knowing which OS facility produced them.

pub mod address;
pub mod candidate;
pub mod process;

// Re-export all public types
pub use address::Address;
pub use candidate::ScanCandidate;
pub use process::{MemoryRegion, ProcessId, ProcessInfo};
