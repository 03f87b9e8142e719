//! Scan result candidate type.

use super::Address;
use crate::value::ValueType;

/// One member of the scan result set
///
/// A candidate is an address plus the byte pattern most recently observed
/// there under a given type. Candidates are self-describing (each carries its
/// own type), so a result set loaded from disk can in principle mix types,
/// although a single scan pass always uses one.
///
/// The stored bytes are the baseline for `changed`/`unchanged` refinements:
/// every scan pass that keeps a candidate replaces them with the freshly
/// observed pattern, which is what makes a chain of
/// `unchanged … changed … unchanged` filters meaningful.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanCandidate
{
    /// Absolute address in the target's address space
    pub address: Address,
    /// Type the bytes were observed under
    pub ty: ValueType,
    /// Last observed byte pattern, exactly the type's width
    /// (the search length for strings)
    pub bytes: Vec<u8>,
    /// Displayable form of `bytes`
    pub rendered: String,
}

impl ScanCandidate
{
    /// Build a candidate from a freshly observed byte pattern, rendering its
    /// display form through the codec.
    pub fn observed(address: Address, ty: ValueType, bytes: Vec<u8>) -> Self
    {
        let rendered = ty.render(&bytes);
        Self {
            address,
            ty,
            bytes,
            rendered,
        }
    }
}
