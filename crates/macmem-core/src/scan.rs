//! # Scan Engine
//!
//! First-scan and next-scan over a target address space.
//!
//! The engine owns the result set (`current`) and its predecessor
//! (`previous`). A first scan sweeps every readable region of the region map
//! for a typed pattern; a next scan re-reads each address in the result set
//! and keeps the candidates whose fresh bytes satisfy the comparison. The
//! predecessor set exists to supply the prior observed bytes for the
//! `changed`/`unchanged` filters; it is overwritten at the start of every
//! next scan.
//!
//! ## Ordering
//!
//! First-scan matches appear in ascending address order (region order times
//! offset order). Next-scan matches preserve the order of the previous
//! result set, so the address sets only ever shrink across refinements.
//!
//! ## Error policy
//!
//! Regions that refuse to read in full and candidate addresses that have
//! become unreadable are dropped silently (at `debug!` verbosity); the scan
//! continues. The target keeps running while we sweep, so vanished memory is
//! expected, not exceptional.

use tracing::{debug, info};

use crate::error::{MacmemError, Result};
use crate::port::MemoryPort;
use crate::types::{MemoryRegion, ScanCandidate};
use crate::value::{CompareOp, ValueType};

/// Hard cap on the result set after a first scan
///
/// Broad queries like `scan byte 0` would otherwise collect a candidate for
/// nearly every byte of the address space; the scan stops once this many
/// matches have been gathered and reports truncation.
pub const RESULT_CAP: usize = 10_000;

/// Regions between first-scan progress reports.
const REGION_PROGRESS_INTERVAL: usize = 100;

/// Candidate addresses between next-scan progress reports.
const ADDRESS_PROGRESS_INTERVAL: usize = 1_000;

/// Summary of one scan pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanOutcome
{
    /// Candidates in the result set after the pass
    pub matches: usize,
    /// Regions swept (first scan) or candidate addresses re-read (next scan)
    pub examined: usize,
    /// Whether the pass stopped early at [`RESULT_CAP`]
    pub truncated: bool,
}

/// The scan result set and the machinery that evolves it
///
/// The engine exclusively owns `current` and `previous`; callers receive
/// read-only views via [`ScanEngine::results`] and [`ScanEngine::snapshot`],
/// never aliased mutable references.
#[derive(Debug, Default)]
pub struct ScanEngine
{
    /// Result set of the most recent scan pass.
    current: Vec<ScanCandidate>,
    /// Result set of the pass before that; baseline for changed/unchanged.
    previous: Vec<ScanCandidate>,
    /// Region read buffer, reused across regions and scans.
    scratch: Vec<u8>,
}

impl ScanEngine
{
    /// Create an empty engine.
    pub fn new() -> Self
    {
        Self::default()
    }

    /// Number of candidates in the current result set.
    pub fn len(&self) -> usize
    {
        self.current.len()
    }

    /// Whether the current result set is empty.
    pub fn is_empty(&self) -> bool
    {
        self.current.is_empty()
    }

    /// Read-only view of the full current result set.
    pub fn results(&self) -> &[ScanCandidate]
    {
        &self.current
    }

    /// Read-only view of at most `limit` candidates
    ///
    /// The full count is always available via [`ScanEngine::len`].
    pub fn snapshot(&self, limit: usize) -> &[ScanCandidate]
    {
        &self.current[..limit.min(self.current.len())]
    }

    /// Drop both result sets.
    pub fn clear(&mut self)
    {
        self.current.clear();
        self.previous.clear();
    }

    /// Replace the current result set wholesale (used by `load`)
    ///
    /// The predecessor set is cleared: loaded candidates carry their saved
    /// bytes as the new baseline.
    pub fn replace_results(&mut self, candidates: Vec<ScanCandidate>)
    {
        self.previous.clear();
        self.current = candidates;
    }

    /// Sweep every readable region for a typed pattern
    ///
    /// Inspects every byte offset of every readable, non-empty region
    /// (stride 1, so matches may be unaligned) and collects the offsets whose
    /// window satisfies `op` against `pattern`. Both result sets are cleared
    /// first. Scanning stops early once [`RESULT_CAP`] candidates have been
    /// gathered.
    ///
    /// Reading by whole region rather than page-by-page amortizes the
    /// syscall overhead; the read buffer is reused across regions.
    ///
    /// ## Errors
    ///
    /// - `NoPriorResults`: `op` is `changed`/`unchanged`, which need a
    ///   baseline no first scan has
    /// - `UnsupportedOp`: an ordered comparison against a string pattern
    /// - `MalformedLiteral`: an empty pattern
    pub fn first_scan(
        &mut self,
        port: &dyn MemoryPort,
        regions: &[MemoryRegion],
        ty: ValueType,
        pattern: &[u8],
        op: CompareOp,
    ) -> Result<ScanOutcome>
    {
        if op.requires_baseline() {
            return Err(MacmemError::NoPriorResults);
        }
        validate_comparison(ty, op)?;
        if pattern.is_empty() {
            return Err(MacmemError::MalformedLiteral("empty search pattern".to_string()));
        }

        self.current.clear();
        self.previous.clear();

        let width = pattern.len();
        let mut swept = 0usize;
        let mut truncated = false;

        for (index, region) in regions.iter().enumerate() {
            if index > 0 && index % REGION_PROGRESS_INTERVAL == 0 {
                info!(
                    region = index,
                    total = regions.len(),
                    matches = self.current.len(),
                    "scan progress"
                );
            }

            if !region.is_readable() || region.size() == 0 {
                continue;
            }

            let size = region.size() as usize;
            if size < width {
                continue;
            }

            self.scratch.resize(size, 0);
            if let Err(err) = port.read_into(region.start, &mut self.scratch) {
                debug!(region = %region.start, %err, "skipping unreadable region");
                continue;
            }
            swept += 1;

            for offset in 0..=(size - width) {
                let window = &self.scratch[offset..offset + width];
                if ty.compare(window, pattern, op)? {
                    self.current
                        .push(ScanCandidate::observed(region.start.offset(offset), ty, window.to_vec()));

                    if self.current.len() >= RESULT_CAP {
                        truncated = true;
                        break;
                    }
                }
            }

            if truncated {
                break;
            }
        }

        info!(
            matches = self.current.len(),
            regions = swept,
            truncated,
            "first scan complete"
        );

        Ok(ScanOutcome {
            matches: self.current.len(),
            examined: swept,
            truncated,
        })
    }

    /// Filter the current result set by re-reading every candidate address
    ///
    /// The current set becomes the predecessor, then each of its addresses is
    /// re-read at the candidate's width. Candidates whose memory can no
    /// longer be read are dropped (the allocation may have been freed).
    /// Survivors are stored with the freshly read bytes and a re-rendered
    /// display string, which makes the fresh observation the baseline for the
    /// next `changed`/`unchanged` round.
    ///
    /// `pattern` is the reference for `exact`/`greater`/`less` and is ignored
    /// for `changed`/`unchanged` (those compare against each candidate's
    /// stored bytes).
    ///
    /// ## Errors
    ///
    /// - `NoPriorResults`: the current result set is empty
    /// - `TypeMismatch`: `ty` differs from the result set's type
    /// - `UnsupportedOp`: an ordered comparison against a string pattern
    pub fn next_scan(&mut self, port: &dyn MemoryPort, ty: ValueType, pattern: &[u8], op: CompareOp) -> Result<ScanOutcome>
    {
        if self.current.is_empty() {
            return Err(MacmemError::NoPriorResults);
        }
        if let Some(mismatch) = self.current.iter().find(|candidate| candidate.ty != ty) {
            return Err(MacmemError::TypeMismatch {
                expected: mismatch.ty,
                found: ty,
            });
        }
        validate_comparison(ty, op)?;
        if !op.requires_baseline() && pattern.is_empty() {
            return Err(MacmemError::MalformedLiteral("empty search pattern".to_string()));
        }

        std::mem::swap(&mut self.current, &mut self.previous);
        self.current.clear();

        let total = self.previous.len();
        for (index, candidate) in self.previous.iter().enumerate() {
            if index > 0 && index % ADDRESS_PROGRESS_INTERVAL == 0 {
                info!(checked = index, total, "filter progress");
            }

            let width = if op.requires_baseline() {
                candidate.bytes.len()
            } else {
                pattern.len()
            };

            let fresh = match port.read(candidate.address, width) {
                Ok(bytes) => bytes,
                Err(err) => {
                    debug!(address = %candidate.address, %err, "dropping unreadable candidate");
                    continue;
                }
            };

            let reference: &[u8] = if op.requires_baseline() { &candidate.bytes } else { pattern };
            if ty.compare(&fresh, reference, op)? {
                self.current.push(ScanCandidate::observed(candidate.address, ty, fresh));
            }
        }

        info!(matches = self.current.len(), filtered_from = total, "next scan complete");

        Ok(ScanOutcome {
            matches: self.current.len(),
            examined: total,
            truncated: false,
        })
    }
}

/// Reject ordered comparisons for types without an ordering.
fn validate_comparison(ty: ValueType, op: CompareOp) -> Result<()>
{
    if matches!(op, CompareOp::Gt | CompareOp::Lt) && ty == ValueType::String {
        return Err(MacmemError::UnsupportedOp { op, ty });
    }
    Ok(())
}
