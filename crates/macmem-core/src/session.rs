//! # Session Façade
//!
//! Owns the memory port, the region snapshot, and the scan engine for at
//! most one attached target, and enforces the attached/detached lifecycle
//! around every operation that needs a target.
//!
//! ## Lifecycle
//!
//! 1. Create: `Session::new()` (detached)
//! 2. Attach: `attach(pid)` acquires a port, records pid/name, snapshots regions
//! 3. Use: scan / next / results / read / write / watch / save / load
//! 4. Detach: `detach()` releases the port and clears all scan state
//!
//! The port is released on every exit path: `detach()` drops the target, and
//! dropping the session itself drops any remaining attachment (the port's
//! own `Drop` returns the OS handle).
//!
//! ## Thread Safety
//!
//! Not thread-safe; the session is driven by a single synchronous shell
//! loop. Long operations (scans, watch) block that loop until they finish.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tracing::{debug, info};

use crate::error::{MacmemError, Result};
use crate::port::MemoryPort;
use crate::results;
use crate::scan::{ScanEngine, ScanOutcome};
use crate::types::{Address, MemoryRegion, ProcessId, ScanCandidate};
use crate::value::{CompareOp, ValueType};

/// Fixed window, in bytes, that watch observes for string values
///
/// Strings have no inherent width, so a watch re-reads this many bytes each
/// tick.
pub const STRING_WATCH_WIDTH: usize = 32;

/// Everything owned on behalf of one attached process.
struct Target
{
    pid: ProcessId,
    name: String,
    port: Box<dyn MemoryPort>,
    regions: Vec<MemoryRegion>,
    engine: ScanEngine,
}

/// Summary for the `info` command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionInfo
{
    /// Target process ID
    pub pid: ProcessId,
    /// Target executable name
    pub name: String,
    /// Regions in the current snapshot
    pub region_count: usize,
    /// Candidates in the current result set
    pub result_count: usize,
    /// Total bytes mapped across the snapshot
    pub mapped_bytes: u64,
}

/// One observation reported by a watch loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchUpdate
{
    /// The baseline value read when the watch started.
    Initial(String),
    /// The watched bytes differ from the last reported value.
    Changed
    {
        /// 1-based change counter
        sequence: u32,
        /// Previously reported rendering
        old: String,
        /// Fresh rendering, the new baseline
        new: String,
    },
}

/// Interactive session over at most one attached target process
///
/// All attached-only operations fail with
/// [`MacmemError::NotAttached`] while detached and leave state unchanged.
#[derive(Default)]
pub struct Session
{
    target: Option<Target>,
}

impl Session
{
    /// Create a detached session.
    pub fn new() -> Self
    {
        Self::default()
    }

    /// Whether a target is currently attached.
    pub fn is_attached(&self) -> bool
    {
        self.target.is_some()
    }

    /// PID and name of the attached target, for prompt display.
    pub fn attached_process(&self) -> Option<(ProcessId, &str)>
    {
        self.target.as_ref().map(|t| (t.pid, t.name.as_str()))
    }

    /// Attach to a running process by PID
    ///
    /// Acquires a Mach task port for the process, records its name, and
    /// snapshots its memory regions.
    ///
    /// ## Errors
    ///
    /// - `AlreadyAttached`: a target is already attached; detach first
    /// - `PermissionDenied`: the OS refused a task port (run with sudo)
    /// - `ProcessNotFound`: no such PID
    #[cfg(target_os = "macos")]
    pub fn attach(&mut self, pid: ProcessId) -> Result<()>
    {
        use crate::platform::macos::{process_name, TaskPort};

        if let Some(target) = &self.target {
            return Err(MacmemError::AlreadyAttached(target.pid.0));
        }

        let port = TaskPort::open(pid)?;
        let name = process_name(pid).unwrap_or_else(|| "unknown".to_string());
        self.attach_with_port(pid, name, Box::new(port))
    }

    /// Attach to a running process by PID
    ///
    /// Process attachment needs the macOS Mach APIs; on other hosts this
    /// always fails.
    #[cfg(not(target_os = "macos"))]
    pub fn attach(&mut self, _pid: ProcessId) -> Result<()>
    {
        Err(MacmemError::Unsupported("attaching to a process requires macOS"))
    }

    /// Attach using an already-open memory port
    ///
    /// This is the seam the platform `attach` goes through; tests use it to
    /// drive the session against a fake port.
    pub fn attach_with_port(&mut self, pid: ProcessId, name: String, port: Box<dyn MemoryPort>) -> Result<()>
    {
        if let Some(target) = &self.target {
            return Err(MacmemError::AlreadyAttached(target.pid.0));
        }

        let regions = port.regions()?;
        info!(pid = pid.0, name = %name, regions = regions.len(), "attached to process");

        self.target = Some(Target {
            pid,
            name,
            port,
            regions,
            engine: ScanEngine::new(),
        });
        Ok(())
    }

    /// Detach from the current target, releasing the port and clearing all
    /// scan state. A no-op when already detached.
    ///
    /// Returns the PID that was detached, if any.
    pub fn detach(&mut self) -> Option<ProcessId>
    {
        let target = self.target.take()?;
        info!(pid = target.pid.0, name = %target.name, "detached from process");
        Some(target.pid)
        // Target drop releases the port.
    }

    fn target(&self) -> Result<&Target>
    {
        self.target.as_ref().ok_or(MacmemError::NotAttached)
    }

    fn target_mut(&mut self) -> Result<&mut Target>
    {
        self.target.as_mut().ok_or(MacmemError::NotAttached)
    }

    /// Report pid, name, region count, result count, and total mapped bytes.
    pub fn info(&self) -> Result<SessionInfo>
    {
        let target = self.target()?;
        Ok(SessionInfo {
            pid: target.pid,
            name: target.name.clone(),
            region_count: target.regions.len(),
            result_count: target.engine.len(),
            mapped_bytes: target.regions.iter().map(MemoryRegion::size).sum(),
        })
    }

    /// The current region snapshot.
    pub fn regions(&self) -> Result<&[MemoryRegion]>
    {
        Ok(&self.target()?.regions)
    }

    /// Rebuild the region snapshot from the target
    ///
    /// Returns the new region count.
    pub fn refresh_regions(&mut self) -> Result<usize>
    {
        let target = self.target_mut()?;
        target.regions = target.port.regions()?;
        debug!(regions = target.regions.len(), "refreshed region snapshot");
        Ok(target.regions.len())
    }

    /// Run a first scan for `value` under `ty`
    ///
    /// The region snapshot is refreshed first, since it ages while the shell
    /// sits at the prompt.
    pub fn first_scan(&mut self, ty: ValueType, value: &str, op: CompareOp) -> Result<ScanOutcome>
    {
        let target = self.target_mut()?;
        let pattern = ty.parse(value)?;
        target.regions = target.port.regions()?;
        target.engine.first_scan(target.port.as_ref(), &target.regions, ty, &pattern, op)
    }

    /// Refine the current result set
    ///
    /// For `changed`/`unchanged` the value argument is ignored (each
    /// candidate's stored bytes are the reference), so it is not parsed and
    /// may be anything.
    pub fn next_scan(&mut self, ty: ValueType, value: &str, op: CompareOp) -> Result<ScanOutcome>
    {
        let target = self.target_mut()?;
        let pattern = if op.requires_baseline() { Vec::new() } else { ty.parse(value)? };
        target.engine.next_scan(target.port.as_ref(), ty, &pattern, op)
    }

    /// View of at most `limit` candidates plus the full result count.
    pub fn results(&self, limit: usize) -> Result<(&[ScanCandidate], usize)>
    {
        let engine = &self.target()?.engine;
        Ok((engine.snapshot(limit), engine.len()))
    }

    /// Read and render a single value
    ///
    /// Reads the type's width (or the string watch window) at `address`.
    pub fn read_value(&self, address: Address, ty: ValueType) -> Result<String>
    {
        let width = ty.width().unwrap_or(STRING_WATCH_WIDTH);
        let bytes = self.target()?.port.read(address, width)?;
        Ok(ty.render(&bytes))
    }

    /// Parse `value` under `ty` and write the resulting bytes
    ///
    /// The write length is exactly the pattern width; string writes do not
    /// append a NUL. Returns the number of bytes written.
    pub fn write_value(&mut self, address: Address, ty: ValueType, value: &str) -> Result<usize>
    {
        let target = self.target()?;
        let bytes = ty.parse(value)?;
        target.port.write(address, &bytes)?;
        info!(address = %address, ty = %ty, bytes = bytes.len(), "wrote value");
        Ok(bytes.len())
    }

    /// Watch an address for changes until cancelled
    ///
    /// Reads a baseline, reports it as [`WatchUpdate::Initial`], then
    /// re-reads the same width every `interval` and reports an old/new pair
    /// whenever the bytes differ from the last reported value, updating the
    /// baseline each time.
    ///
    /// Cancellation is cooperative: the flag is checked at every tick
    /// boundary, so the loop ends within one interval of `cancel` being set.
    /// A failed re-read terminates the watch and is surfaced to the caller.
    ///
    /// Returns the number of changes reported.
    pub fn watch<F>(
        &self,
        address: Address,
        ty: ValueType,
        interval: Duration,
        cancel: &AtomicBool,
        mut observer: F,
    ) -> Result<u32>
    where
        F: FnMut(WatchUpdate),
    {
        let width = ty.width().unwrap_or(STRING_WATCH_WIDTH);
        let port = self.target()?.port.as_ref();

        let mut baseline = port.read(address, width)?;
        observer(WatchUpdate::Initial(ty.render(&baseline)));

        let mut changes = 0u32;
        loop {
            if cancel.load(Ordering::SeqCst) {
                break;
            }
            std::thread::sleep(interval);
            if cancel.load(Ordering::SeqCst) {
                break;
            }

            let fresh = port.read(address, width)?;
            if fresh != baseline {
                changes += 1;
                observer(WatchUpdate::Changed {
                    sequence: changes,
                    old: ty.render(&baseline),
                    new: ty.render(&fresh),
                });
                baseline = fresh;
            }
        }

        Ok(changes)
    }

    /// Persist the current result set to `path`.
    pub fn save(&self, path: &Path) -> Result<usize>
    {
        let target = self.target()?;
        results::save_results(path, &target.name, target.pid, target.engine.results())
    }

    /// Replace the current result set with the contents of `path`.
    ///
    /// Returns the number of candidates loaded.
    pub fn load(&mut self, path: &Path) -> Result<usize>
    {
        let candidates = results::load_results(path)?;
        let target = self.target_mut()?;
        let count = candidates.len();
        target.engine.replace_results(candidates);
        info!(count, "loaded result set");
        Ok(count)
    }
}
