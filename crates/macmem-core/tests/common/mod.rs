//! Shared test fixtures: an in-memory stand-in for a target process.

#![allow(dead_code)] // not every test binary uses every helper

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use macmem_core::{Address, MacmemError, MemoryPort, MemoryRegion};

/// Backing store for a [`FakePort`]
///
/// Cloneable handle onto the fake target's memory, so a test can keep one
/// and mutate "target" memory after the port has been boxed into a session,
/// the way a live process mutates its own memory between scans.
#[derive(Clone, Default)]
pub struct FakeMemory
{
    blocks: Arc<Mutex<BTreeMap<u64, Vec<u8>>>>,
}

impl FakeMemory
{
    /// Overwrite bytes inside an existing block.
    pub fn poke(&self, address: u64, bytes: &[u8])
    {
        let mut blocks = self.blocks.lock().unwrap();
        for (start, data) in blocks.iter_mut() {
            let end = start + data.len() as u64;
            if address >= *start && address + bytes.len() as u64 <= end {
                let offset = (address - start) as usize;
                data[offset..offset + bytes.len()].copy_from_slice(bytes);
                return;
            }
        }
        panic!("poke outside any backed block: 0x{address:x}");
    }

    /// Drop the backing for the block starting at `start`; subsequent reads
    /// of it fail as if the target freed the mapping.
    pub fn unmap(&self, start: u64)
    {
        self.blocks.lock().unwrap().remove(&start);
    }
}

/// In-memory [`MemoryPort`] implementation
///
/// Regions are declared up front; those with backing data serve reads and
/// writes, those without fail every access, modelling mappings the kernel
/// reports but refuses to read.
pub struct FakePort
{
    regions: Vec<MemoryRegion>,
    memory: FakeMemory,
}

impl FakePort
{
    pub fn new() -> Self
    {
        Self {
            regions: Vec::new(),
            memory: FakeMemory::default(),
        }
    }

    /// Handle for mutating target memory from the test body.
    pub fn memory(&self) -> FakeMemory
    {
        self.memory.clone()
    }

    /// Add a region backed by `data`.
    pub fn add_region(&mut self, start: u64, permissions: &str, data: Vec<u8>)
    {
        let end = start + data.len() as u64;
        self.regions
            .push(MemoryRegion::new(Address::from(start), Address::from(end), permissions.to_string()));
        self.memory.blocks.lock().unwrap().insert(start, data);
    }

    /// Add a region the port will report but refuse to read.
    pub fn add_unreadable_region(&mut self, start: u64, size: u64)
    {
        self.regions.push(MemoryRegion::new(
            Address::from(start),
            Address::from(start + size),
            "r--".to_string(),
        ));
    }
}

impl MemoryPort for FakePort
{
    fn regions(&self) -> macmem_core::Result<Vec<MemoryRegion>>
    {
        Ok(self.regions.clone())
    }

    fn read_into(&self, address: Address, buf: &mut [u8]) -> macmem_core::Result<()>
    {
        let blocks = self.memory.blocks.lock().unwrap();
        for (start, data) in blocks.iter() {
            let end = start + data.len() as u64;
            if address.value() >= *start && address.value() + buf.len() as u64 <= end {
                let offset = (address.value() - start) as usize;
                buf.copy_from_slice(&data[offset..offset + buf.len()]);
                return Ok(());
            }
        }
        Err(MacmemError::Unreadable(address))
    }

    fn write(&self, address: Address, bytes: &[u8]) -> macmem_core::Result<()>
    {
        let writable = self
            .regions
            .iter()
            .any(|region| region.contains(address) && region.is_writable());
        if !writable {
            return Err(MacmemError::Unwritable(address));
        }

        let mut blocks = self.memory.blocks.lock().unwrap();
        for (start, data) in blocks.iter_mut() {
            let end = start + data.len() as u64;
            if address.value() >= *start && address.value() + bytes.len() as u64 <= end {
                let offset = (address.value() - start) as usize;
                data[offset..offset + bytes.len()].copy_from_slice(bytes);
                return Ok(());
            }
        }
        Err(MacmemError::Unwritable(address))
    }
}
