// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2025 The secpart Authors

//! In-memory stand-ins for the collaborators of the partition manager.

extern crate alloc;

use crate::address::{Address, VirtAddr};
use crate::mm::{AddressSpace, MappingInfo, Prot, VmError};
use crate::partition::SpImage;
use crate::platform::{ExceptionMask, SpPlatform};
use crate::storage::{DataFlags, FileHandle, FileOps, PersistentObject, StorageError};
use crate::types::PAGE_SIZE;
use crate::utils::checked_page_align_up;
use crate::vmm::{EntryOutcome, SpRegs, FFA_ARG_REGS};
use alloc::boxed::Box;
use alloc::collections::BTreeMap;
use alloc::rc::Rc;
use alloc::vec;
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};
use core::fmt;
use miniz_oxide::deflate::compress_to_vec_zlib;

const TEST_ASPACE_BASE: usize = 0x4000_0000;

#[derive(Debug)]
struct TestPage {
    data: Vec<u8>,
    prot: Prot,
}

/// Page-granular address space backed by heap memory. Allocations are
/// separated by one unmapped guard page.
#[derive(Debug)]
pub struct TestAddressSpace {
    pages: BTreeMap<usize, TestPage>,
    next_va: usize,
    page_limit: usize,
    set_prot_calls: usize,
    get_prot_calls: Cell<usize>,
}

impl TestAddressSpace {
    pub fn new() -> Self {
        Self::with_page_limit(usize::MAX)
    }

    /// Address space that fails allocations beyond `page_limit` pages.
    pub fn with_page_limit(page_limit: usize) -> Self {
        Self {
            pages: BTreeMap::new(),
            next_va: TEST_ASPACE_BASE,
            page_limit,
            set_prot_calls: 0,
            get_prot_calls: Cell::new(0),
        }
    }

    pub fn set_prot_calls(&self) -> usize {
        self.set_prot_calls
    }

    pub fn get_prot_calls(&self) -> usize {
        self.get_prot_calls.get()
    }

    /// Page addresses covering `[va, va + size)`.
    fn page_range(va: VirtAddr, size: usize) -> Result<impl Iterator<Item = usize>, VmError> {
        if size == 0 {
            return Err(VmError::InvalidRange);
        }
        let end = va
            .bits()
            .checked_add(size)
            .and_then(checked_page_align_up)
            .ok_or(VmError::InvalidRange)?;
        Ok((va.page_align().bits()..end).step_by(PAGE_SIZE))
    }

    fn copy_range(
        &self,
        va: VirtAddr,
        len: usize,
        need: Prot,
    ) -> Result<Vec<(usize, usize, usize)>, VmError> {
        // (page, offset in page, chunk length)
        let mut chunks = Vec::new();
        let mut addr = va.bits();
        let mut left = len;

        while left > 0 {
            let page = addr & !(PAGE_SIZE - 1);
            let offset = addr - page;
            let chunk = left.min(PAGE_SIZE - offset);
            let entry = self.pages.get(&page).ok_or(VmError::NotMapped)?;
            if !entry.prot.contains(need) {
                return Err(VmError::AccessDenied);
            }
            chunks.push((page, offset, chunk));
            addr = addr.checked_add(chunk).ok_or(VmError::InvalidRange)?;
            left -= chunk;
        }

        Ok(chunks)
    }
}

impl Default for TestAddressSpace {
    fn default() -> Self {
        Self::new()
    }
}

impl AddressSpace for TestAddressSpace {
    fn map_zeroed(&mut self, size: usize, prot: Prot) -> Result<VirtAddr, VmError> {
        let size = checked_page_align_up(size)
            .filter(|s| *s != 0)
            .ok_or(VmError::InvalidRange)?;
        let npages = size / PAGE_SIZE;
        if self.pages.len() + npages > self.page_limit {
            return Err(VmError::OutOfMemory);
        }

        let va = self.next_va;
        for i in 0..npages {
            self.pages.insert(
                va + i * PAGE_SIZE,
                TestPage {
                    data: vec![0u8; PAGE_SIZE],
                    prot,
                },
            );
        }
        self.next_va = va + size + PAGE_SIZE;

        Ok(VirtAddr::new(va))
    }

    fn set_prot(&mut self, va: VirtAddr, size: usize, prot: Prot) -> Result<(), VmError> {
        self.set_prot_calls += 1;
        if !va.is_page_aligned() {
            return Err(VmError::InvalidRange);
        }

        let range: Vec<usize> = Self::page_range(va, size)?.collect();
        if range.iter().any(|page| !self.pages.contains_key(page)) {
            return Err(VmError::NotMapped);
        }
        for page in range {
            if let Some(entry) = self.pages.get_mut(&page) {
                entry.prot = prot;
            }
        }

        Ok(())
    }

    fn get_prot(&self, va: VirtAddr, size: usize) -> Result<Prot, VmError> {
        self.get_prot_calls.set(self.get_prot_calls.get() + 1);

        let mut prot = None;
        for page in Self::page_range(va, size)? {
            let entry = self.pages.get(&page).ok_or(VmError::NotMapped)?;
            match prot {
                None => prot = Some(entry.prot),
                Some(p) if p != entry.prot => return Err(VmError::InvalidRange),
                Some(_) => {}
            }
        }

        prot.ok_or(VmError::NotMapped)
    }

    fn read_bytes(&self, va: VirtAddr, buf: &mut [u8]) -> Result<(), VmError> {
        let mut pos = 0;
        for (page, offset, len) in self.copy_range(va, buf.len(), Prot::PR)? {
            let data = &self.pages[&page].data;
            buf[pos..pos + len].copy_from_slice(&data[offset..offset + len]);
            pos += len;
        }
        Ok(())
    }

    fn write_bytes(&mut self, va: VirtAddr, data: &[u8]) -> Result<(), VmError> {
        let mut pos = 0;
        for (page, offset, len) in self.copy_range(va, data.len(), Prot::PW)? {
            if let Some(entry) = self.pages.get_mut(&page) {
                entry.data[offset..offset + len].copy_from_slice(&data[pos..pos + len]);
            }
            pos += len;
        }
        Ok(())
    }

    fn mappings(&self) -> Vec<MappingInfo> {
        let mut out: Vec<MappingInfo> = Vec::new();

        for (&va, page) in self.pages.iter() {
            match out.last_mut() {
                Some(last)
                    if last.start + last.size == VirtAddr::new(va) && last.prot == page.prot =>
                {
                    last.size += PAGE_SIZE;
                }
                _ => out.push(MappingInfo {
                    start: VirtAddr::new(va),
                    size: PAGE_SIZE,
                    prot: page.prot,
                }),
            }
        }

        out
    }

    fn asid(&self) -> u32 {
        1
    }
}

#[derive(Debug, Default)]
struct StoredObject {
    data: Vec<u8>,
    corrupt: bool,
}

#[derive(Debug, Default)]
struct RamStoreState {
    objects: BTreeMap<Vec<u8>, StoredObject>,
    open_handles: usize,
    opens: usize,
    last_flags: Option<DataFlags>,
}

/// Object store kept in memory. Clones share the same objects.
#[derive(Clone, Debug, Default)]
pub struct RamStore {
    state: Rc<RefCell<RamStoreState>>,
}

impl RamStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, obj_id: &[u8], data: &[u8]) {
        self.state.borrow_mut().objects.insert(
            obj_id.to_vec(),
            StoredObject {
                data: data.to_vec(),
                corrupt: false,
            },
        );
    }

    /// Makes every subsequent read of `obj_id` fail its integrity check.
    pub fn mark_corrupt(&self, obj_id: &[u8]) {
        if let Some(obj) = self.state.borrow_mut().objects.get_mut(obj_id) {
            obj.corrupt = true;
        }
    }

    pub fn contents(&self, obj_id: &[u8]) -> Option<Vec<u8>> {
        self.state
            .borrow()
            .objects
            .get(obj_id)
            .map(|obj| obj.data.clone())
    }

    /// Handles currently open.
    pub fn open_handles(&self) -> usize {
        self.state.borrow().open_handles
    }

    /// Number of open and create calls so far.
    pub fn opens(&self) -> usize {
        self.state.borrow().opens
    }

    pub fn last_flags(&self) -> Option<DataFlags> {
        self.state.borrow().last_flags
    }

    fn handle(&self, po: &PersistentObject) -> Box<dyn FileHandle> {
        self.state.borrow_mut().open_handles += 1;
        Box::new(RamHandle {
            state: self.state.clone(),
            obj_id: po.obj_id().to_vec(),
        })
    }

    fn record_open(&self, po: &PersistentObject) {
        let mut state = self.state.borrow_mut();
        state.opens += 1;
        state.last_flags = Some(po.flags());
    }
}

impl FileOps for RamStore {
    fn open(&self, po: &PersistentObject) -> Result<Box<dyn FileHandle>, StorageError> {
        self.record_open(po);
        if !self.state.borrow().objects.contains_key(po.obj_id()) {
            return Err(StorageError::NotFound);
        }
        Ok(self.handle(po))
    }

    fn create(
        &self,
        po: &PersistentObject,
        overwrite: bool,
    ) -> Result<Box<dyn FileHandle>, StorageError> {
        self.record_open(po);
        {
            let mut state = self.state.borrow_mut();
            if state.objects.contains_key(po.obj_id()) && !overwrite {
                return Err(StorageError::AccessConflict);
            }
            state
                .objects
                .insert(po.obj_id().to_vec(), StoredObject::default());
        }
        Ok(self.handle(po))
    }

    fn remove(&self, po: &PersistentObject) -> Result<(), StorageError> {
        self.state
            .borrow_mut()
            .objects
            .remove(po.obj_id())
            .map(|_| ())
            .ok_or(StorageError::NotFound)
    }
}

#[derive(Debug)]
struct RamHandle {
    state: Rc<RefCell<RamStoreState>>,
    obj_id: Vec<u8>,
}

impl FileHandle for RamHandle {
    fn read(&mut self, offset: usize, buf: &mut [u8]) -> Result<usize, StorageError> {
        let state = self.state.borrow();
        let obj = state.objects.get(&self.obj_id).ok_or(StorageError::NotFound)?;
        if obj.corrupt {
            return Err(StorageError::Corrupt);
        }

        let avail = obj.data.get(offset..).unwrap_or(&[]);
        let n = avail.len().min(buf.len());
        buf[..n].copy_from_slice(&avail[..n]);
        Ok(n)
    }

    fn write(&mut self, offset: usize, data: &[u8]) -> Result<(), StorageError> {
        let mut state = self.state.borrow_mut();
        let obj = state
            .objects
            .get_mut(&self.obj_id)
            .ok_or(StorageError::NotFound)?;
        let end = offset.checked_add(data.len()).ok_or(StorageError::Io)?;
        if obj.data.len() < end {
            obj.data.resize(end, 0);
        }
        obj.data[offset..end].copy_from_slice(data);
        Ok(())
    }
}

impl Drop for RamHandle {
    fn drop(&mut self) {
        self.state.borrow_mut().open_handles -= 1;
    }
}

/// What the platform observed across partition entries.
#[derive(Debug, Default)]
pub struct Stats {
    pub entries: usize,
    pub masked_on_entry: bool,
    pub cntkctl_on_entry: u64,
    pub vfp_clears: usize,
    /// Argument registers handed to the partition on each entry
    pub entry_args: Vec<[u64; FFA_ARG_REGS]>,
}

type PartitionFn = dyn FnMut(&mut dyn AddressSpace, &mut SpRegs) -> EntryOutcome;

/// Platform whose "partition" is a closure run on every entry.
pub struct TestPlatform {
    partition: Box<PartitionFn>,
    stats: Rc<RefCell<Stats>>,
    masked: bool,
    cntkctl: u64,
}

impl fmt::Debug for TestPlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestPlatform")
            .field("stats", &self.stats)
            .field("masked", &self.masked)
            .field("cntkctl", &self.cntkctl)
            .finish_non_exhaustive()
    }
}

impl TestPlatform {
    pub fn new<F>(partition: F) -> Self
    where
        F: FnMut(&mut dyn AddressSpace, &mut SpRegs) -> EntryOutcome + 'static,
    {
        Self {
            partition: Box::new(partition),
            stats: Rc::new(RefCell::new(Stats::default())),
            masked: false,
            cntkctl: 0,
        }
    }

    pub fn stats(&self) -> Rc<RefCell<Stats>> {
        self.stats.clone()
    }

    pub fn is_masked(&self) -> bool {
        self.masked
    }
}

impl SpPlatform for TestPlatform {
    fn mask_exceptions(&mut self) -> ExceptionMask {
        let prev = ExceptionMask(u32::from(self.masked));
        self.masked = true;
        prev
    }

    fn restore_exceptions(&mut self, mask: ExceptionMask) {
        self.masked = mask.0 != 0;
    }

    fn read_cntkctl(&self) -> u64 {
        self.cntkctl
    }

    fn write_cntkctl(&mut self, val: u64) {
        self.cntkctl = val;
    }

    fn clear_vfp_state(&mut self) {
        self.stats.borrow_mut().vfp_clears += 1;
    }

    fn read_mpidr(&self) -> u64 {
        0x8000_0000
    }

    fn new_address_space(&mut self) -> Result<Box<dyn AddressSpace>, VmError> {
        Ok(Box::new(TestAddressSpace::new()))
    }

    fn enter_user_mode(
        &mut self,
        aspace: &mut dyn AddressSpace,
        regs: &mut SpRegs,
    ) -> EntryOutcome {
        {
            let mut stats = self.stats.borrow_mut();
            stats.entries += 1;
            stats.masked_on_entry = self.masked;
            stats.cntkctl_on_entry = self.cntkctl;
            stats.entry_args.push(regs.args());
        }
        (self.partition)(aspace, regs)
    }
}

/// Compresses `payload` into a partition image.
pub fn compressed_image(payload: &[u8]) -> SpImage {
    let data = compress_to_vec_zlib(payload, 6);
    SpImage {
        data: Box::leak(data.into_boxed_slice()),
        uncompressed_size: payload.len(),
    }
}
