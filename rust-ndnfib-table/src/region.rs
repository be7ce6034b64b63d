//! Backing memory for the index and the record log.
//!
//! The table only needs zeroed, byte-addressable regions; where they come
//! from is decided by the [`RegionAllocator`] handed to the table. Tests use
//! the heap, deployments may prefer anonymous mappings.

use log::debug;
use memmap2::{MmapMut, MmapOptions};
use rust_ndnfib_common::{Error, Result};
use std::alloc::{self, Layout};
use std::ptr::NonNull;

/// A zero-initialised byte region.
pub trait Region: Send + Sync {
    /// The region's bytes.
    fn as_bytes(&self) -> &[u8];

    /// The region's bytes, mutably.
    fn as_bytes_mut(&mut self) -> &mut [u8];

    /// Region length in bytes.
    fn len(&self) -> usize {
        self.as_bytes().len()
    }

    /// Whether the region is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Source of zeroed regions.
pub trait RegionAllocator {
    type Region: Region;

    /// Acquire `len` zeroed bytes aligned to at least `align`.
    fn allocate(&self, len: usize, align: usize) -> Result<Self::Region>;
}

/* ---------------------------------------------------------------- *
 * Heap
 * ---------------------------------------------------------------- */

/// Zeroed heap memory with an explicit alignment.
pub struct HeapRegion {
    ptr: NonNull<u8>,
    layout: Layout,
}

// SAFETY: HeapRegion uniquely owns its allocation; shared access only
// hands out `&[u8]`.
unsafe impl Send for HeapRegion {}
unsafe impl Sync for HeapRegion {}

impl HeapRegion {
    pub fn zeroed(len: usize, align: usize) -> Result<Self> {
        let layout = Layout::from_size_align(len.max(1), align)
            .map_err(|e| Error::Allocation(format!("bad layout ({len} bytes, align {align}): {e}")))?;
        // SAFETY: layout has non-zero size.
        let raw = unsafe { alloc::alloc_zeroed(layout) };
        let ptr = NonNull::new(raw)
            .ok_or_else(|| Error::Allocation(format!("heap allocation of {len} bytes failed")))?;
        Ok(Self { ptr, layout })
    }
}

impl Region for HeapRegion {
    fn as_bytes(&self) -> &[u8] {
        // SAFETY: ptr is valid for layout.size() initialised bytes.
        unsafe { std::slice::from_raw_parts(self.ptr.as_ptr(), self.layout.size()) }
    }

    fn as_bytes_mut(&mut self) -> &mut [u8] {
        // SAFETY: as above, and &mut self guarantees exclusivity.
        unsafe { std::slice::from_raw_parts_mut(self.ptr.as_ptr(), self.layout.size()) }
    }
}

impl Drop for HeapRegion {
    fn drop(&mut self) {
        // SAFETY: allocated in `zeroed` with this layout.
        unsafe { alloc::dealloc(self.ptr.as_ptr(), self.layout) }
    }
}

impl std::fmt::Debug for HeapRegion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HeapRegion")
            .field("len", &self.layout.size())
            .field("align", &self.layout.align())
            .finish()
    }
}

/// Allocates [`HeapRegion`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeapAllocator;

impl RegionAllocator for HeapAllocator {
    type Region = HeapRegion;

    fn allocate(&self, len: usize, align: usize) -> Result<HeapRegion> {
        debug!("Allocating {} heap bytes (align {})", len, align);
        HeapRegion::zeroed(len, align)
    }
}

/* ---------------------------------------------------------------- *
 * Anonymous mapping
 * ---------------------------------------------------------------- */

/// Anonymous memory mapping. Page aligned and zero-filled by the kernel.
#[derive(Debug)]
pub struct MmapRegion {
    map: MmapMut,
}

impl Region for MmapRegion {
    fn as_bytes(&self) -> &[u8] {
        &self.map
    }

    fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.map
    }
}

/// Allocates [`MmapRegion`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnonMmapAllocator {
    /// Pre-fault the mapping.
    pub populate: bool,
}

/// Alignment an anonymous mapping is guaranteed to have.
const MIN_PAGE_SIZE: usize = 4096;

impl RegionAllocator for AnonMmapAllocator {
    type Region = MmapRegion;

    fn allocate(&self, len: usize, align: usize) -> Result<MmapRegion> {
        if align > MIN_PAGE_SIZE {
            return Err(Error::Allocation(format!(
                "anonymous mappings cannot guarantee {align}-byte alignment"
            )));
        }
        debug!("Mapping {} anonymous bytes", len);
        let mut options = MmapOptions::new();
        options.len(len.max(1));
        if self.populate {
            options.populate();
        }
        let map = options.map_anon()?;
        Ok(MmapRegion { map })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check_zeroed_and_writable<R: Region>(mut region: R, len: usize, align: usize) {
        assert_eq!(region.len(), len);
        assert_eq!(region.as_bytes().as_ptr() as usize % align, 0);
        assert!(region.as_bytes().iter().all(|&b| b == 0));
        region.as_bytes_mut()[len - 1] = 0xAB;
        assert_eq!(region.as_bytes()[len - 1], 0xAB);
    }

    #[test]
    fn test_heap_region() {
        let region = HeapAllocator.allocate(4096, 64).unwrap();
        check_zeroed_and_writable(region, 4096, 64);
    }

    #[test]
    fn test_heap_region_rejects_bad_alignment() {
        assert!(matches!(
            HeapAllocator.allocate(64, 24),
            Err(Error::Allocation(_))
        ));
    }

    #[test]
    fn test_mmap_region() {
        let region = AnonMmapAllocator::default().allocate(8192, 64).unwrap();
        check_zeroed_and_writable(region, 8192, 64);
    }
}
