//! Moxie MMU: virtual → physical translation with a direct-mapped software TLB.
//!
//! Translation uses a two-level page table resident in physical memory:
//! - directory index = `vaddr[31:22]`, read from `page_directory_base + index * 4`
//! - table index = `vaddr[21:12]`, read from `(pde & frame_mask) + index * 4`
//! - byte offset = `vaddr[11:0]`
//!
//! Resolved leaf entries are cached in a 1024-slot direct-mapped TLB. The TLB is *not*
//! kept coherent with page-table edits: callers that rewrite an entry for a page that may
//! already be cached must call [`Mmu::invalidate_page`] or [`Mmu::flush_tlb`].

#![forbid(unsafe_code)]

mod paged;
mod tlb;

pub use moxie_mem::{MemoryError, PhysicalMemory};
pub use paged::PagedMemory;
pub use tlb::{TlbEntry, INVALID_TAG, TLB_ENTRIES};

use thiserror::Error;
use tlb::{tag_of, Tlb};


pub const PAGE_SHIFT: u32 = 12;
pub const PAGE_SIZE: u32 = 1 << PAGE_SHIFT;
pub const PAGE_OFFSET_MASK: u32 = PAGE_SIZE - 1;

/// Default mask applied to directory/table entries to obtain a frame address.
///
/// This keeps bits 31..10 even though pages are 4KiB, so bits 10 and 11 of an entry are
/// treated as part of the frame. Existing page tables are built against this layout; use
/// [`MmuOptions::frame_mask`] to select `0xFFFF_F000` instead.
pub const FRAME_MASK: u32 = 0xFFFF_FC00;

bitflags::bitflags! {
    /// Flag bits of page-directory and page-table entries.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct PteFlags: u32 {
        const PRESENT = 1 << 0;
        const WRITABLE = 1 << 1;
        const SUPERVISOR = 1 << 2;
    }
}

/// Builds a directory or table entry pointing at `frame`.
#[inline]
pub fn page_entry(frame: u32, flags: PteFlags) -> u32 {
    (frame & FRAME_MASK) | flags.bits()
}

/// Page-directory slot for `vaddr`.
#[inline]
pub const fn directory_index(vaddr: u32) -> u32 {
    vaddr >> 22
}

/// Page-table slot for `vaddr`.
#[inline]
pub const fn table_index(vaddr: u32) -> u32 {
    (vaddr >> PAGE_SHIFT) & 0x3FF
}

/// Type of memory access being translated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessType {
    Read,
    Write,
}

/// A failed virtual or physical memory access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AccessError {
    #[error(transparent)]
    Memory(#[from] MemoryError),

    #[error("page directory entry not present for vaddr={vaddr:#010x}")]
    PageDirectoryEntryNotPresent { vaddr: u32 },

    #[error("page not present for vaddr={vaddr:#010x}")]
    PageNotPresent { vaddr: u32 },

    #[error("write to read-only page at vaddr={vaddr:#010x}")]
    PageReadOnly { vaddr: u32 },

    #[error("page table maps vaddr={vaddr:#010x} to frame {frame:#010x} beyond physical memory")]
    PhysicalAddressOutOfRange { vaddr: u32, frame: u32 },
}

/// Construction-time MMU configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MmuOptions {
    /// Physical address of the page directory.
    pub page_directory_base: u32,
    /// Mask selecting the frame bits of directory/table entries.
    pub frame_mask: u32,
}

impl Default for MmuOptions {
    fn default() -> Self {
        Self {
            page_directory_base: 0,
            frame_mask: FRAME_MASK,
        }
    }
}

/// Optional MMU/TLB statistics.
///
/// When the `stats` feature is disabled, this type contains no fields and
/// [`Mmu::stats`] will always return `None`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MmuStats {
    /// Translations that consulted the TLB.
    #[cfg(feature = "stats")]
    pub tlb_lookups: u64,
    #[cfg(feature = "stats")]
    pub tlb_hits: u64,
    #[cfg(feature = "stats")]
    pub tlb_misses: u64,
    /// Walks that completed and installed a TLB entry.
    #[cfg(feature = "stats")]
    pub page_walks: u64,
    /// Whole-TLB flushes (explicit or due to a page directory change).
    #[cfg(feature = "stats")]
    pub tlb_flushes: u64,
    /// Single-page invalidations.
    #[cfg(feature = "stats")]
    pub tlb_invalidations: u64,
}

#[derive(Debug, Clone)]
pub struct Mmu {
    page_directory_base: u32,
    frame_mask: u32,
    tlb: Tlb,
    #[cfg(feature = "stats")]
    stats: MmuStats,
}

impl Default for Mmu {
    fn default() -> Self {
        Self::new()
    }
}

impl Mmu {
    pub fn new() -> Self {
        Self::with_options(MmuOptions::default())
    }

    pub fn with_options(options: MmuOptions) -> Self {
        Self {
            page_directory_base: options.page_directory_base,
            frame_mask: options.frame_mask,
            tlb: Tlb::new(),
            #[cfg(feature = "stats")]
            stats: MmuStats::default(),
        }
    }

    /// Returns current MMU/TLB statistics when the `stats` feature is enabled.
    #[inline]
    pub fn stats(&self) -> Option<MmuStats> {
        #[cfg(feature = "stats")]
        {
            Some(self.stats)
        }

        #[cfg(not(feature = "stats"))]
        {
            None
        }
    }

    /// Resets statistics counters back to 0 when the `stats` feature is enabled.
    #[inline]
    pub fn reset_stats(&mut self) {
        #[cfg(feature = "stats")]
        {
            self.stats = MmuStats::default();
        }
    }

    #[inline]
    pub fn page_directory_base(&self) -> u32 {
        self.page_directory_base
    }

    #[inline]
    pub fn frame_mask(&self) -> u32 {
        self.frame_mask
    }

    /// Points the walker at a new page directory. Flushes the TLB when the base changes.
    pub fn set_page_directory_base(&mut self, base: u32) {
        if self.page_directory_base != base {
            tracing::debug!(
                old = self.page_directory_base,
                new = base,
                "page directory base changed"
            );
            self.page_directory_base = base;
            self.flush_tlb();
        }
    }

    /// Drops every cached translation.
    pub fn flush_tlb(&mut self) {
        #[cfg(feature = "stats")]
        {
            self.stats.tlb_flushes = self.stats.tlb_flushes.wrapping_add(1);
        }
        tracing::debug!("tlb flush");
        self.tlb.flush_all();
    }

    /// Drops the cached translation of the page containing `vaddr`, if any.
    pub fn invalidate_page(&mut self, vaddr: u32) {
        #[cfg(feature = "stats")]
        {
            self.stats.tlb_invalidations = self.stats.tlb_invalidations.wrapping_add(1);
        }
        let dropped = self.tlb.invalidate(tag_of(vaddr));
        tracing::debug!(vaddr, dropped, "tlb invalidate page");
    }

    /// The cached translation for the page containing `vaddr`, without walking.
    pub fn tlb_entry(&self, vaddr: u32) -> Option<TlbEntry> {
        self.tlb.lookup(tag_of(vaddr))
    }

    /// Number of occupied TLB slots.
    pub fn tlb_len(&self) -> usize {
        self.tlb.valid_entries()
    }

    /// Translate a virtual address to a physical address.
    ///
    /// On a TLB miss the page tables are walked in `phys` and the result replaces whatever
    /// occupied the TLB slot. Writes to pages without [`PteFlags::WRITABLE`] fault whether
    /// the translation hit or missed.
    pub fn translate(
        &mut self,
        phys: &PhysicalMemory,
        vaddr: u32,
        access: AccessType,
    ) -> Result<u32, AccessError> {
        let tag = tag_of(vaddr);

        #[cfg(feature = "stats")]
        {
            self.stats.tlb_lookups = self.stats.tlb_lookups.wrapping_add(1);
        }

        let entry = match self.tlb.lookup(tag) {
            Some(entry) => {
                #[cfg(feature = "stats")]
                {
                    self.stats.tlb_hits = self.stats.tlb_hits.wrapping_add(1);
                }
                entry
            }
            None => {
                #[cfg(feature = "stats")]
                {
                    self.stats.tlb_misses = self.stats.tlb_misses.wrapping_add(1);
                }
                let entry = self.walk(phys, vaddr)?;
                self.tlb.insert(entry);
                entry
            }
        };

        if access == AccessType::Write && !entry.writable() {
            return Err(AccessError::PageReadOnly { vaddr });
        }

        Ok(entry
            .frame(self.frame_mask)
            .wrapping_add(vaddr & PAGE_OFFSET_MASK))
    }

    fn walk(&mut self, phys: &PhysicalMemory, vaddr: u32) -> Result<TlbEntry, AccessError> {
        let pde_addr = self
            .page_directory_base
            .wrapping_add(directory_index(vaddr) * 4);
        let pde = phys.get_long(pde_addr)?;
        if pde & PteFlags::PRESENT.bits() == 0 {
            return Err(AccessError::PageDirectoryEntryNotPresent { vaddr });
        }

        let pte_addr = (pde & self.frame_mask).wrapping_add(table_index(vaddr) * 4);
        let pte = phys.get_long(pte_addr)?;
        if pte & PteFlags::PRESENT.bits() == 0 {
            return Err(AccessError::PageNotPresent { vaddr });
        }

        let frame = pte & self.frame_mask;
        if frame >= phys.size() {
            return Err(AccessError::PhysicalAddressOutOfRange { vaddr, frame });
        }

        #[cfg(feature = "stats")]
        {
            self.stats.page_walks = self.stats.page_walks.wrapping_add(1);
        }
        tracing::trace!(vaddr, pde, pte, "tlb miss resolved");

        Ok(TlbEntry {
            tag: tag_of(vaddr),
            frame_and_flags: pte,
        })
    }
}
