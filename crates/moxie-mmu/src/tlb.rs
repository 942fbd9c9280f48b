use crate::{PteFlags, PAGE_SHIFT};

/// Number of TLB slots. The TLB is direct-mapped: slot = `tag % TLB_ENTRIES`.
pub const TLB_ENTRIES: usize = 1024;

/// Tag stored in empty slots.
///
/// Real tags are `vaddr >> 12` and therefore have their top 12 bits clear, so a lookup can
/// test validity and tag equality with a single comparison.
pub const INVALID_TAG: u32 = u32::MAX;

/// A cached page-table entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TlbEntry {
    /// Virtual page number (`vaddr >> 12`), or [`INVALID_TAG`].
    pub tag: u32,
    /// The leaf page-table entry as read from memory: frame bits plus [`PteFlags`].
    pub frame_and_flags: u32,
}

impl TlbEntry {
    pub const INVALID: TlbEntry = TlbEntry {
        tag: INVALID_TAG,
        frame_and_flags: 0,
    };

    #[inline]
    pub fn is_valid(&self) -> bool {
        self.tag != INVALID_TAG
    }

    #[inline]
    pub fn flags(&self) -> PteFlags {
        PteFlags::from_bits_truncate(self.frame_and_flags)
    }

    #[inline]
    pub fn writable(&self) -> bool {
        self.frame_and_flags & PteFlags::WRITABLE.bits() != 0
    }

    #[inline]
    pub fn frame(&self, frame_mask: u32) -> u32 {
        self.frame_and_flags & frame_mask
    }
}

#[inline]
pub(crate) fn tag_of(vaddr: u32) -> u32 {
    vaddr >> PAGE_SHIFT
}

#[inline]
fn slot_of(tag: u32) -> usize {
    (tag as usize) & (TLB_ENTRIES - 1)
}

#[derive(Clone)]
pub(crate) struct Tlb {
    entries: Box<[TlbEntry; TLB_ENTRIES]>,
}

impl Tlb {
    pub(crate) fn new() -> Self {
        Self {
            entries: Box::new([TlbEntry::INVALID; TLB_ENTRIES]),
        }
    }

    #[inline]
    pub(crate) fn lookup(&self, tag: u32) -> Option<TlbEntry> {
        let entry = self.entries[slot_of(tag)];
        (entry.tag == tag).then_some(entry)
    }

    /// Overwrites whatever occupies the entry's slot.
    #[inline]
    pub(crate) fn insert(&mut self, entry: TlbEntry) {
        self.entries[slot_of(entry.tag)] = entry;
    }

    /// Drops the translation for `tag`, if cached. Returns whether anything was dropped.
    pub(crate) fn invalidate(&mut self, tag: u32) -> bool {
        let slot = &mut self.entries[slot_of(tag)];
        if slot.tag == tag {
            *slot = TlbEntry::INVALID;
            true
        } else {
            false
        }
    }

    pub(crate) fn flush_all(&mut self) {
        self.entries.fill(TlbEntry::INVALID);
    }

    pub(crate) fn valid_entries(&self) -> usize {
        self.entries.iter().filter(|e| e.is_valid()).count()
    }
}

impl core::fmt::Debug for Tlb {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tlb")
            .field("valid_entries", &self.valid_entries())
            .finish()
    }
}
