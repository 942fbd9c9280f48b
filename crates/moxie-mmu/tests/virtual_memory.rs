use moxie_mmu::{
    directory_index, page_entry, table_index, AccessError, PagedMemory, PhysicalMemory, PteFlags,
    PAGE_SIZE,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

fn rw() -> PteFlags {
    PteFlags::PRESENT | PteFlags::WRITABLE
}

#[test]
fn byte_from_virtual_address_with_empty_tlb_can_be_read() {
    let mut mem = PagedMemory::new(PhysicalMemory::new(85_000).unwrap());
    let vaddr = 65_536u32;

    let phys = mem.physical_mut();
    phys.copy_in(0, &page_entry(4096, rw()).to_le_bytes())
        .unwrap();
    let pte_addr = 4096 + table_index(vaddr) * 4;
    phys.copy_in(pte_addr, &page_entry(8192, rw()).to_le_bytes())
        .unwrap();
    phys.copy_in(8192, &[66, 33]).unwrap();

    assert_eq!(mem.get_virtual_byte(vaddr), Ok(66));
    assert_eq!(mem.get_virtual_byte(vaddr + 1), Ok(33));
}

/// Identity-maps every page of `size` bytes with the directory at 0 and page tables placed
/// right after it. Returns the first address not used by paging structures.
fn identity_mapped(size: usize) -> (PagedMemory, u32) {
    let mut phys = PhysicalMemory::new(size).unwrap();
    let pages = size as u32 / PAGE_SIZE;
    let tables = pages.div_ceil(1024);
    for table in 0..tables {
        let table_base = PAGE_SIZE * (1 + table);
        phys.store_long(table * 4, page_entry(table_base, rw()))
            .unwrap();
    }
    for page in 0..pages {
        let vaddr = page * PAGE_SIZE;
        let table_base = PAGE_SIZE * (1 + directory_index(vaddr));
        phys.store_long(table_base + table_index(vaddr) * 4, page_entry(vaddr, rw()))
            .unwrap();
    }
    (PagedMemory::new(phys), PAGE_SIZE * (1 + tables))
}

#[test]
fn identity_mapped_longs_round_trip() {
    const SEED: u64 = 0x6d6f_7869_65;
    let (mut mem, first_free) = identity_mapped(1 << 20);
    let end = mem.physical().size() - 4;

    let mut rng = ChaCha8Rng::seed_from_u64(SEED);
    for addr in (first_free..end).step_by(4) {
        mem.store_virtual_long(addr, rng.gen()).unwrap();
    }

    let mut rng = ChaCha8Rng::seed_from_u64(SEED);
    for addr in (first_free..end).step_by(4) {
        let expected: u32 = rng.gen();
        assert_eq!(mem.get_virtual_long(addr), Ok(expected), "addr={addr:#x}");
        assert_eq!(mem.physical().get_long(addr), Ok(expected));
    }
}

#[test]
fn virtual_shorts_and_bytes_hit_the_same_bytes() {
    let (mut mem, first_free) = identity_mapped(64 * 1024);
    mem.store_virtual_long(first_free, 0xDEAD_BEEF).unwrap();
    assert_eq!(mem.get_virtual_short(first_free), Ok(0xBEEF));
    assert_eq!(mem.get_virtual_byte(first_free + 3), Ok(0xDE));

    mem.store_virtual_short(first_free + 1, 0x1234).unwrap();
    mem.store_virtual_byte(first_free + 3, 0x56).unwrap();
    assert_eq!(mem.get_virtual_long(first_free), Ok(0x5612_34EF));
}

#[test]
fn store_to_read_only_page_faults_without_writing() {
    let (mut mem, first_free) = identity_mapped(64 * 1024);
    let pte_addr = PAGE_SIZE + table_index(first_free) * 4;
    mem.physical_mut()
        .store_long(pte_addr, page_entry(first_free, PteFlags::PRESENT))
        .unwrap();

    assert_eq!(
        mem.store_virtual_long(first_free, 1),
        Err(AccessError::PageReadOnly { vaddr: first_free })
    );
    assert_eq!(mem.get_virtual_long(first_free), Ok(0));
}

#[test]
fn access_running_off_the_end_of_memory_is_reported() {
    let (mut mem, _) = identity_mapped(64 * 1024);
    let last = mem.physical().size() - 2;
    assert!(matches!(
        mem.get_virtual_long(last),
        Err(AccessError::Memory(_))
    ));
    assert!(mem.get_virtual_short(last).is_ok());
}

#[test]
fn unmapped_virtual_address_faults() {
    let (mut mem, _) = identity_mapped(64 * 1024);
    assert_eq!(
        mem.get_virtual_byte(0x0100_0000),
        Err(AccessError::PageDirectoryEntryNotPresent { vaddr: 0x0100_0000 })
    );
    // 64KiB maps 16 pages; page 16 has a directory entry but no table entry.
    assert_eq!(
        mem.get_virtual_byte(16 * PAGE_SIZE),
        Err(AccessError::PageNotPresent {
            vaddr: 16 * PAGE_SIZE
        })
    );
}
