use crate::{AccessError, AccessType, Mmu, MmuOptions, PhysicalMemory};

/// Physical memory accessed through the [`Mmu`].
///
/// Multi-byte accesses are translated by their first byte; the remaining bytes come from
/// the physically following addresses, even when the virtual access crosses a page.
#[derive(Debug, Clone)]
pub struct PagedMemory {
    mmu: Mmu,
    phys: PhysicalMemory,
}

impl PagedMemory {
    pub fn new(phys: PhysicalMemory) -> Self {
        Self::with_mmu(Mmu::new(), phys)
    }

    pub fn with_options(phys: PhysicalMemory, options: MmuOptions) -> Self {
        Self::with_mmu(Mmu::with_options(options), phys)
    }

    pub fn with_mmu(mmu: Mmu, phys: PhysicalMemory) -> Self {
        Self { mmu, phys }
    }

    #[inline]
    pub fn mmu(&self) -> &Mmu {
        &self.mmu
    }

    #[inline]
    pub fn mmu_mut(&mut self) -> &mut Mmu {
        &mut self.mmu
    }

    #[inline]
    pub fn physical(&self) -> &PhysicalMemory {
        &self.phys
    }

    /// Direct physical access, e.g. for building page tables or loading an image.
    /// Edits here are not reflected in already-cached translations.
    #[inline]
    pub fn physical_mut(&mut self) -> &mut PhysicalMemory {
        &mut self.phys
    }

    #[inline]
    pub fn into_parts(self) -> (Mmu, PhysicalMemory) {
        (self.mmu, self.phys)
    }

    #[inline]
    pub fn translate(&mut self, vaddr: u32, access: AccessType) -> Result<u32, AccessError> {
        self.mmu.translate(&self.phys, vaddr, access)
    }

    #[inline]
    pub fn get_virtual_byte(&mut self, vaddr: u32) -> Result<u8, AccessError> {
        let paddr = self.translate(vaddr, AccessType::Read)?;
        Ok(self.phys.get_byte(paddr)?)
    }

    #[inline]
    pub fn get_virtual_short(&mut self, vaddr: u32) -> Result<u16, AccessError> {
        let paddr = self.translate(vaddr, AccessType::Read)?;
        Ok(self.phys.get_short(paddr)?)
    }

    #[inline]
    pub fn get_virtual_long(&mut self, vaddr: u32) -> Result<u32, AccessError> {
        let paddr = self.translate(vaddr, AccessType::Read)?;
        Ok(self.phys.get_long(paddr)?)
    }

    #[inline]
    pub fn store_virtual_byte(&mut self, vaddr: u32, value: u8) -> Result<(), AccessError> {
        let paddr = self.translate(vaddr, AccessType::Write)?;
        Ok(self.phys.store_byte(paddr, value)?)
    }

    #[inline]
    pub fn store_virtual_short(&mut self, vaddr: u32, value: u16) -> Result<(), AccessError> {
        let paddr = self.translate(vaddr, AccessType::Write)?;
        Ok(self.phys.store_short(paddr, value)?)
    }

    #[inline]
    pub fn store_virtual_long(&mut self, vaddr: u32, value: u32) -> Result<(), AccessError> {
        let paddr = self.translate(vaddr, AccessType::Write)?;
        Ok(self.phys.store_long(paddr, value)?)
    }
}
