//! Memory interface used by the interpreter.

use moxie_mmu::{AccessError, PagedMemory, PhysicalMemory};

/// Byte-addressed guest memory as seen by the interpreter.
///
/// Multi-byte values are little-endian and need not be aligned. Implementations either
/// address physical memory directly ([`PhysicalMemory`]) or translate every address through
/// the MMU first ([`PagedMemory`]).
pub trait CpuBus {
    /// Size of backing physical memory in bytes. The initial stack pointer is derived from it.
    fn size(&self) -> u32;

    fn get_byte(&mut self, addr: u32) -> Result<u8, AccessError>;
    fn get_short(&mut self, addr: u32) -> Result<u16, AccessError>;
    fn get_long(&mut self, addr: u32) -> Result<u32, AccessError>;

    fn store_byte(&mut self, addr: u32, value: u8) -> Result<(), AccessError>;
    fn store_short(&mut self, addr: u32, value: u16) -> Result<(), AccessError>;
    fn store_long(&mut self, addr: u32, value: u32) -> Result<(), AccessError>;
}

impl<T: CpuBus + ?Sized> CpuBus for &mut T {
    #[inline]
    fn size(&self) -> u32 {
        <T as CpuBus>::size(&**self)
    }

    #[inline]
    fn get_byte(&mut self, addr: u32) -> Result<u8, AccessError> {
        <T as CpuBus>::get_byte(&mut **self, addr)
    }

    #[inline]
    fn get_short(&mut self, addr: u32) -> Result<u16, AccessError> {
        <T as CpuBus>::get_short(&mut **self, addr)
    }

    #[inline]
    fn get_long(&mut self, addr: u32) -> Result<u32, AccessError> {
        <T as CpuBus>::get_long(&mut **self, addr)
    }

    #[inline]
    fn store_byte(&mut self, addr: u32, value: u8) -> Result<(), AccessError> {
        <T as CpuBus>::store_byte(&mut **self, addr, value)
    }

    #[inline]
    fn store_short(&mut self, addr: u32, value: u16) -> Result<(), AccessError> {
        <T as CpuBus>::store_short(&mut **self, addr, value)
    }

    #[inline]
    fn store_long(&mut self, addr: u32, value: u32) -> Result<(), AccessError> {
        <T as CpuBus>::store_long(&mut **self, addr, value)
    }
}

impl CpuBus for PhysicalMemory {
    #[inline]
    fn size(&self) -> u32 {
        PhysicalMemory::size(self)
    }

    #[inline]
    fn get_byte(&mut self, addr: u32) -> Result<u8, AccessError> {
        Ok(PhysicalMemory::get_byte(self, addr)?)
    }

    #[inline]
    fn get_short(&mut self, addr: u32) -> Result<u16, AccessError> {
        Ok(PhysicalMemory::get_short(self, addr)?)
    }

    #[inline]
    fn get_long(&mut self, addr: u32) -> Result<u32, AccessError> {
        Ok(PhysicalMemory::get_long(self, addr)?)
    }

    #[inline]
    fn store_byte(&mut self, addr: u32, value: u8) -> Result<(), AccessError> {
        Ok(PhysicalMemory::store_byte(self, addr, value)?)
    }

    #[inline]
    fn store_short(&mut self, addr: u32, value: u16) -> Result<(), AccessError> {
        Ok(PhysicalMemory::store_short(self, addr, value)?)
    }

    #[inline]
    fn store_long(&mut self, addr: u32, value: u32) -> Result<(), AccessError> {
        Ok(PhysicalMemory::store_long(self, addr, value)?)
    }
}

impl CpuBus for PagedMemory {
    #[inline]
    fn size(&self) -> u32 {
        self.physical().size()
    }

    #[inline]
    fn get_byte(&mut self, addr: u32) -> Result<u8, AccessError> {
        self.get_virtual_byte(addr)
    }

    #[inline]
    fn get_short(&mut self, addr: u32) -> Result<u16, AccessError> {
        self.get_virtual_short(addr)
    }

    #[inline]
    fn get_long(&mut self, addr: u32) -> Result<u32, AccessError> {
        self.get_virtual_long(addr)
    }

    #[inline]
    fn store_byte(&mut self, addr: u32, value: u8) -> Result<(), AccessError> {
        self.store_virtual_byte(addr, value)
    }

    #[inline]
    fn store_short(&mut self, addr: u32, value: u16) -> Result<(), AccessError> {
        self.store_virtual_short(addr, value)
    }

    #[inline]
    fn store_long(&mut self, addr: u32, value: u32) -> Result<(), AccessError> {
        self.store_virtual_long(addr, value)
    }
}
