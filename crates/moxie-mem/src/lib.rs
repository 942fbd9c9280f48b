//! Guest physical memory for the Moxie interpreter.
//!
//! [`PhysicalMemory`] is a flat, fixed-size, byte-addressable buffer. Multi-byte values are
//! little-endian and may start at any address as long as the whole access fits inside the
//! buffer; there is no alignment requirement on loads and stores.

#![forbid(unsafe_code)]

use thiserror::Error;

/// Smallest accepted memory size: the interpreter places its initial stack pointer at
/// `size - 4`.
pub const MIN_SIZE: usize = 4;

pub type Result<T> = std::result::Result<T, MemoryError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MemoryError {
    #[error("physical access out of range: addr={addr:#010x} len={len} size={size:#x}")]
    OutOfRange { addr: u32, len: usize, size: u32 },

    #[error("invalid physical memory size {size} (must be even, at least 4 and fit in 32 bits)")]
    InvalidSize { size: usize },

    #[error("copy into physical memory must use an even offset and length (offset={offset:#x} len={len})")]
    UnalignedCopy { offset: u32, len: usize },
}

#[derive(Clone, PartialEq, Eq)]
pub struct PhysicalMemory {
    bytes: Box<[u8]>,
    size: u32,
}

impl core::fmt::Debug for PhysicalMemory {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PhysicalMemory")
            .field("size", &self.size)
            .finish_non_exhaustive()
    }
}

impl PhysicalMemory {
    /// Allocates `size` zeroed bytes.
    pub fn new(size: usize) -> Result<Self> {
        if size % 2 != 0 || size < MIN_SIZE {
            return Err(MemoryError::InvalidSize { size });
        }
        let size_u32 = u32::try_from(size).map_err(|_| MemoryError::InvalidSize { size })?;
        Ok(Self {
            bytes: vec![0u8; size].into_boxed_slice(),
            size: size_u32,
        })
    }

    #[inline]
    pub fn size(&self) -> u32 {
        self.size
    }

    /// The whole buffer, for inspection and snapshots.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    #[inline]
    fn range(&self, addr: u32, len: usize) -> Result<core::ops::Range<usize>> {
        let start = addr as usize;
        match start.checked_add(len) {
            Some(end) if end <= self.bytes.len() => Ok(start..end),
            _ => Err(MemoryError::OutOfRange {
                addr,
                len,
                size: self.size,
            }),
        }
    }

    #[inline]
    fn read_array<const N: usize>(&self, addr: u32) -> Result<[u8; N]> {
        let range = self.range(addr, N)?;
        let mut buf = [0u8; N];
        buf.copy_from_slice(&self.bytes[range]);
        Ok(buf)
    }

    #[inline]
    fn write_array<const N: usize>(&mut self, addr: u32, src: [u8; N]) -> Result<()> {
        let range = self.range(addr, N)?;
        self.bytes[range].copy_from_slice(&src);
        Ok(())
    }

    #[inline]
    pub fn get_byte(&self, addr: u32) -> Result<u8> {
        Ok(self.read_array::<1>(addr)?[0])
    }

    #[inline]
    pub fn get_short(&self, addr: u32) -> Result<u16> {
        self.read_array(addr).map(u16::from_le_bytes)
    }

    #[inline]
    pub fn get_long(&self, addr: u32) -> Result<u32> {
        self.read_array(addr).map(u32::from_le_bytes)
    }

    #[inline]
    pub fn store_byte(&mut self, addr: u32, value: u8) -> Result<()> {
        self.write_array(addr, [value])
    }

    #[inline]
    pub fn store_short(&mut self, addr: u32, value: u16) -> Result<()> {
        self.write_array(addr, value.to_le_bytes())
    }

    #[inline]
    pub fn store_long(&mut self, addr: u32, value: u32) -> Result<()> {
        self.write_array(addr, value.to_le_bytes())
    }

    /// Reads `dst.len()` bytes starting at `addr`.
    pub fn read_bytes(&self, addr: u32, dst: &mut [u8]) -> Result<()> {
        let range = self.range(addr, dst.len())?;
        dst.copy_from_slice(&self.bytes[range]);
        Ok(())
    }

    /// Copies `src` verbatim to `offset`. Both the offset and the length must be even.
    pub fn copy_in(&mut self, offset: u32, src: &[u8]) -> Result<()> {
        if offset % 2 != 0 || src.len() % 2 != 0 {
            return Err(MemoryError::UnalignedCopy {
                offset,
                len: src.len(),
            });
        }
        let range = self.range(offset, src.len())?;
        self.bytes[range].copy_from_slice(src);
        Ok(())
    }

    /// Copies each `(physical offset, bytes)` segment of an executable image into memory, in
    /// order. Stops at the first segment that is misaligned or does not fit.
    pub fn load_segments<'a, I>(&mut self, segments: I) -> Result<()>
    where
        I: IntoIterator<Item = (u32, &'a [u8])>,
    {
        for (offset, bytes) in segments {
            self.copy_in(offset, bytes)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_odd_and_tiny_sizes() {
        assert_eq!(
            PhysicalMemory::new(85_001).unwrap_err(),
            MemoryError::InvalidSize { size: 85_001 }
        );
        assert_eq!(
            PhysicalMemory::new(2).unwrap_err(),
            MemoryError::InvalidSize { size: 2 }
        );
        assert_eq!(PhysicalMemory::new(4).unwrap().size(), 4);
    }

    #[test]
    fn end_check_does_not_overflow() {
        let mem = PhysicalMemory::new(16).unwrap();
        assert_eq!(
            mem.get_long(u32::MAX),
            Err(MemoryError::OutOfRange {
                addr: u32::MAX,
                len: 4,
                size: 16
            })
        );
    }

    #[test]
    fn copy_in_requires_even_offset_and_length() {
        let mut mem = PhysicalMemory::new(64).unwrap();
        assert_eq!(
            mem.copy_in(1, &[1, 2]),
            Err(MemoryError::UnalignedCopy { offset: 1, len: 2 })
        );
        assert_eq!(
            mem.copy_in(2, &[1, 2, 3]),
            Err(MemoryError::UnalignedCopy { offset: 2, len: 3 })
        );
        assert!(mem.copy_in(62, &[1, 2, 3, 4]).is_err());
        mem.copy_in(2, &[0xAA, 0xBB]).unwrap();
        assert_eq!(mem.get_short(2), Ok(0xBBAA));
    }

    #[test]
    fn load_segments_places_each_segment() {
        let mut mem = PhysicalMemory::new(0x100).unwrap();
        let text = [0x01u8, 0x02, 0x03, 0x04];
        let data = [0xFFu8, 0xEE];
        mem.load_segments([(0x10, &text[..]), (0x80, &data[..])])
            .unwrap();
        assert_eq!(mem.get_long(0x10), Ok(0x0403_0201));
        assert_eq!(mem.get_short(0x80), Ok(0xEEFF));
        assert_eq!(mem.get_byte(0x12), Ok(0x03));
    }
}
