//! Raw access to the bytes behind [`VirtualAddress`]es.

use alloc::{vec, vec::Vec};
use core::{error, fmt, ops::Range};

use crate::address::VirtualAddress;

/// The raw memory-copy primitive.
pub trait MemoryAccess {
    /// Copies `count` bytes starting at `src` to the bytes starting at `dest`.
    ///
    /// The two regions may overlap.
    fn copy(&mut self, src: VirtualAddress, dest: VirtualAddress, count: u64);
}

/// A contiguous, owned region of bytes that is addressed starting at a base [`VirtualAddress`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArenaMemory {
    /// The address of the first byte of `bytes`.
    base: VirtualAddress,
    /// The backing storage.
    bytes: Vec<u8>,
}

impl ArenaMemory {
    /// Constructs a zero-filled [`ArenaMemory`] of `size` bytes located at `base`.
    pub fn new(base: VirtualAddress, size: usize) -> Self {
        Self {
            base,
            bytes: vec![0; size],
        }
    }

    /// Returns the address of the first byte in the arena.
    pub const fn base(&self) -> VirtualAddress {
        self.base
    }

    /// Returns the number of bytes in the arena.
    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    /// Returns the bytes in `[address, address + count)`.
    ///
    /// # Errors
    ///
    /// Returns [`AccessError`] if the range is not entirely contained in the arena.
    pub fn read(&self, address: VirtualAddress, count: u64) -> Result<&[u8], AccessError> {
        let range = self.index_range(address, count)?;
        Ok(&self.bytes[range])
    }

    /// Writes `data` to the bytes starting at `address`.
    ///
    /// # Errors
    ///
    /// Returns [`AccessError`] if the range is not entirely contained in the arena.
    pub fn write(&mut self, address: VirtualAddress, data: &[u8]) -> Result<(), AccessError> {
        let count = u64::try_from(data.len()).map_err(|_| AccessError { address, count: 0 })?;
        let range = self.index_range(address, count)?;
        self.bytes[range].copy_from_slice(data);
        Ok(())
    }

    /// Converts `[address, address + count)` into an index range into `bytes`.
    fn index_range(
        &self,
        address: VirtualAddress,
        count: u64,
    ) -> Result<Range<usize>, AccessError> {
        let error = AccessError { address, count };

        let start = address
            .checked_offset_from(self.base)
            .and_then(|offset| usize::try_from(offset).ok())
            .ok_or(error)?;
        let end = usize::try_from(count)
            .ok()
            .and_then(|count| start.checked_add(count))
            .ok_or(error)?;
        if end > self.bytes.len() {
            return Err(error);
        }

        Ok(start..end)
    }
}

impl MemoryAccess for ArenaMemory {
    /// # Panics
    ///
    /// Panics if either region is not entirely contained in the arena.
    fn copy(&mut self, src: VirtualAddress, dest: VirtualAddress, count: u64) {
        let src = match self.index_range(src, count) {
            Ok(range) => range,
            Err(error) => panic!("invalid copy source: {error}"),
        };
        let dest = match self.index_range(dest, count) {
            Ok(range) => range,
            Err(error) => panic!("invalid copy destination: {error}"),
        };

        self.bytes.copy_within(src, dest.start);
    }
}

/// An access to bytes outside of an [`ArenaMemory`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AccessError {
    /// The first address of the rejected access.
    pub address: VirtualAddress,
    /// The number of bytes in the rejected access.
    pub count: u64,
}

impl fmt::Display for AccessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "access of {} bytes at {} is outside of the arena",
            self.count, self.address
        )
    }
}

impl error::Error for AccessError {}

#[cfg(test)]
mod test {
    use super::{AccessError, ArenaMemory, MemoryAccess};
    use crate::address::VirtualAddress;

    #[test]
    fn read_write_bounds() {
        let base = VirtualAddress::new(0x100);
        let mut arena = ArenaMemory::new(base, 8);

        arena.write(base.strict_add(2), &[1, 2, 3]).unwrap();
        assert_eq!(arena.read(base, 6).unwrap(), &[0, 0, 1, 2, 3, 0]);

        assert_eq!(
            arena.read(base.strict_add(4), 5),
            Err(AccessError {
                address: base.strict_add(4),
                count: 5
            })
        );
        assert!(arena.read(VirtualAddress::new(0xFF), 1).is_err());
        assert!(arena.write(base.strict_add(7), &[1, 2]).is_err());
    }

    #[test]
    fn overlapping_copy() {
        let base = VirtualAddress::new(0x100);
        let mut arena = ArenaMemory::new(base, 6);
        arena.write(base, &[1, 2, 3, 4, 5, 6]).unwrap();

        arena.copy(base, base.strict_add(2), 4);
        assert_eq!(arena.read(base, 6).unwrap(), &[1, 2, 1, 2, 3, 4]);
    }

    #[test]
    #[should_panic(expected = "invalid copy destination")]
    fn copy_out_of_bounds_panics() {
        let base = VirtualAddress::new(0x100);
        let mut arena = ArenaMemory::new(base, 4);

        arena.copy(base, base.strict_add(2), 3);
    }
}
