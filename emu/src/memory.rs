//! The emulated machine memory: a flat 2 MiB byte-addressable region,
//! zero-initialised, little-endian. The program image is loaded at
//! offset 0 and 4/8-byte accesses need not be aligned.

use thiserror::Error;

/// Size of the emulated memory region in bytes.
pub const MEMORY_SIZE: usize = 2 * 1024 * 1024;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MemoryError {
    #[error("program image of {size} bytes does not fit the {MEMORY_SIZE} byte memory")]
    ImageTooLarge { size: usize },
}

/// Byte-addressable memory backing a single emulation run.
///
/// Out-of-region accesses are a fatal error: the emulated program has no
/// way to recover and the run aborts with a panic.
pub struct Memory {
    data: Box<[u8]>,
}

impl Default for Memory {
    fn default() -> Self {
        Self {
            data: vec![0; MEMORY_SIZE].into_boxed_slice(),
        }
    }
}

impl Memory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Copies a program image to offset 0.
    pub fn load_image(&mut self, image: &[u8]) -> Result<(), MemoryError> {
        if image.len() > MEMORY_SIZE {
            return Err(MemoryError::ImageTooLarge { size: image.len() });
        }
        self.data[..image.len()].copy_from_slice(image);
        Ok(())
    }

    fn range(&self, address: u64, size: usize) -> &[u8] {
        let start = usize::try_from(address).expect("memory address overflows usize");
        let end = start
            .checked_add(size)
            .filter(|end| *end <= MEMORY_SIZE)
            .unwrap_or_else(|| {
                panic!("memory access of {size} bytes at 0x{address:x} is out of the memory region")
            });
        &self.data[start..end]
    }

    fn range_mut(&mut self, address: u64, size: usize) -> &mut [u8] {
        let start = usize::try_from(address).expect("memory address overflows usize");
        let end = start
            .checked_add(size)
            .filter(|end| *end <= MEMORY_SIZE)
            .unwrap_or_else(|| {
                panic!("memory access of {size} bytes at 0x{address:x} is out of the memory region")
            });
        &mut self.data[start..end]
    }

    #[must_use]
    pub fn read_word(&self, address: u64) -> u32 {
        u32::from_le_bytes(self.range(address, 4).try_into().unwrap())
    }

    pub fn write_word(&mut self, address: u64, value: u32) {
        self.range_mut(address, 4).copy_from_slice(&value.to_le_bytes());
    }

    #[must_use]
    pub fn read_doubleword(&self, address: u64) -> u64 {
        u64::from_le_bytes(self.range(address, 8).try_into().unwrap())
    }

    pub fn write_doubleword(&mut self, address: u64, value: u64) {
        self.range_mut(address, 8).copy_from_slice(&value.to_le_bytes());
    }

    /// Iterates the non-zero 32-bit words of the whole region in
    /// ascending address order, as `(byte_address, word)` pairs.
    pub fn non_zero_words(&self) -> impl Iterator<Item = (usize, u32)> + '_ {
        self.data
            .chunks_exact(4)
            .enumerate()
            .filter_map(|(index, chunk)| {
                let word = u32::from_le_bytes(chunk.try_into().unwrap());
                (word != 0).then_some((index * 4, word))
            })
    }
}
