//! # Frame Memory
//!
//! Byte-addressable scratch memory for a message frame. Grows on demand in
//! 32-byte words up to a ceiling taken from
//! [`VmConfig`](crate::domain::entities::VmConfig); the quadratic price
//! schedule makes the ceiling unreachable under any sane gas budget.
//!
//! Reads past the allocated region observe zeros without growing the
//! buffer, which keeps every read path total. Writes grow the buffer and
//! report how many fresh words they allocated so the caller can price them.

use crate::domain::invariants::limits;
use crate::errors::MemoryError;

/// Word size in bytes (32 bytes = 256 bits).
pub const WORD_SIZE: usize = 32;

/// Expandable byte-addressable memory.
#[derive(Clone, Debug)]
pub struct Memory {
    bytes: Vec<u8>,
    limit: usize,
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}

impl Memory {
    /// Empty memory with the protocol size ceiling.
    #[must_use]
    pub fn new() -> Self {
        Self::with_limit(limits::MAX_MEMORY_SIZE)
    }

    /// Empty memory with a custom size ceiling.
    #[must_use]
    pub fn with_limit(limit: usize) -> Self {
        Self {
            bytes: Vec::new(),
            limit,
        }
    }

    /// Allocated size in bytes, always a whole number of words.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// True when nothing has been allocated yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Allocated size in 32-byte words.
    #[must_use]
    pub fn word_size(&self) -> usize {
        words(self.bytes.len())
    }

    /// Configured size ceiling in bytes.
    #[must_use]
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Grows the buffer so at least `size` bytes are allocated, rounding
    /// up to a word boundary. Returns the number of fresh words.
    ///
    /// # Errors
    ///
    /// `LimitExceeded` when the rounded size would pass the ceiling.
    pub fn expand(&mut self, size: usize) -> Result<usize, MemoryError> {
        if size <= self.bytes.len() {
            return Ok(0);
        }

        let target_words = words(size);
        let target = target_words
            .checked_mul(WORD_SIZE)
            .filter(|&target| target <= self.limit)
            .ok_or(MemoryError::LimitExceeded {
                requested: size,
                max: self.limit,
            })?;

        let grown = target_words - self.word_size();
        self.bytes.resize(target, 0);
        Ok(grown)
    }

    /// A single byte; unallocated positions read as zero.
    #[must_use]
    pub fn read_byte(&self, offset: usize) -> u8 {
        self.bytes.get(offset).copied().unwrap_or(0)
    }

    /// A 32-byte word; unallocated positions read as zero.
    #[must_use]
    pub fn read_word(&self, offset: usize) -> [u8; 32] {
        let mut word = [0u8; 32];
        self.copy_out(offset, &mut word);
        word
    }

    /// A fresh buffer of `size` bytes; unallocated positions read as zero.
    #[must_use]
    pub fn read_bytes(&self, offset: usize, size: usize) -> Vec<u8> {
        let mut out = vec![0u8; size];
        self.copy_out(offset, &mut out);
        out
    }

    /// Writes one byte, growing if necessary. Returns fresh words.
    ///
    /// # Errors
    ///
    /// `LimitExceeded` when growth would pass the ceiling.
    pub fn write_byte(&mut self, offset: usize, value: u8) -> Result<usize, MemoryError> {
        self.splice(offset, &[value])
    }

    /// Writes a 32-byte word, growing if necessary. Returns fresh words.
    ///
    /// # Errors
    ///
    /// `LimitExceeded` when growth would pass the ceiling.
    pub fn write_word(&mut self, offset: usize, word: &[u8; 32]) -> Result<usize, MemoryError> {
        self.splice(offset, word)
    }

    /// Writes a byte run, growing if necessary. Returns fresh words.
    ///
    /// # Errors
    ///
    /// `LimitExceeded` when growth would pass the ceiling.
    pub fn write_bytes(&mut self, offset: usize, data: &[u8]) -> Result<usize, MemoryError> {
        self.splice(offset, data)
    }

    /// Fills `dest` from the allocated region starting at `offset`,
    /// leaving bytes past the allocation untouched (callers pre-zero).
    fn copy_out(&self, offset: usize, dest: &mut [u8]) {
        let Some(available) = self.bytes.len().checked_sub(offset) else {
            return;
        };
        let run = available.min(dest.len());
        dest[..run].copy_from_slice(&self.bytes[offset..offset + run]);
    }

    fn splice(&mut self, offset: usize, src: &[u8]) -> Result<usize, MemoryError> {
        if src.is_empty() {
            return Ok(0);
        }
        // A saturated end exceeds any ceiling, so expand rejects it.
        let end = offset.saturating_add(src.len());
        let grown = self.expand(end)?;
        self.bytes[offset..end].copy_from_slice(src);
        Ok(grown)
    }
}

/// Total gas cost of a memory footprint of `word_size` words.
///
/// Cost = (`word_size^2` / 512) + (3 * `word_size`)
///
/// Saturates: costs are computed before any growth happens, so the
/// formula must stay defined even for absurd requested sizes.
#[must_use]
pub fn memory_gas_cost(word_size: usize) -> u64 {
    let word_size = word_size as u64;
    (word_size.saturating_mul(word_size) / 512).saturating_add(3u64.saturating_mul(word_size))
}

/// Incremental gas cost of growing from `old_word_size` to
/// `new_word_size`; zero when no growth happens.
#[must_use]
pub fn memory_expansion_cost(old_word_size: usize, new_word_size: usize) -> u64 {
    memory_gas_cost(new_word_size).saturating_sub(memory_gas_cost(old_word_size))
}

/// Number of 32-byte words covering `bytes` bytes (rounded up).
#[must_use]
pub fn words(bytes: usize) -> usize {
    bytes.div_ceil(WORD_SIZE)
}

// =============================================================================
// TESTS
// =============================================================================
