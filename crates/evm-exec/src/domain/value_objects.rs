//! # Value Objects
//!
//! Immutable machine-word primitives. Each type is defined by its value
//! alone and carries no behavior beyond conversion and formatting; the
//! fixed-width kinds share their scaffolding through [`byte_newtype`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Deref;

// Re-export U256 from primitive-types for 256-bit machine words
pub use primitive_types::U256;

fn hex(f: &mut fmt::Formatter<'_>, bytes: &[u8]) -> fmt::Result {
    for byte in bytes {
        write!(f, "{byte:02x}")?;
    }
    Ok(())
}

/// Fixed-width byte wrapper: constructors, zero checks, array
/// conversions, and a full-hex `Debug`.
macro_rules! byte_newtype {
    ($(#[$meta:meta])* $name:ident, $len:expr) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
        pub struct $name(pub [u8; $len]);

        impl $name {
            /// All bytes zero.
            pub const ZERO: Self = Self([0u8; $len]);

            /// Wraps a byte array.
            #[must_use]
            pub const fn new(bytes: [u8; $len]) -> Self {
                Self(bytes)
            }

            /// Copies a slice of exactly the right length, `None` otherwise.
            #[must_use]
            pub fn from_slice(slice: &[u8]) -> Option<Self> {
                slice.try_into().ok().map(Self)
            }

            /// Borrows the raw bytes.
            #[must_use]
            pub const fn as_bytes(&self) -> &[u8; $len] {
                &self.0
            }

            /// True when every byte is zero.
            #[must_use]
            pub fn is_zero(&self) -> bool {
                self.0 == [0u8; $len]
            }
        }

        impl From<[u8; $len]> for $name {
            fn from(bytes: [u8; $len]) -> Self {
                Self(bytes)
            }
        }

        impl From<$name> for [u8; $len] {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("0x")?;
                hex(f, &self.0)
            }
        }
    };
}

/// 256-bit word conversions for the 32-byte kinds.
macro_rules! word_convertible {
    ($name:ident) => {
        impl $name {
            /// Packs the big-endian bytes of `word`.
            #[must_use]
            pub fn from_word(word: U256) -> Self {
                let mut bytes = [0u8; 32];
                word.to_big_endian(&mut bytes);
                Self(bytes)
            }

            /// Reads the bytes back as a big-endian word.
            #[must_use]
            pub fn to_word(&self) -> U256 {
                U256::from_big_endian(&self.0)
            }
        }

        impl From<U256> for $name {
            fn from(word: U256) -> Self {
                Self::from_word(word)
            }
        }
    };
}

byte_newtype!(
    /// A 20-byte account address.
    Address,
    20
);

byte_newtype!(
    /// A 32-byte hash (Keccak-256 unless noted otherwise).
    Hash,
    32
);

byte_newtype!(
    /// A 32-byte storage slot key.
    StorageKey,
    32
);

byte_newtype!(
    /// A 32-byte storage slot value. The zero value is the implicit
    /// content of every untouched slot.
    StorageValue,
    32
);

word_convertible!(Hash);
word_convertible!(StorageKey);
word_convertible!(StorageValue);

impl Address {
    /// The address of precompiled contract `n` (only the low byte set).
    #[must_use]
    pub const fn precompile(n: u8) -> Self {
        let mut bytes = [0u8; 20];
        bytes[19] = n;
        Self(bytes)
    }

    /// True when the address falls in the reserved precompile range
    /// (0x01-0x09).
    #[must_use]
    pub fn is_precompile(&self) -> bool {
        self.0[..19] == [0u8; 19] && (1..=9).contains(&self.0[19])
    }

    /// The address read as the low 20 bytes of a 256-bit word.
    #[must_use]
    pub fn to_word(&self) -> U256 {
        U256::from_big_endian(&self.0)
    }
}

// Truncated forms for log lines; Debug keeps the full hex.

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("0x")?;
        hex(f, &self.0[..4])?;
        f.write_str("...")?;
        hex(f, &self.0[18..])
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("0x")?;
        hex(f, &self.0[..4])?;
        f.write_str("...")?;
        hex(f, &self.0[28..])
    }
}

// =============================================================================
// BYTES (variable length)
// =============================================================================

/// Variable-length byte vector for calldata, return data, and code.
///
/// Derefs to `[u8]`, so slice methods apply directly.
#[derive(Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Bytes(pub Vec<u8>);

impl Bytes {
    /// An empty buffer.
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Takes ownership of a vector.
    #[must_use]
    pub fn from_vec(vec: Vec<u8>) -> Self {
        Self(vec)
    }

    /// Copies a slice.
    #[must_use]
    pub fn from_slice(slice: &[u8]) -> Self {
        Self(slice.to_vec())
    }

    /// Unwraps into the underlying vector.
    #[must_use]
    pub fn into_vec(self) -> Vec<u8> {
        self.0
    }

    /// Borrows the underlying slice.
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }
}

impl Deref for Bytes {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for Bytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("0x")?;
        if self.0.len() <= 8 {
            hex(f, &self.0)
        } else {
            hex(f, &self.0[..4])?;
            write!(f, "..({} bytes)", self.0.len())
        }
    }
}

impl From<Vec<u8>> for Bytes {
    fn from(vec: Vec<u8>) -> Self {
        Self(vec)
    }
}

impl From<&[u8]> for Bytes {
    fn from(slice: &[u8]) -> Self {
        Self(slice.to_vec())
    }
}

impl AsRef<[u8]> for Bytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

// =============================================================================
// GAS COUNTER
// =============================================================================

/// Per-frame gas ledger.
///
/// ## Invariants
/// - `used <= limit` at all times
/// - a failed `consume` leaves the ledger untouched
#[derive(Clone, Copy, Debug, Default)]
pub struct GasCounter {
    limit: u64,
    used: u64,
    refund: u64,
}

impl GasCounter {
    /// A fresh ledger over `limit` gas.
    #[must_use]
    pub const fn new(limit: u64) -> Self {
        Self {
            limit,
            used: 0,
            refund: 0,
        }
    }

    /// The frame budget.
    #[must_use]
    pub const fn limit(&self) -> u64 {
        self.limit
    }

    /// Gas consumed so far.
    #[must_use]
    pub const fn used(&self) -> u64 {
        self.used
    }

    /// Budget still available.
    #[must_use]
    pub const fn remaining(&self) -> u64 {
        self.limit - self.used
    }

    /// Refund accumulated by storage clears.
    #[must_use]
    pub const fn refund(&self) -> u64 {
        self.refund
    }

    /// Debits `amount`, or reports false without debiting anything when
    /// the remaining budget does not cover it.
    pub fn consume(&mut self, amount: u64) -> bool {
        if amount > self.remaining() {
            return false;
        }
        self.used += amount;
        true
    }

    /// Debits the entire remaining budget (exceptional halt rule).
    pub fn consume_all(&mut self) {
        self.used = self.limit;
    }

    /// Credits the refund counter.
    pub fn add_refund(&mut self, amount: u64) {
        self.refund = self.refund.saturating_add(amount);
    }

    /// Debits the refund counter, flooring at zero.
    pub fn sub_refund(&mut self, amount: u64) {
        self.refund = self.refund.saturating_sub(amount);
    }

    /// Gas used after the refund, which never pays back more than half
    /// of what was consumed (EIP-3529).
    #[must_use]
    pub fn effective_gas_used(&self) -> u64 {
        self.used - self.refund.min(self.used / 2)
    }
}

// =============================================================================
// TESTS
// =============================================================================
