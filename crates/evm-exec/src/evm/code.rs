//! # Contract Code
//!
//! Immutable bytecode with lazily computed jump-destination analysis.
//!
//! A jump target is valid only when it points at a JUMPDEST byte that is a
//! real instruction. A 0x5B byte inside PUSH immediate data is operand
//! payload, not an instruction, so the analysis walks the code linearly
//! and skips each PUSH's immediate bytes. The destination set is computed
//! at most once per code blob (on first jump validation) and shared by
//! every frame holding the same `Code`.

use std::collections::HashSet;
use std::sync::OnceLock;

use crate::domain::value_objects::{Bytes, U256};

/// First PUSH opcode (PUSH1).
const PUSH1: u8 = 0x60;
/// Last PUSH opcode (PUSH32).
const PUSH32: u8 = 0x7F;
/// Jump destination marker opcode.
const JUMPDEST: u8 = 0x5B;

/// Width of the immediate operand carried by `opcode`, in bytes.
///
/// PUSH1 through PUSH32 carry 1 to 32 immediate bytes; every other
/// instruction carries none.
#[must_use]
pub fn push_immediate_len(opcode: u8) -> usize {
    if (PUSH1..=PUSH32).contains(&opcode) {
        (opcode - PUSH1 + 1) as usize
    } else {
        0
    }
}

/// Immutable contract bytecode with memoized jump-destination analysis.
#[derive(Clone, Debug, Default)]
pub struct Code {
    bytes: Bytes,
    jump_dests: OnceLock<HashSet<usize>>,
}

impl Code {
    /// Wraps raw bytecode.
    #[must_use]
    pub fn new(bytes: Bytes) -> Self {
        Self {
            bytes,
            jump_dests: OnceLock::new(),
        }
    }

    /// Code length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns true for empty code.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Raw bytecode.
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        self.bytes.as_slice()
    }

    /// Byte at `pc`, or `None` past the end of the code.
    #[must_use]
    pub fn byte_at(&self, pc: usize) -> Option<u8> {
        self.bytes.as_slice().get(pc).copied()
    }

    /// The set of valid jump destinations, analyzing on first use.
    #[must_use]
    pub fn jump_destinations(&self) -> &HashSet<usize> {
        self.jump_dests
            .get_or_init(|| analyze_jump_destinations(self.bytes.as_slice()))
    }

    /// Returns true if `dest` is a valid jump destination.
    #[must_use]
    pub fn is_valid_jump_destination(&self, dest: usize) -> bool {
        self.jump_destinations().contains(&dest)
    }

    /// Resolves a 256-bit jump operand to a validated program counter.
    ///
    /// Returns `None` when the operand does not fit an address or does not
    /// land on a valid destination.
    #[must_use]
    pub fn jump_target(&self, dest: U256) -> Option<usize> {
        if dest.bits() > 64 {
            return None;
        }
        let dest = usize::try_from(dest.low_u64()).ok()?;
        if self.is_valid_jump_destination(dest) {
            Some(dest)
        } else {
            None
        }
    }
}

impl From<Bytes> for Code {
    fn from(bytes: Bytes) -> Self {
        Self::new(bytes)
    }
}

impl From<Vec<u8>> for Code {
    fn from(bytes: Vec<u8>) -> Self {
        Self::new(Bytes::from_vec(bytes))
    }
}

/// Single linear scan collecting JUMPDEST positions, skipping each PUSH's
/// immediate bytes. A truncated trailing PUSH simply ends the scan.
fn analyze_jump_destinations(code: &[u8]) -> HashSet<usize> {
    let mut dests = HashSet::new();
    let mut i = 0;

    while i < code.len() {
        let op = code[i];
        if op == JUMPDEST {
            dests.insert(i);
        }
        // Skip PUSH data bytes
        i += push_immediate_len(op);
        i += 1;
    }

    dests
}

// =============================================================================
// TESTS
// =============================================================================
