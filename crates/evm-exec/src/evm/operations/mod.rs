//! # Instruction Implementations
//!
//! Cost functions, halt predicates, and execute bodies for every
//! registered instruction, grouped by family. The operation table wires
//! these into [`Operation`](crate::evm::operation::Operation) records;
//! nothing here is dispatched by matching on opcode bytes.
//!
//! Bodies run only after the dispatch loop has checked arity, run the
//! halt predicate, and charged gas, so they assume well-formed stacks.
//! They still propagate typed faults instead of panicking.

use crate::domain::value_objects::U256;
use crate::evm::frame::MessageFrame;
use crate::evm::gas::costs;
use crate::evm::operation::EvmHost;

pub mod arithmetic;
pub mod control;
pub mod environment;
pub mod logic;
pub mod memory;
pub mod stack;
pub mod storage;

// =============================================================================
// SHARED HELPERS
// =============================================================================

/// Saturating word-to-u64 conversion for diagnostics payloads.
pub(crate) fn saturating_u64(value: U256) -> u64 {
    if value.bits() > 64 {
        u64::MAX
    } else {
        value.low_u64()
    }
}

/// End of the byte span `[offset, offset + len)`, or `None` when it does
/// not fit the address space.
pub(crate) fn span_end(offset: U256, len: U256) -> Option<usize> {
    if len.is_zero() {
        // Zero-length accesses touch nothing regardless of offset
        return Some(0);
    }
    if offset.bits() > 64 || len.bits() > 64 {
        return None;
    }
    let end = offset.low_u64().checked_add(len.low_u64())?;
    usize::try_from(end).ok()
}

/// Memory expansion price for the span `[offset, offset + len)`. A span
/// that cannot exist prices at `u64::MAX`, which no budget covers.
pub(crate) fn expansion_cost(
    frame: &MessageFrame,
    host: &dyn EvmHost,
    offset: U256,
    len: U256,
) -> u64 {
    match span_end(offset, len) {
        Some(end) => host
            .calculator()
            .memory_expansion_cost(frame.memory.word_size(), end),
        None => u64::MAX,
    }
}

/// Halt when the span `[offset, offset + len)` cannot fit frame memory.
pub(crate) fn bounds_check(
    frame: &MessageFrame,
    offset: U256,
    len: U256,
) -> Option<crate::errors::ExceptionalHaltReason> {
    match span_end(offset, len) {
        Some(end) if end <= frame.memory.limit() => None,
        _ => Some(crate::errors::ExceptionalHaltReason::OutOfBoundsMemory {
            offset: saturating_u64(offset),
            size: saturating_u64(len),
        }),
    }
}

// =============================================================================
// FLAT COST FUNCTIONS
// =============================================================================

pub(crate) fn cost_zero(_frame: &MessageFrame, _host: &dyn EvmHost) -> u64 {
    costs::ZERO
}

pub(crate) fn cost_base(_frame: &MessageFrame, _host: &dyn EvmHost) -> u64 {
    costs::BASE
}

pub(crate) fn cost_very_low(_frame: &MessageFrame, _host: &dyn EvmHost) -> u64 {
    costs::VERY_LOW
}

pub(crate) fn cost_low(_frame: &MessageFrame, _host: &dyn EvmHost) -> u64 {
    costs::LOW
}

pub(crate) fn cost_mid(_frame: &MessageFrame, _host: &dyn EvmHost) -> u64 {
    costs::MID
}

pub(crate) fn cost_high(_frame: &MessageFrame, _host: &dyn EvmHost) -> u64 {
    costs::HIGH
}

pub(crate) fn cost_jumpdest(_frame: &MessageFrame, _host: &dyn EvmHost) -> u64 {
    costs::JUMPDEST
}

// =============================================================================
// TESTS
// =============================================================================
