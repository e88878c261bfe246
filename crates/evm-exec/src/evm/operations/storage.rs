//! Storage and log family: SLOAD SSTORE LOG0..LOG4.
//!
//! Writes never touch world state here. SSTORE and LOG append to the
//! frame journal, which the caller applies only after the frame completes;
//! SLOAD reads through the journal first so a contract observes its own
//! pending writes. In a static context every journal-writing instruction
//! halts with an illegal state change before anything else is checked.

use crate::domain::entities::Log;
use crate::domain::value_objects::{Hash, StorageKey, StorageValue, U256};
use crate::errors::{ExceptionalHaltReason, VmFault};
use crate::evm::frame::MessageFrame;
use crate::evm::operation::EvmHost;
use crate::evm::operations::{bounds_check, expansion_cost};

/// First LOG opcode (LOG0).
const LOG0: u8 = 0xA0;

// =============================================================================
// SLOAD
// =============================================================================

pub(crate) fn sload_cost(_frame: &MessageFrame, host: &dyn EvmHost) -> u64 {
    host.calculator().sload_cost()
}

pub(crate) fn sload(frame: &mut MessageFrame, host: &dyn EvmHost) -> Result<(), VmFault> {
    let key = StorageKey::from_word(frame.stack.pop()?);
    let value = frame
        .pending_storage(key)
        .unwrap_or_else(|| host.storage_read(frame.context.address, key));
    frame.stack.push(value.to_word())?;
    Ok(())
}

// =============================================================================
// SSTORE
// =============================================================================

/// Current observable value of the slot under the top-of-stack key:
/// pending journal entry first, then committed state.
fn observed_slot(frame: &MessageFrame, host: &dyn EvmHost, key: StorageKey) -> StorageValue {
    frame
        .pending_storage(key)
        .unwrap_or_else(|| host.storage_read(frame.context.address, key))
}

pub(crate) fn sstore_guard(
    frame: &MessageFrame,
    _host: &dyn EvmHost,
) -> Option<ExceptionalHaltReason> {
    if frame.context.is_static {
        Some(ExceptionalHaltReason::IllegalStateChange)
    } else {
        None
    }
}

pub(crate) fn sstore_cost(frame: &MessageFrame, host: &dyn EvmHost) -> u64 {
    let key = StorageKey::from_word(frame.stack.peek_at(0).unwrap_or_default());
    let new = frame.stack.peek_at(1).unwrap_or_default();
    let current = observed_slot(frame, host, key);

    host.calculator()
        .sstore_cost(current.is_zero(), new.is_zero())
}

pub(crate) fn sstore(frame: &mut MessageFrame, host: &dyn EvmHost) -> Result<(), VmFault> {
    let key = StorageKey::from_word(frame.stack.pop()?);
    let new = StorageValue::from_word(frame.stack.pop()?);

    let current = observed_slot(frame, host, key);
    let refund = host
        .calculator()
        .sstore_refund(current.is_zero(), new.is_zero());
    if refund > 0 {
        frame.gas.add_refund(refund);
    }

    frame.record_storage_write(key, new);
    Ok(())
}

// =============================================================================
// LOG0..LOG4
// =============================================================================

fn topic_count(frame: &MessageFrame) -> usize {
    frame
        .current_opcode()
        .unwrap_or(LOG0)
        .saturating_sub(LOG0) as usize
}

/// Static context wins over span problems: the instruction is illegal
/// there no matter its operands.
pub(crate) fn log_guard(
    frame: &MessageFrame,
    _host: &dyn EvmHost,
) -> Option<ExceptionalHaltReason> {
    if frame.context.is_static {
        return Some(ExceptionalHaltReason::IllegalStateChange);
    }
    let offset = frame.stack.peek_at(0).unwrap_or_default();
    let size = frame.stack.peek_at(1).unwrap_or_default();
    bounds_check(frame, offset, size)
}

pub(crate) fn log_cost(frame: &MessageFrame, host: &dyn EvmHost) -> u64 {
    let offset = frame.stack.peek_at(0).unwrap_or_default();
    let size = frame.stack.peek_at(1).unwrap_or_default();

    let emit_cost = if size.bits() > 64 {
        u64::MAX
    } else {
        host.calculator().log_cost(
            usize::try_from(size.low_u64()).unwrap_or(usize::MAX),
            topic_count(frame),
        )
    };

    emit_cost.saturating_add(expansion_cost(frame, host, offset, size))
}

pub(crate) fn log(frame: &mut MessageFrame, _host: &dyn EvmHost) -> Result<(), VmFault> {
    let topics_wanted = topic_count(frame);
    let offset = frame.stack.pop()?.low_u64() as usize;
    let size = frame.stack.pop()?.low_u64() as usize;

    let mut topics = Vec::with_capacity(topics_wanted);
    for _ in 0..topics_wanted {
        topics.push(Hash::from_word(frame.stack.pop()?));
    }

    let data = if size == 0 {
        Vec::new()
    } else {
        frame.memory.expand(offset + size)?;
        frame.memory.read_bytes(offset, size)
    };

    frame.logs.push(Log::new(
        frame.context.address,
        topics,
        crate::domain::value_objects::Bytes::from_vec(data),
    ));
    Ok(())
}

// =============================================================================
// TESTS
// =============================================================================
