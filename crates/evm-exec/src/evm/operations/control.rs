//! Control family: STOP JUMP JUMPI PC GAS JUMPDEST RETURN REVERT INVALID.
//!
//! JUMP and JUMPI manage the program counter themselves and validate the
//! destination in their halt predicates, before any stack mutation. The
//! conditional jump only validates its destination when the condition is
//! set: a dormant branch may carry garbage.

use crate::domain::value_objects::{Bytes, U256};
use crate::errors::{ExceptionalHaltReason, VmFault};
use crate::evm::frame::MessageFrame;
use crate::evm::operation::EvmHost;
use crate::evm::operations::{bounds_check, expansion_cost, saturating_u64};

// =============================================================================
// STOP
// =============================================================================

pub(crate) fn stop(frame: &mut MessageFrame, _host: &dyn EvmHost) -> Result<(), VmFault> {
    frame.complete(Bytes::new());
    Ok(())
}

// =============================================================================
// JUMP / JUMPI
// =============================================================================

pub(crate) fn jump_guard(
    frame: &MessageFrame,
    _host: &dyn EvmHost,
) -> Option<ExceptionalHaltReason> {
    let dest = frame.stack.peek().unwrap_or_default();
    if frame.code.jump_target(dest).is_some() {
        None
    } else {
        Some(ExceptionalHaltReason::InvalidJumpDestination(
            saturating_u64(dest),
        ))
    }
}

pub(crate) fn jump(frame: &mut MessageFrame, _host: &dyn EvmHost) -> Result<(), VmFault> {
    let dest = frame.stack.pop()?;
    let target = frame
        .code
        .jump_target(dest)
        .ok_or(VmFault::Inconsistency("validated jump target disappeared"))?;
    frame.pc = target;
    Ok(())
}

pub(crate) fn jumpi_guard(
    frame: &MessageFrame,
    _host: &dyn EvmHost,
) -> Option<ExceptionalHaltReason> {
    let condition = frame.stack.peek_at(1).unwrap_or_default();
    if condition.is_zero() {
        return None;
    }
    let dest = frame.stack.peek_at(0).unwrap_or_default();
    if frame.code.jump_target(dest).is_some() {
        None
    } else {
        Some(ExceptionalHaltReason::InvalidJumpDestination(
            saturating_u64(dest),
        ))
    }
}

pub(crate) fn jumpi(frame: &mut MessageFrame, _host: &dyn EvmHost) -> Result<(), VmFault> {
    let dest = frame.stack.pop()?;
    let condition = frame.stack.pop()?;

    if condition.is_zero() {
        frame.pc += 1;
    } else {
        let target = frame
            .code
            .jump_target(dest)
            .ok_or(VmFault::Inconsistency("validated jump target disappeared"))?;
        frame.pc = target;
    }
    Ok(())
}

// =============================================================================
// PC / GAS / JUMPDEST
// =============================================================================

/// Pushes the offset of this instruction (the counter has not advanced
/// yet when the body runs).
pub(crate) fn pc(frame: &mut MessageFrame, _host: &dyn EvmHost) -> Result<(), VmFault> {
    frame.stack.push(U256::from(frame.pc))?;
    Ok(())
}

/// Pushes gas remaining after this instruction's own charge.
pub(crate) fn gas(frame: &mut MessageFrame, _host: &dyn EvmHost) -> Result<(), VmFault> {
    frame.stack.push(U256::from(frame.gas.remaining()))?;
    Ok(())
}

/// Jump destination marker; no effect beyond its cost.
pub(crate) fn jumpdest(_frame: &mut MessageFrame, _host: &dyn EvmHost) -> Result<(), VmFault> {
    Ok(())
}

// =============================================================================
// RETURN / REVERT
// =============================================================================

pub(crate) fn return_cost(frame: &MessageFrame, host: &dyn EvmHost) -> u64 {
    let offset = frame.stack.peek_at(0).unwrap_or_default();
    let size = frame.stack.peek_at(1).unwrap_or_default();
    expansion_cost(frame, host, offset, size)
}

pub(crate) fn return_bounds(
    frame: &MessageFrame,
    _host: &dyn EvmHost,
) -> Option<ExceptionalHaltReason> {
    let offset = frame.stack.peek_at(0).unwrap_or_default();
    let size = frame.stack.peek_at(1).unwrap_or_default();
    bounds_check(frame, offset, size)
}

fn read_output(frame: &mut MessageFrame) -> Result<Bytes, VmFault> {
    let offset = frame.stack.pop()?.low_u64() as usize;
    let size = frame.stack.pop()?.low_u64() as usize;

    if size == 0 {
        return Ok(Bytes::new());
    }
    frame.memory.expand(offset + size)?;
    Ok(Bytes::from_vec(frame.memory.read_bytes(offset, size)))
}

pub(crate) fn ret(frame: &mut MessageFrame, _host: &dyn EvmHost) -> Result<(), VmFault> {
    let output = read_output(frame)?;
    frame.complete(output);
    Ok(())
}

pub(crate) fn revert(frame: &mut MessageFrame, _host: &dyn EvmHost) -> Result<(), VmFault> {
    let output = read_output(frame)?;
    frame.revert(output);
    Ok(())
}

// =============================================================================
// INVALID
// =============================================================================

/// The designated invalid instruction (0xFE) always halts; its body never
/// runs.
pub(crate) fn invalid_guard(
    frame: &MessageFrame,
    _host: &dyn EvmHost,
) -> Option<ExceptionalHaltReason> {
    Some(ExceptionalHaltReason::InvalidOpcode(
        frame.current_opcode().unwrap_or(0xFE),
    ))
}

pub(crate) fn invalid(_frame: &mut MessageFrame, _host: &dyn EvmHost) -> Result<(), VmFault> {
    Ok(())
}

// =============================================================================
// TESTS
// =============================================================================
