//! Stack family: POP, PUSH0, PUSH1..PUSH32, DUP1..DUP16, SWAP1..SWAP16.
//!
//! One body serves each parameterized family; the width or depth comes
//! from the opcode byte under the program counter, so PUSH7 and PUSH23
//! share code without closures in the operation table.

use crate::domain::value_objects::U256;
use crate::errors::VmFault;
use crate::evm::code::push_immediate_len;
use crate::evm::frame::MessageFrame;
use crate::evm::operation::EvmHost;

/// First DUP opcode (DUP1).
const DUP1: u8 = 0x80;
/// The opcode one below SWAP1, so `opcode - SWAP_BASE` is the swap depth.
const SWAP_BASE: u8 = 0x8F;

pub(crate) fn pop(frame: &mut MessageFrame, _host: &dyn EvmHost) -> Result<(), VmFault> {
    frame.stack.pop()?;
    Ok(())
}

pub(crate) fn push_zero(frame: &mut MessageFrame, _host: &dyn EvmHost) -> Result<(), VmFault> {
    frame.stack.push(U256::zero())?;
    Ok(())
}

/// PUSH1..PUSH32: push the immediate operand. Immediate bytes past the
/// end of code read as zero.
pub(crate) fn push(frame: &mut MessageFrame, _host: &dyn EvmHost) -> Result<(), VmFault> {
    let width = frame.current_opcode().map_or(0, push_immediate_len);
    let value = frame.read_immediate(width);
    frame.stack.push(value)?;
    Ok(())
}

/// DUP1..DUP16: duplicate the n-th item from the top.
pub(crate) fn dup(frame: &mut MessageFrame, _host: &dyn EvmHost) -> Result<(), VmFault> {
    let opcode = frame.current_opcode().unwrap_or(DUP1);
    let depth = opcode.saturating_sub(DUP1) as usize;
    frame.stack.dup(depth)?;
    Ok(())
}

/// SWAP1..SWAP16: swap the top with the item n below it.
pub(crate) fn swap(frame: &mut MessageFrame, _host: &dyn EvmHost) -> Result<(), VmFault> {
    let opcode = frame.current_opcode().unwrap_or(SWAP_BASE);
    let depth = opcode.saturating_sub(SWAP_BASE) as usize;
    frame.stack.swap(depth)?;
    Ok(())
}

// =============================================================================
// TESTS
// =============================================================================
