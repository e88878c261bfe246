//! Environment family: ADDRESS ORIGIN CALLER CALLVALUE CALLDATALOAD
//! CALLDATASIZE CALLDATACOPY CODESIZE CODECOPY NUMBER TIMESTAMP CHAINID.
//!
//! Reads of calldata and code past their ends observe zeros, matching
//! memory semantics. The two copy instructions share pricing and bounds
//! logic: both pay per word copied plus any memory expansion.

use crate::domain::value_objects::U256;
use crate::errors::{ExceptionalHaltReason, VmFault};
use crate::evm::frame::MessageFrame;
use crate::evm::gas::costs;
use crate::evm::operation::EvmHost;
use crate::evm::operations::{bounds_check, expansion_cost};

// =============================================================================
// IDENTITY & VALUE
// =============================================================================

pub(crate) fn address(frame: &mut MessageFrame, _host: &dyn EvmHost) -> Result<(), VmFault> {
    frame.stack.push(frame.context.address.to_word())?;
    Ok(())
}

pub(crate) fn origin(frame: &mut MessageFrame, _host: &dyn EvmHost) -> Result<(), VmFault> {
    frame.stack.push(frame.context.origin.to_word())?;
    Ok(())
}

pub(crate) fn caller(frame: &mut MessageFrame, _host: &dyn EvmHost) -> Result<(), VmFault> {
    frame.stack.push(frame.context.caller.to_word())?;
    Ok(())
}

pub(crate) fn callvalue(frame: &mut MessageFrame, _host: &dyn EvmHost) -> Result<(), VmFault> {
    frame.stack.push(frame.context.value)?;
    Ok(())
}

// =============================================================================
// CALLDATA
// =============================================================================

pub(crate) fn calldataload(frame: &mut MessageFrame, _host: &dyn EvmHost) -> Result<(), VmFault> {
    let offset = frame.stack.pop()?;
    let data = frame.context.data.as_slice();
    let mut word = [0u8; 32];

    if offset.bits() <= 64 {
        let offset = offset.low_u64() as usize;
        for (i, byte) in word.iter_mut().enumerate() {
            let pos = offset.saturating_add(i);
            if pos < data.len() {
                *byte = data[pos];
            }
        }
    }

    frame.stack.push(U256::from_big_endian(&word))?;
    Ok(())
}

pub(crate) fn calldatasize(frame: &mut MessageFrame, _host: &dyn EvmHost) -> Result<(), VmFault> {
    frame.stack.push(U256::from(frame.context.data.len()))?;
    Ok(())
}

pub(crate) fn calldatacopy(frame: &mut MessageFrame, _host: &dyn EvmHost) -> Result<(), VmFault> {
    let dest = frame.stack.pop()?.low_u64() as usize;
    let src = frame.stack.pop()?;
    let size = frame.stack.pop()?.low_u64() as usize;

    if size == 0 {
        return Ok(());
    }

    let buf = padded_slice(frame.context.data.as_slice(), src, size);
    frame.memory.write_bytes(dest, &buf)?;
    Ok(())
}

// =============================================================================
// CODE
// =============================================================================

pub(crate) fn codesize(frame: &mut MessageFrame, _host: &dyn EvmHost) -> Result<(), VmFault> {
    frame.stack.push(U256::from(frame.code.len()))?;
    Ok(())
}

pub(crate) fn codecopy(frame: &mut MessageFrame, _host: &dyn EvmHost) -> Result<(), VmFault> {
    let dest = frame.stack.pop()?.low_u64() as usize;
    let src = frame.stack.pop()?;
    let size = frame.stack.pop()?.low_u64() as usize;

    if size == 0 {
        return Ok(());
    }

    let code = frame.code.clone();
    let buf = padded_slice(code.as_slice(), src, size);
    frame.memory.write_bytes(dest, &buf)?;
    Ok(())
}

/// Shared pricing for CALLDATACOPY and CODECOPY: flat, per-word copy, and
/// destination expansion. Stack shape is identical for both.
pub(crate) fn copy_cost(frame: &MessageFrame, host: &dyn EvmHost) -> u64 {
    let dest = frame.stack.peek_at(0).unwrap_or_default();
    let size = frame.stack.peek_at(2).unwrap_or_default();

    let per_word = if size.bits() > 64 {
        u64::MAX
    } else {
        host.calculator()
            .copy_cost(usize::try_from(size.low_u64()).unwrap_or(usize::MAX))
    };

    costs::VERY_LOW
        .saturating_add(per_word)
        .saturating_add(expansion_cost(frame, host, dest, size))
}

/// Shared bounds guard for CALLDATACOPY and CODECOPY destinations.
pub(crate) fn copy_bounds(
    frame: &MessageFrame,
    _host: &dyn EvmHost,
) -> Option<ExceptionalHaltReason> {
    let dest = frame.stack.peek_at(0).unwrap_or_default();
    let size = frame.stack.peek_at(2).unwrap_or_default();
    bounds_check(frame, dest, size)
}

// =============================================================================
// BLOCK
// =============================================================================

pub(crate) fn number(frame: &mut MessageFrame, _host: &dyn EvmHost) -> Result<(), VmFault> {
    frame.stack.push(U256::from(frame.context.block.number))?;
    Ok(())
}

pub(crate) fn timestamp(frame: &mut MessageFrame, _host: &dyn EvmHost) -> Result<(), VmFault> {
    frame.stack.push(U256::from(frame.context.block.timestamp))?;
    Ok(())
}

pub(crate) fn chainid(frame: &mut MessageFrame, _host: &dyn EvmHost) -> Result<(), VmFault> {
    frame.stack.push(U256::from(frame.context.block.chain_id))?;
    Ok(())
}

// =============================================================================
// HELPERS
// =============================================================================

/// `size` bytes of `data` starting at `src`, zero-padded past the end.
fn padded_slice(data: &[u8], src: U256, size: usize) -> Vec<u8> {
    let mut buf = vec![0u8; size];

    if src.bits() <= 64 {
        let src = src.low_u64() as usize;
        for (i, byte) in buf.iter_mut().enumerate() {
            let pos = src.saturating_add(i);
            if pos < data.len() {
                *byte = data[pos];
            }
        }
    }

    buf
}

// =============================================================================
// TESTS
// =============================================================================
