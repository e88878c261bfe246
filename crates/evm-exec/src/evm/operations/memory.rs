//! Memory family: MLOAD MSTORE MSTORE8 MSIZE, plus KECCAK256 which hashes
//! a memory span.
//!
//! Each access is guarded twice before the body runs: the halt predicate
//! rejects spans that cannot fit frame memory, and the cost function
//! prices the expansion the access will cause. By the time a body
//! expands, both the bound and the charge are settled.

use crate::domain::services::keccak256;
use crate::domain::value_objects::U256;
use crate::errors::{ExceptionalHaltReason, VmFault};
use crate::evm::frame::MessageFrame;
use crate::evm::gas::costs;
use crate::evm::memory::WORD_SIZE;
use crate::evm::operation::EvmHost;
use crate::evm::operations::{bounds_check, expansion_cost};

// =============================================================================
// MLOAD
// =============================================================================

pub(crate) fn mload_cost(frame: &MessageFrame, host: &dyn EvmHost) -> u64 {
    let offset = frame.stack.peek().unwrap_or_default();
    costs::VERY_LOW.saturating_add(expansion_cost(frame, host, offset, U256::from(WORD_SIZE)))
}

pub(crate) fn mload_bounds(
    frame: &MessageFrame,
    _host: &dyn EvmHost,
) -> Option<ExceptionalHaltReason> {
    let offset = frame.stack.peek().unwrap_or_default();
    bounds_check(frame, offset, U256::from(WORD_SIZE))
}

pub(crate) fn mload(frame: &mut MessageFrame, _host: &dyn EvmHost) -> Result<(), VmFault> {
    let offset = frame.stack.pop()?.low_u64() as usize;
    frame.memory.expand(offset + WORD_SIZE)?;
    let word = frame.memory.read_word(offset);
    frame.stack.push(U256::from_big_endian(&word))?;
    Ok(())
}

// =============================================================================
// MSTORE / MSTORE8
// =============================================================================

pub(crate) fn mstore_cost(frame: &MessageFrame, host: &dyn EvmHost) -> u64 {
    let offset = frame.stack.peek().unwrap_or_default();
    costs::VERY_LOW.saturating_add(expansion_cost(frame, host, offset, U256::from(WORD_SIZE)))
}

pub(crate) fn mstore_bounds(
    frame: &MessageFrame,
    _host: &dyn EvmHost,
) -> Option<ExceptionalHaltReason> {
    let offset = frame.stack.peek().unwrap_or_default();
    bounds_check(frame, offset, U256::from(WORD_SIZE))
}

pub(crate) fn mstore(frame: &mut MessageFrame, _host: &dyn EvmHost) -> Result<(), VmFault> {
    let offset = frame.stack.pop()?.low_u64() as usize;
    let value = frame.stack.pop()?;

    let mut bytes = [0u8; 32];
    value.to_big_endian(&mut bytes);
    frame.memory.write_word(offset, &bytes)?;
    Ok(())
}

pub(crate) fn mstore8_cost(frame: &MessageFrame, host: &dyn EvmHost) -> u64 {
    let offset = frame.stack.peek().unwrap_or_default();
    costs::VERY_LOW.saturating_add(expansion_cost(frame, host, offset, U256::one()))
}

pub(crate) fn mstore8_bounds(
    frame: &MessageFrame,
    _host: &dyn EvmHost,
) -> Option<ExceptionalHaltReason> {
    let offset = frame.stack.peek().unwrap_or_default();
    bounds_check(frame, offset, U256::one())
}

pub(crate) fn mstore8(frame: &mut MessageFrame, _host: &dyn EvmHost) -> Result<(), VmFault> {
    let offset = frame.stack.pop()?.low_u64() as usize;
    let value = frame.stack.pop()?;
    frame.memory.write_byte(offset, value.byte(0))?;
    Ok(())
}

// =============================================================================
// MSIZE
// =============================================================================

pub(crate) fn msize(frame: &mut MessageFrame, _host: &dyn EvmHost) -> Result<(), VmFault> {
    frame.stack.push(U256::from(frame.memory.len()))?;
    Ok(())
}

// =============================================================================
// KECCAK256
// =============================================================================

pub(crate) fn keccak256_cost(frame: &MessageFrame, host: &dyn EvmHost) -> u64 {
    let offset = frame.stack.peek_at(0).unwrap_or_default();
    let size = frame.stack.peek_at(1).unwrap_or_default();

    let hash_cost = if size.bits() > 64 {
        u64::MAX
    } else {
        host.calculator()
            .keccak256_cost(usize::try_from(size.low_u64()).unwrap_or(usize::MAX))
    };

    hash_cost.saturating_add(expansion_cost(frame, host, offset, size))
}

pub(crate) fn keccak256_bounds(
    frame: &MessageFrame,
    _host: &dyn EvmHost,
) -> Option<ExceptionalHaltReason> {
    let offset = frame.stack.peek_at(0).unwrap_or_default();
    let size = frame.stack.peek_at(1).unwrap_or_default();
    bounds_check(frame, offset, size)
}

pub(crate) fn keccak256_op(frame: &mut MessageFrame, _host: &dyn EvmHost) -> Result<(), VmFault> {
    let offset = frame.stack.pop()?.low_u64() as usize;
    let size = frame.stack.pop()?.low_u64() as usize;

    let data = if size == 0 {
        Vec::new()
    } else {
        frame.memory.expand(offset + size)?;
        frame.memory.read_bytes(offset, size)
    };

    let hash = keccak256(&data);
    frame.stack.push(U256::from_big_endian(hash.as_bytes()))?;
    Ok(())
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evm::operations::testing::{frame_with_code, MapHost};

    #[test]
    fn test_mstore_mload_round() {
        let mut frame = frame_with_code(vec![0x00]);
        let host = MapHost::new();

        // MSTORE value 0x42 at offset 0
        frame.stack.push(U256::from(0x42)).unwrap();
        frame.stack.push(U256::zero()).unwrap();
        mstore(&mut frame, &host).unwrap();

        // MLOAD offset 0
        frame.stack.push(U256::zero()).unwrap();
        mload(&mut frame, &host).unwrap();
        assert_eq!(frame.stack.pop().unwrap(), U256::from(0x42));
    }

    #[test]
    fn test_mstore8_writes_low_byte() {
        let mut frame = frame_with_code(vec![0x00]);
        let host = MapHost::new();

        frame.stack.push(U256::from(0xABCDu64)).unwrap();
        frame.stack.push(U256::from(5)).unwrap();
        mstore8(&mut frame, &host).unwrap();

        assert_eq!(frame.memory.read_byte(5), 0xCD);
    }

    #[test]
    fn test_msize_reports_word_aligned() {
        let mut frame = frame_with_code(vec![0x00]);
        let host = MapHost::new();

        msize(&mut frame, &host).unwrap();
        assert_eq!(frame.stack.pop().unwrap(), U256::zero());

        frame.memory.expand(10).unwrap();
        msize(&mut frame, &host).unwrap();
        assert_eq!(frame.stack.pop().unwrap(), U256::from(32));
    }

    #[test]
    fn test_mload_cost_includes_expansion() {
        let mut frame = frame_with_code(vec![0x00]);
        let host = MapHost::new();
        frame.stack.push(U256::zero()).unwrap();

        // First word: 3 flat + 3 expansion
        assert_eq!(mload_cost(&frame, &host), 6);

        frame.memory.expand(32).unwrap();
        // Already covered: flat only
        assert_eq!(mload_cost(&frame, &host), 3);
    }

    #[test]
    fn test_bounds_predicate_rejects_absurd_offset() {
        let mut frame = frame_with_code(vec![0x00]);
        let host = MapHost::new();
        frame.stack.push(U256::MAX).unwrap();

        assert!(matches!(
            mstore_bounds(&frame, &host),
            Some(ExceptionalHaltReason::OutOfBoundsMemory { .. })
        ));
    }

    #[test]
    fn test_keccak256_of_memory_span() {
        let mut frame = frame_with_code(vec![0x00]);
        let host = MapHost::new();

        // Hash 0 bytes: keccak256("")
        frame.stack.push(U256::zero()).unwrap(); // size
        frame.stack.push(U256::zero()).unwrap(); // offset
        keccak256_op(&mut frame, &host).unwrap();

        let empty_hash = keccak256(&[]);
        assert_eq!(
            frame.stack.pop().unwrap(),
            U256::from_big_endian(empty_hash.as_bytes())
        );
    }

    #[test]
    fn test_keccak256_zero_size_ignores_offset() {
        let mut frame = frame_with_code(vec![0x00]);
        let host = MapHost::new();

        frame.stack.push(U256::zero()).unwrap(); // size
        frame.stack.push(U256::from(1u64 << 40)).unwrap(); // absurd offset
        keccak256_op(&mut frame, &host).unwrap();

        // No expansion happened
        assert_eq!(frame.memory.len(), 0);
    }
}
