//! Comparison and bitwise family: LT GT SLT SGT EQ ISZERO AND OR XOR NOT
//! BYTE SHL SHR SAR.
//!
//! Comparisons push one or zero. Shift counts of 256 or more flush to
//! zero (or all-ones for SAR of a negative value).

use crate::domain::value_objects::U256;
use crate::errors::VmFault;
use crate::evm::frame::MessageFrame;
use crate::evm::operation::EvmHost;

fn bool_word(condition: bool) -> U256 {
    if condition {
        U256::one()
    } else {
        U256::zero()
    }
}

pub(crate) fn lt(frame: &mut MessageFrame, _host: &dyn EvmHost) -> Result<(), VmFault> {
    let a = frame.stack.pop()?;
    let b = frame.stack.pop()?;
    frame.stack.push(bool_word(a < b))?;
    Ok(())
}

pub(crate) fn gt(frame: &mut MessageFrame, _host: &dyn EvmHost) -> Result<(), VmFault> {
    let a = frame.stack.pop()?;
    let b = frame.stack.pop()?;
    frame.stack.push(bool_word(a > b))?;
    Ok(())
}

pub(crate) fn slt(frame: &mut MessageFrame, _host: &dyn EvmHost) -> Result<(), VmFault> {
    let a = frame.stack.pop()?;
    let b = frame.stack.pop()?;
    frame.stack.push(bool_word(signed_lt(a, b)))?;
    Ok(())
}

pub(crate) fn sgt(frame: &mut MessageFrame, _host: &dyn EvmHost) -> Result<(), VmFault> {
    let a = frame.stack.pop()?;
    let b = frame.stack.pop()?;
    frame.stack.push(bool_word(signed_lt(b, a)))?;
    Ok(())
}

pub(crate) fn eq(frame: &mut MessageFrame, _host: &dyn EvmHost) -> Result<(), VmFault> {
    let a = frame.stack.pop()?;
    let b = frame.stack.pop()?;
    frame.stack.push(bool_word(a == b))?;
    Ok(())
}

pub(crate) fn iszero(frame: &mut MessageFrame, _host: &dyn EvmHost) -> Result<(), VmFault> {
    let a = frame.stack.pop()?;
    frame.stack.push(bool_word(a.is_zero()))?;
    Ok(())
}

pub(crate) fn and(frame: &mut MessageFrame, _host: &dyn EvmHost) -> Result<(), VmFault> {
    let a = frame.stack.pop()?;
    let b = frame.stack.pop()?;
    frame.stack.push(a & b)?;
    Ok(())
}

pub(crate) fn or(frame: &mut MessageFrame, _host: &dyn EvmHost) -> Result<(), VmFault> {
    let a = frame.stack.pop()?;
    let b = frame.stack.pop()?;
    frame.stack.push(a | b)?;
    Ok(())
}

pub(crate) fn xor(frame: &mut MessageFrame, _host: &dyn EvmHost) -> Result<(), VmFault> {
    let a = frame.stack.pop()?;
    let b = frame.stack.pop()?;
    frame.stack.push(a ^ b)?;
    Ok(())
}

pub(crate) fn not(frame: &mut MessageFrame, _host: &dyn EvmHost) -> Result<(), VmFault> {
    let a = frame.stack.pop()?;
    frame.stack.push(!a)?;
    Ok(())
}

pub(crate) fn byte(frame: &mut MessageFrame, _host: &dyn EvmHost) -> Result<(), VmFault> {
    let i = frame.stack.pop()?;
    let x = frame.stack.pop()?;
    let result = if i < U256::from(32) {
        let mut bytes = [0u8; 32];
        x.to_big_endian(&mut bytes);
        U256::from(bytes[i.low_u64() as usize])
    } else {
        U256::zero()
    };
    frame.stack.push(result)?;
    Ok(())
}

pub(crate) fn shl(frame: &mut MessageFrame, _host: &dyn EvmHost) -> Result<(), VmFault> {
    let shift = frame.stack.pop()?;
    let value = frame.stack.pop()?;
    let result = if shift >= U256::from(256) {
        U256::zero()
    } else {
        value << shift.low_u64() as usize
    };
    frame.stack.push(result)?;
    Ok(())
}

pub(crate) fn shr(frame: &mut MessageFrame, _host: &dyn EvmHost) -> Result<(), VmFault> {
    let shift = frame.stack.pop()?;
    let value = frame.stack.pop()?;
    let result = if shift >= U256::from(256) {
        U256::zero()
    } else {
        value >> shift.low_u64() as usize
    };
    frame.stack.push(result)?;
    Ok(())
}

pub(crate) fn sar(frame: &mut MessageFrame, _host: &dyn EvmHost) -> Result<(), VmFault> {
    let shift = frame.stack.pop()?;
    let value = frame.stack.pop()?;
    frame.stack.push(arithmetic_shift_right(value, shift))?;
    Ok(())
}

// =============================================================================
// HELPERS
// =============================================================================

/// Signed less-than over two's-complement words.
fn signed_lt(a: U256, b: U256) -> bool {
    let a_neg = a.bit(255);
    let b_neg = b.bit(255);
    match (a_neg, b_neg) {
        (true, false) => true,
        (false, true) => false,
        _ => a < b,
    }
}

/// Arithmetic shift right: the sign bit fills vacated positions.
fn arithmetic_shift_right(value: U256, shift: U256) -> U256 {
    if shift >= U256::from(256) {
        if value.bit(255) {
            U256::MAX
        } else {
            U256::zero()
        }
    } else {
        let shift = shift.low_u64() as usize;
        let is_negative = value.bit(255);
        let shifted = value >> shift;
        if is_negative && shift > 0 {
            let mask = U256::MAX << (256 - shift);
            shifted | mask
        } else {
            shifted
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
