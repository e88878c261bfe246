//! Arithmetic family: ADD MUL SUB DIV SDIV MOD SMOD ADDMOD MULMOD EXP.
//!
//! All arithmetic wraps modulo 2^256; division and modulo by zero yield
//! zero. Signed variants interpret operands as two's complement.

use crate::domain::value_objects::U256;
use crate::errors::VmFault;
use crate::evm::frame::MessageFrame;
use crate::evm::operation::EvmHost;

pub(crate) fn add(frame: &mut MessageFrame, _host: &dyn EvmHost) -> Result<(), VmFault> {
    let a = frame.stack.pop()?;
    let b = frame.stack.pop()?;
    frame.stack.push(a.overflowing_add(b).0)?;
    Ok(())
}

pub(crate) fn mul(frame: &mut MessageFrame, _host: &dyn EvmHost) -> Result<(), VmFault> {
    let a = frame.stack.pop()?;
    let b = frame.stack.pop()?;
    frame.stack.push(a.overflowing_mul(b).0)?;
    Ok(())
}

pub(crate) fn sub(frame: &mut MessageFrame, _host: &dyn EvmHost) -> Result<(), VmFault> {
    let a = frame.stack.pop()?;
    let b = frame.stack.pop()?;
    frame.stack.push(a.overflowing_sub(b).0)?;
    Ok(())
}

pub(crate) fn div(frame: &mut MessageFrame, _host: &dyn EvmHost) -> Result<(), VmFault> {
    let a = frame.stack.pop()?;
    let b = frame.stack.pop()?;
    let result = if b.is_zero() { U256::zero() } else { a / b };
    frame.stack.push(result)?;
    Ok(())
}

pub(crate) fn sdiv(frame: &mut MessageFrame, _host: &dyn EvmHost) -> Result<(), VmFault> {
    let a = frame.stack.pop()?;
    let b = frame.stack.pop()?;
    let result = if b.is_zero() {
        U256::zero()
    } else {
        signed_div(a, b)
    };
    frame.stack.push(result)?;
    Ok(())
}

pub(crate) fn modulo(frame: &mut MessageFrame, _host: &dyn EvmHost) -> Result<(), VmFault> {
    let a = frame.stack.pop()?;
    let b = frame.stack.pop()?;
    let result = if b.is_zero() { U256::zero() } else { a % b };
    frame.stack.push(result)?;
    Ok(())
}

pub(crate) fn smod(frame: &mut MessageFrame, _host: &dyn EvmHost) -> Result<(), VmFault> {
    let a = frame.stack.pop()?;
    let b = frame.stack.pop()?;
    let result = if b.is_zero() {
        U256::zero()
    } else {
        signed_mod(a, b)
    };
    frame.stack.push(result)?;
    Ok(())
}

pub(crate) fn addmod(frame: &mut MessageFrame, _host: &dyn EvmHost) -> Result<(), VmFault> {
    let a = frame.stack.pop()?;
    let b = frame.stack.pop()?;
    let n = frame.stack.pop()?;
    let result = if n.is_zero() {
        U256::zero()
    } else {
        // 512-bit arithmetic so the intermediate sum cannot wrap
        let sum = u256_to_u512(a) + u256_to_u512(b);
        u512_to_u256(sum % u256_to_u512(n))
    };
    frame.stack.push(result)?;
    Ok(())
}

pub(crate) fn mulmod(frame: &mut MessageFrame, _host: &dyn EvmHost) -> Result<(), VmFault> {
    let a = frame.stack.pop()?;
    let b = frame.stack.pop()?;
    let n = frame.stack.pop()?;
    let result = if n.is_zero() {
        U256::zero()
    } else {
        // 512-bit arithmetic so the intermediate product cannot wrap
        let prod = u256_to_u512(a) * u256_to_u512(b);
        u512_to_u256(prod % u256_to_u512(n))
    };
    frame.stack.push(result)?;
    Ok(())
}

/// EXP pricing: base plus a per-byte charge on the exponent. The exponent
/// is the second stack item at pricing time.
pub(crate) fn exp_cost(frame: &MessageFrame, host: &dyn EvmHost) -> u64 {
    let exponent = frame.stack.peek_at(1).unwrap_or_default();
    host.calculator().exp_cost(exponent)
}

pub(crate) fn exp(frame: &mut MessageFrame, _host: &dyn EvmHost) -> Result<(), VmFault> {
    let base = frame.stack.pop()?;
    let exponent = frame.stack.pop()?;
    frame.stack.push(exp_by_squaring(base, exponent))?;
    Ok(())
}

// =============================================================================
// HELPERS
// =============================================================================

/// Two's-complement negation.
fn negate(value: U256) -> U256 {
    (!value).overflowing_add(U256::one()).0
}

/// Signed division.
fn signed_div(a: U256, b: U256) -> U256 {
    let a_neg = a.bit(255);
    let b_neg = b.bit(255);
    let a_abs = if a_neg { negate(a) } else { a };
    let b_abs = if b_neg { negate(b) } else { b };
    let result = a_abs / b_abs;
    if a_neg == b_neg {
        result
    } else {
        negate(result)
    }
}

/// Signed modulo; the result takes the dividend's sign.
fn signed_mod(a: U256, b: U256) -> U256 {
    let a_neg = a.bit(255);
    let a_abs = if a_neg { negate(a) } else { a };
    let b_abs = if b.bit(255) { negate(b) } else { b };
    let result = a_abs % b_abs;
    if a_neg {
        negate(result)
    } else {
        result
    }
}

/// Exponentiation by squaring, wrapping modulo 2^256.
fn exp_by_squaring(base: U256, mut exp: U256) -> U256 {
    if exp.is_zero() {
        return U256::one();
    }

    let mut result = U256::one();
    let mut base = base;

    while !exp.is_zero() {
        if exp.bit(0) {
            result = result.overflowing_mul(base).0;
        }
        exp >>= 1;
        base = base.overflowing_mul(base).0;
    }

    result
}

/// Widen for addmod/mulmod intermediates.
fn u256_to_u512(value: U256) -> primitive_types::U512 {
    let mut bytes = [0u8; 64];
    value.to_big_endian(&mut bytes[32..]);
    primitive_types::U512::from_big_endian(&bytes)
}

/// Narrow back; the modulus guarantees the value fits.
fn u512_to_u256(value: primitive_types::U512) -> U256 {
    let mut bytes = [0u8; 64];
    value.to_big_endian(&mut bytes);
    U256::from_big_endian(&bytes[32..])
}

// =============================================================================
// TESTS
// =============================================================================
