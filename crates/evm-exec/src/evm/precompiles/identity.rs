//! # Identity Precompile (0x04)
//!
//! Echoes its input. Contracts use it as a cheap memory copy.

use super::{Precompile, PrecompileOutput};
use crate::domain::value_objects::{Address, Bytes};
use crate::errors::PrecompileError;
use crate::evm::memory::words;

/// Base charge.
const BASE_COST: u64 = 15;
/// Charge per 32-byte word of input.
const WORD_COST: u64 = 3;

/// Identity precompile: output equals input.
pub struct Identity;

impl Precompile for Identity {
    fn execute(&self, input: &[u8], gas_limit: u64) -> Result<PrecompileOutput, PrecompileError> {
        let gas_used = BASE_COST.saturating_add(WORD_COST.saturating_mul(words(input.len()) as u64));
        if gas_used > gas_limit {
            return Err(PrecompileError::OutOfGas);
        }

        Ok(PrecompileOutput {
            gas_used,
            output: Bytes::from_slice(input),
        })
    }

    fn address(&self) -> Address {
        Address::precompile(4)
    }
}
