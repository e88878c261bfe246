//! # SHA-256 Precompile (0x02)
//!
//! Standard SHA-256 digest of the input.

use super::{Precompile, PrecompileOutput};
use crate::domain::value_objects::{Address, Bytes};
use crate::errors::PrecompileError;
use crate::evm::memory::words;
use sha2::{Digest, Sha256};

/// Base charge.
const BASE_COST: u64 = 60;
/// Charge per 32-byte word of input.
const WORD_COST: u64 = 12;

/// SHA-256 precompile.
pub struct Sha256Precompile;

impl Precompile for Sha256Precompile {
    fn execute(&self, input: &[u8], gas_limit: u64) -> Result<PrecompileOutput, PrecompileError> {
        let gas_used =
            BASE_COST.saturating_add(WORD_COST.saturating_mul(words(input.len()) as u64));
        if gas_used > gas_limit {
            return Err(PrecompileError::OutOfGas);
        }

        let digest = Sha256::digest(input);
        Ok(PrecompileOutput {
            gas_used,
            output: Bytes::from_slice(&digest),
        })
    }

    fn address(&self) -> Address {
        Address::precompile(2)
    }
}
