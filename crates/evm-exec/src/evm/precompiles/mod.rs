//! # Precompiled Contracts
//!
//! Native contracts reachable at reserved low addresses. To the engine
//! they are opaque callables: input bytes in, output bytes and a gas
//! charge out, with no frame, no stack and no journal of their own.
//!
//! Only the identity copy (0x04) and SHA-256 (0x02) are wired up; the
//! remaining reserved addresses behave like ordinary code-less accounts.

pub mod identity;
pub mod sha256;

use crate::domain::value_objects::{Address, Bytes};
use crate::errors::PrecompileError;

/// What a precompile hands back: its charge and its output.
#[derive(Clone, Debug)]
pub struct PrecompileOutput {
    /// Gas consumed by the call.
    pub gas_used: u64,
    /// Output data.
    pub output: Bytes,
}

/// A native contract at a reserved address.
pub trait Precompile: Send + Sync {
    /// Runs the precompile over `input` with at most `gas_limit` gas.
    fn execute(&self, input: &[u8], gas_limit: u64) -> Result<PrecompileOutput, PrecompileError>;

    /// Reserved address this precompile answers at.
    fn address(&self) -> Address;
}

/// Routes a call to the precompile at `address`, if one is wired there.
///
/// `None` means the address is not an active precompile and the call
/// should proceed as an ordinary account call.
#[must_use]
pub fn run_precompile(
    address: Address,
    input: &[u8],
    gas_limit: u64,
) -> Option<Result<PrecompileOutput, PrecompileError>> {
    if !address.is_precompile() {
        return None;
    }

    match address.as_bytes()[19] {
        2 => Some(sha256::Sha256Precompile.execute(input, gas_limit)),
        4 => Some(identity::Identity.execute(input, gas_limit)),
        _ => None,
    }
}

// =============================================================================
// TESTS
// =============================================================================
