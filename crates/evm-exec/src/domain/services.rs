//! # Domain Services
//!
//! Pure functions for contract execution: hashing and contract-address
//! derivation. Deterministic, no I/O, no async.

use crate::domain::value_objects::{Address, Hash};
use sha3::{Digest, Keccak256};

// =============================================================================
// KECCAK256
// =============================================================================

/// Computes the keccak256 hash of data.
#[must_use]
pub fn keccak256(data: &[u8]) -> Hash {
    Hash::new(Keccak256::digest(data).into())
}

/// Keccak256 of empty bytes (the empty code hash).
#[must_use]
pub fn empty_code_hash() -> Hash {
    keccak256(&[])
}

// =============================================================================
// CONTRACT ADDRESS DERIVATION
// =============================================================================

/// Derives the deployment address for a creation transaction.
///
/// Address = keccak256(rlp(\[sender, nonce\]))\[12:\]
#[must_use]
pub fn compute_contract_address(sender: Address, nonce: u64) -> Address {
    // rlp([sender, nonce]): the payload tops out at 30 bytes, so the
    // short-list header form always applies. Slot 0 holds the header
    // and is patched once the payload length is known.
    let mut rlp = vec![0xC0, 0x94];
    rlp.extend_from_slice(sender.as_bytes());
    match nonce {
        0 => rlp.push(0x80),
        1..=0x7F => rlp.push(nonce as u8),
        _ => {
            let be = nonce.to_be_bytes();
            let digits = &be[(nonce.leading_zeros() / 8) as usize..];
            rlp.push(0x80 + digits.len() as u8);
            rlp.extend_from_slice(digits);
        }
    }
    rlp[0] = 0xC0 + (rlp.len() - 1) as u8;

    low_twenty(Keccak256::digest(&rlp).as_slice())
}

/// The low 20 bytes of a 32-byte digest, read as an address.
fn low_twenty(digest: &[u8]) -> Address {
    let mut tail = [0u8; 20];
    tail.copy_from_slice(&digest[12..]);
    Address::new(tail)
}

// =============================================================================
// TESTS
// =============================================================================
