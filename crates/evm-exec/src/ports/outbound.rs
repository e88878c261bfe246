//! # Driven Ports (SPI - Outbound)
//!
//! Interfaces the execution engine depends on. Adapters implement these
//! traits to supply world state from whatever backs it (in-memory maps for
//! tests, a database in a node).
//!
//! `StateAccess` is deliberately synchronous: the interpreter charges gas
//! and mutates machine state in one indivisible step, so no instruction
//! may suspend mid-step waiting on I/O. An adapter over an async backend
//! must materialize the state it needs before execution begins.

use crate::domain::entities::AccountState;
use crate::domain::value_objects::{Address, Bytes, Hash, StorageKey, StorageValue, U256};
use crate::errors::StateError;

// =============================================================================
// STATE ACCESS
// =============================================================================

/// Interface for reading and writing world state.
///
/// Reads serve the interpreter and the service; writes are only ever
/// issued by the service when it applies a successful frame's journal.
/// Instructions themselves never call a write method.
pub trait StateAccess: Send + Sync {
    /// Account state, or `None` for an address that never existed.
    fn get_account(&self, address: Address) -> Result<Option<AccountState>, StateError>;

    /// Value at a storage slot (zero if never written).
    fn get_storage(&self, address: Address, key: StorageKey) -> Result<StorageValue, StateError>;

    /// Contract bytecode (empty for an externally owned account).
    fn get_code(&self, address: Address) -> Result<Bytes, StateError>;

    /// True if the account has balance, nonce or code.
    fn account_exists(&self, address: Address) -> Result<bool, StateError>;

    /// Creates or replaces an account record.
    fn set_account(&self, address: Address, account: AccountState) -> Result<(), StateError>;

    /// Writes a storage slot.
    fn set_storage(
        &self,
        address: Address,
        key: StorageKey,
        value: StorageValue,
    ) -> Result<(), StateError>;

    /// Clears a storage slot.
    fn remove_storage(&self, address: Address, key: StorageKey) -> Result<(), StateError>;

    /// Installs contract code at an address.
    fn set_code(&self, address: Address, code: Bytes) -> Result<(), StateError>;

    /// Balance of an account (zero for a missing account).
    fn get_balance(&self, address: Address) -> Result<U256, StateError> {
        match self.get_account(address)? {
            Some(account) => Ok(account.balance),
            None => Ok(U256::zero()),
        }
    }

    /// Nonce of an account (zero for a missing account).
    fn get_nonce(&self, address: Address) -> Result<u64, StateError> {
        match self.get_account(address)? {
            Some(account) => Ok(account.nonce),
            None => Ok(0),
        }
    }

    /// Code hash of an account (the empty-code hash for a missing one).
    fn get_code_hash(&self, address: Address) -> Result<Hash, StateError> {
        match self.get_account(address)? {
            Some(account) => Ok(account.code_hash),
            None => Ok(AccountState::EMPTY_CODE_HASH),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
