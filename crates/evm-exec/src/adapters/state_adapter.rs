//! # State Adapter
//!
//! In-memory world state behind the outbound port. Tests and tooling run
//! against this; a node wires the same port to its database.

use crate::domain::entities::AccountState;
use crate::domain::services::keccak256;
use crate::domain::value_objects::{Address, Bytes, StorageKey, StorageValue, U256};
use crate::errors::StateError;
use crate::ports::outbound::StateAccess;
use std::collections::HashMap;
use std::sync::RwLock;

/// Map-backed state. Interior mutability keeps the port's `&self`
/// signatures; a poisoned lock surfaces as `StateError::Unavailable`.
#[derive(Debug, Default)]
pub struct InMemoryState {
    /// Account records.
    accounts: RwLock<HashMap<Address, AccountState>>,
    /// Contract code.
    code: RwLock<HashMap<Address, Bytes>>,
    /// Storage slots.
    storage: RwLock<HashMap<(Address, StorageKey), StorageValue>>,
}

impl InMemoryState {
    /// Creates an empty state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a balance, creating the account if needed.
    pub fn set_balance(&self, address: Address, balance: U256) {
        let mut accounts = self.accounts.write().unwrap_or_else(|e| e.into_inner());
        accounts
            .entry(address)
            .or_insert_with(|| AccountState::new_eoa(U256::zero(), 0))
            .balance = balance;
    }

    /// Seeds a storage slot directly, bypassing journal semantics.
    pub fn set_storage_value(&self, address: Address, key: StorageKey, value: StorageValue) {
        let mut storage = self.storage.write().unwrap_or_else(|e| e.into_inner());
        storage.insert((address, key), value);
    }
}

impl StateAccess for InMemoryState {
    fn get_account(&self, address: Address) -> Result<Option<AccountState>, StateError> {
        let accounts = self.accounts.read().map_err(|_| StateError::Unavailable)?;
        Ok(accounts.get(&address).cloned())
    }

    fn get_storage(&self, address: Address, key: StorageKey) -> Result<StorageValue, StateError> {
        let storage = self.storage.read().map_err(|_| StateError::Unavailable)?;
        Ok(storage
            .get(&(address, key))
            .copied()
            .unwrap_or(StorageValue::ZERO))
    }

    fn get_code(&self, address: Address) -> Result<Bytes, StateError> {
        let code = self.code.read().map_err(|_| StateError::Unavailable)?;
        Ok(code.get(&address).cloned().unwrap_or_default())
    }

    fn account_exists(&self, address: Address) -> Result<bool, StateError> {
        let accounts = self.accounts.read().map_err(|_| StateError::Unavailable)?;
        Ok(accounts.contains_key(&address))
    }

    fn set_account(&self, address: Address, account: AccountState) -> Result<(), StateError> {
        let mut accounts = self.accounts.write().map_err(|_| StateError::Unavailable)?;
        accounts.insert(address, account);
        Ok(())
    }

    fn set_storage(
        &self,
        address: Address,
        key: StorageKey,
        value: StorageValue,
    ) -> Result<(), StateError> {
        let mut storage = self.storage.write().map_err(|_| StateError::Unavailable)?;
        storage.insert((address, key), value);
        Ok(())
    }

    fn remove_storage(&self, address: Address, key: StorageKey) -> Result<(), StateError> {
        let mut storage = self.storage.write().map_err(|_| StateError::Unavailable)?;
        storage.remove(&(address, key));
        Ok(())
    }

    fn set_code(&self, address: Address, code: Bytes) -> Result<(), StateError> {
        let code_hash = if code.is_empty() {
            AccountState::EMPTY_CODE_HASH
        } else {
            keccak256(code.as_slice())
        };

        {
            let mut accounts = self.accounts.write().map_err(|_| StateError::Unavailable)?;
            accounts
                .entry(address)
                .or_insert_with(|| AccountState::new_eoa(U256::zero(), 0))
                .code_hash = code_hash;
        }

        let mut stored = self.code.write().map_err(|_| StateError::Unavailable)?;
        stored.insert(address, code);
        Ok(())
    }
}

// =============================================================================
// TESTS
// =============================================================================
