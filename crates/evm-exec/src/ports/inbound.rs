//! # Driving Ports (API - Inbound)
//!
//! The surfaces a node calls to run contract code: single executions,
//! full signed transactions, gas estimation, read-only calls, and batch
//! execution for block building. The service implements these; nothing
//! below this layer is async.

use crate::domain::entities::{BlockContext, ExecutionContext, ExecutionResult, Log};
use crate::domain::value_objects::{Address, Bytes, Hash, U256};
use crate::errors::VmError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

// =============================================================================
// SIGNED TRANSACTION
// =============================================================================

/// A signature-checked transaction ready for execution.
///
/// Signature recovery happens upstream; by the time a transaction
/// reaches this subsystem its sender is already established.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SignedTransaction {
    /// Sender address.
    pub from: Address,
    /// Recipient, or `None` for contract creation.
    pub to: Option<Address>,
    /// Value transferred in wei.
    pub value: U256,
    /// Sender's nonce.
    pub nonce: u64,
    /// Gas price in wei.
    pub gas_price: U256,
    /// Gas budget.
    pub gas_limit: u64,
    /// Calldata, or init code when creating.
    pub data: Bytes,
    /// Transaction hash.
    pub hash: Hash,
}

impl SignedTransaction {
    /// True when this transaction creates a contract.
    #[must_use]
    pub fn is_contract_creation(&self) -> bool {
        self.to.is_none()
    }

    /// The transaction hash.
    #[must_use]
    pub fn hash(&self) -> Hash {
        self.hash
    }

    /// The established sender.
    #[must_use]
    pub fn sender(&self) -> Address {
        self.from
    }
}

impl Default for SignedTransaction {
    fn default() -> Self {
        Self {
            from: Address::ZERO,
            to: None,
            value: U256::zero(),
            nonce: 0,
            gas_price: U256::from(1_000_000_000u64), // 1 gwei
            gas_limit: 21_000,
            data: Bytes::new(),
            hash: Hash::ZERO,
        }
    }
}

// =============================================================================
// TRANSACTION RECEIPT
// =============================================================================

/// Outcome of one transaction inside a block.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TransactionReceipt {
    /// Transaction hash.
    pub tx_hash: Hash,
    /// Whether the transaction succeeded.
    pub success: bool,
    /// Gas used by this transaction (post-settlement).
    pub gas_used: u64,
    /// Running gas total for the block up to and including this entry.
    pub cumulative_gas_used: u64,
    /// Return data.
    pub output: Bytes,
    /// Logs emitted.
    pub logs: Vec<Log>,
    /// Address of the created contract, when the transaction was a
    /// creation.
    pub contract_address: Option<Address>,
}

// =============================================================================
// CONTRACT EXECUTION API (Primary Driving Port)
// =============================================================================

/// Primary API for contract execution.
#[async_trait]
pub trait ContractExecutionApi: Send + Sync {
    /// Runs `code` under `context` and applies the journal on success.
    ///
    /// This is the low-level primitive; transaction handling, intrinsic
    /// gas and creation flow live in [`execute_transaction`].
    ///
    /// [`execute_transaction`]: ContractExecutionApi::execute_transaction
    async fn execute(
        &self,
        context: ExecutionContext,
        code: &[u8],
    ) -> Result<ExecutionResult, VmError>;

    /// Executes a signed transaction: intrinsic gas, value transfer,
    /// nonce increment, and either a call or a contract creation.
    async fn execute_transaction(
        &self,
        tx: &SignedTransaction,
        block: &BlockContext,
    ) -> Result<ExecutionResult, VmError>;

    /// Estimates the gas a call needs. Runs against current state with a
    /// full budget, discards all effects, and returns gas used plus
    /// headroom.
    async fn estimate_gas(&self, context: ExecutionContext, code: &[u8]) -> Result<u64, VmError>;

    /// Read-only call: runs with the static flag forced on and never
    /// applies state. Returns the call's output.
    async fn call(&self, context: ExecutionContext, code: &[u8]) -> Result<Bytes, VmError>;
}

// =============================================================================
// BATCH EXECUTOR (For Block Processing)
// =============================================================================

/// Ordered execution of a block's transactions.
#[async_trait]
pub trait BatchExecutor: Send + Sync {
    /// Executes `transactions` in order against evolving state.
    ///
    /// A failed transaction still produces a receipt and still consumes
    /// gas; the batch carries on with the next one. Receipts carry the
    /// block's running gas total.
    async fn execute_batch(
        &self,
        transactions: &[SignedTransaction],
        block: &BlockContext,
    ) -> Result<Vec<TransactionReceipt>, VmError>;
}

// =============================================================================
// TESTS
// =============================================================================
