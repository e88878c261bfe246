//! # Core Domain Entities
//!
//! Main business entities for contract execution: the per-call context,
//! block environment, execution results, the deferred state-change
//! journal, and the machine configuration.

use crate::domain::value_objects::{Address, Bytes, Hash, StorageKey, StorageValue, U256};
use crate::errors::ExceptionalHaltReason;
use serde::{Deserialize, Serialize};

// =============================================================================
// EXECUTION CONTEXT
// =============================================================================

/// Execution context for a contract call.
///
/// Everything the machine needs to know about *why* it is running:
/// caller/origin identity, transferred value, calldata, gas budget, and
/// the enclosing block. The context is immutable for the lifetime of the
/// frame it seeds.
#[derive(Clone, Debug)]
pub struct ExecutionContext {
    /// Transaction sender (the account that signed the transaction).
    pub origin: Address,
    /// Immediate caller (differs from origin in nested calls).
    pub caller: Address,
    /// Account whose code is being executed.
    pub address: Address,
    /// Value transferred (wei).
    pub value: U256,
    /// Input data (calldata).
    pub data: Bytes,
    /// Gas budget for this call.
    pub gas_limit: u64,
    /// Gas price.
    pub gas_price: U256,
    /// Block environment.
    pub block: BlockContext,
    /// Call depth of this frame.
    pub depth: u16,
    /// Static (read-only) context: journal writes are illegal.
    pub is_static: bool,
}

impl ExecutionContext {
    /// Creates the context for a top-level transaction.
    #[must_use]
    pub fn new_transaction(
        origin: Address,
        to: Address,
        value: U256,
        data: Bytes,
        gas_limit: u64,
        gas_price: U256,
        block: BlockContext,
    ) -> Self {
        Self {
            origin,
            caller: origin,
            address: to,
            value,
            data,
            gas_limit,
            gas_price,
            block,
            depth: 0,
            is_static: false,
        }
    }

    /// Returns the same context with the static flag forced on, for
    /// read-only entry points.
    #[must_use]
    pub fn into_static(mut self) -> Self {
        self.is_static = true;
        self
    }
}

impl Default for ExecutionContext {
    fn default() -> Self {
        Self {
            origin: Address::ZERO,
            caller: Address::ZERO,
            address: Address::ZERO,
            value: U256::zero(),
            data: Bytes::new(),
            gas_limit: 0,
            gas_price: U256::zero(),
            block: BlockContext::default(),
            depth: 0,
            is_static: false,
        }
    }
}

// =============================================================================
// BLOCK CONTEXT
// =============================================================================

/// Block environment visible to executing code.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BlockContext {
    /// Block number.
    pub number: u64,
    /// Block timestamp (unix seconds).
    pub timestamp: u64,
    /// Coinbase address (block proposer).
    pub coinbase: Address,
    /// Block gas limit.
    pub gas_limit: u64,
    /// Base fee (EIP-1559).
    pub base_fee: U256,
    /// Chain ID (EIP-155).
    pub chain_id: u64,
}

impl Default for BlockContext {
    fn default() -> Self {
        Self {
            number: 0,
            timestamp: 0,
            coinbase: Address::ZERO,
            gas_limit: VmConfig::BLOCK_GAS_LIMIT,
            base_fee: U256::zero(),
            chain_id: 1,
        }
    }
}

// =============================================================================
// EXECUTION RESULT
// =============================================================================

/// Terminal outcome of contract execution, as consumed by the node.
///
/// Exactly one of three shapes:
/// - success: `success = true`, journal and logs populated;
/// - revert: `success = false`, `halt_reason = None`, output carries the
///   revert payload, journal discarded;
/// - exceptional halt: `success = false`, `halt_reason = Some(..)`, all
///   gas consumed, journal discarded.
#[derive(Clone, Debug, Default)]
pub struct ExecutionResult {
    /// Whether execution completed normally.
    pub success: bool,
    /// Return data (or revert payload).
    pub output: Bytes,
    /// Gas consumed by execution. The service folds the capped refund
    /// into this before a result leaves the public API.
    pub gas_used: u64,
    /// Refund accrued by storage clears (capped at settlement).
    pub gas_refund: u64,
    /// Exceptional halt reason, if any.
    pub halt_reason: Option<ExceptionalHaltReason>,
    /// State changes to apply (empty unless successful).
    pub state_changes: Vec<StateChange>,
    /// Logs emitted (empty unless successful).
    pub logs: Vec<Log>,
    /// Decoded revert reason, when the payload carries one.
    pub revert_reason: Option<String>,
}

impl ExecutionResult {
    /// Creates a successful result.
    #[must_use]
    pub fn success(output: Bytes, gas_used: u64) -> Self {
        Self {
            success: true,
            output,
            gas_used,
            ..Self::default()
        }
    }

    /// Creates a reverted result. Unconsumed gas stays with the caller;
    /// the payload is scanned for an ABI-encoded `Error(string)` reason.
    #[must_use]
    pub fn revert(data: Bytes, gas_used: u64) -> Self {
        let reason = decode_revert_reason(&data);
        Self {
            success: false,
            output: data,
            gas_used,
            revert_reason: reason,
            ..Self::default()
        }
    }

    /// Creates an exceptionally halted result. Per protocol the entire
    /// budget is consumed.
    #[must_use]
    pub fn exceptional(reason: ExceptionalHaltReason, gas_limit: u64) -> Self {
        Self {
            success: false,
            gas_used: gas_limit,
            halt_reason: Some(reason),
            ..Self::default()
        }
    }

    /// Returns true if this result halted exceptionally.
    #[must_use]
    pub fn is_exceptional(&self) -> bool {
        self.halt_reason.is_some()
    }

    /// Returns true if this result is a revert (failed without an
    /// exceptional reason).
    #[must_use]
    pub fn is_revert(&self) -> bool {
        !self.success && self.halt_reason.is_none()
    }
}

/// Attempts to decode an ABI `Error(string)` revert reason.
fn decode_revert_reason(data: &Bytes) -> Option<String> {
    // Error(string) selector: 0x08c379a0
    if data.len() < 68 {
        return None;
    }

    let selector = &data.as_slice()[0..4];
    if selector != [0x08, 0xc3, 0x79, 0xa0] {
        return None;
    }

    // selector (4) + string offset word (32), then the length word
    let offset = 4 + 32;
    if data.len() < offset + 32 {
        return None;
    }

    let len_bytes = &data.as_slice()[offset..offset + 32];
    let len = U256::from_big_endian(len_bytes);
    if len > U256::from(data.len()) {
        return None;
    }
    let len = len.as_usize();

    if data.len() < offset + 32 + len {
        return None;
    }

    let string_bytes = &data.as_slice()[offset + 32..offset + 32 + len];
    String::from_utf8(string_bytes.to_vec()).ok()
}

// =============================================================================
// STATE CHANGE (JOURNAL ENTRY)
// =============================================================================

/// Deferred state change recorded during execution.
///
/// Entries accumulate in the frame journal and are applied by the caller
/// only when the frame completes successfully; reverted and exceptionally
/// halted frames discard the journal unseen.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StateChange {
    /// Transfer balance between accounts.
    BalanceTransfer {
        /// Debited account.
        from: Address,
        /// Credited account.
        to: Address,
        /// Amount in wei.
        amount: U256,
    },
    /// Write to contract storage.
    StorageWrite {
        /// Contract whose storage is written.
        address: Address,
        /// Slot key.
        key: StorageKey,
        /// New slot value.
        value: StorageValue,
    },
    /// Clear a storage slot (write of zero).
    StorageDelete {
        /// Contract whose storage is cleared.
        address: Address,
        /// Slot key.
        key: StorageKey,
    },
    /// Deploy code at an address.
    ContractCreate {
        /// Deployment address.
        address: Address,
        /// Deployed runtime code.
        code: Bytes,
    },
    /// Increment account nonce.
    NonceIncrement {
        /// Account whose nonce advances.
        address: Address,
    },
}

// =============================================================================
// LOG (EVENT)
// =============================================================================

/// Emitted log (event) from contract execution.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Log {
    /// Contract address that emitted the log.
    pub address: Address,
    /// Indexed topics (up to 4).
    pub topics: Vec<Hash>,
    /// Non-indexed data.
    pub data: Bytes,
}

impl Log {
    /// Creates a new log.
    #[must_use]
    pub fn new(address: Address, topics: Vec<Hash>, data: Bytes) -> Self {
        Self {
            address,
            topics,
            data,
        }
    }
}

// =============================================================================
// VM CONFIGURATION
// =============================================================================

/// Machine configuration: execution limits and the active protocol
/// version.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VmConfig {
    /// Maximum call depth.
    pub max_call_depth: u16,
    /// Maximum deployed code size in bytes (EIP-170).
    pub max_code_size: usize,
    /// Maximum init code size in bytes (EIP-3860).
    pub max_init_code_size: usize,
    /// Maximum operand stack depth.
    pub max_stack_depth: usize,
    /// Maximum memory size in bytes.
    pub max_memory_size: usize,
    /// Step ceiling: safety valve against interpreter defects. Gas
    /// pricing already bounds every loop, so a trip indicates a bug and
    /// halts the frame with an internal fault.
    pub step_ceiling: u64,
    /// Protocol version; selects the gas calculator and operation table.
    pub evm_version: EvmVersion,
}

impl Default for VmConfig {
    fn default() -> Self {
        use crate::domain::invariants::limits;
        Self {
            max_call_depth: limits::MAX_CALL_DEPTH,
            max_code_size: limits::MAX_CODE_SIZE,
            max_init_code_size: limits::MAX_INIT_CODE_SIZE,
            max_stack_depth: limits::MAX_STACK_DEPTH,
            max_memory_size: limits::MAX_MEMORY_SIZE,
            step_ceiling: limits::STEP_CEILING,
            evm_version: EvmVersion::Shanghai,
        }
    }
}

impl VmConfig {
    /// Default block gas limit.
    pub const BLOCK_GAS_LIMIT: u64 = crate::domain::invariants::limits::BLOCK_GAS_LIMIT;

    /// Gas budget used for estimation runs.
    #[must_use]
    pub fn max_gas_limit(&self) -> u64 {
        Self::BLOCK_GAS_LIMIT
    }
}

/// Protocol version.
///
/// The interpreter core never branches on this: each version maps to a
/// gas calculator and an operation table at configuration time, and all
/// version sensitivity flows through those two seams.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EvmVersion {
    /// Launch rules: cheap state reads, 10-per-byte exponent pricing.
    Frontier,
    /// Istanbul rules: EIP-1884 re-pricing, EIP-160 exponent pricing,
    /// shift instructions and CHAINID available.
    Istanbul,
    /// Shanghai rules: Istanbul pricing plus PUSH0.
    #[default]
    Shanghai,
}

impl EvmVersion {
    /// Shift instructions (SHL/SHR/SAR) present in this version's table.
    #[must_use]
    pub fn has_shifts(&self) -> bool {
        !matches!(self, Self::Frontier)
    }

    /// CHAINID present in this version's table (EIP-1344).
    #[must_use]
    pub fn has_chain_id(&self) -> bool {
        !matches!(self, Self::Frontier)
    }

    /// PUSH0 present in this version's table (EIP-3855).
    #[must_use]
    pub fn has_push0(&self) -> bool {
        matches!(self, Self::Shanghai)
    }
}

// =============================================================================
// ACCOUNT STATE (for StateAccess port)
// =============================================================================

/// Account state as seen through the state port.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AccountState {
    /// Account balance.
    pub balance: U256,
    /// Account nonce.
    pub nonce: u64,
    /// Code hash (keccak256 of code, or the empty-code hash).
    pub code_hash: Hash,
    /// Storage root.
    pub storage_root: Hash,
}

impl AccountState {
    /// Keccak-256 of empty bytes: the code hash of every code-less
    /// account.
    pub const EMPTY_CODE_HASH: Hash = Hash([
        0xc5, 0xd2, 0x46, 0x01, 0x86, 0xf7, 0x23, 0x3c, 0x92, 0x7e, 0x7d, 0xb2, 0xdc, 0xc7, 0x03,
        0xc0, 0xe5, 0x00, 0xb6, 0x53, 0xca, 0x82, 0x27, 0x3b, 0x7b, 0xfa, 0xd8, 0x04, 0x5d, 0x85,
        0xa4, 0x70,
    ]);

    /// Creates an externally owned account.
    #[must_use]
    pub fn new_eoa(balance: U256, nonce: u64) -> Self {
        Self {
            balance,
            nonce,
            code_hash: Self::EMPTY_CODE_HASH,
            storage_root: Hash::ZERO,
        }
    }

    /// Returns true if this account carries no code.
    #[must_use]
    pub fn is_eoa(&self) -> bool {
        self.code_hash == Self::EMPTY_CODE_HASH || self.code_hash == Hash::ZERO
    }

    /// Returns true if this account carries code.
    #[must_use]
    pub fn is_contract(&self) -> bool {
        !self.is_eoa()
    }

    /// Returns true if this account is empty (prunable).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.balance.is_zero() && self.nonce == 0 && self.is_eoa()
    }
}

// =============================================================================
// TESTS
// =============================================================================
