//! # Gas Metering
//!
//! Cost constants, dynamic cost formulas, and the pluggable cost policy.
//!
//! Flat per-instruction prices are stable across supported protocol
//! versions and live in [`costs`]. Prices that changed between versions
//! (state reads, exponent bytes) flow through the [`GasCalculator`] trait
//! so instruction bodies never branch on the protocol version themselves:
//! swapping the calculator swaps the fee schedule.

use std::sync::Arc;

use crate::domain::entities::EvmVersion;
use crate::domain::value_objects::U256;
use crate::evm::memory;

// =============================================================================
// BASE GAS COSTS
// =============================================================================

/// Gas costs for common operations.
pub mod costs {
    /// Zero gas.
    pub const ZERO: u64 = 0;
    /// Base cost (e.g., for `ADDRESS`).
    pub const BASE: u64 = 2;
    /// Very low cost (e.g., for `ADD`).
    pub const VERY_LOW: u64 = 3;
    /// Low cost (e.g., for `MUL`).
    pub const LOW: u64 = 5;
    /// Mid cost (e.g., for `ADDMOD`, `JUMP`).
    pub const MID: u64 = 8;
    /// High cost (e.g., for `JUMPI`).
    pub const HIGH: u64 = 10;
    /// Jump destination marker cost.
    pub const JUMPDEST: u64 = 1;

    // Transaction costs
    /// Base transaction gas.
    pub const TX_BASE: u64 = 21_000;
    /// Contract creation base gas.
    pub const TX_CREATE: u64 = 53_000;
    /// Gas per non-zero byte of calldata.
    pub const TX_DATA_NON_ZERO: u64 = 16;
    /// Gas per zero byte of calldata.
    pub const TX_DATA_ZERO: u64 = 4;

    // Memory costs
    /// Gas per word for memory copy.
    pub const COPY: u64 = 3;

    // Storage costs
    /// Storage read at launch rules.
    pub const SLOAD_FRONTIER: u64 = 50;
    /// Storage read from Istanbul on (EIP-1884).
    pub const SLOAD: u64 = 800;
    /// SSTORE when setting zero to non-zero.
    pub const SSTORE_SET: u64 = 20_000;
    /// SSTORE when overwriting an existing value.
    pub const SSTORE_RESET: u64 = 5_000;
    /// SSTORE refund for clearing storage.
    pub const SSTORE_CLEAR_REFUND: u64 = 15_000;

    // Log costs
    /// LOG base cost.
    pub const LOG: u64 = 375;
    /// LOG cost per topic.
    pub const LOG_TOPIC: u64 = 375;
    /// LOG cost per byte of data.
    pub const LOG_DATA: u64 = 8;

    // Other
    /// KECCAK256 base cost.
    pub const KECCAK256: u64 = 30;
    /// KECCAK256 cost per word hashed.
    pub const KECCAK256_WORD: u64 = 6;
    /// EXP base cost.
    pub const EXP: u64 = 10;
    /// EXP cost per byte of exponent at launch rules.
    pub const EXP_BYTE_FRONTIER: u64 = 10;
    /// EXP cost per byte of exponent from Istanbul on (EIP-160).
    pub const EXP_BYTE: u64 = 50;
}

// =============================================================================
// DYNAMIC COST FORMULAS
// =============================================================================

/// Gas cost for EXP with the given per-byte price.
#[must_use]
pub fn exp_gas_cost(exponent: U256, per_byte: u64) -> u64 {
    if exponent.is_zero() {
        return costs::EXP;
    }

    // Count bytes in exponent
    let byte_size = (256 - u64::from(exponent.leading_zeros())).div_ceil(8);
    costs::EXP + per_byte * byte_size
}

/// Gas cost for KECCAK256 over `data_size` bytes.
#[must_use]
pub fn keccak256_gas_cost(data_size: usize) -> u64 {
    costs::KECCAK256 + costs::KECCAK256_WORD * memory::words(data_size) as u64
}

/// Gas cost for a LOG with `data_size` bytes and `topic_count` topics.
#[must_use]
pub fn log_gas_cost(data_size: usize, topic_count: usize) -> u64 {
    costs::LOG + costs::LOG_TOPIC * topic_count as u64 + costs::LOG_DATA * data_size as u64
}

/// Gas cost for copy operations (CALLDATACOPY, CODECOPY) over `size` bytes.
#[must_use]
pub fn copy_gas_cost(size: usize) -> u64 {
    costs::COPY * memory::words(size) as u64
}

/// Intrinsic gas for a transaction: charged before the first instruction
/// runs, covering base bookkeeping and calldata.
#[must_use]
pub fn intrinsic_gas(data: &[u8], is_contract_creation: bool) -> u64 {
    let base = if is_contract_creation {
        costs::TX_CREATE
    } else {
        costs::TX_BASE
    };

    let data_cost: u64 = data
        .iter()
        .map(|&b| {
            if b == 0 {
                costs::TX_DATA_ZERO
            } else {
                costs::TX_DATA_NON_ZERO
            }
        })
        .sum();

    base + data_cost
}

// =============================================================================
// GAS CALCULATOR
// =============================================================================

/// Version-sensitive cost policy.
///
/// Implementations are pure pricing: they read arguments, never execution
/// state, so the same inputs always price the same. Formulas shared by all
/// versions are provided as defaults; versions override only what their
/// fork re-priced.
pub trait GasCalculator: Send + Sync {
    /// Cost of a storage read.
    fn sload_cost(&self) -> u64;

    /// Per-byte price applied to the EXP exponent.
    fn exp_byte_cost(&self) -> u64;

    /// Cost of a storage write given the current and new value shapes.
    fn sstore_cost(&self, current_is_zero: bool, new_is_zero: bool) -> u64 {
        if current_is_zero && !new_is_zero {
            costs::SSTORE_SET
        } else {
            costs::SSTORE_RESET
        }
    }

    /// Refund granted by a storage write, if any.
    fn sstore_refund(&self, current_is_zero: bool, new_is_zero: bool) -> u64 {
        if !current_is_zero && new_is_zero {
            costs::SSTORE_CLEAR_REFUND
        } else {
            0
        }
    }

    /// Cost of EXP for the given exponent.
    fn exp_cost(&self, exponent: U256) -> u64 {
        exp_gas_cost(exponent, self.exp_byte_cost())
    }

    /// Cost of hashing `data_size` bytes.
    fn keccak256_cost(&self, data_size: usize) -> u64 {
        keccak256_gas_cost(data_size)
    }

    /// Cost of copying `size` bytes into memory.
    fn copy_cost(&self, size: usize) -> u64 {
        copy_gas_cost(size)
    }

    /// Cost of a LOG with `data_size` bytes and `topic_count` topics.
    fn log_cost(&self, data_size: usize, topic_count: usize) -> u64 {
        log_gas_cost(data_size, topic_count)
    }

    /// Incremental cost of growing memory from `current_words` words to
    /// cover `required_bytes` bytes.
    fn memory_expansion_cost(&self, current_words: usize, required_bytes: usize) -> u64 {
        memory::memory_expansion_cost(current_words, memory::words(required_bytes))
    }
}

/// Launch fee schedule: cheap state reads, 10-per-byte exponents.
#[derive(Clone, Copy, Debug, Default)]
pub struct FrontierGasCalculator;

impl GasCalculator for FrontierGasCalculator {
    fn sload_cost(&self) -> u64 {
        costs::SLOAD_FRONTIER
    }

    fn exp_byte_cost(&self) -> u64 {
        costs::EXP_BYTE_FRONTIER
    }
}

/// Istanbul fee schedule: EIP-1884 state read re-pricing, EIP-160
/// exponent pricing. Shanghai kept this schedule unchanged.
#[derive(Clone, Copy, Debug, Default)]
pub struct IstanbulGasCalculator;

impl GasCalculator for IstanbulGasCalculator {
    fn sload_cost(&self) -> u64 {
        costs::SLOAD
    }

    fn exp_byte_cost(&self) -> u64 {
        costs::EXP_BYTE
    }
}

/// The cost policy for a protocol version.
#[must_use]
pub fn calculator_for(version: EvmVersion) -> Arc<dyn GasCalculator> {
    match version {
        EvmVersion::Frontier => Arc::new(FrontierGasCalculator),
        EvmVersion::Istanbul | EvmVersion::Shanghai => Arc::new(IstanbulGasCalculator),
    }
}

// =============================================================================
// TESTS
// =============================================================================
