//! # EVM Execution Core
//!
//! A deterministic smart-contract bytecode interpreter for blockchain
//! nodes. Executes EVM-style bytecode with strict gas metering, isolates
//! every state effect in a deferred journal, and reports one of three
//! terminal outcomes: completed, reverted, or exceptionally halted.
//!
//! ## Design
//!
//! Instruction dispatch is table-driven: each opcode maps to an immutable
//! capability record bundling its cost function, halt predicate, stack
//! arity, and execute body. The interpreter core contains no per-opcode
//! branching; protocol versions differ only in which records their table
//! carries and which gas calculator prices them.
//!
//! Every step follows the same order: fetch, lookup, arity check, halt
//! predicate, gas charge, then execute. Nothing mutates until everything
//! that can fail has been checked, so independent nodes running the same
//! code agree byte-for-byte on the outcome.
//!
//! ## Domain Invariants
//!
//! | Invariant | Enforcement |
//! |-----------|-------------|
//! | Gas never exceeds the budget | `domain/invariants.rs` - `check_gas_budget_invariant()` |
//! | Failed frames leave no state | `domain/invariants.rs` - `check_rollback_invariant()` |
//! | Static frames are pure | `domain/invariants.rs` - `check_static_purity_invariant()` |
//! | Call depth is bounded | `domain/invariants.rs` - `check_depth_ceiling_invariant()` |
//! | Exceptional halts burn the budget | `domain/invariants.rs` - `check_exceptional_burn_invariant()` |
//!
//! ## Execution Safety Limits
//!
//! | Limit | Value | Purpose |
//! |-------|-------|---------|
//! | `max_call_depth` | 1024 | Prevent stack overflow |
//! | `max_code_size` | 24 KB (EIP-170) | Limit deployed contract size |
//! | `max_init_code_size` | 48 KB (EIP-3860) | Limit deployment code |
//! | `max_stack_depth` | 1024 | Operand stack bound |
//! | `max_memory_size` | 16 MB | Memory expansion ceiling |
//! | `step_ceiling` | 10M steps | Safety valve against driver bugs |
//!
//! ## Components
//!
//! | Component | Location | Purpose |
//! |-----------|----------|---------|
//! | Interpreter | `evm/interpreter.rs` | The step state machine |
//! | Registry | `evm/registry.rs` | Versioned operation tables |
//! | Operations | `evm/operations/` | Instruction bodies by family |
//! | Stack | `evm/stack.rs` | 1024-item operand stack |
//! | Memory | `evm/memory.rs` | Byte-addressed memory with expansion gas |
//! | Gas | `evm/gas.rs` | Cost tables and versioned calculators |
//! | Precompiles | `evm/precompiles/` | sha256, identity |
//! | Service | `service.rs` | Transactions, journals, settlement |
//!
//! ## Usage Example
//!
//! ```ignore
//! use evm_exec::prelude::*;
//!
//! let service = create_test_service();
//!
//! // Execute a transaction
//! let result = service.execute_transaction(&tx, &block_context).await?;
//!
//! if result.success {
//!     println!("Gas used: {}", result.gas_used);
//!     println!("Output: {:?}", result.output);
//! }
//! ```

// Crate-level lints
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::similar_names)]

// =============================================================================
// MODULES
// =============================================================================

pub mod adapters;
pub mod domain;
pub mod errors;
pub mod evm;
pub mod metrics;
pub mod ports;
pub mod service;

// =============================================================================
// PRELUDE
// =============================================================================

/// Convenient re-exports for common usage.
pub mod prelude {
    // Domain entities
    pub use crate::domain::entities::{
        AccountState, BlockContext, EvmVersion, ExecutionContext, ExecutionResult, Log,
        StateChange, VmConfig,
    };

    // Value objects
    pub use crate::domain::value_objects::{
        Address, Bytes, GasCounter, Hash, StorageKey, StorageValue, U256,
    };

    // Domain services
    pub use crate::domain::services::{compute_contract_address, empty_code_hash, keccak256};

    // Invariants
    pub use crate::domain::invariants::{
        check_all_invariants, limits, InvariantCheckResult, InvariantViolation,
    };

    // Ports
    pub use crate::ports::inbound::{
        BatchExecutor, ContractExecutionApi, SignedTransaction, TransactionReceipt,
    };
    pub use crate::ports::outbound::StateAccess;

    // Errors
    pub use crate::errors::{
        ExceptionalHaltReason, PrecompileError, StateError, VmError, VmFault,
    };

    // EVM components
    pub use crate::evm::{
        gas, memory::Memory, stack::Stack, Code, Interpreter, MessageFrame, Operation,
        OperationRegistry,
    };

    // Adapters
    pub use crate::adapters::InMemoryState;

    // Service
    pub use crate::service::{create_test_service, ExecutionService, ServiceConfig, ServiceStats};
}

// =============================================================================
// CRATE INFO
// =============================================================================

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// TESTS
// =============================================================================
