//! # Operation Registry
//!
//! Immutable dispatch table mapping each opcode byte to its capability
//! record. The table is populated once per EVM version at construction and
//! never mutated afterwards, so lookups are plain array indexing and the
//! interpreter loop carries no per-instruction branching beyond the record
//! itself.
//!
//! An empty slot IS the definition of an invalid opcode: the interpreter
//! halts with `InvalidOpcode` when `lookup` returns `None`. Version
//! differences are expressed purely as presence or absence of slots
//! (plus which calculator prices the dynamic records):
//!
//! | Version  | Table delta                                |
//! |----------|--------------------------------------------|
//! | Frontier | baseline table                             |
//! | Istanbul | + SHL SHR SAR (EIP-145), CHAINID (EIP-1344)|
//! | Shanghai | + PUSH0 (EIP-3855)                         |
//!
//! Families share one body: PUSH1..32, DUP1..16, SWAP1..16 and LOG0..4
//! each register a single function that reads its own parameter from the
//! opcode byte under the program counter.

use std::fmt;

use crate::domain::entities::EvmVersion;
use crate::evm::operation::Operation;
use crate::evm::operations::{
    arithmetic, control, cost_base, cost_high, cost_jumpdest, cost_low, cost_mid, cost_very_low,
    cost_zero, environment, logic, memory, stack, storage,
};

// =============================================================================
// INSTRUCTION NAMES FOR PARAMETERIZED FAMILIES
// =============================================================================

const PUSH_NAMES: [&str; 32] = [
    "PUSH1", "PUSH2", "PUSH3", "PUSH4", "PUSH5", "PUSH6", "PUSH7", "PUSH8", "PUSH9", "PUSH10",
    "PUSH11", "PUSH12", "PUSH13", "PUSH14", "PUSH15", "PUSH16", "PUSH17", "PUSH18", "PUSH19",
    "PUSH20", "PUSH21", "PUSH22", "PUSH23", "PUSH24", "PUSH25", "PUSH26", "PUSH27", "PUSH28",
    "PUSH29", "PUSH30", "PUSH31", "PUSH32",
];

const DUP_NAMES: [&str; 16] = [
    "DUP1", "DUP2", "DUP3", "DUP4", "DUP5", "DUP6", "DUP7", "DUP8", "DUP9", "DUP10", "DUP11",
    "DUP12", "DUP13", "DUP14", "DUP15", "DUP16",
];

const SWAP_NAMES: [&str; 16] = [
    "SWAP1", "SWAP2", "SWAP3", "SWAP4", "SWAP5", "SWAP6", "SWAP7", "SWAP8", "SWAP9", "SWAP10",
    "SWAP11", "SWAP12", "SWAP13", "SWAP14", "SWAP15", "SWAP16",
];

const LOG_NAMES: [&str; 5] = ["LOG0", "LOG1", "LOG2", "LOG3", "LOG4"];

// =============================================================================
// REGISTRY
// =============================================================================

/// Dispatch table for one EVM version: 256 slots, one per opcode byte.
pub struct OperationRegistry {
    slots: [Option<Operation>; 256],
    version: EvmVersion,
}

impl OperationRegistry {
    /// Builds the full instruction table for `version`.
    #[must_use]
    pub fn new(version: EvmVersion) -> Self {
        let mut registry = Self {
            slots: [None; 256],
            version,
        };
        registry.populate(version);
        registry
    }

    /// The record for `opcode`, or `None` if the byte is not an
    /// instruction in this version.
    #[must_use]
    pub fn lookup(&self, opcode: u8) -> Option<&Operation> {
        self.slots[opcode as usize].as_ref()
    }

    /// True if `opcode` is assigned in this version.
    #[must_use]
    pub fn contains(&self, opcode: u8) -> bool {
        self.slots[opcode as usize].is_some()
    }

    /// Version this table was built for.
    #[must_use]
    pub fn version(&self) -> EvmVersion {
        self.version
    }

    /// Number of assigned slots.
    #[must_use]
    pub fn registered_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    fn set(&mut self, opcode: u8, operation: Operation) {
        self.slots[opcode as usize] = Some(operation);
    }

    #[allow(clippy::too_many_lines)]
    fn populate(&mut self, version: EvmVersion) {
        // 0x00 - Stop and Arithmetic
        self.set(
            0x00,
            Operation::new("STOP", 0, 0, cost_zero, control::stop).self_managed_pc(),
        );
        self.set(0x01, Operation::new("ADD", 2, 1, cost_very_low, arithmetic::add));
        self.set(0x02, Operation::new("MUL", 2, 1, cost_low, arithmetic::mul));
        self.set(0x03, Operation::new("SUB", 2, 1, cost_very_low, arithmetic::sub));
        self.set(0x04, Operation::new("DIV", 2, 1, cost_low, arithmetic::div));
        self.set(0x05, Operation::new("SDIV", 2, 1, cost_low, arithmetic::sdiv));
        self.set(0x06, Operation::new("MOD", 2, 1, cost_low, arithmetic::modulo));
        self.set(0x07, Operation::new("SMOD", 2, 1, cost_low, arithmetic::smod));
        self.set(0x08, Operation::new("ADDMOD", 3, 1, cost_mid, arithmetic::addmod));
        self.set(0x09, Operation::new("MULMOD", 3, 1, cost_mid, arithmetic::mulmod));
        self.set(
            0x0A,
            Operation::new("EXP", 2, 1, arithmetic::exp_cost, arithmetic::exp),
        );

        // 0x10 - Comparison & Bitwise
        self.set(0x10, Operation::new("LT", 2, 1, cost_very_low, logic::lt));
        self.set(0x11, Operation::new("GT", 2, 1, cost_very_low, logic::gt));
        self.set(0x12, Operation::new("SLT", 2, 1, cost_very_low, logic::slt));
        self.set(0x13, Operation::new("SGT", 2, 1, cost_very_low, logic::sgt));
        self.set(0x14, Operation::new("EQ", 2, 1, cost_very_low, logic::eq));
        self.set(0x15, Operation::new("ISZERO", 1, 1, cost_very_low, logic::iszero));
        self.set(0x16, Operation::new("AND", 2, 1, cost_very_low, logic::and));
        self.set(0x17, Operation::new("OR", 2, 1, cost_very_low, logic::or));
        self.set(0x18, Operation::new("XOR", 2, 1, cost_very_low, logic::xor));
        self.set(0x19, Operation::new("NOT", 1, 1, cost_very_low, logic::not));
        self.set(0x1A, Operation::new("BYTE", 2, 1, cost_very_low, logic::byte));
        if version.has_shifts() {
            self.set(0x1B, Operation::new("SHL", 2, 1, cost_very_low, logic::shl));
            self.set(0x1C, Operation::new("SHR", 2, 1, cost_very_low, logic::shr));
            self.set(0x1D, Operation::new("SAR", 2, 1, cost_very_low, logic::sar));
        }

        // 0x20 - Keccak256
        self.set(
            0x20,
            Operation::new("KECCAK256", 2, 1, memory::keccak256_cost, memory::keccak256_op)
                .with_halt(memory::keccak256_bounds),
        );

        // 0x30 - Environmental Information
        self.set(0x30, Operation::new("ADDRESS", 0, 1, cost_base, environment::address));
        self.set(0x32, Operation::new("ORIGIN", 0, 1, cost_base, environment::origin));
        self.set(0x33, Operation::new("CALLER", 0, 1, cost_base, environment::caller));
        self.set(
            0x34,
            Operation::new("CALLVALUE", 0, 1, cost_base, environment::callvalue),
        );
        self.set(
            0x35,
            Operation::new("CALLDATALOAD", 1, 1, cost_very_low, environment::calldataload),
        );
        self.set(
            0x36,
            Operation::new("CALLDATASIZE", 0, 1, cost_base, environment::calldatasize),
        );
        self.set(
            0x37,
            Operation::new(
                "CALLDATACOPY",
                3,
                0,
                environment::copy_cost,
                environment::calldatacopy,
            )
            .with_halt(environment::copy_bounds),
        );
        self.set(0x38, Operation::new("CODESIZE", 0, 1, cost_base, environment::codesize));
        self.set(
            0x39,
            Operation::new("CODECOPY", 3, 0, environment::copy_cost, environment::codecopy)
                .with_halt(environment::copy_bounds),
        );

        // 0x40 - Block Information
        self.set(
            0x42,
            Operation::new("TIMESTAMP", 0, 1, cost_base, environment::timestamp),
        );
        self.set(0x43, Operation::new("NUMBER", 0, 1, cost_base, environment::number));
        if version.has_chain_id() {
            self.set(0x46, Operation::new("CHAINID", 0, 1, cost_base, environment::chainid));
        }

        // 0x50 - Stack, Memory, Storage and Flow
        self.set(0x50, Operation::new("POP", 1, 0, cost_base, stack::pop));
        self.set(
            0x51,
            Operation::new("MLOAD", 1, 1, memory::mload_cost, memory::mload)
                .with_halt(memory::mload_bounds),
        );
        self.set(
            0x52,
            Operation::new("MSTORE", 2, 0, memory::mstore_cost, memory::mstore)
                .with_halt(memory::mstore_bounds),
        );
        self.set(
            0x53,
            Operation::new("MSTORE8", 2, 0, memory::mstore8_cost, memory::mstore8)
                .with_halt(memory::mstore8_bounds),
        );
        self.set(
            0x54,
            Operation::new("SLOAD", 1, 1, storage::sload_cost, storage::sload),
        );
        self.set(
            0x55,
            Operation::new("SSTORE", 2, 0, storage::sstore_cost, storage::sstore)
                .with_halt(storage::sstore_guard),
        );
        self.set(
            0x56,
            Operation::new("JUMP", 1, 0, cost_mid, control::jump)
                .with_halt(control::jump_guard)
                .self_managed_pc(),
        );
        self.set(
            0x57,
            Operation::new("JUMPI", 2, 0, cost_high, control::jumpi)
                .with_halt(control::jumpi_guard)
                .self_managed_pc(),
        );
        self.set(0x58, Operation::new("PC", 0, 1, cost_base, control::pc));
        self.set(0x59, Operation::new("MSIZE", 0, 1, cost_base, memory::msize));
        self.set(0x5A, Operation::new("GAS", 0, 1, cost_base, control::gas));
        self.set(
            0x5B,
            Operation::new("JUMPDEST", 0, 0, cost_jumpdest, control::jumpdest),
        );

        // 0x5F - Push0
        if version.has_push0() {
            self.set(0x5F, Operation::new("PUSH0", 0, 1, cost_base, stack::push_zero));
        }

        // 0x60-0x7F - Push
        for (i, &name) in PUSH_NAMES.iter().enumerate() {
            self.set(
                0x60 + i as u8,
                Operation::new(name, 0, 1, cost_very_low, stack::push),
            );
        }

        // 0x80-0x8F - Dup (DUPn requires n operands and nets one more)
        for (i, &name) in DUP_NAMES.iter().enumerate() {
            let depth = i + 1;
            self.set(
                0x80 + i as u8,
                Operation::new(name, depth, depth + 1, cost_very_low, stack::dup),
            );
        }

        // 0x90-0x9F - Swap (SWAPn requires n+1 operands, net zero)
        for (i, &name) in SWAP_NAMES.iter().enumerate() {
            let depth = i + 2;
            self.set(
                0x90 + i as u8,
                Operation::new(name, depth, depth, cost_very_low, stack::swap),
            );
        }

        // 0xA0-0xA4 - Log (LOGn pops offset, size and n topics)
        for (i, &name) in LOG_NAMES.iter().enumerate() {
            self.set(
                0xA0 + i as u8,
                Operation::new(name, 2 + i, 0, storage::log_cost, storage::log)
                    .with_halt(storage::log_guard),
            );
        }

        // 0xF0 - System
        self.set(
            0xF3,
            Operation::new("RETURN", 2, 0, control::return_cost, control::ret)
                .with_halt(control::return_bounds)
                .self_managed_pc(),
        );
        self.set(
            0xFD,
            Operation::new("REVERT", 2, 0, control::return_cost, control::revert)
                .with_halt(control::return_bounds)
                .self_managed_pc(),
        );
        self.set(
            0xFE,
            Operation::new("INVALID", 0, 0, cost_zero, control::invalid)
                .with_halt(control::invalid_guard)
                .self_managed_pc(),
        );
    }
}

impl Default for OperationRegistry {
    fn default() -> Self {
        Self::new(EvmVersion::default())
    }
}

impl fmt::Debug for OperationRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OperationRegistry")
            .field("version", &self.version)
            .field("registered", &self.registered_count())
            .finish()
    }
}

// =============================================================================
// TESTS
// =============================================================================
