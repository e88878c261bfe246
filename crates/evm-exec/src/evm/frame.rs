//! # Message Frame
//!
//! Mutable state of one bytecode execution: program counter, operand
//! stack, memory, gas counter, the write journal, and the frame's
//! life-cycle state.
//!
//! ## Life cycle
//!
//! A frame starts `Running` and ends in exactly one terminal state:
//!
//! | State | Meaning | Journal |
//! |-------|---------|---------|
//! | `Completed` | STOP, RETURN, or ran off the end of code | applied |
//! | `Reverted` | explicit REVERT | discarded, unused gas returned |
//! | `Halted(reason)` | protocol violation or internal fault | discarded, all gas burned |
//!
//! The state field moves through [`MessageFrame::complete`],
//! [`MessageFrame::revert`], and [`MessageFrame::halt`] only, so the
//! gas-burn rule for exceptional halts cannot be skipped.

use std::sync::Arc;

use crate::domain::entities::{ExecutionContext, Log, StateChange, VmConfig};
use crate::domain::value_objects::{Bytes, GasCounter, StorageKey, StorageValue, U256};
use crate::errors::ExceptionalHaltReason;
use crate::evm::code::Code;
use crate::evm::memory::Memory;
use crate::evm::stack::Stack;

// =============================================================================
// FRAME STATE
// =============================================================================

/// Life-cycle state of a message frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FrameState {
    /// Executing instructions.
    Running,
    /// Finished normally (STOP, RETURN, or end of code).
    Completed,
    /// Finished via REVERT: journal discarded, unused gas returned.
    Reverted,
    /// Finished via protocol violation or internal fault: journal
    /// discarded, all gas burned.
    Halted(ExceptionalHaltReason),
}

impl FrameState {
    /// Returns true while instructions may still execute.
    #[must_use]
    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running)
    }

    /// Returns true once the frame reached a terminal state.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        !self.is_running()
    }
}

// =============================================================================
// MESSAGE FRAME
// =============================================================================

/// Execution state of a single bytecode run.
#[derive(Clone, Debug)]
pub struct MessageFrame {
    /// Life-cycle state.
    pub state: FrameState,
    /// Code under execution; shared so jump analysis is computed once.
    pub code: Arc<Code>,
    /// Program counter (byte offset into the code).
    pub pc: usize,
    /// Operand stack.
    pub stack: Stack,
    /// Scratch memory.
    pub memory: Memory,
    /// Gas accounting.
    pub gas: GasCounter,
    /// Immutable call environment.
    pub context: ExecutionContext,
    /// Output carried by RETURN or REVERT.
    pub output: Bytes,
    /// Logs emitted so far (discarded unless the frame completes).
    pub logs: Vec<Log>,
    /// Journal of pending writes (applied only on completion).
    pub state_changes: Vec<StateChange>,
    /// Instructions executed so far.
    pub steps: u64,
}

impl MessageFrame {
    /// Creates a running frame over `code` with limits from `config`.
    #[must_use]
    pub fn new(code: Arc<Code>, context: ExecutionContext, config: &VmConfig) -> Self {
        let gas = GasCounter::new(context.gas_limit);
        Self {
            state: FrameState::Running,
            code,
            pc: 0,
            stack: Stack::with_limit(config.max_stack_depth),
            memory: Memory::with_limit(config.max_memory_size),
            gas,
            context,
            output: Bytes::new(),
            logs: Vec::new(),
            state_changes: Vec::new(),
            steps: 0,
        }
    }

    /// Opcode byte at the current program counter, or `None` past the
    /// end of code.
    #[must_use]
    pub fn current_opcode(&self) -> Option<u8> {
        self.code.byte_at(self.pc)
    }

    /// Reads the `n`-byte immediate following the current opcode as a
    /// big-endian word. Bytes past the end of code read as zero.
    #[must_use]
    pub fn read_immediate(&self, n: usize) -> U256 {
        let code = self.code.as_slice();
        let start = self.pc + 1;
        let mut buf = [0u8; 32];

        for i in 0..n.min(32) {
            buf[32 - n + i] = code.get(start + i).copied().unwrap_or(0);
        }

        U256::from_big_endian(&buf)
    }

    /// Returns true while instructions may still execute.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.state.is_running()
    }

    /// Finish normally with `output`.
    pub fn complete(&mut self, output: Bytes) {
        self.output = output;
        self.state = FrameState::Completed;
    }

    /// Finish via REVERT with `output`. Unused gas stays refundable.
    pub fn revert(&mut self, output: Bytes) {
        self.output = output;
        self.state = FrameState::Reverted;
    }

    /// Finish via exceptional halt, burning all remaining gas.
    pub fn halt(&mut self, reason: ExceptionalHaltReason) {
        self.gas.consume_all();
        self.state = FrameState::Halted(reason);
    }

    /// Latest pending value for a storage slot of the executing contract,
    /// if this frame already wrote it.
    ///
    /// The journal is scanned newest-first so re-writes shadow earlier
    /// entries; a delete reads back as the zero value.
    #[must_use]
    pub fn pending_storage(&self, key: StorageKey) -> Option<StorageValue> {
        let address = self.context.address;
        self.state_changes.iter().rev().find_map(|change| match change {
            StateChange::StorageWrite {
                address: a,
                key: k,
                value,
            } if *a == address && *k == key => Some(*value),
            StateChange::StorageDelete { address: a, key: k }
                if *a == address && *k == key =>
            {
                Some(StorageValue::ZERO)
            }
            _ => None,
        })
    }

    /// Journals a storage write for the executing contract. A zero value
    /// journals as a delete.
    pub fn record_storage_write(&mut self, key: StorageKey, value: StorageValue) {
        let address = self.context.address;
        if value.is_zero() {
            self.state_changes
                .push(StateChange::StorageDelete { address, key });
        } else {
            self.state_changes.push(StateChange::StorageWrite {
                address,
                key,
                value,
            });
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
