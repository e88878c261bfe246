//! # Operation Records
//!
//! Every instruction is described by an [`Operation`]: a record of plain
//! function pointers plus declared stack arity. The dispatch loop never
//! matches on opcode bytes; it looks the record up in the operation table
//! and drives it through a fixed sequence:
//!
//! 1. arity check against `stack_pops` / `stack_pushes`
//! 2. the record's halt predicate, if any
//! 3. price via the cost function, then charge
//! 4. the execute body, which runs only after the charge succeeded
//!
//! Cost functions and halt predicates take the frame immutably: they may
//! inspect the stack, memory footprint, and committed state through the
//! host, but cannot change anything. Execute bodies get the mutable frame
//! and report implementation faults as [`VmFault`] instead of panicking.

use crate::domain::value_objects::{Address, StorageKey, StorageValue};
use crate::errors::{ExceptionalHaltReason, VmFault};
use crate::evm::frame::MessageFrame;
use crate::evm::gas::GasCalculator;

// =============================================================================
// HOST INTERFACE
// =============================================================================

/// World access available to instruction pricing and bodies.
///
/// The host exposes the active cost policy and committed state reads.
/// It is deliberately read-only: all writes go through the frame journal
/// and are applied after the frame completes.
pub trait EvmHost {
    /// Active cost policy.
    fn calculator(&self) -> &dyn GasCalculator;

    /// Committed storage slot value. Untouched slots read as zero. This
    /// does not see the frame's own journal; use
    /// [`MessageFrame::pending_storage`] first for read-your-writes.
    fn storage_read(&self, address: Address, key: StorageKey) -> StorageValue;
}

// =============================================================================
// OPERATION RECORD
// =============================================================================

/// Prices one instruction in the current frame. Total: returns a cost for
/// every reachable frame shape, saturating instead of overflowing.
pub type CostFn = fn(&MessageFrame, &dyn EvmHost) -> u64;

/// Executes one instruction body. Runs only after arity, halt predicate,
/// and gas charge all passed. An `Err` is an implementation fault, never
/// a protocol condition.
pub type ExecuteFn = fn(&mut MessageFrame, &dyn EvmHost) -> Result<(), VmFault>;

/// Detects an instruction-specific exceptional condition before any
/// mutation (for example an invalid jump target).
pub type HaltFn = fn(&MessageFrame, &dyn EvmHost) -> Option<ExceptionalHaltReason>;

/// Immutable description of one instruction.
#[derive(Clone, Copy)]
pub struct Operation {
    name: &'static str,
    stack_pops: usize,
    stack_pushes: usize,
    cost: CostFn,
    halt: Option<HaltFn>,
    execute: ExecuteFn,
    advances_pc: bool,
}

impl Operation {
    /// Creates a record with the given arity, pricing, and body. The
    /// program counter advances automatically past the instruction and
    /// its immediate unless [`Self::self_managed_pc`] is set.
    #[must_use]
    pub const fn new(
        name: &'static str,
        stack_pops: usize,
        stack_pushes: usize,
        cost: CostFn,
        execute: ExecuteFn,
    ) -> Self {
        Self {
            name,
            stack_pops,
            stack_pushes,
            cost,
            halt: None,
            execute,
            advances_pc: true,
        }
    }

    /// Attaches an instruction-specific halt predicate.
    #[must_use]
    pub const fn with_halt(mut self, halt: HaltFn) -> Self {
        self.halt = Some(halt);
        self
    }

    /// Marks the instruction as writing the program counter itself.
    #[must_use]
    pub const fn self_managed_pc(mut self) -> Self {
        self.advances_pc = false;
        self
    }

    /// Mnemonic, for traces and diagnostics.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Stack items the instruction consumes.
    #[must_use]
    pub fn stack_pops(&self) -> usize {
        self.stack_pops
    }

    /// Stack items the instruction produces.
    #[must_use]
    pub fn stack_pushes(&self) -> usize {
        self.stack_pushes
    }

    /// Returns true when the dispatch loop advances the program counter
    /// after the body runs.
    #[must_use]
    pub fn advances_pc(&self) -> bool {
        self.advances_pc
    }

    /// Prices the instruction in the current frame.
    #[must_use]
    pub fn cost(&self, frame: &MessageFrame, host: &dyn EvmHost) -> u64 {
        (self.cost)(frame, host)
    }

    /// Runs the instruction-specific halt predicate, if any.
    #[must_use]
    pub fn check_halt(
        &self,
        frame: &MessageFrame,
        host: &dyn EvmHost,
    ) -> Option<ExceptionalHaltReason> {
        self.halt.and_then(|check| check(frame, host))
    }

    /// Runs the instruction body.
    ///
    /// # Errors
    ///
    /// Returns a [`VmFault`] on an implementation fault; the dispatch
    /// loop converts it into an internal-fault halt.
    pub fn execute(&self, frame: &mut MessageFrame, host: &dyn EvmHost) -> Result<(), VmFault> {
        (self.execute)(frame, host)
    }
}

impl std::fmt::Debug for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Operation")
            .field("name", &self.name)
            .field("stack_pops", &self.stack_pops)
            .field("stack_pushes", &self.stack_pushes)
            .field("has_halt_check", &self.halt.is_some())
            .field("advances_pc", &self.advances_pc)
            .finish()
    }
}

// =============================================================================
// TESTS
// =============================================================================
