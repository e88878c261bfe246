//! # Bytecode Interpreter
//!
//! The driver loop that advances a [`MessageFrame`] one instruction at a
//! time until it reaches a terminal state. The loop owns sequencing and
//! nothing else: what each instruction does lives in its registry record.
//!
//! ## Step sequence
//!
//! Every step runs the same checks, in the same order, and the first
//! failure halts the frame:
//!
//! | Phase | Check                        | Halt reason            |
//! |-------|------------------------------|------------------------|
//! | fetch | byte under `pc`              | (end of code = STOP)   |
//! | look  | registry slot assigned       | `InvalidOpcode`        |
//! | arity | operands present, room left  | `StackUnderflow` / `StackOverflow` |
//! | guard | record's own halt predicate  | predicate's reason     |
//! | price | budget covers the charge     | `InsufficientGas`      |
//! | run   | body returns `Ok`            | `InternalFault`        |
//!
//! Nothing in the frame is mutated until every check has passed; a halted
//! frame therefore never carries a half-applied instruction. Bodies that
//! return a fault indicate a bug in the engine, not in the contract, and
//! are contained as an `InternalFault` halt rather than unwinding.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, error, trace, warn};

use crate::domain::entities::{ExecutionContext, ExecutionResult, VmConfig};
use crate::domain::value_objects::{Address, Bytes, StorageKey, StorageValue};
use crate::errors::ExceptionalHaltReason;
use crate::evm::code::{push_immediate_len, Code};
use crate::evm::frame::{FrameState, MessageFrame};
use crate::evm::gas::{calculator_for, GasCalculator};
use crate::evm::operation::EvmHost;
use crate::evm::registry::OperationRegistry;
use crate::ports::outbound::StateAccess;

// =============================================================================
// INTERPRETER
// =============================================================================

/// Executes bytecode against a state backend.
///
/// The interpreter is immutable and shareable: registry, calculator and
/// configuration are fixed at construction, and every execution runs in
/// its own frame.
pub struct Interpreter<S: StateAccess> {
    config: VmConfig,
    registry: Arc<OperationRegistry>,
    calculator: Arc<dyn GasCalculator>,
    state: Arc<S>,
}

impl<S: StateAccess> Interpreter<S> {
    /// Creates an interpreter for the version named in `config`, priced
    /// by that version's calculator.
    #[must_use]
    pub fn new(config: VmConfig, state: Arc<S>) -> Self {
        let registry = Arc::new(OperationRegistry::new(config.evm_version));
        let calculator = calculator_for(config.evm_version);
        Self {
            config,
            registry,
            calculator,
            state,
        }
    }

    /// Swaps in a different cost policy. The instruction table keeps its
    /// version; only pricing changes.
    #[must_use]
    pub fn with_calculator(mut self, calculator: Arc<dyn GasCalculator>) -> Self {
        self.calculator = calculator;
        self
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &VmConfig {
        &self.config
    }

    /// Instruction table in use.
    #[must_use]
    pub fn registry(&self) -> &OperationRegistry {
        &self.registry
    }

    /// Runs `code` in a fresh frame under `context`.
    #[must_use]
    pub fn execute(&self, context: ExecutionContext, code: Bytes) -> ExecutionResult {
        self.execute_code(context, Arc::new(Code::new(code)))
    }

    /// Runs pre-analyzed `code` in a fresh frame under `context`. Sharing
    /// the `Code` handle across calls reuses its jump-destination table.
    #[must_use]
    pub fn execute_code(&self, context: ExecutionContext, code: Arc<Code>) -> ExecutionResult {
        let frame = MessageFrame::new(code, context, &self.config);
        self.run(frame)
    }

    /// Drives `frame` to a terminal state and consumes it.
    #[must_use]
    pub fn run(&self, mut frame: MessageFrame) -> ExecutionResult {
        debug!(
            code_len = frame.code.len(),
            gas_limit = frame.gas.limit(),
            depth = frame.context.depth,
            is_static = frame.context.is_static,
            "frame start"
        );

        while frame.is_running() {
            self.step(&mut frame);
        }

        debug!(
            state = ?frame.state,
            gas_used = frame.gas.used(),
            steps = frame.steps,
            "frame finished"
        );
        into_result(frame)
    }

    /// Advances `frame` by exactly one instruction.
    ///
    /// Exposed so tracers and tests can observe the machine between
    /// instructions; `run` is this in a loop. Calling it on a terminal
    /// frame does nothing.
    pub fn step(&self, frame: &mut MessageFrame) {
        if !frame.is_running() {
            return;
        }
        if frame.steps >= self.config.step_ceiling {
            warn!(steps = frame.steps, "step ceiling reached, halting frame");
            frame.halt(ExceptionalHaltReason::InternalFault);
            return;
        }
        frame.steps += 1;

        // Running past the end of code is an implicit STOP
        let Some(opcode) = frame.current_opcode() else {
            frame.complete(Bytes::new());
            return;
        };

        let Some(operation) = self.registry.lookup(opcode) else {
            frame.halt(ExceptionalHaltReason::InvalidOpcode(opcode));
            return;
        };

        trace!(pc = frame.pc, name = operation.name(), "dispatch");

        let depth = frame.stack.len();
        if depth < operation.stack_pops() {
            frame.halt(ExceptionalHaltReason::StackUnderflow);
            return;
        }
        if depth - operation.stack_pops() + operation.stack_pushes() > frame.stack.limit() {
            frame.halt(ExceptionalHaltReason::StackOverflow);
            return;
        }

        if let Some(reason) = operation.check_halt(frame, self) {
            frame.halt(reason);
            return;
        }

        let cost = operation.cost(frame, self);
        if !frame.gas.consume(cost) {
            frame.halt(ExceptionalHaltReason::InsufficientGas);
            return;
        }

        if let Err(fault) = operation.execute(frame, self) {
            error!(
                pc = frame.pc,
                name = operation.name(),
                %fault,
                "instruction body fault"
            );
            frame.halt(ExceptionalHaltReason::InternalFault);
            return;
        }

        if operation.advances_pc() && frame.is_running() {
            frame.pc += 1 + push_immediate_len(opcode);
        }
    }
}

impl<S: StateAccess> EvmHost for Interpreter<S> {
    fn calculator(&self) -> &dyn GasCalculator {
        self.calculator.as_ref()
    }

    fn storage_read(&self, address: Address, key: StorageKey) -> StorageValue {
        match self.state.get_storage(address, key) {
            Ok(value) => value,
            Err(source) => {
                // The step contract requires a total read. A backend that
                // can fail mid-run must surface that before execution.
                error!(?address, %source, "storage read failed, slot reads as zero");
                StorageValue::ZERO
            }
        }
    }
}

impl<S: StateAccess> fmt::Debug for Interpreter<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Interpreter")
            .field("version", &self.config.evm_version)
            .field("registry", &self.registry)
            .finish()
    }
}

/// Maps a terminal frame onto the caller-facing result. Completed frames
/// carry their journal out; reverted and halted frames drop it.
fn into_result(frame: MessageFrame) -> ExecutionResult {
    match frame.state {
        FrameState::Completed => {
            let mut result = ExecutionResult::success(frame.output, frame.gas.used());
            result.gas_refund = frame.gas.refund();
            result.state_changes = frame.state_changes;
            result.logs = frame.logs;
            result
        }
        FrameState::Reverted => ExecutionResult::revert(frame.output, frame.gas.used()),
        FrameState::Halted(reason) => ExecutionResult::exceptional(reason, frame.gas.limit()),
        // run() never hands a live frame to this function
        FrameState::Running => {
            ExecutionResult::exceptional(ExceptionalHaltReason::InternalFault, frame.gas.limit())
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
