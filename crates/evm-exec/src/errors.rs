//! # Error Types
//!
//! All error types for contract execution: the closed exceptional-halt
//! enumeration, the machine-internal fault channel, and boundary errors.

use crate::domain::value_objects::{Address, U256};
use thiserror::Error;

// =============================================================================
// EXCEPTIONAL HALTS
// =============================================================================

/// Protocol-defined reasons a frame halts exceptionally.
///
/// These are terminal outcomes of the step state machine, not propagating
/// faults. Every variant except [`InternalFault`](Self::InternalFault) is
/// consensus-relevant: independent nodes must agree on which one fires.
/// At most one reason is reported per step; the driver selects it by a
/// fixed precedence order.
///
/// An exceptional halt consumes all remaining gas.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ExceptionalHaltReason {
    /// Remaining gas is less than the cost of the current instruction.
    #[error("insufficient gas")]
    InsufficientGas,

    /// Stack holds fewer items than the instruction consumes.
    #[error("stack underflow")]
    StackUnderflow,

    /// Instruction would grow the stack past its depth bound.
    #[error("stack overflow")]
    StackOverflow,

    /// Jump target is out of bounds, not a JUMPDEST, or push-data.
    #[error("invalid jump destination: {0}")]
    InvalidJumpDestination(u64),

    /// Opcode byte is not registered for the active protocol version.
    #[error("invalid opcode: 0x{0:02X}")]
    InvalidOpcode(u8),

    /// Memory access past the configured memory ceiling.
    #[error("out of bounds memory access: offset {offset}, size {size}")]
    OutOfBoundsMemory {
        /// Requested start offset (saturated for diagnostics).
        offset: u64,
        /// Requested length (saturated for diagnostics).
        size: u64,
    },

    /// State-mutating instruction inside a static (read-only) context.
    #[error("illegal state change in static context")]
    IllegalStateChange,

    /// Unexpected internal error isolated at the driver boundary.
    ///
    /// Non-protocol: nodes log it and fail the frame locally instead of
    /// crashing. The triggering fault is recorded in the log, not here.
    #[error("internal fault")]
    InternalFault,
}

impl ExceptionalHaltReason {
    /// Returns true for consensus-relevant reasons, false for the
    /// local-only [`InternalFault`](Self::InternalFault) category.
    #[must_use]
    pub fn is_protocol(&self) -> bool {
        !matches!(self, Self::InternalFault)
    }
}

// =============================================================================
// MACHINE FAULTS
// =============================================================================

/// Errors from direct stack manipulation.
///
/// The driver pre-checks declared arity before an instruction body runs,
/// so a body seeing one of these indicates an arity declaration bug; the
/// driver converts it into an [`ExceptionalHaltReason::InternalFault`].
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum StackError {
    /// Pop from an empty stack.
    #[error("stack underflow")]
    Underflow,

    /// Push past the depth bound.
    #[error("stack overflow")]
    Overflow,
}

/// Errors from direct memory manipulation.
///
/// Memory ranges are validated by halt predicates before an instruction
/// body runs; a body seeing one of these indicates a missing bounds check.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum MemoryError {
    /// Requested expansion past the configured ceiling.
    #[error("memory limit exceeded: {requested} > {max} bytes")]
    LimitExceeded {
        /// Bytes the access would require.
        requested: usize,
        /// Configured ceiling.
        max: usize,
    },
}

/// Implementation-fault channel for instruction bodies.
///
/// Anything an `execute` body cannot handle locally flows through this
/// type to the driver, which halts the frame with `InternalFault` and
/// logs the payload. Faults never propagate past the driver loop.
#[derive(Debug, Error, Clone)]
pub enum VmFault {
    /// Stack operation failed after the arity pre-check passed.
    #[error("stack inconsistency: {0}")]
    Stack(#[from] StackError),

    /// Memory operation failed after the bounds pre-check passed.
    #[error("memory inconsistency: {0}")]
    Memory(#[from] MemoryError),

    /// Outbound state read failed mid-step.
    #[error("state access failed: {0}")]
    State(#[from] StateError),

    /// Invariant violated inside an instruction body.
    #[error("inconsistency: {0}")]
    Inconsistency(&'static str),
}

// =============================================================================
// BOUNDARY ERRORS
// =============================================================================

/// Errors returned by the node-facing execution API.
///
/// These reject or fail a request *outside* the interpreter loop. Halts
/// that occur inside the loop are not errors; they surface as the terminal
/// state of the returned [`ExecutionResult`](crate::domain::entities::ExecutionResult).
#[derive(Debug, Error, Clone)]
pub enum VmError {
    /// Deployed contract code exceeds the size cap.
    #[error("code size exceeded: {size} > {max} bytes")]
    CodeSizeExceeded {
        /// Actual code size in bytes.
        size: usize,
        /// Configured cap.
        max: usize,
    },

    /// Init code exceeds the size cap (EIP-3860).
    #[error("init code size exceeded: {size} > {max} bytes")]
    InitCodeSizeExceeded {
        /// Actual init code size in bytes.
        size: usize,
        /// Configured cap.
        max: usize,
    },

    /// Deployed code starts with 0xEF (reserved for EOF).
    #[error("code starts with 0xEF byte (reserved for EOF)")]
    InvalidCodePrefix,

    /// Call depth past the configured ceiling.
    #[error("call depth exceeded: {depth} > {max}")]
    CallDepthExceeded {
        /// Requested depth.
        depth: u16,
        /// Configured ceiling.
        max: u16,
    },

    /// Transaction gas limit exceeds the block gas limit.
    #[error("gas limit exceeded: {limit} > {max}")]
    GasLimitExceeded {
        /// Requested gas limit.
        limit: u64,
        /// Block gas limit.
        max: u64,
    },

    /// Gas limit below the transaction's intrinsic cost.
    #[error("intrinsic gas too low: required {required}, limit {limit}")]
    IntrinsicGasTooLow {
        /// Intrinsic gas of the transaction.
        required: u64,
        /// Supplied gas limit.
        limit: u64,
    },

    /// Transaction nonce does not match the sender's account nonce.
    #[error("nonce mismatch: transaction {tx_nonce}, account {account_nonce}")]
    NonceMismatch {
        /// Nonce carried by the transaction.
        tx_nonce: u64,
        /// Sender's current account nonce.
        account_nonce: u64,
    },

    /// Sender balance cannot cover the transferred value.
    #[error("insufficient balance: required {required}, available {available}")]
    InsufficientBalance {
        /// Value plus fees required.
        required: U256,
        /// Sender balance.
        available: U256,
    },

    /// Read-only entry point observed a failed execution; carries the
    /// revert reason or the halt description.
    #[error("execution failed: {0}")]
    ExecutionFailed(String),

    /// State access error.
    #[error("state error: {0}")]
    StateError(#[from] StateError),

    /// Internal error (should not happen in production).
    #[error("internal error: {0}")]
    Internal(String),
}

impl VmError {
    /// Returns true if the request itself was invalid, as opposed to an
    /// infrastructure failure or a failing outcome while serving a valid
    /// request.
    #[must_use]
    pub fn is_rejection(&self) -> bool {
        !matches!(
            self,
            Self::ExecutionFailed(_) | Self::StateError(_) | Self::Internal(_)
        )
    }
}

// =============================================================================
// STATE ERRORS
// =============================================================================

/// Errors from state access operations.
#[derive(Debug, Error, Clone)]
pub enum StateError {
    /// State not found for an address expected to exist.
    #[error("state not found for address: {0:?}")]
    NotFound(Address),

    /// State database is corrupted.
    #[error("state corruption detected")]
    Corrupted,

    /// State backend unavailable.
    #[error("state backend unavailable")]
    Unavailable,

    /// Other state error.
    #[error("state error: {0}")]
    Other(String),
}

// =============================================================================
// PRECOMPILE ERRORS
// =============================================================================

/// Errors from precompiled contract execution.
#[derive(Debug, Error, Clone)]
pub enum PrecompileError {
    /// Invalid input data.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Out of gas during precompile execution.
    #[error("precompile out of gas")]
    OutOfGas,
}

// =============================================================================
// TESTS
// =============================================================================
