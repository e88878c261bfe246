//! # Domain Invariants
//!
//! Runtime audit checks over terminal execution results. The interpreter
//! enforces these by construction; the service re-checks them on every
//! result so a defect surfaces as a loud violation instead of a corrupt
//! state transition.

use crate::domain::entities::{ExecutionContext, ExecutionResult, VmConfig};

// =============================================================================
// INVARIANT CHECKS
// =============================================================================

/// Gas budget enforcement: a frame never uses more gas than it was given.
#[must_use]
pub fn check_gas_budget_invariant(result: &ExecutionResult, ctx: &ExecutionContext) -> bool {
    result.gas_used <= ctx.gas_limit
}

/// Rollback: failed frames (reverted or halted) surface no journal
/// entries and no logs.
#[must_use]
pub fn check_rollback_invariant(result: &ExecutionResult) -> bool {
    if result.success {
        true
    } else {
        result.state_changes.is_empty() && result.logs.is_empty()
    }
}

/// Static purity: a read-only frame surfaces no journal entries and no
/// logs even on success.
#[must_use]
pub fn check_static_purity_invariant(ctx: &ExecutionContext, result: &ExecutionResult) -> bool {
    if ctx.is_static {
        result.state_changes.is_empty() && result.logs.is_empty()
    } else {
        true
    }
}

/// Depth ceiling: the frame was created within the configured call depth.
#[must_use]
pub fn check_depth_ceiling_invariant(ctx: &ExecutionContext, config: &VmConfig) -> bool {
    ctx.depth <= config.max_call_depth
}

/// Exceptional burn: an exceptionally halted frame consumed its entire
/// budget.
#[must_use]
pub fn check_exceptional_burn_invariant(result: &ExecutionResult, ctx: &ExecutionContext) -> bool {
    if result.is_exceptional() {
        result.gas_used == ctx.gas_limit
    } else {
        true
    }
}

/// Shape: a successful result carries neither a halt reason nor a revert
/// reason.
#[must_use]
pub fn check_result_shape_invariant(result: &ExecutionResult) -> bool {
    if result.success {
        result.halt_reason.is_none() && result.revert_reason.is_none()
    } else {
        true
    }
}

/// Runs every audit check and collects violations.
#[must_use]
pub fn check_all_invariants(
    ctx: &ExecutionContext,
    result: &ExecutionResult,
    config: &VmConfig,
) -> InvariantCheckResult {
    let mut violations = Vec::new();

    if !check_gas_budget_invariant(result, ctx) {
        violations.push(InvariantViolation::GasBudgetExceeded {
            used: result.gas_used,
            limit: ctx.gas_limit,
        });
    }

    if !check_rollback_invariant(result) {
        violations.push(InvariantViolation::JournalNotRolledBack {
            changes: result.state_changes.len(),
            logs: result.logs.len(),
        });
    }

    if !check_static_purity_invariant(ctx, result) {
        violations.push(InvariantViolation::StaticPurityViolation);
    }

    if !check_depth_ceiling_invariant(ctx, config) {
        violations.push(InvariantViolation::DepthCeilingExceeded {
            depth: ctx.depth,
            max: config.max_call_depth,
        });
    }

    if !check_exceptional_burn_invariant(result, ctx) {
        violations.push(InvariantViolation::ExceptionalGasNotBurned {
            used: result.gas_used,
            limit: ctx.gas_limit,
        });
    }

    if !check_result_shape_invariant(result) {
        violations.push(InvariantViolation::MalformedResult);
    }

    if violations.is_empty() {
        InvariantCheckResult::Valid
    } else {
        InvariantCheckResult::Invalid(violations)
    }
}

// =============================================================================
// INVARIANT TYPES
// =============================================================================

/// Result of running all audit checks.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InvariantCheckResult {
    /// All invariants hold.
    Valid,
    /// One or more invariants violated.
    Invalid(Vec<InvariantViolation>),
}

impl InvariantCheckResult {
    /// Returns true if all invariants hold.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }
}

/// A specific audit violation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InvariantViolation {
    /// Frame used more gas than its budget.
    GasBudgetExceeded {
        /// Gas reported used.
        used: u64,
        /// Budget the frame was given.
        limit: u64,
    },
    /// Failed frame surfaced journal entries or logs.
    JournalNotRolledBack {
        /// Journal entries present.
        changes: usize,
        /// Logs present.
        logs: usize,
    },
    /// Read-only frame surfaced journal entries or logs.
    StaticPurityViolation,
    /// Frame created past the depth ceiling.
    DepthCeilingExceeded {
        /// Frame depth.
        depth: u16,
        /// Configured ceiling.
        max: u16,
    },
    /// Exceptional halt left gas unconsumed.
    ExceptionalGasNotBurned {
        /// Gas reported used.
        used: u64,
        /// Budget that should have been burned.
        limit: u64,
    },
    /// Successful result carried a halt or revert reason.
    MalformedResult,
}

impl std::fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::GasBudgetExceeded { used, limit } => {
                write!(f, "gas budget exceeded: used {used} > limit {limit}")
            }
            Self::JournalNotRolledBack { changes, logs } => {
                write!(
                    f,
                    "journal not rolled back on failure: {changes} changes, {logs} logs"
                )
            }
            Self::StaticPurityViolation => {
                write!(f, "static frame surfaced state modifications")
            }
            Self::DepthCeilingExceeded { depth, max } => {
                write!(f, "depth ceiling exceeded: {depth} > {max}")
            }
            Self::ExceptionalGasNotBurned { used, limit } => {
                write!(
                    f,
                    "exceptional halt left gas unconsumed: used {used} of {limit}"
                )
            }
            Self::MalformedResult => {
                write!(f, "successful result carries a failure reason")
            }
        }
    }
}

// =============================================================================
// EXECUTION LIMIT CONSTANTS
// =============================================================================

/// Protocol and node execution limits.
pub mod limits {
    /// Maximum call depth.
    pub const MAX_CALL_DEPTH: u16 = 1024;

    /// Maximum deployed code size in bytes (EIP-170).
    pub const MAX_CODE_SIZE: usize = 24_576;

    /// Maximum init code size in bytes (EIP-3860).
    pub const MAX_INIT_CODE_SIZE: usize = 49_152;

    /// Maximum operand stack depth.
    pub const MAX_STACK_DEPTH: usize = 1024;

    /// Maximum memory size in bytes.
    pub const MAX_MEMORY_SIZE: usize = 16 * 1024 * 1024;

    /// Step ceiling (interpreter safety valve).
    pub const STEP_CEILING: u64 = 10_000_000;

    /// Block gas limit.
    pub const BLOCK_GAS_LIMIT: u64 = 30_000_000;

    /// Gas refund cap as a percentage of gas used (EIP-3529).
    pub const GAS_REFUND_CAP_PERCENT: u64 = 50;
}

// =============================================================================
// TESTS
// =============================================================================
