//! # Execution Service
//!
//! Node-facing orchestration around the interpreter: admission checks,
//! precompile routing, contract creation, journal application, refund
//! settlement, and execution statistics.
//!
//! ## Responsibilities
//!
//! | Concern | Where |
//! |---------|-------|
//! | Admission (ceilings, intrinsic gas, nonce, balance) | `process_transaction` |
//! | Precompile routing | `process_transaction` |
//! | Deployed-code checks on creation | `process_transaction` |
//! | Refund settlement | `settle_refund` |
//! | Journal application | `apply_journal` |
//! | Result auditing | `run_frame` |
//!
//! The interpreter never touches state directly: a successful frame hands
//! back a journal, and only this layer writes it through the state port.
//! Failed frames arrive with an empty journal and leave no trace beyond
//! the sender's nonce.
//!
//! ## Gas Accounting
//!
//! The interpreter reports raw gas used and the raw accrued refund. This
//! layer settles both: the credited refund is capped at half the gas
//! used, the capped amount is folded into `gas_used`, and intrinsic gas
//! is added on top for transaction entry points.

use crate::adapters::InMemoryState;
use crate::domain::entities::{
    AccountState, BlockContext, ExecutionContext, ExecutionResult, StateChange, VmConfig,
};
use crate::domain::invariants::{check_all_invariants, limits, InvariantCheckResult};
use crate::domain::services::compute_contract_address;
use crate::domain::value_objects::{Bytes, U256};
use crate::errors::{ExceptionalHaltReason, PrecompileError, StateError, VmError};
use crate::evm::gas::intrinsic_gas;
use crate::evm::precompiles::{run_precompile, PrecompileOutput};
use crate::evm::Interpreter;
use crate::metrics;
use crate::ports::inbound::{
    BatchExecutor, ContractExecutionApi, SignedTransaction, TransactionReceipt,
};
use crate::ports::outbound::StateAccess;

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

/// Execution service configuration.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Machine configuration handed to the interpreter.
    pub vm_config: VmConfig,
    /// Ceiling on any single request's gas limit.
    pub block_gas_limit: u64,
    /// Audit every result against the domain invariants before applying
    /// its journal.
    pub audit_results: bool,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            vm_config: VmConfig::default(),
            block_gas_limit: limits::BLOCK_GAS_LIMIT,
            audit_results: true,
        }
    }
}

/// Statistics for the execution service.
#[derive(Debug, Default, Clone)]
pub struct ServiceStats {
    /// Total transactions executed.
    pub transactions_executed: u64,
    /// Transactions that completed successfully.
    pub successful_executions: u64,
    /// Transactions that reverted, halted, or failed on infrastructure.
    pub failed_executions: u64,
    /// Requests rejected before execution (bad nonce, ceilings, funds).
    pub rejected_requests: u64,
    /// Total gas consumed by executed transactions.
    pub total_gas_used: u64,
    /// Average execution time in microseconds.
    pub avg_execution_time_us: u64,
}

/// The main execution service.
///
/// This service:
/// 1. Admits or rejects requests against the configured ceilings
/// 2. Runs bytecode in the interpreter
/// 3. Applies journals of successful frames through the state port
/// 4. Maintains execution statistics
pub struct ExecutionService<S: StateAccess> {
    /// Service configuration.
    config: ServiceConfig,
    /// Backing state, shared with the interpreter.
    state: Arc<S>,
    /// The bytecode interpreter.
    interpreter: Interpreter<S>,
    /// Service statistics.
    stats: Arc<RwLock<ServiceStats>>,
}

impl<S: StateAccess> ExecutionService<S> {
    /// Creates a new execution service over `state`.
    pub fn new(state: S, config: ServiceConfig) -> Self {
        let state = Arc::new(state);
        let interpreter = Interpreter::new(config.vm_config.clone(), Arc::clone(&state));
        Self {
            config,
            state,
            interpreter,
            stats: Arc::new(RwLock::new(ServiceStats::default())),
        }
    }

    /// Current service statistics.
    pub async fn stats(&self) -> ServiceStats {
        self.stats.read().await.clone()
    }

    /// Shared handle to the backing state.
    #[must_use]
    pub fn state(&self) -> Arc<S> {
        Arc::clone(&self.state)
    }

    /// Service configuration.
    #[must_use]
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Runs one frame and settles its gas accounting.
    ///
    /// Enforces the request ceilings, executes, folds the capped refund
    /// into the gas total, and audits the result. Does not apply the
    /// journal; callers decide whether the frame's effects land.
    fn run_frame(
        &self,
        context: ExecutionContext,
        code: Bytes,
    ) -> Result<ExecutionResult, VmError> {
        if context.gas_limit > self.config.block_gas_limit {
            return Err(VmError::GasLimitExceeded {
                limit: context.gas_limit,
                max: self.config.block_gas_limit,
            });
        }
        if context.depth > self.config.vm_config.max_call_depth {
            return Err(VmError::CallDepthExceeded {
                depth: context.depth,
                max: self.config.vm_config.max_call_depth,
            });
        }

        let mut result = self.interpreter.execute(context.clone(), code);
        settle_refund(&mut result);

        if self.config.audit_results {
            let audit = check_all_invariants(&context, &result, self.interpreter.config());
            if let InvariantCheckResult::Invalid(violations) = audit {
                let summary = violations
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join("; ");
                error!(violations = %summary, "execution result failed audit");
                return Err(VmError::Internal(format!("audit failed: {summary}")));
            }
        }

        record_outcome(&result);
        Ok(result)
    }

    /// Writes journal entries through the state port, in order.
    fn apply_journal(&self, changes: &[StateChange]) -> Result<(), StateError> {
        for change in changes {
            match change {
                StateChange::BalanceTransfer { from, to, amount } => {
                    let mut debtor = self
                        .state
                        .get_account(*from)?
                        .unwrap_or_else(|| AccountState::new_eoa(U256::zero(), 0));
                    debtor.balance = debtor.balance.saturating_sub(*amount);
                    self.state.set_account(*from, debtor)?;

                    let mut creditor = self
                        .state
                        .get_account(*to)?
                        .unwrap_or_else(|| AccountState::new_eoa(U256::zero(), 0));
                    creditor.balance = creditor.balance.saturating_add(*amount);
                    self.state.set_account(*to, creditor)?;
                }
                StateChange::StorageWrite {
                    address,
                    key,
                    value,
                } => self.state.set_storage(*address, *key, *value)?,
                StateChange::StorageDelete { address, key } => {
                    self.state.remove_storage(*address, *key)?;
                }
                StateChange::ContractCreate { address, code } => {
                    self.state.set_code(*address, code.clone())?;
                }
                StateChange::NonceIncrement { address } => {
                    let mut account = self
                        .state
                        .get_account(*address)?
                        .unwrap_or_else(|| AccountState::new_eoa(U256::zero(), 0));
                    account.nonce = account.nonce.saturating_add(1);
                    self.state.set_account(*address, account)?;
                }
            }
        }
        Ok(())
    }

    /// The full transaction pipeline: admission, execution, application.
    #[allow(clippy::too_many_lines)]
    fn process_transaction(
        &self,
        tx: &SignedTransaction,
        block: &BlockContext,
    ) -> Result<ExecutionResult, VmError> {
        if tx.gas_limit > self.config.block_gas_limit {
            return Err(VmError::GasLimitExceeded {
                limit: tx.gas_limit,
                max: self.config.block_gas_limit,
            });
        }

        let intrinsic = intrinsic_gas(tx.data.as_slice(), tx.is_contract_creation());
        if tx.gas_limit < intrinsic {
            return Err(VmError::IntrinsicGasTooLow {
                required: intrinsic,
                limit: tx.gas_limit,
            });
        }

        if tx.is_contract_creation() && tx.data.len() > self.config.vm_config.max_init_code_size {
            return Err(VmError::InitCodeSizeExceeded {
                size: tx.data.len(),
                max: self.config.vm_config.max_init_code_size,
            });
        }

        let sender = self.state.get_account(tx.from)?.unwrap_or_default();
        if tx.nonce != sender.nonce {
            return Err(VmError::NonceMismatch {
                tx_nonce: tx.nonce,
                account_nonce: sender.nonce,
            });
        }

        let fee_ceiling = tx.gas_price.saturating_mul(U256::from(tx.gas_limit));
        let required = tx.value.saturating_add(fee_ceiling);
        if sender.balance < required {
            return Err(VmError::InsufficientBalance {
                required,
                available: sender.balance,
            });
        }

        // Intrinsic gas is charged before the first instruction; the frame
        // runs on what is left.
        let exec_limit = tx.gas_limit - intrinsic;

        // The nonce advances for every included transaction, even a
        // failing one. Value transfer and the frame journal land only on
        // success.
        let mut to_apply = vec![StateChange::NonceIncrement { address: tx.from }];

        let mut result = if let Some(to) = tx.to {
            let result = match run_precompile(to, tx.data.as_slice(), exec_limit) {
                Some(outcome) => precompile_result(outcome, exec_limit),
                None => {
                    let code = self.state.get_code(to)?;
                    let context = ExecutionContext {
                        origin: tx.sender(),
                        caller: tx.sender(),
                        address: to,
                        value: tx.value,
                        data: tx.data.clone(),
                        gas_limit: exec_limit,
                        gas_price: tx.gas_price,
                        block: block.clone(),
                        depth: 0,
                        is_static: false,
                    };
                    self.run_frame(context, code)?
                }
            };

            if result.success {
                if !tx.value.is_zero() {
                    to_apply.push(StateChange::BalanceTransfer {
                        from: tx.from,
                        to,
                        amount: tx.value,
                    });
                }
                to_apply.extend(result.state_changes.iter().cloned());
            }
            result
        } else {
            let target = compute_contract_address(tx.from, tx.nonce);
            let context = ExecutionContext {
                origin: tx.sender(),
                caller: tx.sender(),
                address: target,
                value: tx.value,
                // Init code is not calldata: creation frames see empty input.
                data: Bytes::new(),
                gas_limit: exec_limit,
                gas_price: tx.gas_price,
                block: block.clone(),
                depth: 0,
                is_static: false,
            };
            let result = self.run_frame(context, tx.data.clone())?;

            if result.success {
                // The returned runtime code is what gets deployed, subject
                // to the size cap and the reserved 0xEF prefix.
                let deployed = result.output.clone();
                if deployed.len() > self.config.vm_config.max_code_size {
                    return Err(VmError::CodeSizeExceeded {
                        size: deployed.len(),
                        max: self.config.vm_config.max_code_size,
                    });
                }
                if deployed.as_slice().first() == Some(&0xEF) {
                    return Err(VmError::InvalidCodePrefix);
                }

                if !tx.value.is_zero() {
                    to_apply.push(StateChange::BalanceTransfer {
                        from: tx.from,
                        to: target,
                        amount: tx.value,
                    });
                }
                to_apply.extend(result.state_changes.iter().cloned());
                to_apply.push(StateChange::ContractCreate {
                    address: target,
                    code: deployed,
                });
            }
            result
        };

        self.apply_journal(&to_apply)?;
        if result.success {
            result.state_changes = to_apply;
        }
        result.gas_used = result.gas_used.saturating_add(intrinsic);
        Ok(result)
    }

    /// Internal transaction execution with statistics and logging.
    #[instrument(
        skip(self, tx, block),
        fields(correlation_id = %Uuid::new_v4(), tx_hash = ?tx.hash())
    )]
    async fn execute_transaction_internal(
        &self,
        tx: &SignedTransaction,
        block: &BlockContext,
    ) -> Result<ExecutionResult, VmError> {
        info!(
            from = ?tx.from,
            to = ?tx.to,
            gas_limit = tx.gas_limit,
            "processing transaction"
        );

        let start = Instant::now();
        let outcome = self.process_transaction(tx, block);
        let elapsed_us = start.elapsed().as_micros() as u64;

        self.note_transaction(&outcome, elapsed_us).await;
        metrics::record_transaction();

        match &outcome {
            Ok(result) => debug!(
                success = result.success,
                gas_used = result.gas_used,
                logs = result.logs.len(),
                "transaction processed"
            ),
            Err(e) if e.is_rejection() => warn!(error = %e, "transaction rejected"),
            Err(e) => error!(error = %e, "transaction failed"),
        }

        outcome
    }

    /// Updates statistics after a transaction attempt.
    async fn note_transaction(&self, outcome: &Result<ExecutionResult, VmError>, elapsed_us: u64) {
        let mut stats = self.stats.write().await;

        if let Err(e) = outcome {
            if e.is_rejection() {
                stats.rejected_requests += 1;
                return;
            }
        }

        stats.transactions_executed += 1;
        match outcome {
            Ok(result) => {
                if result.success {
                    stats.successful_executions += 1;
                } else {
                    stats.failed_executions += 1;
                }
                stats.total_gas_used += result.gas_used;
            }
            Err(_) => stats.failed_executions += 1,
        }

        let total = stats.transactions_executed;
        stats.avg_execution_time_us =
            (stats.avg_execution_time_us * (total - 1) + elapsed_us) / total;
    }
}

// =============================================================================
// SETTLEMENT HELPERS
// =============================================================================

/// Folds the capped refund into the reported gas total.
///
/// Refunds accrue uncapped during execution; at settlement the credited
/// amount is limited to half of the gas actually used.
fn settle_refund(result: &mut ExecutionResult) {
    if result.gas_refund == 0 {
        return;
    }
    let cap = result.gas_used * limits::GAS_REFUND_CAP_PERCENT / 100;
    let credited = result.gas_refund.min(cap);
    result.gas_used -= credited;
    result.gas_refund = credited;
}

/// Converts a precompile outcome into an execution result.
fn precompile_result(
    outcome: Result<PrecompileOutput, PrecompileError>,
    gas_limit: u64,
) -> ExecutionResult {
    let result = match outcome {
        Ok(out) => ExecutionResult::success(out.output, out.gas_used),
        Err(PrecompileError::OutOfGas) => {
            ExecutionResult::exceptional(ExceptionalHaltReason::InsufficientGas, gas_limit)
        }
        Err(PrecompileError::InvalidInput(msg)) => {
            error!(error = %msg, "precompile rejected input");
            ExecutionResult::exceptional(ExceptionalHaltReason::InternalFault, gas_limit)
        }
    };
    record_outcome(&result);
    result
}

/// Maps a failed result onto the error surfaced by read-only entry points.
fn failure_to_error(result: &ExecutionResult) -> VmError {
    if let Some(reason) = result.halt_reason {
        VmError::ExecutionFailed(reason.to_string())
    } else {
        let reason = result
            .revert_reason
            .clone()
            .map_or_else(|| "reverted".to_string(), |r| format!("reverted: {r}"));
        VmError::ExecutionFailed(reason)
    }
}

/// Feeds one result into the execution metrics.
fn record_outcome(result: &ExecutionResult) {
    let outcome = if result.success {
        "success"
    } else if result.is_revert() {
        "revert"
    } else {
        "halt"
    };
    metrics::record_execution(outcome, result.gas_used);
    if let Some(reason) = result.halt_reason {
        metrics::record_halt(halt_label(reason));
    }
}

/// Stable metric label for a halt reason.
fn halt_label(reason: ExceptionalHaltReason) -> &'static str {
    match reason {
        ExceptionalHaltReason::InsufficientGas => "insufficient_gas",
        ExceptionalHaltReason::StackUnderflow => "stack_underflow",
        ExceptionalHaltReason::StackOverflow => "stack_overflow",
        ExceptionalHaltReason::InvalidJumpDestination(_) => "invalid_jump",
        ExceptionalHaltReason::InvalidOpcode(_) => "invalid_opcode",
        ExceptionalHaltReason::OutOfBoundsMemory { .. } => "out_of_bounds_memory",
        ExceptionalHaltReason::IllegalStateChange => "illegal_state_change",
        ExceptionalHaltReason::InternalFault => "internal_fault",
    }
}

/// Creates a default service with the in-memory state adapter (for testing).
#[must_use]
pub fn create_test_service() -> ExecutionService<InMemoryState> {
    ExecutionService::new(InMemoryState::new(), ServiceConfig::default())
}

// =============================================================================
// ContractExecutionApi Implementation
// =============================================================================

#[async_trait]
impl<S: StateAccess> ContractExecutionApi for ExecutionService<S> {
    async fn execute(
        &self,
        context: ExecutionContext,
        code: &[u8],
    ) -> Result<ExecutionResult, VmError> {
        let apply = !context.is_static;
        let result = self.run_frame(context, Bytes::from_slice(code))?;
        if apply && result.success {
            self.apply_journal(&result.state_changes)?;
        }
        Ok(result)
    }

    async fn execute_transaction(
        &self,
        tx: &SignedTransaction,
        block: &BlockContext,
    ) -> Result<ExecutionResult, VmError> {
        self.execute_transaction_internal(tx, block).await
    }

    async fn estimate_gas(&self, context: ExecutionContext, code: &[u8]) -> Result<u64, VmError> {
        // Run with the full budget to find actual usage, discarding all
        // effects.
        let mut ctx = context;
        ctx.gas_limit = self.config.vm_config.max_gas_limit();

        let result = self.run_frame(ctx, Bytes::from_slice(code))?;
        if !result.success {
            return Err(failure_to_error(&result));
        }

        // 10% headroom over observed usage.
        Ok(result.gas_used + result.gas_used / 10)
    }

    async fn call(&self, context: ExecutionContext, code: &[u8]) -> Result<Bytes, VmError> {
        let ctx = context.into_static();
        let result = self.run_frame(ctx, Bytes::from_slice(code))?;

        if result.success {
            Ok(result.output)
        } else {
            Err(failure_to_error(&result))
        }
    }
}

// =============================================================================
// BatchExecutor Implementation
// =============================================================================

#[async_trait]
impl<S: StateAccess> BatchExecutor for ExecutionService<S> {
    async fn execute_batch(
        &self,
        transactions: &[SignedTransaction],
        block: &BlockContext,
    ) -> Result<Vec<TransactionReceipt>, VmError> {
        info!(transactions = transactions.len(), "executing batch");
        metrics::record_batch_size(transactions.len());

        let mut receipts = Vec::with_capacity(transactions.len());
        let mut cumulative_gas: u64 = 0;

        for tx in transactions {
            let receipt = match self.execute_transaction_internal(tx, block).await {
                Ok(result) => {
                    cumulative_gas = cumulative_gas.saturating_add(result.gas_used);
                    let contract_address = (tx.is_contract_creation() && result.success)
                        .then(|| compute_contract_address(tx.from, tx.nonce));
                    TransactionReceipt {
                        tx_hash: tx.hash(),
                        success: result.success,
                        gas_used: result.gas_used,
                        cumulative_gas_used: cumulative_gas,
                        output: result.output,
                        logs: result.logs,
                        contract_address,
                    }
                }
                // A rejected transaction still occupies its slot in the
                // block: it burns its gas limit and the batch carries on.
                Err(e) if e.is_rejection() => {
                    warn!(tx_hash = ?tx.hash(), error = %e, "transaction rejected in batch");
                    cumulative_gas = cumulative_gas.saturating_add(tx.gas_limit);
                    TransactionReceipt {
                        tx_hash: tx.hash(),
                        success: false,
                        gas_used: tx.gas_limit,
                        cumulative_gas_used: cumulative_gas,
                        output: Bytes::new(),
                        logs: Vec::new(),
                        contract_address: None,
                    }
                }
                // Infrastructure failures abort the batch; retrying the
                // same block later is the caller's call.
                Err(e) => return Err(e),
            };
            receipts.push(receipt);
        }

        Ok(receipts)
    }
}

// =============================================================================
// TESTS
// =============================================================================
