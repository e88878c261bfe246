//! # Execution Metrics
//!
//! Prometheus metrics for monitoring contract execution.
//!
//! ## Usage
//!
//! Enable with the `metrics` feature:
//! ```toml
//! evm-exec = { path = "...", features = ["metrics"] }
//! ```
//!
//! ## Metrics Exported
//!
//! - `evm_executions_total` - Counter of executions (by outcome)
//! - `evm_halts_total` - Counter of exceptional halts (by reason)
//! - `evm_gas_used_total` - Counter of gas consumed
//! - `evm_transactions_total` - Counter of transactions executed
//! - `evm_batch_transactions` - Gauge of the last batch's size

#[cfg(feature = "metrics")]
use lazy_static::lazy_static;

#[cfg(feature = "metrics")]
use prometheus::{
    register_counter_vec, register_gauge, register_int_counter, CounterVec, Gauge, IntCounter,
};

#[cfg(feature = "metrics")]
lazy_static! {
    /// Executions by outcome (success, revert, halt)
    pub static ref EXECUTIONS: CounterVec = register_counter_vec!(
        "evm_executions_total",
        "Total number of contract executions",
        &["outcome"]
    )
    .expect("Failed to create EXECUTIONS metric");

    /// Exceptional halts by reason
    pub static ref HALTS: CounterVec = register_counter_vec!(
        "evm_halts_total",
        "Total number of exceptional halts",
        &["reason"]
    )
    .expect("Failed to create HALTS metric");

    /// Total gas consumed across executions
    pub static ref GAS_USED: IntCounter = register_int_counter!(
        "evm_gas_used_total",
        "Total gas consumed by executions"
    )
    .expect("Failed to create GAS_USED metric");

    /// Total transactions executed
    pub static ref TRANSACTIONS: IntCounter = register_int_counter!(
        "evm_transactions_total",
        "Total number of transactions executed"
    )
    .expect("Failed to create TRANSACTIONS metric");

    /// Size of the most recent batch
    pub static ref BATCH_TRANSACTIONS: Gauge = register_gauge!(
        "evm_batch_transactions",
        "Number of transactions in the most recent batch"
    )
    .expect("Failed to create BATCH_TRANSACTIONS metric");
}

// =============================================================================
// METRIC RECORDING FUNCTIONS
// =============================================================================

/// Record one execution with its outcome label and gas charge.
#[cfg(feature = "metrics")]
pub fn record_execution(outcome: &str, gas_used: u64) {
    EXECUTIONS.with_label_values(&[outcome]).inc();
    GAS_USED.inc_by(gas_used);
}

/// Record an exceptional halt with its reason label.
#[cfg(feature = "metrics")]
pub fn record_halt(reason: &str) {
    HALTS.with_label_values(&[reason]).inc();
}

/// Record a transaction execution.
#[cfg(feature = "metrics")]
pub fn record_transaction() {
    TRANSACTIONS.inc();
}

/// Record the size of an executed batch.
#[cfg(feature = "metrics")]
pub fn record_batch_size(size: usize) {
    BATCH_TRANSACTIONS.set(size as f64);
}

// =============================================================================
// NO-OP IMPLEMENTATIONS (when metrics feature disabled)
// =============================================================================

#[cfg(not(feature = "metrics"))]
pub fn record_execution(_outcome: &str, _gas_used: u64) {}

#[cfg(not(feature = "metrics"))]
pub fn record_halt(_reason: &str) {}

#[cfg(not(feature = "metrics"))]
pub fn record_transaction() {}

#[cfg(not(feature = "metrics"))]
pub fn record_batch_size(_size: usize) {}
