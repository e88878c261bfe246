//! # EVM Execution Core Test Suite
//!
//! Unified test crate containing:
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/          # Whole-pipeline flows
//!     ├── machine_flows.rs      # Multi-family bytecode programs
//!     ├── halt_semantics.rs     # Exceptional halts and reverts
//!     ├── fork_versions.rs      # Protocol version gating and repricing
//!     └── transaction_flows.rs  # Service-level transaction pipeline
//!
//! tests/benches/
//! └── interpreter_benchmarks.rs # Criterion throughput benchmarks
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p evm-exec-tests
//!
//! # By category
//! cargo test -p evm-exec-tests integration::machine_flows
//! cargo test -p evm-exec-tests integration::transaction_flows
//!
//! # Benchmarks
//! cargo bench -p evm-exec-tests
//! ```

#![allow(unused_variables)]
#![allow(unused_imports)]
#![allow(dead_code)]

pub mod integration;
