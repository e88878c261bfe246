//! Integration flows: whole programs through the interpreter and whole
//! transactions through the execution service.

pub mod fork_versions;
pub mod halt_semantics;
pub mod machine_flows;
pub mod transaction_flows;
