//! # Ports Layer (Middle Hexagon)
//!
//! Trait definitions between the execution engine and the outside world.
//!
//! - **Driving Ports (Inbound)**: `ContractExecutionApi`, `BatchExecutor`
//! - **Driven Ports (Outbound)**: `StateAccess`
//! - No concrete implementations in this module

pub mod inbound;
pub mod outbound;

pub use inbound::*;
pub use outbound::*;
