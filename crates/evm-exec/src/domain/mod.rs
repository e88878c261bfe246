//! # Domain Layer (Inner Hexagon)
//!
//! The execution model itself: transactions and receipts, machine words,
//! change journals, and the protocol rules that constrain them. Everything
//! here is synchronous and free of I/O, so the whole layer is
//! unit-testable without a harness.
//!
//! Dependency direction is one-way: ports, adapters, and the machine
//! import these types, never the reverse.

pub mod entities;
pub mod invariants;
pub mod services;
pub mod value_objects;

pub use entities::*;
pub use invariants::*;
pub use services::*;
pub use value_objects::*;
