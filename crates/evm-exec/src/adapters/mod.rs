//! # Adapters Layer (Outer Hexagon)
//!
//! Concrete implementations of the outbound ports. Only the in-memory
//! state adapter lives here; a node supplies its own over real storage.

pub mod state_adapter;

pub use state_adapter::*;
