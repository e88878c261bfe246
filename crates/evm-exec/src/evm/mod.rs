//! # EVM Execution Engine
//!
//! The virtual machine itself: machine state, the instruction table and
//! the driver that connects them.
//!
//! ## Components
//!
//! - `code.rs` - analyzed bytecode and jump-destination validation
//! - `stack.rs` - operand stack
//! - `memory.rs` - byte-addressed scratch memory
//! - `gas.rs` - cost constants and the pluggable calculator
//! - `frame.rs` - per-call machine state and journal
//! - `operation.rs` - the per-instruction capability record
//! - `operations/` - instruction pricing, guards and bodies
//! - `registry.rs` - per-version opcode table
//! - `interpreter.rs` - the driver loop
//! - `precompiles/` - precompiled contracts

pub mod code;
pub mod frame;
pub mod gas;
pub mod interpreter;
pub mod memory;
pub mod operation;
pub mod operations;
pub mod precompiles;
pub mod registry;
pub mod stack;

pub use code::*;
pub use frame::*;
pub use gas::*;
pub use interpreter::*;
pub use memory::*;
pub use operation::*;
pub use registry::*;
pub use stack::*;
