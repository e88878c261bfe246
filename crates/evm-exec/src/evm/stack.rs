//! # Operand Stack
//!
//! Frame-local LIFO of 256-bit words. The protocol bounds its depth at
//! 1024 slots; the bound arrives through
//! [`VmConfig`](crate::domain::entities::VmConfig) so tests can shrink it.
//!
//! The dispatch loop pre-checks arity against each operation's declared
//! pops and pushes, but every mutator re-validates its own bounds and
//! returns a typed error: a mis-declared operation must surface as a
//! fault, never as slot corruption.

use crate::domain::invariants::limits;
use crate::domain::value_objects::U256;
use crate::errors::StackError;

/// Frame-local operand stack.
#[derive(Clone, Debug)]
pub struct Stack {
    slots: Vec<U256>,
    limit: usize,
}

impl Default for Stack {
    fn default() -> Self {
        Self::new()
    }
}

impl Stack {
    /// An empty stack with the protocol depth bound.
    #[must_use]
    pub fn new() -> Self {
        Self::with_limit(limits::MAX_STACK_DEPTH)
    }

    /// An empty stack with a custom depth bound.
    #[must_use]
    pub fn with_limit(limit: usize) -> Self {
        Self {
            // Most frames stay shallow; one page of slots avoids regrowth.
            slots: Vec::with_capacity(64),
            limit,
        }
    }

    /// Current depth.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// True when no slots are occupied.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Configured depth bound.
    #[must_use]
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Pushes `value`.
    ///
    /// # Errors
    ///
    /// `Overflow` when the stack is already at its depth bound.
    pub fn push(&mut self, value: U256) -> Result<(), StackError> {
        if self.slots.len() >= self.limit {
            return Err(StackError::Overflow);
        }
        self.slots.push(value);
        Ok(())
    }

    /// Removes and returns the top word.
    ///
    /// # Errors
    ///
    /// `Underflow` when the stack is empty.
    pub fn pop(&mut self) -> Result<U256, StackError> {
        self.slots.pop().ok_or(StackError::Underflow)
    }

    /// The top word, left in place.
    ///
    /// # Errors
    ///
    /// `Underflow` when the stack is empty.
    pub fn peek(&self) -> Result<U256, StackError> {
        self.peek_at(0)
    }

    /// The word `depth` slots below the top (0 is the top itself).
    ///
    /// # Errors
    ///
    /// `Underflow` when fewer than `depth + 1` slots are occupied.
    pub fn peek_at(&self, depth: usize) -> Result<U256, StackError> {
        self.slots
            .iter()
            .rev()
            .nth(depth)
            .copied()
            .ok_or(StackError::Underflow)
    }

    /// Exchanges the top word with the one `n` slots below it, matching
    /// the opcode numbering: SWAP1 exchanges top and second.
    ///
    /// # Errors
    ///
    /// `Underflow` when `n` is zero or reaches below the bottom.
    pub fn swap(&mut self, n: usize) -> Result<(), StackError> {
        if n == 0 {
            return Err(StackError::Underflow);
        }
        let top = self.slots.len().checked_sub(1).ok_or(StackError::Underflow)?;
        let other = top.checked_sub(n).ok_or(StackError::Underflow)?;
        self.slots.swap(top, other);
        Ok(())
    }

    /// Copies the word `n` slots below the top onto the top, matching
    /// the opcode numbering: DUP1 copies the top itself (`n` = 0).
    ///
    /// # Errors
    ///
    /// `Underflow` when the source slot does not exist, `Overflow` when
    /// the stack is full.
    pub fn dup(&mut self, n: usize) -> Result<(), StackError> {
        let value = self.peek_at(n)?;
        self.push(value)
    }
}

// =============================================================================
// TESTS
// =============================================================================
