//! Exceptional halt behavior observed from outside the interpreter:
//! every halt burns the full budget and discards all effects, while a
//! revert refunds what was never spent and keeps its payload.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use evm_exec::prelude::*;

    // =========================================================================
    // FIXTURES
    // =========================================================================

    const GAS: u64 = 50_000;

    fn run(code: &[u8]) -> ExecutionResult {
        run_with_gas(code, GAS)
    }

    fn run_with_gas(code: &[u8], gas_limit: u64) -> ExecutionResult {
        run_in(
            code,
            ExecutionContext {
                gas_limit,
                ..ExecutionContext::default()
            },
        )
    }

    fn run_in(code: &[u8], context: ExecutionContext) -> ExecutionResult {
        let interpreter = Interpreter::new(VmConfig::default(), Arc::new(InMemoryState::new()));
        interpreter.execute(context, Bytes::from_slice(code))
    }

    // =========================================================================
    // BURN-ALL SEMANTICS
    // =========================================================================

    #[test]
    fn test_every_halt_burns_the_entire_budget() {
        let cases: Vec<(Vec<u8>, ExceptionalHaltReason)> = vec![
            // ADD with an empty stack.
            (vec![0x01], ExceptionalHaltReason::StackUnderflow),
            // Opcode not assigned in any supported version.
            (vec![0x0C], ExceptionalHaltReason::InvalidOpcode(0x0C)),
            // The designated invalid instruction.
            (vec![0xFE], ExceptionalHaltReason::InvalidOpcode(0xFE)),
            // Jump into a PUSH immediate (data, not an instruction).
            (
                vec![0x60, 0x01, 0x56],
                ExceptionalHaltReason::InvalidJumpDestination(1),
            ),
            // Jump onto the JUMP itself (not a JUMPDEST).
            (
                vec![0x60, 0x02, 0x56],
                ExceptionalHaltReason::InvalidJumpDestination(2),
            ),
        ];

        for (code, expected) in cases {
            let result = run(&code);

            assert!(!result.success, "{expected:?} must fail");
            assert_eq!(result.halt_reason, Some(expected));
            assert_eq!(result.gas_used, GAS, "{expected:?} must burn everything");
            assert!(result.output.is_empty());
            assert!(result.state_changes.is_empty());
            assert!(result.logs.is_empty());
        }
    }

    #[test]
    fn test_stack_overflow_at_the_depth_bound() {
        // One push past the 1024-slot bound.
        let mut code = Vec::with_capacity(2 * 1025);
        for _ in 0..1025 {
            code.extend_from_slice(&[0x60, 0x01]);
        }

        let result = run(&code);

        assert_eq!(
            result.halt_reason,
            Some(ExceptionalHaltReason::StackOverflow)
        );
        assert_eq!(result.gas_used, GAS);
    }

    #[test]
    fn test_memory_write_past_the_ceiling() {
        // MSTORE at an offset far beyond the configured memory bound.
        let mut code = vec![0x60, 0x01, 0x7F];
        code.extend_from_slice(&[0xFF; 32]);
        code.push(0x52);

        let result = run(&code);

        assert!(matches!(
            result.halt_reason,
            Some(ExceptionalHaltReason::OutOfBoundsMemory { .. })
        ));
        assert_eq!(result.gas_used, GAS);
    }

    // =========================================================================
    // HALT ORDERING
    // =========================================================================

    #[test]
    fn test_arity_is_checked_before_pricing() {
        // ADD with one remaining gas: the missing operands are reported,
        // not the unaffordable price.
        let result = run_with_gas(&[0x01], 1);

        assert_eq!(
            result.halt_reason,
            Some(ExceptionalHaltReason::StackUnderflow)
        );
        assert_eq!(result.gas_used, 1);
    }

    #[test]
    fn test_out_of_gas_reports_insufficient_gas() {
        let result = run_with_gas(&[0x60, 0x01], 2);

        assert_eq!(
            result.halt_reason,
            Some(ExceptionalHaltReason::InsufficientGas)
        );
        assert_eq!(result.gas_used, 2);
    }

    // =========================================================================
    // STATIC CONTEXT
    // =========================================================================

    #[test]
    fn test_static_frame_rejects_mutators() {
        let static_context = || ExecutionContext {
            gas_limit: GAS,
            is_static: true,
            ..ExecutionContext::default()
        };

        // SSTORE
        let store = run_in(&[0x60, 0x07, 0x60, 0x01, 0x55], static_context());
        assert_eq!(
            store.halt_reason,
            Some(ExceptionalHaltReason::IllegalStateChange)
        );
        assert_eq!(store.gas_used, GAS);

        // LOG0
        let log = run_in(&[0x60, 0x00, 0x60, 0x00, 0xA0], static_context());
        assert_eq!(
            log.halt_reason,
            Some(ExceptionalHaltReason::IllegalStateChange)
        );
        assert_eq!(log.gas_used, GAS);
    }

    // =========================================================================
    // REVERT VS HALT
    // =========================================================================

    #[test]
    fn test_revert_keeps_unspent_gas() {
        // REVERT(0, 0): two pushes and a free revert.
        let reverted = run(&[0x60, 0x00, 0x60, 0x00, 0xFD]);
        assert!(!reverted.success);
        assert!(reverted.is_revert());
        assert!(reverted.halt_reason.is_none());
        assert_eq!(reverted.gas_used, 6);

        // INVALID burns instead.
        let halted = run(&[0xFE]);
        assert_eq!(halted.gas_used, GAS);
    }

    #[test]
    fn test_revert_reason_travels_to_the_result() {
        // Build the solidity Error(string) payload for "hello" in memory:
        // selector, string offset, length, then the string word.
        let selector =
            hex::decode("08c379a000000000000000000000000000000000000000000000000000000000")
                .unwrap();
        let mut message = [0u8; 32];
        message[..5].copy_from_slice(b"hello");

        let mut code = vec![0x7F];
        code.extend_from_slice(&selector);
        code.extend_from_slice(&[0x60, 0x00, 0x52]); // MSTORE @ 0
        code.extend_from_slice(&[0x60, 0x20, 0x60, 0x04, 0x52]); // offset @ 4
        code.extend_from_slice(&[0x60, 0x05, 0x60, 0x24, 0x52]); // length @ 36
        code.push(0x7F);
        code.extend_from_slice(&message);
        code.extend_from_slice(&[0x60, 0x44, 0x52]); // string @ 68
        code.extend_from_slice(&[0x60, 0x64, 0x60, 0x00, 0xFD]); // REVERT(0, 100)

        let result = run(&code);

        assert!(!result.success);
        assert!(result.is_revert());
        assert_eq!(result.revert_reason.as_deref(), Some("hello"));
        assert_eq!(result.output.len(), 100);
        assert_eq!(&result.output.as_slice()[..4], &selector[..4]);
        assert!(result.gas_used < GAS);
    }

    // =========================================================================
    // EFFECT DISCARD
    // =========================================================================

    #[test]
    fn test_journal_and_logs_discarded_on_halt() {
        // SSTORE(1, 7); LOG1(0x77); INVALID.
        let code = [
            0x60, 0x07, 0x60, 0x01, 0x55, // SSTORE
            0x60, 0x77, 0x60, 0x00, 0x60, 0x00, 0xA1, // LOG1
            0xFE, // INVALID
        ];

        let result = run(&code);

        assert!(!result.success);
        assert!(result.state_changes.is_empty());
        assert!(result.logs.is_empty());
        assert_eq!(result.gas_used, GAS);
    }

    #[test]
    fn test_journal_and_logs_survive_completion() {
        // Same effects, but the frame ends with STOP.
        let code = [
            0x60, 0x07, 0x60, 0x01, 0x55, // SSTORE
            0x60, 0x77, 0x60, 0x00, 0x60, 0x00, 0xA1, // LOG1
            0x00, // STOP
        ];

        let result = run(&code);

        assert!(result.success);
        assert!(matches!(
            result.state_changes.as_slice(),
            [StateChange::StorageWrite { key, value, .. }]
                if *key == StorageKey::from_word(U256::one())
                    && *value == StorageValue::from_word(U256::from(7))
        ));
        assert_eq!(result.logs.len(), 1);
        assert_eq!(result.logs[0].topics, vec![Hash::from_word(U256::from(0x77))]);
        // Two pushes and a fresh-slot store (20_006), then the log
        // sequence (759): base and one topic at 375 each.
        assert_eq!(result.gas_used, 20_765);
    }
}
