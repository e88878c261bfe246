//! Protocol-version behavior observed end to end: instructions arriving
//! with a fork are unknown bytes before it, and repriced instructions
//! charge the active calculator's schedule.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use evm_exec::prelude::*;

    // =========================================================================
    // FIXTURES
    // =========================================================================

    fn run_at(version: EvmVersion, code: &[u8]) -> ExecutionResult {
        run_at_in(
            version,
            code,
            ExecutionContext {
                gas_limit: 100_000,
                ..ExecutionContext::default()
            },
        )
    }

    fn run_at_in(version: EvmVersion, code: &[u8], context: ExecutionContext) -> ExecutionResult {
        let config = VmConfig {
            evm_version: version,
            ..VmConfig::default()
        };
        let interpreter = Interpreter::new(config, Arc::new(InMemoryState::new()));
        interpreter.execute(context, Bytes::from_slice(code))
    }

    fn returned_word(result: &ExecutionResult) -> U256 {
        assert!(
            result.success,
            "expected success, halted with {:?}",
            result.halt_reason
        );
        U256::from_big_endian(result.output.as_slice())
    }

    // =========================================================================
    // INSTRUCTION AVAILABILITY
    // =========================================================================

    #[test]
    fn test_shift_instructions_arrive_with_istanbul() {
        // 1 << 4 via SHL, returned as a word.
        let code = [
            0x60, 0x01, // PUSH1 1
            0x60, 0x04, // PUSH1 4
            0x1B, // SHL
            0x60, 0x00, 0x52, // MSTORE
            0x60, 0x20, 0x60, 0x00, 0xF3, // RETURN
        ];

        let istanbul = run_at(EvmVersion::Istanbul, &code);
        assert_eq!(returned_word(&istanbul), U256::from(16));

        let shanghai = run_at(EvmVersion::Shanghai, &code);
        assert_eq!(returned_word(&shanghai), U256::from(16));

        let frontier = run_at(EvmVersion::Frontier, &code);
        assert_eq!(
            frontier.halt_reason,
            Some(ExceptionalHaltReason::InvalidOpcode(0x1B))
        );
        assert_eq!(frontier.gas_used, 100_000);
    }

    #[test]
    fn test_push0_is_shanghai_only() {
        let code = [0x5F, 0x00]; // PUSH0; STOP

        let shanghai = run_at(EvmVersion::Shanghai, &code);
        assert!(shanghai.success);
        assert_eq!(shanghai.gas_used, 2);

        for version in [EvmVersion::Frontier, EvmVersion::Istanbul] {
            let result = run_at(version, &code);
            assert_eq!(
                result.halt_reason,
                Some(ExceptionalHaltReason::InvalidOpcode(0x5F)),
                "{version:?} must not know PUSH0"
            );
        }
    }

    #[test]
    fn test_chainid_reports_the_block_chain() {
        let code = [
            0x46, // CHAINID
            0x60, 0x00, 0x52, // MSTORE
            0x60, 0x20, 0x60, 0x00, 0xF3, // RETURN
        ];
        let context = || ExecutionContext {
            gas_limit: 100_000,
            block: BlockContext {
                chain_id: 1337,
                ..BlockContext::default()
            },
            ..ExecutionContext::default()
        };

        let istanbul = run_at_in(EvmVersion::Istanbul, &code, context());
        assert_eq!(returned_word(&istanbul), U256::from(1337));

        let frontier = run_at_in(EvmVersion::Frontier, &code, context());
        assert_eq!(
            frontier.halt_reason,
            Some(ExceptionalHaltReason::InvalidOpcode(0x46))
        );
    }

    // =========================================================================
    // REPRICING
    // =========================================================================

    #[test]
    fn test_storage_reads_repriced_at_istanbul() {
        // PUSH1 0; SLOAD; POP; STOP
        let code = [0x60, 0x00, 0x54, 0x50, 0x00];

        let frontier = run_at(EvmVersion::Frontier, &code);
        assert_eq!(frontier.gas_used, 3 + 50 + 2);

        let istanbul = run_at(EvmVersion::Istanbul, &code);
        assert_eq!(istanbul.gas_used, 3 + 800 + 2);
    }

    #[test]
    fn test_exponent_bytes_repriced_at_istanbul() {
        // 2 ** 256: the exponent occupies two bytes.
        let code = [
            0x61, 0x01, 0x00, // PUSH2 256
            0x60, 0x02, // PUSH1 2
            0x0A, // EXP
            0x50, // POP
            0x00, // STOP
        ];

        let frontier = run_at(EvmVersion::Frontier, &code);
        assert_eq!(frontier.gas_used, 3 + 3 + (10 + 10 * 2) + 2);

        let istanbul = run_at(EvmVersion::Istanbul, &code);
        assert_eq!(istanbul.gas_used, 3 + 3 + (10 + 50 * 2) + 2);
    }

    // =========================================================================
    // CATALOG SHAPE
    // =========================================================================

    #[test]
    fn test_instruction_catalog_grows_monotonically() {
        fn catalog_size(version: EvmVersion) -> usize {
            let registry = OperationRegistry::new(version);
            (0u8..=255).filter(|&opcode| registry.contains(opcode)).count()
        }

        let frontier = catalog_size(EvmVersion::Frontier);
        let istanbul = catalog_size(EvmVersion::Istanbul);
        let shanghai = catalog_size(EvmVersion::Shanghai);

        // Istanbul adds SHL, SHR, SAR, CHAINID; Shanghai adds PUSH0.
        assert_eq!(istanbul, frontier + 4);
        assert_eq!(shanghai, istanbul + 1);
    }
}
