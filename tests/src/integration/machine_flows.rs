//! Whole programs through the interpreter: loops, memory traffic,
//! calldata, hashing, and control flow crossing every instruction
//! family in one frame.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use evm_exec::prelude::*;
    use sha3::{Digest, Keccak256};

    // =========================================================================
    // FIXTURES
    // =========================================================================

    const GAS: u64 = 1_000_000;

    fn interpreter() -> Interpreter<InMemoryState> {
        Interpreter::new(VmConfig::default(), Arc::new(InMemoryState::new()))
    }

    fn run(code: &[u8]) -> ExecutionResult {
        run_in(
            code,
            ExecutionContext {
                gas_limit: GAS,
                ..ExecutionContext::default()
            },
        )
    }

    fn run_in(code: &[u8], context: ExecutionContext) -> ExecutionResult {
        interpreter().execute(context, Bytes::from_slice(code))
    }

    /// Unwraps a successful run into its single 32-byte output word.
    fn returned_word(result: &ExecutionResult) -> U256 {
        assert!(
            result.success,
            "expected success, halted with {:?}",
            result.halt_reason
        );
        assert_eq!(result.output.len(), 32, "expected one output word");
        U256::from_big_endian(result.output.as_slice())
    }

    // =========================================================================
    // CONTROL FLOW
    // =========================================================================

    #[test]
    fn test_countdown_loop_runs_to_completion() {
        // PUSH2 100; then loop: JUMPDEST, PUSH1 1, SWAP1, SUB, DUP1,
        // PUSH1 3, JUMPI. Decrements to zero, then falls through to STOP.
        let code = [
            0x61, 0x00, 0x64, // PUSH2 100
            0x5B, // JUMPDEST (pc 3)
            0x60, 0x01, // PUSH1 1
            0x90, // SWAP1
            0x03, // SUB
            0x80, // DUP1
            0x60, 0x03, // PUSH1 3
            0x57, // JUMPI
            0x00, // STOP
        ];

        let result = run(&code);

        assert!(result.success);
        assert!(result.halt_reason.is_none());
        // Setup PUSH2 (3) plus 100 iterations of 26 gas each.
        assert_eq!(result.gas_used, 2_603);
    }

    #[test]
    fn test_conditional_branch_selects_exit() {
        // JUMPI either falls through to an empty RETURN or jumps to a
        // second exit that returns the word 1.
        fn branch(condition: u8) -> ExecutionResult {
            let code = [
                0x60, condition, // PUSH1 condition
                0x60, 0x0A, // PUSH1 10 (taken exit)
                0x57, // JUMPI
                0x60, 0x00, // PUSH1 0
                0x60, 0x00, // PUSH1 0
                0xF3, // RETURN (empty)
                0x5B, // JUMPDEST (pc 10)
                0x60, 0x01, // PUSH1 1
                0x60, 0x00, // PUSH1 0
                0x52, // MSTORE
                0x60, 0x20, // PUSH1 32
                0x60, 0x00, // PUSH1 0
                0xF3, // RETURN (one word)
            ];
            run(&code)
        }

        let not_taken = branch(0);
        assert!(not_taken.success);
        assert!(not_taken.output.is_empty());

        let taken = branch(1);
        assert_eq!(returned_word(&taken), U256::one());
    }

    #[test]
    fn test_truncated_push_reads_zero() {
        // PUSH1 as the last byte: the missing immediate reads as zero and
        // the counter lands past the end, which completes the frame.
        let result = run(&[0x60]);

        assert!(result.success);
        assert!(result.output.is_empty());
        assert_eq!(result.gas_used, 3);
    }

    // =========================================================================
    // STACK AND ARITHMETIC
    // =========================================================================

    #[test]
    fn test_stack_shuffle_feeds_arithmetic() {
        // [1, 2, 3] -> SWAP2 -> [3, 2, 1] -> DUP2 -> [3, 2, 1, 2]
        // -> ADD -> [3, 2, 3]; the top lands in the output word.
        let code = [
            0x60, 0x01, // PUSH1 1
            0x60, 0x02, // PUSH1 2
            0x60, 0x03, // PUSH1 3
            0x91, // SWAP2
            0x81, // DUP2
            0x01, // ADD
            0x60, 0x00, // PUSH1 0
            0x52, // MSTORE
            0x60, 0x20, // PUSH1 32
            0x60, 0x00, // PUSH1 0
            0xF3, // RETURN
        ];

        let result = run(&code);

        assert_eq!(returned_word(&result), U256::from(3));
    }

    #[test]
    fn test_wide_push_assembles_full_word() {
        // PUSH32 with 32 distinct immediate bytes. Completion proves the
        // counter skipped the whole immediate; the output proves no byte
        // was lost on the way through memory.
        let immediate: Vec<u8> = (0..32).collect();
        let mut code = vec![0x7F];
        code.extend_from_slice(&immediate);
        code.extend_from_slice(&[0x60, 0x00, 0x52, 0x60, 0x20, 0x60, 0x00, 0xF3]);

        let result = run(&code);

        assert!(result.success);
        assert_eq!(result.output.as_slice(), immediate.as_slice());
    }

    // =========================================================================
    // MEMORY
    // =========================================================================

    #[test]
    fn test_memory_word_write_and_single_byte_return() {
        // MSTORE 0x42 at offset 64, then return only its last byte.
        let code = [
            0x60, 0x42, // PUSH1 0x42
            0x60, 0x40, // PUSH1 64
            0x52, // MSTORE
            0x60, 0x01, // PUSH1 1
            0x60, 0x5F, // PUSH1 95
            0xF3, // RETURN
        ];

        let result = run(&code);

        assert!(result.success);
        assert_eq!(result.output.as_slice(), &[0x42]);
        // Four pushes (12), MSTORE (3) plus expansion to 3 words (9).
        assert_eq!(result.gas_used, 24);
    }

    #[test]
    fn test_msize_tracks_expansion() {
        // MLOAD at 0 expands memory to one word; MSIZE reports 32.
        let code = [
            0x60, 0x00, // PUSH1 0
            0x51, // MLOAD
            0x50, // POP
            0x59, // MSIZE
            0x60, 0x00, // PUSH1 0
            0x52, // MSTORE
            0x60, 0x20, // PUSH1 32
            0x60, 0x00, // PUSH1 0
            0xF3, // RETURN
        ];

        let result = run(&code);

        assert_eq!(returned_word(&result), U256::from(32));
    }

    // =========================================================================
    // CALLDATA AND ENVIRONMENT
    // =========================================================================

    #[test]
    fn test_calldata_word_echo() {
        // CALLDATALOAD 0 returns the calldata left-aligned, zero-padded.
        let code = hex::decode("60003560005260206000F3").unwrap();
        let context = ExecutionContext {
            data: Bytes::from_slice(&[0xDE, 0xAD, 0xBE, 0xEF]),
            gas_limit: GAS,
            ..ExecutionContext::default()
        };

        let result = run_in(&code, context);

        assert!(result.success);
        assert_eq!(&result.output.as_slice()[..4], &[0xDE, 0xAD, 0xBE, 0xEF]);
        assert!(result.output.as_slice()[4..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_caller_surfaces_as_padded_word() {
        let caller = Address::new([0xAB; 20]);
        let code = [
            0x33, // CALLER
            0x60, 0x00, // PUSH1 0
            0x52, // MSTORE
            0x60, 0x20, // PUSH1 32
            0x60, 0x00, // PUSH1 0
            0xF3, // RETURN
        ];
        let context = ExecutionContext {
            caller,
            gas_limit: GAS,
            ..ExecutionContext::default()
        };

        let result = run_in(&code, context);

        assert!(result.success);
        let out = result.output.as_slice();
        assert!(out[..12].iter().all(|&b| b == 0));
        assert_eq!(&out[12..], &caller.as_bytes()[..]);
    }

    // =========================================================================
    // HASHING
    // =========================================================================

    #[test]
    fn test_keccak_matches_reference_digest() {
        // Hash one memory word holding 123 and return the digest.
        let code = [
            0x60, 0x7B, // PUSH1 123
            0x60, 0x00, // PUSH1 0
            0x52, // MSTORE
            0x60, 0x20, // PUSH1 32
            0x60, 0x00, // PUSH1 0
            0x20, // KECCAK256
            0x60, 0x00, // PUSH1 0
            0x52, // MSTORE
            0x60, 0x20, // PUSH1 32
            0x60, 0x00, // PUSH1 0
            0xF3, // RETURN
        ];

        let result = run(&code);

        let mut word = [0u8; 32];
        word[31] = 0x7B;
        let expected = Keccak256::digest(word);
        assert!(result.success);
        assert_eq!(result.output.as_slice(), expected.as_slice());
    }
}
