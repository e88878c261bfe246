//! Service-level transaction pipeline over the in-memory state adapter:
//! deployments that are later called, state evolving across a batch,
//! read-only entry points, and admission rejections.

#[cfg(test)]
mod tests {
    use evm_exec::prelude::*;
    use sha2::{Digest, Sha256};

    // =========================================================================
    // FIXTURES
    // =========================================================================

    const SENDER: Address = Address::new([0x11; 20]);
    const RECIPIENT: Address = Address::new([0x22; 20]);
    const CONTRACT: Address = Address::new([0x33; 20]);

    /// Runtime returning the constant 42 as one word.
    const RETURN_42: [u8; 10] = [0x60, 0x2A, 0x60, 0x00, 0x52, 0x60, 0x20, 0x60, 0x00, 0xF3];

    /// Runtime loading slot 0, adding one, and storing it back.
    const COUNTER: [u8; 10] = [0x60, 0x00, 0x54, 0x60, 0x01, 0x01, 0x60, 0x00, 0x55, 0x00];

    /// Init code that copies the trailing runtime to memory and returns it.
    fn deploy_init(runtime: &[u8]) -> Vec<u8> {
        let len = u8::try_from(runtime.len()).unwrap();
        let mut init = vec![
            0x60, len, // PUSH1 runtime length
            0x60, 0x0C, // PUSH1 offset of the runtime below
            0x60, 0x00, // PUSH1 0
            0x39, // CODECOPY
            0x60, len, // PUSH1 runtime length
            0x60, 0x00, // PUSH1 0
            0xF3, // RETURN
        ];
        init.extend_from_slice(runtime);
        init
    }

    fn funded_service() -> ExecutionService<InMemoryState> {
        let state = InMemoryState::new();
        state.set_balance(SENDER, U256::exp10(18));
        ExecutionService::new(state, ServiceConfig::default())
    }

    fn tx(to: Option<Address>, data: Vec<u8>, nonce: u64, gas_limit: u64) -> SignedTransaction {
        SignedTransaction {
            from: SENDER,
            to,
            data: Bytes::from_vec(data),
            nonce,
            gas_limit,
            ..SignedTransaction::default()
        }
    }

    fn contract_context(gas_limit: u64) -> ExecutionContext {
        ExecutionContext {
            origin: SENDER,
            caller: SENDER,
            address: CONTRACT,
            gas_limit,
            ..ExecutionContext::default()
        }
    }

    // =========================================================================
    // DEPLOY AND CALL
    // =========================================================================

    #[tokio::test]
    async fn test_deploy_then_call_round_trip() {
        let service = funded_service();
        let block = BlockContext::default();
        let deployed = compute_contract_address(SENDER, 0);

        let creation = service
            .execute_transaction(&tx(None, deploy_init(&RETURN_42), 0, 200_000), &block)
            .await
            .unwrap();
        assert!(creation.success);
        // Creation intrinsic (53_304 with this init code) plus the init
        // frame's 24 gas.
        assert_eq!(creation.gas_used, 53_328);
        assert_eq!(
            service.state().get_code(deployed).unwrap().as_slice(),
            &RETURN_42[..]
        );

        let call = service
            .execute_transaction(&tx(Some(deployed), vec![], 1, 100_000), &block)
            .await
            .unwrap();
        assert!(call.success);
        assert_eq!(call.gas_used, 21_018);
        assert_eq!(
            U256::from_big_endian(call.output.as_slice()),
            U256::from(42)
        );
    }

    #[tokio::test]
    async fn test_counter_state_evolves_across_a_batch() {
        let service = funded_service();
        service
            .state()
            .set_code(CONTRACT, Bytes::from_slice(&COUNTER))
            .unwrap();

        let txs: Vec<SignedTransaction> = (0..3)
            .map(|nonce| tx(Some(CONTRACT), vec![], nonce, 100_000))
            .collect();
        let receipts = service
            .execute_batch(&txs, &BlockContext::default())
            .await
            .unwrap();

        assert_eq!(receipts.len(), 3);
        assert!(receipts.iter().all(|r| r.success));
        // First store writes a fresh slot; the next two overwrite it.
        assert_eq!(receipts[0].gas_used, 41_812);
        assert_eq!(receipts[1].gas_used, 26_812);
        assert_eq!(receipts[2].gas_used, 26_812);
        assert_eq!(receipts[2].cumulative_gas_used, 95_436);

        let counter = service
            .state()
            .get_storage(CONTRACT, StorageKey::from_word(U256::zero()))
            .unwrap();
        assert_eq!(counter.to_word(), U256::from(3));
    }

    #[tokio::test]
    async fn test_batch_mixes_transfer_creation_and_call() {
        let service = funded_service();
        let deployed = compute_contract_address(SENDER, 1);
        let txs = vec![
            SignedTransaction {
                from: SENDER,
                to: Some(RECIPIENT),
                value: U256::from(1_000u64),
                nonce: 0,
                gas_limit: 21_000,
                ..SignedTransaction::default()
            },
            tx(None, deploy_init(&RETURN_42), 1, 200_000),
            tx(Some(deployed), vec![], 2, 100_000),
        ];

        let receipts = service
            .execute_batch(&txs, &BlockContext::default())
            .await
            .unwrap();

        assert!(receipts.iter().all(|r| r.success));
        assert_eq!(receipts[0].cumulative_gas_used, 21_000);
        assert_eq!(receipts[1].cumulative_gas_used, 74_328);
        assert_eq!(receipts[1].contract_address, Some(deployed));
        assert_eq!(receipts[2].cumulative_gas_used, 95_346);
        assert_eq!(
            U256::from_big_endian(receipts[2].output.as_slice()),
            U256::from(42)
        );

        // Value moved, gas fees are not debited, nonce advanced per tx.
        let state = service.state();
        assert_eq!(state.get_balance(RECIPIENT).unwrap(), U256::from(1_000u64));
        let sender = state.get_account(SENDER).unwrap().unwrap();
        assert_eq!(sender.balance, U256::exp10(18) - U256::from(1_000u64));
        assert_eq!(sender.nonce, 3);

        let stats = service.stats().await;
        assert_eq!(stats.transactions_executed, 3);
        assert_eq!(stats.successful_executions, 3);
        assert_eq!(stats.total_gas_used, 95_346);
    }

    // =========================================================================
    // READ-ONLY ENTRY POINTS
    // =========================================================================

    #[tokio::test]
    async fn test_estimate_covers_actual_usage() {
        let service = funded_service();

        let estimate = service
            .estimate_gas(contract_context(0), &COUNTER)
            .await
            .unwrap();

        let actual = service
            .execute(contract_context(100_000), &COUNTER)
            .await
            .unwrap();
        assert!(actual.success);
        assert_eq!(actual.gas_used, 20_812);
        assert_eq!(estimate, actual.gas_used + actual.gas_used / 10);

        // The estimate left no trace; the execute call committed.
        let counter = service
            .state()
            .get_storage(CONTRACT, StorageKey::from_word(U256::zero()))
            .unwrap();
        assert_eq!(counter.to_word(), U256::one());
    }

    #[tokio::test]
    async fn test_estimate_surfaces_failing_programs() {
        let service = funded_service();

        let err = service
            .estimate_gas(contract_context(0), &[0xFE])
            .await
            .unwrap_err();

        assert!(matches!(err, VmError::ExecutionFailed(_)));
        assert!(!err.is_rejection());
    }

    #[tokio::test]
    async fn test_static_call_reads_without_writing() {
        let service = funded_service();
        let slot = StorageKey::from_word(U256::zero());
        service
            .state()
            .set_storage(CONTRACT, slot, StorageValue::from_word(U256::from(99)))
            .unwrap();

        // PUSH1 0; SLOAD; MSTORE; RETURN one word.
        let reader = [
            0x60, 0x00, 0x54, 0x60, 0x00, 0x52, 0x60, 0x20, 0x60, 0x00, 0xF3,
        ];
        let output = service
            .call(contract_context(100_000), &reader)
            .await
            .unwrap();
        assert_eq!(U256::from_big_endian(output.as_slice()), U256::from(99));

        // A writer is rejected by the static frame and changes nothing.
        let writer = [0x60, 0x07, 0x60, 0x00, 0x55, 0x00];
        let err = service
            .call(contract_context(100_000), &writer)
            .await
            .unwrap_err();
        assert!(matches!(err, VmError::ExecutionFailed(_)));
        assert_eq!(
            service.state().get_storage(CONTRACT, slot).unwrap().to_word(),
            U256::from(99)
        );
    }

    // =========================================================================
    // PRECOMPILES AND ENVIRONMENT
    // =========================================================================

    #[tokio::test]
    async fn test_precompile_digest_and_pricing() {
        let service = funded_service();

        let result = service
            .execute_transaction(
                &tx(Some(Address::precompile(2)), b"hello".to_vec(), 0, 100_000),
                &BlockContext::default(),
            )
            .await
            .unwrap();

        assert!(result.success);
        assert_eq!(
            result.output.as_slice(),
            Sha256::digest(b"hello").as_slice()
        );
        // Intrinsic 21_080 (five non-zero data bytes) plus 60 base and
        // 12 for the single input word.
        assert_eq!(result.gas_used, 21_152);
    }

    #[tokio::test]
    async fn test_block_environment_is_visible_to_programs() {
        let service = funded_service();
        // NUMBER; MSTORE; RETURN one word.
        let runtime = [0x43, 0x60, 0x00, 0x52, 0x60, 0x20, 0x60, 0x00, 0xF3];
        service
            .state()
            .set_code(CONTRACT, Bytes::from_slice(&runtime))
            .unwrap();
        let block = BlockContext {
            number: 7_777_777,
            timestamp: 1_700_000_000,
            chain_id: 1337,
            ..BlockContext::default()
        };

        let result = service
            .execute_transaction(&tx(Some(CONTRACT), vec![], 0, 100_000), &block)
            .await
            .unwrap();

        assert!(result.success);
        assert_eq!(
            U256::from_big_endian(result.output.as_slice()),
            U256::from(7_777_777)
        );
    }

    // =========================================================================
    // BOUNDS AND REJECTIONS
    // =========================================================================

    #[tokio::test]
    async fn test_gas_budget_tames_an_infinite_loop() {
        let service = funded_service();
        // JUMPDEST; PUSH1 0; JUMP
        let spin = [0x5B, 0x60, 0x00, 0x56];
        service
            .state()
            .set_code(CONTRACT, Bytes::from_slice(&spin))
            .unwrap();

        let result = service
            .execute_transaction(&tx(Some(CONTRACT), vec![], 0, 30_000), &BlockContext::default())
            .await
            .unwrap();

        assert!(!result.success);
        assert_eq!(
            result.halt_reason,
            Some(ExceptionalHaltReason::InsufficientGas)
        );
        assert_eq!(result.gas_used, 30_000);
    }

    #[tokio::test]
    async fn test_rejection_rolls_nothing_forward() {
        let service = funded_service();

        let err = service
            .execute_transaction(
                &tx(Some(RECIPIENT), vec![], 5, 50_000),
                &BlockContext::default(),
            )
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            VmError::NonceMismatch {
                tx_nonce: 5,
                account_nonce: 0
            }
        ));
        assert!(err.is_rejection());

        let sender = service.state().get_account(SENDER).unwrap().unwrap();
        assert_eq!(sender.nonce, 0);
        assert_eq!(sender.balance, U256::exp10(18));

        let stats = service.stats().await;
        assert_eq!(stats.rejected_requests, 1);
        assert_eq!(stats.transactions_executed, 0);
    }
}
