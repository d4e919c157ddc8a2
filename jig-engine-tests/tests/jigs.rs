use jig_engine_tests::common::*;

fn create_counter(runner: &mut TestRunner, key: &KeyPair) -> (PackageId, Output) {
    let package = deploy_counter(runner);
    let tx = runner.fund_and_sign(
        TxBuilder::new()
            .import(package)
            .new_instance(0, 0, no_args())
            .lock(1, key.address),
        key,
    );
    let result = runner.exec_tx(&tx).unwrap();
    (package, result.outputs[0].clone())
}

#[test]
fn test_new_jig_is_locked_to_address() {
    // Arrange
    let mut runner = TestRunner::new();
    let key = runner.new_key_pair();
    let package = deploy_counter(&runner);
    let tx = runner.fund_and_sign(
        TxBuilder::new()
            .import(package)
            .new_instance(0, 0, no_args())
            .lock(1, key.address),
        &key,
    );

    // Act
    let result = runner.exec_tx(&tx).unwrap();

    // Assert
    assert_eq!(result.outputs.len(), 2);
    let counter = &result.outputs[0];
    assert_eq!(counter.origin, Pointer::from_hash(tx.hash(), 0));
    assert_eq!(counter.location, counter.origin);
    assert_eq!(counter.class_ptr, Pointer::from_hash(package, 0));
    assert_eq!(counter.lock, Lock::pubkey(&key.address));
    assert_eq!(counter.state, counter_state(0, false));
    assert_eq!(counter.created_at, TEST_TIMESTAMP);
    assert_eq!(result.executed_at, TEST_TIMESTAMP);
    assert_eq!(result.hydros.new_jigs, 1);
    assert_eq!(runner.output_by_origin(&counter.origin), Some(counter.clone()));
}

#[test]
fn test_unlocked_jig_fails_the_transaction() {
    // Arrange
    let mut runner = TestRunner::new();
    let key = runner.new_key_pair();
    let package = deploy_counter(&runner);
    let tx = runner.fund_and_sign(
        TxBuilder::new().import(package).new_instance(0, 0, no_args()),
        &key,
    );
    let utxos_before = runner.storage().utxo_count();

    // Act
    let result = runner.exec_tx(&tx);

    // Assert
    assert_eq!(
        result,
        Err(RuntimeError::ExecutionError(ExecutionError::UnlockedJig {
            class_name: "Counter".to_string(),
            origin: Pointer::from_hash(tx.hash(), 0),
        }))
    );
    assert_eq!(runner.storage().utxo_count(), utxos_before);
}

#[test]
fn test_unlocked_jig_rejects_calls() {
    // Arrange
    let mut runner = TestRunner::new();
    let key = runner.new_key_pair();
    let package = deploy_counter(&runner);
    let tx = runner.fund_and_sign(
        TxBuilder::new()
            .import(package)
            .new_instance(0, 0, no_args())
            .call(1, COUNTER_INC, no_args())
            .lock(1, key.address),
        &key,
    );

    // Act
    let result = runner.execute(&tx);

    // Assert
    assert_eq!(
        result,
        Err(RuntimeError::PermissionError(PermissionError {
            origin: Pointer::from_hash(tx.hash(), 0),
            operation: "exec \"inc\"".to_string(),
            caller: None,
            frozen: false,
        }))
    );
}

#[test]
fn test_update_moves_the_jig() {
    // Arrange
    let mut runner = TestRunner::new();
    let key = runner.new_key_pair();
    let (_, counter) = create_counter(&mut runner, &key);
    let tx = runner.fund_and_sign(
        TxBuilder::new()
            .load(counter.id())
            .call(0, COUNTER_INC, no_args())
            .lock(0, key.address),
        &key,
    );

    // Act
    let result = runner.exec_tx(&tx).unwrap();

    // Assert
    let updated = result.output_by_origin(&counter.origin).unwrap();
    assert_eq!(updated.location, Pointer::from_hash(tx.hash(), 0));
    assert_eq!(updated.state, counter_state(1, false));
    assert_eq!(updated.lock, Lock::pubkey(&key.address));
    assert!(result.spends.contains(&counter));
    assert_eq!(runner.output_by_origin(&counter.origin), Some(updated.clone()));
}

#[test]
fn test_loading_twice_gives_the_same_jig() {
    // Arrange
    let mut runner = TestRunner::new();
    let key = runner.new_key_pair();
    let (_, counter) = create_counter(&mut runner, &key);
    let tx = runner.fund_and_sign(
        TxBuilder::new()
            .load(counter.id())
            .load(counter.id())
            .call(0, COUNTER_INC, no_args())
            .call(1, COUNTER_INC, no_args()),
        &key,
    );

    // Act
    let result = runner.exec_tx(&tx).unwrap();

    // Assert
    let counters: Vec<_> = result
        .outputs
        .iter()
        .filter(|output| output.origin == counter.origin)
        .collect();
    assert_eq!(counters.len(), 1);
    assert_eq!(counters[0].state, counter_state(2, false));
}

#[test]
fn test_load_by_origin_finds_the_latest_state() {
    // Arrange
    let mut runner = TestRunner::new();
    let key = runner.new_key_pair();
    let (_, counter) = create_counter(&mut runner, &key);
    let tx = runner.fund_and_sign(
        TxBuilder::new()
            .load(counter.id())
            .call(0, COUNTER_INC, no_args()),
        &key,
    );
    runner.exec_tx(&tx).unwrap();
    let tx = runner.fund_and_sign(
        TxBuilder::new()
            .load_by_origin(counter.origin)
            .call(0, COUNTER_INC, no_args()),
        &key,
    );

    // Act
    let result = runner.exec_tx(&tx).unwrap();

    // Assert
    let updated = result.output_by_origin(&counter.origin).unwrap();
    assert_eq!(updated.state, counter_state(2, false));
    assert_eq!(result.hydros.origin_checks, 1);
}

#[test]
fn test_loading_a_spent_output_fails() {
    // Arrange
    let mut runner = TestRunner::new();
    let key = runner.new_key_pair();
    let (_, counter) = create_counter(&mut runner, &key);
    let tx = runner.fund_and_sign(
        TxBuilder::new()
            .load(counter.id())
            .call(0, COUNTER_INC, no_args()),
        &key,
    );
    runner.exec_tx(&tx).unwrap();
    let tx = runner.fund_and_sign(TxBuilder::new().load(counter.id()), &key);

    // Act
    let result = runner.execute(&tx);

    // Assert
    assert_eq!(
        result,
        Err(RuntimeError::ExecutionError(ExecutionError::OutputNotFound(
            counter.id()
        )))
    );
}

#[test]
fn test_untouched_jigs_are_reads() {
    // Arrange
    let mut runner = TestRunner::new();
    let key = runner.new_key_pair();
    let (_, counter) = create_counter(&mut runner, &key);
    let tx = runner.fund_and_sign(TxBuilder::new().load(counter.id()), &key);

    // Act
    let result = runner.exec_tx(&tx).unwrap();

    // Assert
    assert_eq!(result.reads, vec![counter.clone()]);
    assert!(result.output_by_origin(&counter.origin).is_none());
    assert_eq!(runner.output_by_origin(&counter.origin), Some(counter));
}

#[test]
fn test_function_result_as_argument() {
    // Arrange
    let mut runner = TestRunner::new();
    let key = runner.new_key_pair();
    let package = deploy_counter(&runner);
    let tx = runner.fund_and_sign(
        TxBuilder::new()
            .import(package)
            .exec_func(0, DOUBLE_FN, ArgsBuilder::new().u32(21).build())
            .new_instance(0, 0, no_args())
            .lock(2, key.address)
            .call(2, COUNTER_ADD, ArgsBuilder::new().stmt_ref(1).build()),
        &key,
    );

    // Act
    let result = runner.exec_tx(&tx).unwrap();

    // Assert
    assert_eq!(result.outputs[0].state, counter_state(42, false));
}

#[test]
fn test_nullable_result_as_argument() {
    // Arrange
    let mut runner = TestRunner::new();
    let key = runner.new_key_pair();
    let package = deploy_counter(&runner);
    let tx = runner.fund_and_sign(
        TxBuilder::new()
            .import(package)
            .exec_func(0, HALF_FN, ArgsBuilder::new().u32(42).build())
            .exec_func(0, DOUBLE_FN, ArgsBuilder::new().stmt_ref(1).build())
            .new_instance(0, 0, no_args())
            .lock(3, key.address)
            .call(3, COUNTER_ADD, ArgsBuilder::new().stmt_ref(2).build()),
        &key,
    );

    // Act
    let result = runner.exec_tx(&tx).unwrap();

    // Assert
    assert_eq!(result.outputs[0].state, counter_state(42, false));
}

#[test]
fn test_null_result_rejected_as_required_argument() {
    // Arrange
    let mut runner = TestRunner::new();
    let key = runner.new_key_pair();
    let package = deploy_counter(&runner);
    let tx = runner.fund_and_sign(
        TxBuilder::new()
            .import(package)
            .exec_func(0, HALF_FN, ArgsBuilder::new().u32(7).build())
            .exec_func(0, DOUBLE_FN, ArgsBuilder::new().stmt_ref(1).build()),
        &key,
    );

    // Act
    let result = runner.execute(&tx);

    // Assert
    assert_eq!(
        result,
        Err(RuntimeError::ExecutionError(ExecutionError::NullArgument(1)))
    );
}

#[test]
fn test_static_method_result_as_argument() {
    // Arrange
    let mut runner = TestRunner::new();
    let key = runner.new_key_pair();
    let package = deploy_counter(&runner);
    let tx = runner.fund_and_sign(
        TxBuilder::new()
            .import(package)
            .exec(0, 0, COUNTER_SEVEN, no_args())
            .new_instance(0, 0, no_args())
            .lock(2, key.address)
            .call(2, COUNTER_ADD, ArgsBuilder::new().stmt_ref(1).build())
            .call(2, COUNTER_ADD, ArgsBuilder::new().stmt_ref(4).build()),
        &key,
    );

    // Act
    let result = runner.exec_tx(&tx).unwrap();

    // Assert
    assert_eq!(result.outputs[0].state, counter_state(14, false));
}

#[test]
fn test_exec_rejects_instance_methods() {
    // Arrange
    let mut runner = TestRunner::new();
    let key = runner.new_key_pair();
    let package = deploy_counter(&runner);
    let tx = runner.fund_and_sign(
        TxBuilder::new()
            .import(package)
            .exec(0, 0, COUNTER_INC, no_args()),
        &key,
    );

    // Act
    let result = runner.execute(&tx);

    // Assert
    assert_eq!(
        result,
        Err(RuntimeError::ExecutionError(ExecutionError::UnknownMethodIdx {
            class_name: "Counter".to_string(),
            idx: COUNTER_INC,
        }))
    );
}

#[test]
fn test_call_rejects_static_methods() {
    // Arrange
    let mut runner = TestRunner::new();
    let key = runner.new_key_pair();
    let (_, counter) = create_counter(&mut runner, &key);
    let tx = runner.fund_and_sign(
        TxBuilder::new()
            .load(counter.id())
            .call(0, COUNTER_SEVEN, no_args()),
        &key,
    );

    // Act
    let result = runner.execute(&tx);

    // Assert
    assert_eq!(
        result,
        Err(RuntimeError::ExecutionError(ExecutionError::UnknownMethodIdx {
            class_name: "Counter".to_string(),
            idx: COUNTER_SEVEN,
        }))
    );
}

#[test]
fn test_frozen_jig_rejects_calls() {
    // Arrange
    let mut runner = TestRunner::new();
    let key = runner.new_key_pair();
    let package = deploy_counter(&runner);
    let tx = runner.fund_and_sign(
        TxBuilder::new()
            .import(package)
            .new_instance(0, 0, no_args())
            .lock(1, key.address)
            .call(1, COUNTER_FREEZE, no_args())
            .call(1, COUNTER_INC, no_args()),
        &key,
    );

    // Act
    let error = runner.execute(&tx).unwrap_err();

    // Assert
    assert_eq!(
        error,
        RuntimeError::PermissionError(PermissionError {
            origin: Pointer::from_hash(tx.hash(), 0),
            operation: "exec \"inc\"".to_string(),
            caller: None,
            frozen: true,
        })
    );
    assert!(error.to_string().ends_with("because it's frozen"));
}

#[test]
fn test_frozen_jig_is_persisted_frozen() {
    // Arrange
    let mut runner = TestRunner::new();
    let key = runner.new_key_pair();
    let (_, counter) = create_counter(&mut runner, &key);
    let tx = runner.fund_and_sign(
        TxBuilder::new()
            .load(counter.id())
            .call(0, COUNTER_FREEZE, no_args()),
        &key,
    );

    // Act
    let result = runner.exec_tx(&tx).unwrap();

    // Assert
    let frozen = result.output_by_origin(&counter.origin).unwrap();
    assert_eq!(frozen.lock, Lock::frozen());
    let tx = runner.fund_and_sign(TxBuilder::new().load(frozen.id()).lock(0, key.address), &key);
    assert!(matches!(
        runner.execute(&tx),
        Err(RuntimeError::PermissionError(PermissionError { frozen: true, .. }))
    ));
}

#[test]
fn test_pubkey_lock_requires_signature() {
    // Arrange
    let mut runner = TestRunner::new();
    let owner = runner.new_key_pair();
    let stranger = runner.new_key_pair();
    let (_, counter) = create_counter(&mut runner, &owner);
    let call = runner.fund_and_sign(
        TxBuilder::new()
            .load(counter.id())
            .call(0, COUNTER_INC, no_args()),
        &stranger,
    );
    let relock = runner.fund_and_sign(
        TxBuilder::new().load(counter.id()).lock(0, stranger.address),
        &stranger,
    );

    // Act
    let call_result = runner.execute(&call);
    let relock_result = runner.execute(&relock);

    // Assert
    assert_eq!(
        call_result,
        Err(RuntimeError::PermissionError(PermissionError {
            origin: counter.origin,
            operation: "exec \"inc\"".to_string(),
            caller: None,
            frozen: false,
        }))
    );
    assert_eq!(
        relock_result,
        Err(RuntimeError::PermissionError(PermissionError {
            origin: counter.origin,
            operation: "change lock".to_string(),
            caller: None,
            frozen: false,
        }))
    );
}

#[test]
fn test_sign_to_covers_earlier_statements_only() {
    // Arrange
    let mut runner = TestRunner::new();
    let owner = runner.new_key_pair();
    let (_, counter) = create_counter(&mut runner, &owner);
    let coin = runner.mint(&owner.address, FUNDING_AMOUNT);
    let tx = TxBuilder::new()
        .load(counter.id())
        .call(0, COUNTER_INC, no_args())
        .sign_to(owner.signature(), owner.public_key.clone())
        .load(coin.id())
        .fund(3)
        .build();

    // Act
    let result = runner.execute(&tx);

    // Assert
    assert_eq!(
        result,
        Err(RuntimeError::PermissionError(PermissionError {
            origin: coin.origin,
            operation: "fund".to_string(),
            caller: None,
            frozen: false,
        }))
    );
}

#[test]
fn test_top_level_caller_introspection() {
    // Arrange
    let mut runner = TestRunner::new();
    let key = runner.new_key_pair();
    let (_, counter) = create_counter(&mut runner, &key);
    let check = runner.fund_and_sign(
        TxBuilder::new()
            .load(counter.id())
            .call(0, COUNTER_PROBE_CALLER, no_args()),
        &key,
    );
    let origin = runner.fund_and_sign(
        TxBuilder::new()
            .load(counter.id())
            .call(0, COUNTER_CALLER_ORIGIN, no_args()),
        &key,
    );

    // Act
    let check_result = runner.execute(&check).unwrap();
    let origin_result = runner.execute(&origin);

    // Assert
    let checked = check_result.output_by_origin(&counter.origin).unwrap();
    assert_eq!(checked.state, counter_state(0, false));
    assert_eq!(
        origin_result,
        Err(RuntimeError::ExecutionError(ExecutionError::CallerFromTopLevel))
    );
}

#[test]
fn test_deploy_in_transaction() {
    // Arrange
    let mut runner = TestRunner::new();
    let key = runner.new_key_pair();
    let (entries, sources) = jig_engine_tests::include_package!("counter");
    let package = Vm::package_id(&entries, &sources);
    let tx = runner.fund_and_sign(
        TxBuilder::new()
            .deploy(entries, sources)
            .new_instance(0, 0, no_args())
            .lock(1, key.address),
        &key,
    );

    // Act
    let result = runner.exec_tx(&tx).unwrap();

    // Assert
    assert_eq!(result.deployed_package_ids(), vec![package]);
    assert_eq!(result.outputs[0].class_ptr, Pointer::from_hash(package, 0));
    assert_eq!(result.hydros.deploys, 1);
    assert!(runner.storage().package_by_id(&package).is_some());
}

#[test]
fn test_failed_transaction_changes_nothing() {
    // Arrange
    let mut runner = TestRunner::new();
    let key = runner.new_key_pair();
    let (_, counter) = create_counter(&mut runner, &key);
    let tx = runner.fund_with(
        TxBuilder::new()
            .load(counter.id())
            .call(0, COUNTER_INC, no_args()),
        &key,
        10,
    );

    let utxos_before = runner.storage().utxo_count();

    // Act
    let result = runner.exec_tx(&tx);

    // Assert
    assert!(result.is_err());
    assert_eq!(runner.output_by_origin(&counter.origin), Some(counter));
    assert_eq!(runner.storage().utxo_count(), utxos_before);
}

#[test]
fn test_truncated_arguments_fail_to_decode() {
    // Arrange
    let mut runner = TestRunner::new();
    let key = runner.new_key_pair();
    let package = deploy_counter(&runner);
    let tx = runner.fund_and_sign(
        TxBuilder::new().import(package).exec_func(
            0,
            DOUBLE_FN,
            ArgsBuilder::new()
                .arg(|w| {
                    w.write_u16(21);
                })
                .build(),
        ),
        &key,
    );

    // Act
    let result = runner.execute(&tx);

    // Assert
    let error = result.unwrap_err();
    assert_eq!(
        error,
        RuntimeError::ExecutionError(ExecutionError::DecodeError(
            DecodeError::BufferOverflow {
                needed: 4,
                remaining: 2
            }
        ))
    );
    assert!(error.to_string().starts_with("buffer overflow"));
}
