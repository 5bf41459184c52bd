use eyre::Result;
use scripts::{
    cli::{InitBridgeArgs, InitSafeArgs},
    client::CallTarget,
    commands::{init_bridge, init_safe},
    constants::{BRIDGE_CAP_KEY, BRIDGE_KEY, BRIDGE_SAFE_KEY, FROM_COIN_CAP_KEY},
    errors::ScriptError,
};
use tests::{
    mock::{MockBridgeClient, RecordedCall},
    utils::{
        dummy_relayer_keys, full_objects, TestLedger, BRIDGE_CAP_ID, BRIDGE_SAFE_ID,
        FROM_COIN_CAP_ID, NETWORK, PACKAGE_ID,
    },
};

// -------------------------
// | BRIDGE INITIALIZATION |
// -------------------------

#[tokio::test]
async fn test_init_bridge() -> Result<()> {
    let ledger = TestLedger::empty()?;
    ledger.add_deployment(
        1,
        true,
        &[(BRIDGE_SAFE_KEY, BRIDGE_SAFE_ID), (BRIDGE_CAP_KEY, BRIDGE_CAP_ID)],
    )?;
    let client = MockBridgeClient::with_created_objects([(BRIDGE_KEY, "0xb71d")]);

    let args = InitBridgeArgs {
        relayer_keys: dummy_relayer_keys(4),
        quorum: 3,
    };
    init_bridge(args, &ledger.config(None)?, &client).await?;

    assert_eq!(
        client.calls(),
        vec![RecordedCall::InitializeBridge {
            target: CallTarget {
                package: PACKAGE_ID.to_string(),
                object: BRIDGE_SAFE_ID.to_string(),
                cap: BRIDGE_CAP_ID.to_string(),
            },
            relayer_keys: dummy_relayer_keys(4),
            quorum: 3,
        }]
    );

    // Created objects are merged into the existing ones
    let record = ledger.active_deployment()?;
    assert_eq!(record.objects[BRIDGE_KEY], "0xb71d");
    assert_eq!(record.objects[BRIDGE_SAFE_KEY], BRIDGE_SAFE_ID);
    assert_eq!(record.objects.len(), 3);

    Ok(())
}

#[tokio::test]
async fn test_init_bridge_quorum_below_minimum() -> Result<()> {
    let ledger = TestLedger::with_active_deployment()?;
    let before = ledger.contents();
    let client = MockBridgeClient::new();

    let args = InitBridgeArgs {
        relayer_keys: dummy_relayer_keys(4),
        quorum: 2,
    };
    let res = init_bridge(args, &ledger.config(None)?, &client).await;

    assert!(matches!(res, Err(ScriptError::InvalidParameter(_))));
    assert!(client.calls().is_empty());
    assert_eq!(ledger.contents(), before);

    Ok(())
}

#[tokio::test]
async fn test_init_bridge_quorum_above_relayers() -> Result<()> {
    let ledger = TestLedger::with_active_deployment()?;
    let client = MockBridgeClient::new();

    let args = InitBridgeArgs {
        relayer_keys: dummy_relayer_keys(3),
        quorum: 4,
    };
    let res = init_bridge(args, &ledger.config(None)?, &client).await;

    assert!(matches!(res, Err(ScriptError::InvalidParameter(_))));
    assert!(client.calls().is_empty());

    Ok(())
}

#[tokio::test]
async fn test_init_bridge_without_relayers() -> Result<()> {
    let ledger = TestLedger::with_active_deployment()?;
    let client = MockBridgeClient::new();

    let args = InitBridgeArgs {
        relayer_keys: vec![],
        quorum: 3,
    };
    let res = init_bridge(args, &ledger.config(None)?, &client).await;

    assert!(matches!(res, Err(ScriptError::InvalidParameter(_))));
    assert!(client.calls().is_empty());

    Ok(())
}

#[tokio::test]
async fn test_init_bridge_without_safe() -> Result<()> {
    let ledger = TestLedger::empty()?;
    ledger.add_deployment(1, true, &[(BRIDGE_CAP_KEY, BRIDGE_CAP_ID)])?;
    let client = MockBridgeClient::new();

    let args = InitBridgeArgs {
        relayer_keys: dummy_relayer_keys(3),
        quorum: 3,
    };
    let res = init_bridge(args, &ledger.config(None)?, &client).await;

    assert!(matches!(res, Err(ScriptError::MissingObject(role)) if role == BRIDGE_SAFE_KEY));
    assert!(client.calls().is_empty());

    Ok(())
}

#[tokio::test]
async fn test_init_bridge_without_active_deployment() -> Result<()> {
    let ledger = TestLedger::empty()?;
    ledger.add_deployment(1, false, &[])?;
    let before = ledger.contents();
    let client = MockBridgeClient::new();

    let args = InitBridgeArgs {
        relayer_keys: dummy_relayer_keys(3),
        quorum: 3,
    };
    let res = init_bridge(args, &ledger.config(None)?, &client).await;

    let err = res.unwrap_err();
    assert!(matches!(err, ScriptError::NoActiveDeployment));
    assert!(err.is_configuration());
    assert!(client.calls().is_empty());
    assert_eq!(ledger.contents(), before);

    Ok(())
}

#[tokio::test]
async fn test_init_bridge_with_unpublished_deployment() -> Result<()> {
    let ledger = TestLedger::empty()?;
    ledger.add_deployment(1, true, &full_objects())?;

    // An active record without a package cannot be acted on
    let mut contents = ledger.read()?;
    contents.deployment_mut(NETWORK.as_str(), 1)?.package = None;
    contents.write(&ledger.path)?;
    let before = ledger.contents();
    let client = MockBridgeClient::new();

    let args = InitBridgeArgs {
        relayer_keys: dummy_relayer_keys(3),
        quorum: 3,
    };
    let res = init_bridge(args, &ledger.config(None)?, &client).await;

    assert!(matches!(res, Err(ScriptError::NoActiveDeployment)));
    assert!(client.calls().is_empty());
    assert_eq!(ledger.contents(), before);

    Ok(())
}

// -----------------------
// | SAFE INITIALIZATION |
// -----------------------

#[tokio::test]
async fn test_init_safe_with_recorded_cap() -> Result<()> {
    let ledger = TestLedger::empty()?;
    ledger.add_deployment(1, true, &[(FROM_COIN_CAP_KEY, FROM_COIN_CAP_ID)])?;
    let client = MockBridgeClient::with_created_objects([
        (BRIDGE_SAFE_KEY, "0x5afe"),
        (BRIDGE_CAP_KEY, "0xcafe"),
    ]);

    init_safe(
        InitSafeArgs {
            from_coin_cap: None,
        },
        &ledger.config(None)?,
        &client,
    )
    .await?;

    assert_eq!(
        client.calls(),
        vec![RecordedCall::InitializeSafe {
            package: PACKAGE_ID.to_string(),
            from_coin_cap: FROM_COIN_CAP_ID.to_string(),
        }]
    );

    let record = ledger.active_deployment()?;
    assert_eq!(record.objects[BRIDGE_SAFE_KEY], "0x5afe");
    assert_eq!(record.objects[BRIDGE_CAP_KEY], "0xcafe");
    assert_eq!(record.objects[FROM_COIN_CAP_KEY], FROM_COIN_CAP_ID);

    Ok(())
}

#[tokio::test]
async fn test_init_safe_cap_override() -> Result<()> {
    let ledger = TestLedger::empty()?;
    ledger.add_deployment(1, true, &[])?;
    let client = MockBridgeClient::new();

    // Without a recorded cap, one must be given
    let res = init_safe(
        InitSafeArgs {
            from_coin_cap: None,
        },
        &ledger.config(None)?,
        &client,
    )
    .await;
    assert!(matches!(res, Err(ScriptError::MissingObject(role)) if role == FROM_COIN_CAP_KEY));
    assert!(client.calls().is_empty());

    init_safe(
        InitSafeArgs {
            from_coin_cap: Some("0x7777".to_string()),
        },
        &ledger.config(None)?,
        &client,
    )
    .await?;
    assert_eq!(
        client.calls(),
        vec![RecordedCall::InitializeSafe {
            package: PACKAGE_ID.to_string(),
            from_coin_cap: "0x7777".to_string(),
        }]
    );

    Ok(())
}
