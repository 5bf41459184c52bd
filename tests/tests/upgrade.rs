use eyre::Result;
use scripts::{
    commands::{list_deployments, upgrade},
    constants::{BRIDGE_KEY, PACKAGE_KEY, UPGRADE_CAP_KEY},
    errors::ScriptError,
};
use tests::{
    mock::{MockBridgeClient, RecordedCall},
    utils::{dummy_package, TestLedger, NETWORK, PACKAGE_ID, UPGRADE_CAP_ID},
};

#[tokio::test]
async fn test_upgrade() -> Result<()> {
    let ledger = TestLedger::with_active_deployment()?;
    let before = ledger.active_deployment()?;
    let client = MockBridgeClient::with_created_objects([(PACKAGE_KEY, "0xbeef")]);

    upgrade(&ledger.config(None)?, &client, async { Ok(dummy_package()) }).await?;

    assert_eq!(
        client.calls(),
        vec![RecordedCall::Upgrade {
            current_package: PACKAGE_ID.to_string(),
            upgrade_cap: UPGRADE_CAP_ID.to_string(),
        }]
    );

    let record = ledger.active_deployment()?;
    assert_eq!(record.package.as_deref(), Some("0xbeef"));
    let last_upgrade = record.last_upgrade.clone().unwrap();
    assert_eq!(last_upgrade.previous_package.as_deref(), Some(PACKAGE_ID));
    assert_eq!(last_upgrade.digest, "MockDigest0");

    // Everything but the package & upgrade stays as it was
    assert_eq!(record.id, before.id);
    assert_eq!(record.objects, before.objects);
    assert_eq!(record.digest, before.digest);
    assert_eq!(record.created_at, before.created_at);

    Ok(())
}

#[tokio::test]
async fn test_upgrade_without_upgrade_cap() -> Result<()> {
    let ledger = TestLedger::empty()?;
    ledger.add_deployment(1, true, &[(BRIDGE_KEY, "0xb71d")])?;
    let client = MockBridgeClient::new();

    let res = upgrade(&ledger.config(None)?, &client, async { Ok(dummy_package()) }).await;

    assert!(matches!(res, Err(ScriptError::MissingObject(role)) if role == UPGRADE_CAP_KEY));
    assert!(client.calls().is_empty());

    Ok(())
}

#[tokio::test]
async fn test_upgrade_without_new_package() -> Result<()> {
    let ledger = TestLedger::with_active_deployment()?;
    let before = ledger.contents();
    let client = MockBridgeClient::new();

    let res = upgrade(&ledger.config(None)?, &client, async { Ok(dummy_package()) }).await;

    assert!(matches!(res, Err(ScriptError::MissingUpgradedPackage)));
    assert_eq!(ledger.contents(), before);

    Ok(())
}

#[tokio::test]
async fn test_list_deployments() -> Result<()> {
    let ledger = TestLedger::empty()?;
    list_deployments(NETWORK, &ledger.path)?;

    ledger.add_deployment(1, true, &[(BRIDGE_KEY, "0xb71d")])?;
    let before = ledger.contents();
    list_deployments(NETWORK, &ledger.path)?;
    assert_eq!(ledger.contents(), before);

    Ok(())
}
