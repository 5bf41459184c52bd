use std::str::FromStr;

use eyre::Result;
use scripts::{
    cli::{InitSupplyArgs, RemoveWhitelistArgs, WhitelistTokenArgs},
    client::TokenWhitelist,
    commands::{init_supply, remove_whitelist, whitelist_token},
    errors::ScriptError,
    types::Amount,
};
use tests::{
    mock::{MockBridgeClient, RecordedCall},
    utils::{TestLedger, ADMIN_ADDRESS, TOKEN_TYPE},
};

// ----------------
// | TEST HELPERS |
// ----------------

fn whitelist_args(min: &str, max: &str) -> Result<WhitelistTokenArgs> {
    Ok(WhitelistTokenArgs {
        token_type: TOKEN_TYPE.to_string(),
        min_amount: Amount::from_str(min)?,
        max_amount: Amount::from_str(max)?,
        is_native: true,
        is_locked: false,
    })
}

fn supply_args(amount: &str) -> Result<InitSupplyArgs> {
    Ok(InitSupplyArgs {
        token_type: TOKEN_TYPE.to_string(),
        amount: Amount::from_str(amount)?,
    })
}

// -------------
// | WHITELIST |
// -------------

#[tokio::test]
async fn test_whitelist_then_remove() -> Result<()> {
    let ledger = TestLedger::with_active_deployment()?;
    let client = MockBridgeClient::new();

    whitelist_token(whitelist_args("1", "1000")?, &ledger.config(None)?, &client).await?;

    let record = ledger.active_deployment()?;
    let token = &record.whitelisted_tokens[TOKEN_TYPE];
    assert_eq!(token.min_amount, Amount::from(1));
    assert_eq!(token.max_amount, Amount::from(1000));
    assert!(token.is_native);
    assert!(!token.is_locked);
    assert!(token.initialized_supply.is_zero());

    let args = RemoveWhitelistArgs {
        token_type: TOKEN_TYPE.to_string(),
    };
    remove_whitelist(args, &ledger.config(None)?, &client).await?;
    assert!(ledger.active_deployment()?.whitelisted_tokens.is_empty());

    let calls = client.calls();
    assert_eq!(calls.len(), 2);
    assert!(matches!(
        &calls[0],
        RecordedCall::WhitelistToken { token: TokenWhitelist { token_type, .. }, .. } if token_type == TOKEN_TYPE
    ));
    assert!(matches!(
        &calls[1],
        RecordedCall::RemoveWhitelist { token_type, .. } if token_type == TOKEN_TYPE
    ));

    Ok(())
}

#[tokio::test]
async fn test_rewhitelist_keeps_supply() -> Result<()> {
    let ledger = TestLedger::with_active_deployment()?;
    let client = MockBridgeClient::new();

    whitelist_token(whitelist_args("1", "1000")?, &ledger.config(None)?, &client).await?;
    init_supply(supply_args("500")?, &ledger.config(None)?, &client).await?;
    whitelist_token(whitelist_args("10", "5000")?, &ledger.config(None)?, &client).await?;

    let record = ledger.active_deployment()?;
    let token = &record.whitelisted_tokens[TOKEN_TYPE];
    assert_eq!(token.min_amount, Amount::from(10));
    assert_eq!(token.max_amount, Amount::from(5000));
    assert_eq!(token.initialized_supply, Amount::from(500));

    Ok(())
}

#[tokio::test]
async fn test_whitelist_min_above_max() -> Result<()> {
    let ledger = TestLedger::with_active_deployment()?;
    let client = MockBridgeClient::new();

    let res = whitelist_token(whitelist_args("1001", "1000")?, &ledger.config(None)?, &client).await;

    assert!(matches!(res, Err(ScriptError::InvalidParameter(_))));
    assert!(client.calls().is_empty());
    assert!(ledger.active_deployment()?.whitelisted_tokens.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_whitelist_without_token_type() -> Result<()> {
    let ledger = TestLedger::with_active_deployment()?;
    let client = MockBridgeClient::new();

    let mut args = whitelist_args("1", "1000")?;
    args.token_type = "  ".to_string();
    let res = whitelist_token(args, &ledger.config(None)?, &client).await;

    assert!(matches!(res, Err(ScriptError::InvalidParameter(_))));
    assert!(client.calls().is_empty());

    Ok(())
}

#[tokio::test]
async fn test_remove_unknown_token() -> Result<()> {
    let ledger = TestLedger::with_active_deployment()?;
    let client = MockBridgeClient::new();

    // The removal is still submitted, the ledger simply has nothing to drop
    let args = RemoveWhitelistArgs {
        token_type: TOKEN_TYPE.to_string(),
    };
    remove_whitelist(args, &ledger.config(None)?, &client).await?;

    assert_eq!(client.calls().len(), 1);
    assert!(ledger.active_deployment()?.whitelisted_tokens.is_empty());

    Ok(())
}

// ----------
// | SUPPLY |
// ----------

#[tokio::test]
async fn test_init_supply_accumulates() -> Result<()> {
    let ledger = TestLedger::with_active_deployment()?;
    let client = MockBridgeClient::new();

    whitelist_token(whitelist_args("1", "1000")?, &ledger.config(None)?, &client).await?;
    init_supply(supply_args("1000")?, &ledger.config(None)?, &client).await?;
    init_supply(supply_args("2000")?, &ledger.config(None)?, &client).await?;

    let record = ledger.active_deployment()?;
    assert_eq!(record.whitelisted_tokens[TOKEN_TYPE].initialized_supply, Amount::from(3000));

    // Supplies are kept as decimal strings
    let json: serde_json::Value = serde_json::from_str(&ledger.contents())?;
    assert_eq!(
        json["testnet"]["deployments"][0]["whitelistedTokens"][TOKEN_TYPE]["initializedSupply"],
        "3000"
    );

    assert!(matches!(
        &client.calls()[1],
        RecordedCall::InitSupply { recipient, amount, .. }
            if recipient == ADMIN_ADDRESS && *amount == Amount::from(1000)
    ));

    Ok(())
}

#[tokio::test]
async fn test_init_supply_beyond_u64() -> Result<()> {
    let ledger = TestLedger::with_active_deployment()?;
    let client = MockBridgeClient::new();

    whitelist_token(whitelist_args("1", "1000")?, &ledger.config(None)?, &client).await?;
    init_supply(supply_args("18446744073709551615")?, &ledger.config(None)?, &client).await?;
    init_supply(supply_args("18446744073709551615")?, &ledger.config(None)?, &client).await?;

    let record = ledger.active_deployment()?;
    assert_eq!(
        record.whitelisted_tokens[TOKEN_TYPE]
            .initialized_supply
            .to_string(),
        "36893488147419103230"
    );

    Ok(())
}

#[tokio::test]
async fn test_init_supply_requires_whitelist() -> Result<()> {
    let ledger = TestLedger::with_active_deployment()?;
    let before = ledger.contents();
    let client = MockBridgeClient::new();

    let res = init_supply(supply_args("1000")?, &ledger.config(None)?, &client).await;

    let err = res.unwrap_err();
    assert!(matches!(&err, ScriptError::TokenNotWhitelisted(t) if t == TOKEN_TYPE));
    assert!(err.hint().is_some());
    assert!(client.calls().is_empty());
    assert_eq!(ledger.contents(), before);

    Ok(())
}

#[tokio::test]
async fn test_init_supply_zero_amount() -> Result<()> {
    let ledger = TestLedger::with_active_deployment()?;
    let client = MockBridgeClient::new();

    whitelist_token(whitelist_args("1", "1000")?, &ledger.config(None)?, &client).await?;
    let res = init_supply(supply_args("0")?, &ledger.config(None)?, &client).await;

    assert!(matches!(res, Err(ScriptError::InvalidParameter(_))));
    assert_eq!(client.calls().len(), 1);

    Ok(())
}
