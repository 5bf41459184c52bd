//! Implementations of the bridge deployment & administration scripts.
//!
//! Every on-chain command follows the same template: validate the
//! configuration, submit a single transaction, wait for it to settle, report
//! it, and record its effects in the deployment ledger. Validation failures
//! return before the client is called and before the ledger is touched.

use std::{future::Future, path::Path};

use chrono::Utc;
use tracing::{info, warn};

use crate::{
    cli::{
        InitBridgeArgs, InitSafeArgs, InitSupplyArgs, MarkActiveArgs, RemoveWhitelistArgs,
        SetBatchSizeArgs, SetBatchTimeoutArgs, SetQuorumArgs, WhitelistTokenArgs,
    },
    client::{BridgeClient, TokenWhitelist},
    config::ScriptConfig,
    constants::{
        BRIDGE_CAP_KEY, BRIDGE_KEY, BRIDGE_SAFE_KEY, FROM_COIN_CAP_KEY, MIN_QUORUM,
        UPGRADE_CAP_KEY,
    },
    errors::ScriptError,
    ledger::{update_deployment, DeploymentLedger, DeploymentRecord},
    types::{CompiledPackage, Network},
    utils::{report_transaction, settle},
};

// ---------------
// | Deployments |
// ---------------

/// Publishes the bridge package and records it as a new, inactive deployment.
///
/// Returns the ID of the new deployment.
pub async fn deploy(
    config: &ScriptConfig,
    client: &impl BridgeClient,
    build: impl Future<Output = Result<CompiledPackage, ScriptError>>,
) -> Result<u64, ScriptError> {
    info!("Deployer: {}", config.admin);

    let package = build.await?;
    info!(
        "Publishing {} modules with {} dependencies",
        package.modules.len(),
        package.dependencies.len()
    );

    let result = client.publish(&package).await?;
    settle(config.settle_delay).await;
    report_transaction(config.network, "Deployment", &result);

    info!("Saving deployment details...");
    let network = config.network.as_str();
    let mut ledger = DeploymentLedger::read(&config.deployments_path)?;
    let id = ledger.next_deployment_id(network);
    let record = DeploymentRecord::new(
        id,
        Utc::now(),
        result.package().map(str::to_string),
        result.objects(),
        config.admin.clone(),
        result.digest.clone(),
    );
    let created_at = record.created_at;
    ledger.push_deployment(network, record);
    ledger.write(&config.deployments_path)?;
    info!("Deployment saved to {}", config.deployments_path.display());

    info!("Deployment ID: {}", id);
    info!("Network: {}", network);
    info!("Created at: {}", created_at);
    info!("Package: {}", result.package().unwrap_or("N/A"));
    info!(
        "To make this deployment active, run: bridge-scripts --network {} mark-active --id {}",
        network, id
    );

    Ok(id)
}

/// Upgrades the package of the selected deployment, pointing the deployment
/// at the new package
pub async fn upgrade(
    config: &ScriptConfig,
    client: &impl BridgeClient,
    build: impl Future<Output = Result<CompiledPackage, ScriptError>>,
) -> Result<(), ScriptError> {
    info!("Deployer: {}", config.admin);
    let deployment_id = config.deployment()?.id;
    let current_package = config.package()?;
    let upgrade_cap = config.object(UPGRADE_CAP_KEY)?;

    let package = build.await?;
    info!("Package: {}", current_package);
    info!("UpgradeCap: {}", upgrade_cap);
    info!("New package digest: {}", package.digest_hex());

    let result = client
        .upgrade(&package, current_package, upgrade_cap)
        .await?;
    settle(config.settle_delay).await;
    report_transaction(config.network, "Upgrade", &result);

    info!("Saving upgrade details...");
    let new_package = result
        .package()
        .ok_or(ScriptError::MissingUpgradedPackage)?
        .to_string();
    let previous_package = update_deployment(
        &config.deployments_path,
        config.network.as_str(),
        deployment_id,
        |record| {
            Ok(record.record_upgrade(new_package.clone(), result.digest.clone(), Utc::now()))
        },
    )?;

    info!("Deployment ID: {}", deployment_id);
    info!("Old Package: {}", previous_package.as_deref().unwrap_or("N/A"));
    info!("New Package: {}", new_package);

    Ok(())
}

// ------------------
// | Initialization |
// ------------------

/// Initializes the bridge with its relayer set and quorum
pub async fn init_bridge(
    args: InitBridgeArgs,
    config: &ScriptConfig,
    client: &impl BridgeClient,
) -> Result<(), ScriptError> {
    info!("Deployer: {}", config.admin);
    let deployment_id = config.deployment()?.id;
    let target = config.call_target(BRIDGE_SAFE_KEY, BRIDGE_CAP_KEY)?;

    let InitBridgeArgs {
        relayer_keys,
        quorum,
    } = args;
    if relayer_keys.is_empty() {
        return Err(ScriptError::InvalidParameter(
            "no relayer public keys provided".to_string(),
        ));
    }
    if quorum < MIN_QUORUM {
        return Err(ScriptError::InvalidParameter(format!(
            "quorum must be at least {}",
            MIN_QUORUM
        )));
    }
    if quorum > relayer_keys.len() as u64 {
        return Err(ScriptError::InvalidParameter(format!(
            "quorum ({}) cannot be greater than number of relayers ({})",
            quorum,
            relayer_keys.len()
        )));
    }

    info!("Bridge Initialization Configuration:");
    info!("Package: {}", target.package);
    info!("BridgeSafe: {}", target.object);
    info!("BridgeCap: {}", target.cap);
    info!("Number of relayers: {}", relayer_keys.len());
    info!("Quorum: {}", quorum);
    for (i, key) in relayer_keys.iter().enumerate() {
        info!("  {}. {}", i + 1, key);
    }

    info!("Initializing bridge...");
    let result = client
        .initialize_bridge(&target, &relayer_keys, quorum)
        .await?;
    settle(config.settle_delay).await;
    report_transaction(config.network, "Bridge initialization", &result);

    info!("Saving bridge initialization details...");
    update_deployment(
        &config.deployments_path,
        config.network.as_str(),
        deployment_id,
        |record| {
            record.merge_objects(result.objects());
            Ok(())
        },
    )?;
    info!("Bridge initialization details saved");

    Ok(())
}

/// Initializes the bridge safe
pub async fn init_safe(
    args: InitSafeArgs,
    config: &ScriptConfig,
    client: &impl BridgeClient,
) -> Result<(), ScriptError> {
    let deployment_id = config.deployment()?.id;
    let package = config.package()?;
    let from_coin_cap = match args.from_coin_cap {
        Some(cap) => cap,
        None => config.object(FROM_COIN_CAP_KEY)?.to_string(),
    };

    info!("Package: {}", package);
    info!("FromCoinCap: {}", from_coin_cap);

    info!("Initializing safe...");
    let result = client.initialize_safe(package, &from_coin_cap).await?;
    settle(config.settle_delay).await;
    report_transaction(config.network, "Safe initialization", &result);

    info!("Saving safe initialization details...");
    update_deployment(
        &config.deployments_path,
        config.network.as_str(),
        deployment_id,
        |record| {
            record.merge_objects(result.objects());
            Ok(())
        },
    )?;
    info!("Safe initialization details saved");

    Ok(())
}

/// Initializes supply of a whitelisted token, accumulating it in the ledger
pub async fn init_supply(
    args: InitSupplyArgs,
    config: &ScriptConfig,
    client: &impl BridgeClient,
) -> Result<(), ScriptError> {
    info!("Deployer: {}", config.admin);
    let deployment = config.deployment()?;
    let target = config.call_target(BRIDGE_SAFE_KEY, BRIDGE_CAP_KEY)?;
    let token_type = require_token_type(&args.token_type)?;
    if args.amount.is_zero() {
        return Err(ScriptError::InvalidParameter(
            "coin amount must be greater than zero".to_string(),
        ));
    }
    if !deployment.whitelisted_tokens.contains_key(token_type) {
        return Err(ScriptError::TokenNotWhitelisted(token_type.to_string()));
    }

    info!("Token Supply Initialization Configuration:");
    info!("Package: {}", target.package);
    info!("BridgeSafe: {}", target.object);
    info!("Token Type: {}", token_type);
    info!("Coin Amount: {}", args.amount);

    info!("Initializing token supply...");
    let result = client
        .init_supply(&target, token_type, &args.amount, &config.admin)
        .await?;
    settle(config.settle_delay).await;
    report_transaction(config.network, "Token supply initialization", &result);

    info!("Updating token supply details...");
    let total = update_deployment(
        &config.deployments_path,
        config.network.as_str(),
        deployment.id,
        |record| record.add_initialized_supply(token_type, &args.amount),
    )?;
    info!(
        "Token supply updated: {} added (total: {})",
        args.amount, total
    );

    Ok(())
}

// -------------
// | Whitelist |
// -------------

/// Whitelists a token on the bridge safe
pub async fn whitelist_token(
    args: WhitelistTokenArgs,
    config: &ScriptConfig,
    client: &impl BridgeClient,
) -> Result<(), ScriptError> {
    info!("Deployer: {}", config.admin);
    let deployment_id = config.deployment()?.id;
    let target = config.call_target(BRIDGE_SAFE_KEY, BRIDGE_CAP_KEY)?;
    let token = TokenWhitelist {
        token_type: require_token_type(&args.token_type)?.to_string(),
        min_amount: args.min_amount,
        max_amount: args.max_amount,
        is_native: args.is_native,
        is_locked: args.is_locked,
    };
    if token.min_amount > token.max_amount {
        return Err(ScriptError::InvalidParameter(format!(
            "min amount ({}) cannot be greater than max amount ({})",
            token.min_amount, token.max_amount
        )));
    }

    info!("Token Whitelisting Configuration:");
    info!("Package: {}", target.package);
    info!("BridgeSafe: {}", target.object);
    info!("Token Type: {}", token.token_type);
    info!("Min Amount: {}", token.min_amount);
    info!("Max Amount: {}", token.max_amount);
    info!("Is Native: {}", token.is_native);
    info!("Is Locked: {}", token.is_locked);

    info!("Whitelisting token...");
    let result = client.whitelist_token(&target, &token).await?;
    settle(config.settle_delay).await;
    report_transaction(config.network, "Token whitelisting", &result);

    info!("Saving whitelist details...");
    update_deployment(
        &config.deployments_path,
        config.network.as_str(),
        deployment_id,
        |record| {
            record.whitelist_token(
                &token.token_type,
                token.min_amount.clone(),
                token.max_amount.clone(),
                token.is_native,
                token.is_locked,
            );
            Ok(())
        },
    )?;
    info!("Whitelist details saved");

    Ok(())
}

/// Removes a token from the bridge safe's whitelist
pub async fn remove_whitelist(
    args: RemoveWhitelistArgs,
    config: &ScriptConfig,
    client: &impl BridgeClient,
) -> Result<(), ScriptError> {
    let deployment_id = config.deployment()?.id;
    let target = config.call_target(BRIDGE_SAFE_KEY, BRIDGE_CAP_KEY)?;
    let token_type = require_token_type(&args.token_type)?;

    info!("Removing Token from Whitelist:");
    info!("Package: {}", target.package);
    info!("BridgeSafe: {}", target.object);
    info!("Token Type: {}", token_type);

    info!("Removing token from whitelist...");
    let result = client.remove_whitelist(&target, token_type).await?;
    settle(config.settle_delay).await;
    report_transaction(config.network, "Whitelist removal", &result);

    info!("Saving removal details...");
    let removed = update_deployment(
        &config.deployments_path,
        config.network.as_str(),
        deployment_id,
        |record| Ok(record.remove_whitelisted_token(token_type)),
    )?;
    match removed {
        Some(_) => info!("Token {} removed from whitelistedTokens", token_type),
        None => warn!("Token {} was not found in whitelistedTokens", token_type),
    }

    Ok(())
}

// ----------------------
// | Bridge Parameters |
// ----------------------

/// Sets the number of transfers in a batch
pub async fn set_batch_size(
    args: SetBatchSizeArgs,
    config: &ScriptConfig,
    client: &impl BridgeClient,
) -> Result<(), ScriptError> {
    info!("Deployer: {}", config.admin);
    let target = config.call_target(BRIDGE_SAFE_KEY, BRIDGE_CAP_KEY)?;
    if args.batch_size == 0 {
        return Err(ScriptError::InvalidParameter(
            "batch size must be greater than zero".to_string(),
        ));
    }

    info!("Set Batch Size Configuration:");
    info!("Package: {}", target.package);
    info!("BridgeSafe: {}", target.object);
    info!("BridgeCap: {}", target.cap);
    info!("New Batch Size: {}", args.batch_size);

    info!("Setting batch size...");
    let result = client.set_batch_size(&target, args.batch_size).await?;
    settle(config.settle_delay).await;
    report_transaction(config.network, "Batch size update", &result);

    Ok(())
}

/// Sets the time after which a partial batch is closed
pub async fn set_batch_timeout(
    args: SetBatchTimeoutArgs,
    config: &ScriptConfig,
    client: &impl BridgeClient,
) -> Result<(), ScriptError> {
    info!("Deployer: {}", config.admin);
    let target = config.call_target(BRIDGE_SAFE_KEY, BRIDGE_CAP_KEY)?;
    if args.timeout_ms == 0 {
        return Err(ScriptError::InvalidParameter(
            "batch timeout must be greater than zero".to_string(),
        ));
    }

    info!("Set Batch Timeout Configuration:");
    info!("Package: {}", target.package);
    info!("BridgeSafe: {}", target.object);
    info!("BridgeCap: {}", target.cap);
    info!("Timeout: {} ms", args.timeout_ms);

    info!("Setting batch timeout...");
    let result = client.set_batch_timeout(&target, args.timeout_ms).await?;
    settle(config.settle_delay).await;
    report_transaction(config.network, "Batch timeout update", &result);

    Ok(())
}

/// Sets the number of relayer signatures the bridge requires
pub async fn set_quorum(
    args: SetQuorumArgs,
    config: &ScriptConfig,
    client: &impl BridgeClient,
) -> Result<(), ScriptError> {
    info!("Deployer: {}", config.admin);
    let target = config.call_target(BRIDGE_KEY, BRIDGE_CAP_KEY)?;
    if args.quorum < MIN_QUORUM {
        return Err(ScriptError::InvalidParameter(format!(
            "quorum must be at least {}",
            MIN_QUORUM
        )));
    }

    info!("Set Quorum Configuration:");
    info!("Package: {}", target.package);
    info!("Bridge: {}", target.object);
    info!("BridgeCap: {}", target.cap);
    info!("New Quorum: {}", args.quorum);

    info!("Setting quorum...");
    let result = client.set_quorum(&target, args.quorum).await?;
    settle(config.settle_delay).await;
    report_transaction(config.network, "Quorum update", &result);

    Ok(())
}

/// Unpauses the bridge
pub async fn unpause(config: &ScriptConfig, client: &impl BridgeClient) -> Result<(), ScriptError> {
    info!("Deployer: {}", config.admin);
    let target = config.call_target(BRIDGE_KEY, BRIDGE_CAP_KEY)?;

    info!("Unpause Bridge Configuration:");
    info!("Package: {}", target.package);
    info!("Bridge: {}", target.object);
    info!("BridgeCap: {}", target.cap);

    info!("Unpausing bridge...");
    let result = client.unpause(&target).await?;
    settle(config.settle_delay).await;
    report_transaction(config.network, "Bridge unpause", &result);

    Ok(())
}

// ----------
// | Ledger |
// ----------

/// Marks a deployment as the active one on its network
pub fn mark_active(
    args: MarkActiveArgs,
    network: Network,
    deployments_path: &Path,
) -> Result<(), ScriptError> {
    let mut ledger = DeploymentLedger::read(deployments_path)?;
    ledger.set_active(network.as_str(), args.id)?;
    ledger.write(deployments_path)?;

    info!("Deployment #{} is now active on {}", args.id, network);
    Ok(())
}

/// Lists the deployments of a network
pub fn list_deployments(network: Network, deployments_path: &Path) -> Result<(), ScriptError> {
    let ledger = DeploymentLedger::read(deployments_path)?;
    let deployments = ledger.deployments(network.as_str());
    if deployments.is_empty() {
        info!("No deployments found for {}", network);
        return Ok(());
    }

    for d in deployments {
        info!(
            "#{}{} created {} package {}",
            d.id,
            if d.active { " (active)" } else { "" },
            d.created_at,
            d.package.as_deref().unwrap_or("N/A"),
        );
        for (role, id) in &d.objects {
            info!("    {}: {}", role, id);
        }
        for (token_type, token) in &d.whitelisted_tokens {
            info!(
                "    whitelisted {} [{}, {}] supply {}",
                token_type, token.min_amount, token.max_amount, token.initialized_supply
            );
        }
    }

    Ok(())
}

// -----------
// | Helpers |
// -----------

/// Validates that a token type was provided
fn require_token_type(token_type: &str) -> Result<&str, ScriptError> {
    let token_type = token_type.trim();
    if token_type.is_empty() {
        return Err(ScriptError::InvalidParameter(
            "token type not configured".to_string(),
        ));
    }

    Ok(token_type)
}
