//! A [`BridgeClient`] that drives the `sui` command line tool.
//!
//! Signing, gas selection, and submission are left to the CLI, which uses the
//! keystore and environment of the local Sui client configuration. The active
//! address of that configuration is the admin of the deployment.

use std::{ffi::OsString, fs, path::Path};

use async_trait::async_trait;
use indexmap::IndexMap;
use itertools::Itertools;
use serde::Deserialize;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::{
    client::{BridgeClient, CallTarget, TokenWhitelist},
    constants::{
        BRIDGE_MODULE, CLIENT_SUBCOMMAND, INITIALIZE_BRIDGE_FN, INITIALIZE_SAFE_FN,
        INIT_SUPPLY_FN, MOVE_MANIFEST, PACKAGE_KEY, REMOVE_WHITELIST_FN, SAFE_MODULE, SET_BATCH_SIZE_FN,
        SET_BATCH_TIMEOUT_FN, SET_QUORUM_FN, SUCCESS_STATUS, UNPAUSE_FN,
        UNPUBLISHED_DEPENDENCIES_FLAG, WHITELIST_TOKEN_FN,
    },
    errors::ScriptError,
    types::{Amount, CompiledPackage, Network, RelayerKey, TransactionResult},
    utils::command_stdout,
};

/// A bridge client submitting transactions through the `sui` CLI
#[derive(Clone, Debug)]
pub struct SuiCliClient {
    /// The `sui` binary to invoke
    sui_bin: String,
    /// The gas budget of each transaction, in MIST
    gas_budget: u64,
    /// The active address of the CLI
    admin: String,
}

/// A call to a Move entry function
struct MoveCall<'a> {
    /// The package defining the function
    package: &'a str,
    /// The module defining the function
    module: &'a str,
    /// The name of the function
    function: &'a str,
    /// The type arguments of the call
    type_args: Vec<String>,
    /// The arguments of the call, in the CLI's string form
    args: Vec<String>,
}

impl SuiCliClient {
    /// Connects to the local Sui client configuration, checking that its
    /// active environment is the given network
    pub async fn connect(
        sui_bin: &str,
        network: Network,
        gas_budget: u64,
    ) -> Result<Self, ScriptError> {
        let active_env = run_cli_query(sui_bin, "active-env").await?;
        if active_env != network.as_str() {
            return Err(ScriptError::NetworkMismatch {
                expected: network.to_string(),
                actual: active_env,
            });
        }

        let admin = run_cli_query(sui_bin, "active-address").await?;
        debug!("Connected to {} as {}", network, admin);

        Ok(Self {
            sui_bin: sui_bin.to_string(),
            gas_budget,
            admin,
        })
    }

    /// The address transactions are signed with
    pub fn admin_address(&self) -> &str {
        &self.admin
    }

    /// Runs a transaction-submitting `sui client` subcommand and parses its output
    async fn execute(
        &self,
        subcommand: &str,
        args: Vec<OsString>,
    ) -> Result<TransactionResult, ScriptError> {
        let mut cmd = Command::new(&self.sui_bin);
        cmd.arg(CLIENT_SUBCOMMAND)
            .arg(subcommand)
            .args(args)
            .arg("--gas-budget")
            .arg(self.gas_budget.to_string())
            .arg("--json");

        let stdout = command_stdout(cmd, ScriptError::ContractInteraction).await?;
        parse_transaction_output(&stdout)
    }

    /// Submits a call to a Move entry function
    async fn call(&self, call: MoveCall<'_>) -> Result<TransactionResult, ScriptError> {
        debug!(
            "Calling {}::{}::{}<{}>({})",
            call.package,
            call.module,
            call.function,
            call.type_args.join(", "),
            call.args.join(", ")
        );

        let mut args: Vec<OsString> = vec![
            "--package".into(),
            call.package.into(),
            "--module".into(),
            call.module.into(),
            "--function".into(),
            call.function.into(),
        ];
        if !call.type_args.is_empty() {
            args.push("--type-args".into());
            args.extend(call.type_args.into_iter().map(OsString::from));
        }
        if !call.args.is_empty() {
            args.push("--args".into());
            args.extend(call.args.into_iter().map(OsString::from));
        }

        self.execute("call", args).await
    }
}

#[async_trait]
impl BridgeClient for SuiCliClient {
    async fn publish(&self, package: &CompiledPackage) -> Result<TransactionResult, ScriptError> {
        check_published_at(&package.path, None)?;

        let args = vec![
            UNPUBLISHED_DEPENDENCIES_FLAG.into(),
            package.path.clone().into_os_string(),
        ];
        self.execute("publish", args).await
    }

    async fn upgrade(
        &self,
        package: &CompiledPackage,
        current_package: &str,
        upgrade_cap: &str,
    ) -> Result<TransactionResult, ScriptError> {
        // The CLI resolves the package being upgraded from the `published-at`
        // address in the package manifest, so it must name the selected package
        check_published_at(&package.path, Some(current_package))?;
        debug!(
            "Upgrading {} to digest {}",
            current_package,
            package.digest_hex()
        );

        let args = vec![
            "--upgrade-capability".into(),
            upgrade_cap.into(),
            UNPUBLISHED_DEPENDENCIES_FLAG.into(),
            package.path.clone().into_os_string(),
        ];
        self.execute("upgrade", args).await
    }

    async fn initialize_bridge(
        &self,
        target: &CallTarget,
        relayer_keys: &[RelayerKey],
        quorum: u64,
    ) -> Result<TransactionResult, ScriptError> {
        self.call(MoveCall {
            package: &target.package,
            module: BRIDGE_MODULE,
            function: INITIALIZE_BRIDGE_FN,
            type_args: vec![],
            args: vec![
                encode_byte_vectors(relayer_keys),
                quorum.to_string(),
                target.object.clone(),
                target.cap.clone(),
            ],
        })
        .await
    }

    async fn initialize_safe(
        &self,
        package: &str,
        from_coin_cap: &str,
    ) -> Result<TransactionResult, ScriptError> {
        self.call(MoveCall {
            package,
            module: SAFE_MODULE,
            function: INITIALIZE_SAFE_FN,
            type_args: vec![],
            args: vec![from_coin_cap.to_string()],
        })
        .await
    }

    async fn init_supply(
        &self,
        target: &CallTarget,
        token_type: &str,
        amount: &Amount,
        recipient: &str,
    ) -> Result<TransactionResult, ScriptError> {
        self.call(MoveCall {
            package: &target.package,
            module: SAFE_MODULE,
            function: INIT_SUPPLY_FN,
            type_args: vec![token_type.to_string()],
            args: vec![
                target.object.clone(),
                target.cap.clone(),
                amount.to_string(),
                recipient.to_string(),
            ],
        })
        .await
    }

    async fn whitelist_token(
        &self,
        target: &CallTarget,
        token: &TokenWhitelist,
    ) -> Result<TransactionResult, ScriptError> {
        self.call(MoveCall {
            package: &target.package,
            module: SAFE_MODULE,
            function: WHITELIST_TOKEN_FN,
            type_args: vec![token.token_type.clone()],
            args: vec![
                target.object.clone(),
                target.cap.clone(),
                token.min_amount.to_string(),
                token.max_amount.to_string(),
                token.is_native.to_string(),
                token.is_locked.to_string(),
            ],
        })
        .await
    }

    async fn remove_whitelist(
        &self,
        target: &CallTarget,
        token_type: &str,
    ) -> Result<TransactionResult, ScriptError> {
        self.call(MoveCall {
            package: &target.package,
            module: SAFE_MODULE,
            function: REMOVE_WHITELIST_FN,
            type_args: vec![token_type.to_string()],
            args: vec![target.object.clone(), target.cap.clone()],
        })
        .await
    }

    async fn set_batch_size(
        &self,
        target: &CallTarget,
        batch_size: u64,
    ) -> Result<TransactionResult, ScriptError> {
        self.call(MoveCall {
            package: &target.package,
            module: SAFE_MODULE,
            function: SET_BATCH_SIZE_FN,
            type_args: vec![],
            args: vec![
                target.object.clone(),
                target.cap.clone(),
                batch_size.to_string(),
            ],
        })
        .await
    }

    async fn set_batch_timeout(
        &self,
        target: &CallTarget,
        timeout_ms: u64,
    ) -> Result<TransactionResult, ScriptError> {
        self.call(MoveCall {
            package: &target.package,
            module: SAFE_MODULE,
            function: SET_BATCH_TIMEOUT_FN,
            type_args: vec![],
            args: vec![
                target.object.clone(),
                target.cap.clone(),
                timeout_ms.to_string(),
            ],
        })
        .await
    }

    async fn set_quorum(
        &self,
        target: &CallTarget,
        quorum: u64,
    ) -> Result<TransactionResult, ScriptError> {
        self.call(MoveCall {
            package: &target.package,
            module: BRIDGE_MODULE,
            function: SET_QUORUM_FN,
            type_args: vec![],
            args: vec![target.object.clone(), target.cap.clone(), quorum.to_string()],
        })
        .await
    }

    async fn unpause(&self, target: &CallTarget) -> Result<TransactionResult, ScriptError> {
        self.call(MoveCall {
            package: &target.package,
            module: BRIDGE_MODULE,
            function: UNPAUSE_FN,
            type_args: vec![],
            args: vec![target.object.clone(), target.cap.clone()],
        })
        .await
    }
}

// -----------
// | Helpers |
// -----------

/// Runs a read-only `sui client` query, returning its trimmed output
async fn run_cli_query(sui_bin: &str, query: &str) -> Result<String, ScriptError> {
    let mut cmd = Command::new(sui_bin);
    cmd.arg(CLIENT_SUBCOMMAND).arg(query);

    let stdout = command_stdout(cmd, ScriptError::ClientInitialization).await?;
    Ok(stdout.trim().to_string())
}

/// The parts of a `Move.toml` manifest read before publishing
#[derive(Deserialize)]
struct MoveManifest {
    /// The `[package]` table
    package: ManifestPackage,
}

/// The `[package]` table of a `Move.toml` manifest
#[derive(Deserialize)]
struct ManifestPackage {
    /// The address the package is published at, if it has been published
    #[serde(rename = "published-at")]
    published_at: Option<String>,
}

/// Reads the `published-at` address of the package manifest under
/// `package_path`. A zero address is treated as unpublished.
pub fn manifest_published_at(package_path: &Path) -> Result<Option<String>, ScriptError> {
    let manifest_path = package_path.join(MOVE_MANIFEST);
    let contents = fs::read_to_string(&manifest_path).map_err(|e| {
        ScriptError::PackageBuild(format!("reading {}: {}", manifest_path.display(), e))
    })?;
    let manifest: MoveManifest = toml::from_str(&contents).map_err(|e| {
        ScriptError::PackageBuild(format!("parsing {}: {}", manifest_path.display(), e))
    })?;

    Ok(manifest
        .package
        .published_at
        .filter(|addr| !normalize_address(addr).is_empty()))
}

/// Checks that the package manifest is published at `expected`, or is
/// unpublished when `expected` is `None`
pub fn check_published_at(package_path: &Path, expected: Option<&str>) -> Result<(), ScriptError> {
    let published_at = manifest_published_at(package_path)?;
    let matches = match (published_at.as_deref(), expected) {
        (None, None) => true,
        (Some(actual), Some(expected)) => normalize_address(actual) == normalize_address(expected),
        _ => false,
    };

    if matches {
        Ok(())
    } else {
        Err(ScriptError::PublishedAtMismatch {
            published_at,
            expected: expected.map(str::to_string),
        })
    }
}

/// Normalizes a Sui address for comparison: lowercase hex without the `0x`
/// prefix or leading zeros
fn normalize_address(addr: &str) -> String {
    let addr = addr.trim();
    let hex = addr
        .strip_prefix("0x")
        .or_else(|| addr.strip_prefix("0X"))
        .unwrap_or(addr);
    hex.trim_start_matches('0').to_lowercase()
}

/// Encodes byte vectors as a `vector<vector<u8>>` CLI argument
fn encode_byte_vectors(keys: &[RelayerKey]) -> String {
    let vectors = keys
        .iter()
        .map(|key| format!("[{}]", key.0.iter().join(",")))
        .join(",");
    format!("[{}]", vectors)
}

/// The JSON output of a transaction-submitting `sui client` command
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TransactionOutput {
    /// The transaction digest
    digest: String,
    /// The effects of the transaction
    effects: Option<TransactionEffects>,
    /// The objects changed by the transaction
    #[serde(default)]
    object_changes: Vec<ObjectChange>,
}

/// The effects of an executed transaction
#[derive(Deserialize)]
struct TransactionEffects {
    /// The execution status
    status: ExecutionStatus,
}

/// The execution status of a transaction
#[derive(Deserialize)]
struct ExecutionStatus {
    /// Either `success` or `failure`
    status: String,
    /// The reason for a failure
    error: Option<String>,
}

/// A single object change of a transaction
#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
enum ObjectChange {
    /// A package was published
    Published {
        /// The ID of the new package
        #[serde(rename = "packageId")]
        package_id: String,
    },
    /// An object was created
    Created {
        /// The Move type of the object
        #[serde(rename = "objectType")]
        object_type: String,
        /// The ID of the object
        #[serde(rename = "objectId")]
        object_id: String,
    },
    /// Any other change, e.g. mutated or deleted objects
    #[serde(other)]
    Other,
}

/// Parses the JSON output of a transaction, failing if the transaction did
/// not execute successfully
pub fn parse_transaction_output(output: &str) -> Result<TransactionResult, ScriptError> {
    let output: TransactionOutput =
        serde_json::from_str(output).map_err(|e| ScriptError::Serde(e.to_string()))?;

    let status = output.effects.map(|e| e.status).ok_or_else(|| {
        ScriptError::ContractInteraction(format!(
            "no effects returned for transaction {}",
            output.digest
        ))
    })?;
    if status.status != SUCCESS_STATUS {
        return Err(ScriptError::TransactionFailed {
            digest: output.digest,
            reason: status.error.unwrap_or(status.status),
        });
    }

    let mut created_objects = IndexMap::new();
    for change in output.object_changes {
        let (role, id) = match change {
            ObjectChange::Published { package_id } => (PACKAGE_KEY.to_string(), package_id),
            ObjectChange::Created {
                object_type,
                object_id,
            } => (object_role(&object_type).to_string(), object_id),
            ObjectChange::Other => continue,
        };

        if let Some(previous) = created_objects.insert(role.clone(), id) {
            warn!("Multiple {} objects created, dropping {}", role, previous);
        }
    }

    Ok(TransactionResult {
        digest: output.digest,
        created_objects,
    })
}

/// The role of an object: the name of its Move struct, without type parameters
pub fn object_role(object_type: &str) -> &str {
    let base = object_type
        .split_once('<')
        .map_or(object_type, |(base, _)| base);
    base.rsplit("::").next().unwrap_or(base)
}
