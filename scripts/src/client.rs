//! The interface through which the scripts submit transactions to the bridge

use async_trait::async_trait;

use crate::{
    errors::ScriptError,
    types::{Amount, CompiledPackage, RelayerKey, TransactionResult},
};

/// The on-chain objects an admin call operates on
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallTarget {
    /// The address of the bridge package
    pub package: String,
    /// The shared object the call mutates, either the bridge or the bridge safe
    pub object: String,
    /// The capability authorizing the call
    pub cap: String,
}

/// The parameters with which a token is whitelisted
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TokenWhitelist {
    /// The fully qualified Move type of the token
    pub token_type: String,
    /// The minimum amount of a single transfer
    pub min_amount: Amount,
    /// The maximum amount of a single transfer
    pub max_amount: Amount,
    /// Whether the token is native to Sui
    pub is_native: bool,
    /// Whether bridged tokens are locked rather than burned
    pub is_locked: bool,
}

/// A client able to sign and submit bridge transactions.
///
/// Each method submits exactly one transaction and resolves once it has been
/// executed, returning its digest and the objects it created. A transaction
/// that executes but fails must be reported as an error.
#[async_trait]
pub trait BridgeClient {
    /// Publishes the bridge package
    async fn publish(&self, package: &CompiledPackage) -> Result<TransactionResult, ScriptError>;

    /// Upgrades the package at `current_package`, authorized by `upgrade_cap`
    async fn upgrade(
        &self,
        package: &CompiledPackage,
        current_package: &str,
        upgrade_cap: &str,
    ) -> Result<TransactionResult, ScriptError>;

    /// Initializes the bridge with its relayer set and quorum
    async fn initialize_bridge(
        &self,
        target: &CallTarget,
        relayer_keys: &[RelayerKey],
        quorum: u64,
    ) -> Result<TransactionResult, ScriptError>;

    /// Initializes the bridge safe
    async fn initialize_safe(
        &self,
        package: &str,
        from_coin_cap: &str,
    ) -> Result<TransactionResult, ScriptError>;

    /// Initializes supply of a whitelisted token into the bridge safe
    async fn init_supply(
        &self,
        target: &CallTarget,
        token_type: &str,
        amount: &Amount,
        recipient: &str,
    ) -> Result<TransactionResult, ScriptError>;

    /// Whitelists a token on the bridge safe
    async fn whitelist_token(
        &self,
        target: &CallTarget,
        token: &TokenWhitelist,
    ) -> Result<TransactionResult, ScriptError>;

    /// Removes a token from the bridge safe's whitelist
    async fn remove_whitelist(
        &self,
        target: &CallTarget,
        token_type: &str,
    ) -> Result<TransactionResult, ScriptError>;

    /// Sets the number of transfers in a batch
    async fn set_batch_size(
        &self,
        target: &CallTarget,
        batch_size: u64,
    ) -> Result<TransactionResult, ScriptError>;

    /// Sets the time after which a partial batch is closed
    async fn set_batch_timeout(
        &self,
        target: &CallTarget,
        timeout_ms: u64,
    ) -> Result<TransactionResult, ScriptError>;

    /// Sets the number of relayer signatures required by the bridge
    async fn set_quorum(
        &self,
        target: &CallTarget,
        quorum: u64,
    ) -> Result<TransactionResult, ScriptError>;

    /// Unpauses the bridge
    async fn unpause(&self, target: &CallTarget) -> Result<TransactionResult, ScriptError>;
}
