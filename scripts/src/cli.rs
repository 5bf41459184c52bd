//! Definitions of CLI arguments and commands for the bridge scripts

use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use clap::{ArgAction, Args, Parser, Subcommand};

use crate::{
    client::BridgeClient,
    commands::{
        deploy, init_bridge, init_safe, init_supply, list_deployments, mark_active,
        remove_whitelist, set_batch_size, set_batch_timeout, set_quorum, unpause, upgrade,
        whitelist_token,
    },
    config::ScriptConfig,
    constants::{
        DEFAULT_DEPLOYMENTS_PATH, DEFAULT_GAS_BUDGET, DEFAULT_MAX_AMOUNT, DEFAULT_MIN_AMOUNT,
        DEFAULT_SETTLE_DELAY_MS, SUI_COMMAND,
    },
    errors::ScriptError,
    sui::SuiCliClient,
    types::{Amount, Network, RelayerKey},
    utils::build_move_package,
};

/// The bridge deployment & administration scripts
#[derive(Parser)]
#[command(author, version, about = "Deploy and administer the Sui bridge")]
pub struct Cli {
    /// The network to operate on
    #[arg(short, long, env = "DEPLOY_ON", default_value_t = Network::Testnet)]
    pub network: Network,

    /// Path to the deployment ledger
    #[arg(short, long, env = "DEPLOYMENTS_PATH", default_value = DEFAULT_DEPLOYMENTS_PATH)]
    pub deployments_path: PathBuf,

    /// ID of the deployment to operate on, overriding the active deployment
    #[arg(long, env = "DEPLOYMENT_ID")]
    pub deployment_id: Option<u64>,

    /// Path to the bridge's Move package
    #[arg(long, env = "PACKAGE_PATH", default_value = ".")]
    pub package_path: PathBuf,

    /// The `sui` binary used to build & submit transactions
    #[arg(long, env = "SUI_BIN", default_value = SUI_COMMAND)]
    pub sui_bin: String,

    /// Gas budget of each transaction, in MIST
    #[arg(long, env = "GAS_BUDGET", default_value_t = DEFAULT_GAS_BUDGET)]
    pub gas_budget: u64,

    /// How long to wait for a transaction to settle, in milliseconds
    #[arg(long, env = "SETTLE_DELAY_MS", default_value_t = DEFAULT_SETTLE_DELAY_MS)]
    pub settle_delay_ms: u64,

    /// The command to run
    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Runs the selected command.
    ///
    /// Ledger commands run offline, on-chain commands first connect to the
    /// local Sui client to learn the admin address.
    pub async fn run(self) -> Result<(), ScriptError> {
        let Cli {
            network,
            deployments_path,
            deployment_id,
            package_path,
            sui_bin,
            gas_budget,
            settle_delay_ms,
            command,
        } = self;

        match command {
            Command::Ledger(command) => command.run(network, &deployments_path),
            Command::OnChain(command) => {
                let client = SuiCliClient::connect(&sui_bin, network, gas_budget).await?;
                let config = ScriptConfig::load(
                    network,
                    client.admin_address().to_string(),
                    deployments_path,
                    deployment_id,
                    Duration::from_millis(settle_delay_ms),
                )?;

                command
                    .run(&config, &client, package_path, &sui_bin)
                    .await
            }
        }
    }
}

/// The scripts' commands
#[derive(Subcommand)]
pub enum Command {
    /// Commands that submit transactions
    #[command(flatten)]
    OnChain(OnChainCommand),
    /// Commands that only touch the deployment ledger
    #[command(flatten)]
    Ledger(LedgerCommand),
}

/// Commands that submit a transaction on behalf of the admin
#[derive(Subcommand)]
pub enum OnChainCommand {
    /// Build & publish the bridge package as a new deployment
    Deploy,
    /// Build the bridge package & upgrade the selected deployment to it
    Upgrade,
    /// Initialize the bridge with its relayer set
    InitBridge(InitBridgeArgs),
    /// Initialize the bridge safe
    InitSafe(InitSafeArgs),
    /// Initialize supply of a whitelisted token
    InitSupply(InitSupplyArgs),
    /// Whitelist a token on the bridge safe
    WhitelistToken(WhitelistTokenArgs),
    /// Remove a token from the bridge safe's whitelist
    RemoveWhitelist(RemoveWhitelistArgs),
    /// Set the number of transfers in a batch
    SetBatchSize(SetBatchSizeArgs),
    /// Set the time after which a partial batch is closed
    SetBatchTimeout(SetBatchTimeoutArgs),
    /// Set the number of relayer signatures the bridge requires
    SetQuorum(SetQuorumArgs),
    /// Unpause the bridge
    Unpause,
}

impl OnChainCommand {
    /// Runs the command against the given configuration & client
    pub async fn run(
        self,
        config: &ScriptConfig,
        client: &impl BridgeClient,
        package_path: PathBuf,
        sui_bin: &str,
    ) -> Result<(), ScriptError> {
        match self {
            OnChainCommand::Deploy => deploy(
                config,
                client,
                build_move_package(&package_path, Some(sui_bin)),
            )
            .await
            .map(|_| ()),
            OnChainCommand::Upgrade => {
                upgrade(
                    config,
                    client,
                    build_move_package(&package_path, Some(sui_bin)),
                )
                .await
            }
            OnChainCommand::InitBridge(args) => init_bridge(args, config, client).await,
            OnChainCommand::InitSafe(args) => init_safe(args, config, client).await,
            OnChainCommand::InitSupply(args) => init_supply(args, config, client).await,
            OnChainCommand::WhitelistToken(args) => whitelist_token(args, config, client).await,
            OnChainCommand::RemoveWhitelist(args) => {
                remove_whitelist(args, config, client).await
            }
            OnChainCommand::SetBatchSize(args) => set_batch_size(args, config, client).await,
            OnChainCommand::SetBatchTimeout(args) => {
                set_batch_timeout(args, config, client).await
            }
            OnChainCommand::SetQuorum(args) => set_quorum(args, config, client).await,
            OnChainCommand::Unpause => unpause(config, client).await,
        }
    }
}

/// Commands that read or edit the deployment ledger without a client
#[derive(Subcommand)]
pub enum LedgerCommand {
    /// Mark a deployment as the active one on its network
    MarkActive(MarkActiveArgs),
    /// List the deployments of the network
    List,
}

impl LedgerCommand {
    /// Runs the command against the ledger at `deployments_path`
    pub fn run(self, network: Network, deployments_path: &Path) -> Result<(), ScriptError> {
        match self {
            LedgerCommand::MarkActive(args) => mark_active(args, network, deployments_path),
            LedgerCommand::List => list_deployments(network, deployments_path),
        }
    }
}

/// Initialize the bridge with its relayer set
#[derive(Args)]
pub struct InitBridgeArgs {
    /// Hex-encoded ed25519 public keys of the relayers, comma separated
    #[arg(
        short,
        long = "relayer-keys",
        env = "RELAYER_PUBLIC_KEYS",
        value_delimiter = ',',
        num_args = 1..
    )]
    pub relayer_keys: Vec<RelayerKey>,

    /// Number of relayer signatures required to execute a batch
    #[arg(short, long, env = "QUORUM")]
    pub quorum: u64,
}

/// Initialize the bridge safe
#[derive(Args)]
pub struct InitSafeArgs {
    /// The treasury capability to initialize the safe with, overriding the one
    /// recorded for the deployment
    #[arg(long, env = "FROM_COIN_CAP")]
    pub from_coin_cap: Option<String>,
}

/// Initialize supply of a whitelisted token
#[derive(Args)]
pub struct InitSupplyArgs {
    /// Fully qualified Move type of the token
    #[arg(short, long, env = "TOKEN_TYPE")]
    pub token_type: String,

    /// Amount of the token to mint into the safe
    #[arg(short, long, env = "COIN_AMOUNT")]
    pub amount: Amount,
}

/// Whitelist a token on the bridge safe
#[derive(Args)]
pub struct WhitelistTokenArgs {
    /// Fully qualified Move type of the token
    #[arg(short, long, env = "TOKEN_TYPE")]
    pub token_type: String,

    /// Minimum amount of a single transfer
    #[arg(long, env = "MIN_AMOUNT", default_value = DEFAULT_MIN_AMOUNT)]
    pub min_amount: Amount,

    /// Maximum amount of a single transfer
    #[arg(long, env = "MAX_AMOUNT", default_value = DEFAULT_MAX_AMOUNT)]
    pub max_amount: Amount,

    /// Whether the token is native to Sui
    #[arg(long, env = "IS_NATIVE", default_value_t = true, action = ArgAction::Set)]
    pub is_native: bool,

    /// Whether bridged tokens are locked rather than burned
    #[arg(long, env = "IS_LOCKED", default_value_t = false, action = ArgAction::Set)]
    pub is_locked: bool,
}

/// Remove a token from the bridge safe's whitelist
#[derive(Args)]
pub struct RemoveWhitelistArgs {
    /// Fully qualified Move type of the token
    #[arg(short, long, env = "TOKEN_TYPE")]
    pub token_type: String,
}

/// Set the number of transfers in a batch
#[derive(Args)]
pub struct SetBatchSizeArgs {
    /// The new batch size
    #[arg(short, long, env = "BATCH_SIZE")]
    pub batch_size: u64,
}

/// Set the time after which a partial batch is closed
#[derive(Args)]
pub struct SetBatchTimeoutArgs {
    /// The new timeout, in milliseconds
    #[arg(short, long, env = "BATCH_TIMEOUT_MS")]
    pub timeout_ms: u64,
}

/// Set the number of relayer signatures the bridge requires
#[derive(Args)]
pub struct SetQuorumArgs {
    /// The new quorum
    #[arg(short, long, env = "QUORUM")]
    pub quorum: u64,
}

/// Mark a deployment as the active one on its network
#[derive(Args)]
pub struct MarkActiveArgs {
    /// ID of the deployment
    #[arg(short, long)]
    pub id: u64,
}
