//! Constants used in the bridge scripts

// ----------
// | LEDGER |
// ----------

/// The default path of the deployment ledger
pub const DEFAULT_DEPLOYMENTS_PATH: &str = "deployment.json";

/// The role under which a published package is keyed in a transaction's created objects
pub const PACKAGE_KEY: &str = "Package";

/// The upgrade capability object key in the `Objects` of a deployment
pub const UPGRADE_CAP_KEY: &str = "UpgradeCap";

/// The bridge object key in the `Objects` of a deployment
pub const BRIDGE_KEY: &str = "Bridge";

/// The bridge safe object key in the `Objects` of a deployment
pub const BRIDGE_SAFE_KEY: &str = "BridgeSafe";

/// The bridge capability object key in the `Objects` of a deployment
pub const BRIDGE_CAP_KEY: &str = "BridgeCap";

/// The `FromCoinCap` capability object key in the `Objects` of a deployment
pub const FROM_COIN_CAP_KEY: &str = "FromCoinCap";

// ------------
// | EXPLORER |
// ------------

/// The base URL of the block explorer used for transaction links
pub const EXPLORER_BASE_URL: &str = "https://suiscan.xyz";

// --------------
// | PARAMETERS |
// --------------

/// The minimum number of relayer signatures the bridge may require
pub const MIN_QUORUM: u64 = 3;

/// The number of bytes in a relayer's ed25519 public key
pub const RELAYER_KEY_LEN: usize = 32;

/// The default minimum transfer amount for a newly whitelisted token
pub const DEFAULT_MIN_AMOUNT: &str = "1";

/// The default maximum transfer amount for a newly whitelisted token
pub const DEFAULT_MAX_AMOUNT: &str = "1000000000000000";

/// The default wait after submitting a transaction, in milliseconds
pub const DEFAULT_SETTLE_DELAY_MS: u64 = 2000;

/// The default gas budget for a transaction, in MIST
pub const DEFAULT_GAS_BUDGET: u64 = 500_000_000;

// -------
// | SUI |
// -------

/// The name of the `sui` command
pub const SUI_COMMAND: &str = "sui";

/// The manifest file of a Move package
pub const MOVE_MANIFEST: &str = "Move.toml";

/// The `sui move` subcommand
pub const MOVE_SUBCOMMAND: &str = "move";

/// The `sui client` subcommand
pub const CLIENT_SUBCOMMAND: &str = "client";

/// Flag asking the Sui CLI to build unpublished dependencies along with the package
pub const UNPUBLISHED_DEPENDENCIES_FLAG: &str = "--with-unpublished-dependencies";

/// Flag asking `sui move build` to dump the compiled bytecode as base64 JSON
pub const DUMP_BYTECODE_FLAG: &str = "--dump-bytecode-as-base64";

/// The status reported in the effects of a successful transaction
pub const SUCCESS_STATUS: &str = "success";

/// The Move module holding the bridge entry functions
pub const BRIDGE_MODULE: &str = "bridge";

/// The Move module holding the bridge safe entry functions
pub const SAFE_MODULE: &str = "safe";

/// The bridge initialization function
pub const INITIALIZE_BRIDGE_FN: &str = "initialize";

/// The safe initialization function
pub const INITIALIZE_SAFE_FN: &str = "initialize";

/// The token whitelisting function
pub const WHITELIST_TOKEN_FN: &str = "whitelist_token";

/// The whitelist removal function
pub const REMOVE_WHITELIST_FN: &str = "remove_token_from_whitelist";

/// The token supply initialization function
pub const INIT_SUPPLY_FN: &str = "init_supply";

/// The batch size setter
pub const SET_BATCH_SIZE_FN: &str = "set_batch_size";

/// The batch timeout setter
pub const SET_BATCH_TIMEOUT_FN: &str = "set_batch_timeout_ms";

/// The quorum setter
pub const SET_QUORUM_FN: &str = "set_quorum";

/// The bridge unpause function
pub const UNPAUSE_FN: &str = "unpause";
