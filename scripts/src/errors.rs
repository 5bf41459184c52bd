//! Definitions of errors that can occur during the execution of the bridge management scripts

use std::{
    error::Error,
    fmt::{self, Display, Formatter},
};

/// Errors that can occur during the execution of the bridge management scripts
#[derive(Debug)]
pub enum ScriptError {
    /// Error reading the `deployment.json` file
    ReadDeployments(String),
    /// Error writing the `deployment.json` file
    WriteDeployments(String),
    /// The ledger holds no deployments for the given network
    NoDeployments(String),
    /// The deployment with the given ID is not in the ledger
    DeploymentNotFound {
        /// The network the deployment was looked up in
        network: String,
        /// The ID of the missing deployment
        id: u64,
    },
    /// No active deployment, or the selected deployment has no package
    NoActiveDeployment,
    /// A required object is missing from the selected deployment
    MissingObject(String),
    /// A command parameter is absent or out of range
    InvalidParameter(String),
    /// The client is pointed at a different network than the one configured
    NetworkMismatch {
        /// The network the scripts are configured for
        expected: String,
        /// The network the client is connected to
        actual: String,
    },
    /// The package manifest is published at a different address than the one
    /// being deployed to
    PublishedAtMismatch {
        /// The `published-at` address of the manifest, if any
        published_at: Option<String>,
        /// The address the package was expected to be published at, if any
        expected: Option<String>,
    },
    /// The token has not been whitelisted in the selected deployment
    TokenNotWhitelisted(String),
    /// An upgrade transaction did not publish a new package
    MissingUpgradedPackage,
    /// Error building the Move package
    PackageBuild(String),
    /// Error initializing the bridge client
    ClientInitialization(String),
    /// Error submitting a transaction or calling the client
    ContractInteraction(String),
    /// A submitted transaction was executed but did not succeed
    TransactionFailed {
        /// The digest of the failed transaction
        digest: String,
        /// The failure reported in the transaction effects
        reason: String,
    },
    /// Error de/serializing data
    Serde(String),
}

impl ScriptError {
    /// Whether the error was raised by local validation, before any
    /// transaction was submitted
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            ScriptError::NoActiveDeployment
                | ScriptError::MissingObject(_)
                | ScriptError::InvalidParameter(_)
                | ScriptError::NetworkMismatch { .. }
                | ScriptError::PublishedAtMismatch { .. }
                | ScriptError::PackageBuild(_)
        )
    }

    /// A follow-up hint for the operator, if one applies
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            ScriptError::NoActiveDeployment => Some(
                "deploy the package first with `bridge-scripts deploy`, then select it with \
                 `bridge-scripts mark-active --id <id>` or `--deployment-id <id>`",
            ),
            ScriptError::TokenNotWhitelisted(_) => Some(
                "the token must be whitelisted before initializing its supply, \
                 see `bridge-scripts whitelist-token`",
            ),
            ScriptError::NetworkMismatch { .. } => {
                Some("switch the sui client environment with `sui client switch --env <network>`")
            }
            ScriptError::PublishedAtMismatch { .. } => Some(
                "set `published-at` in Move.toml to the selected deployment's package, or select \
                 the matching deployment with `--deployment-id <id>`",
            ),
            _ => None,
        }
    }
}

impl Display for ScriptError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ScriptError::ReadDeployments(s) => write!(f, "error reading deployments: {}", s),
            ScriptError::WriteDeployments(s) => write!(f, "error writing deployments: {}", s),
            ScriptError::NoDeployments(network) => {
                write!(f, "no deployments found for network {}", network)
            }
            ScriptError::DeploymentNotFound { network, id } => {
                write!(f, "deployment #{} not found for network {}", id, network)
            }
            ScriptError::NoActiveDeployment => write!(f, "no active deployment found"),
            ScriptError::MissingObject(role) => {
                write!(f, "object {} not found in deployment", role)
            }
            ScriptError::InvalidParameter(s) => write!(f, "invalid parameter: {}", s),
            ScriptError::NetworkMismatch { expected, actual } => write!(
                f,
                "client is connected to {}, expected {}",
                actual, expected
            ),
            ScriptError::PublishedAtMismatch {
                published_at,
                expected,
            } => write!(
                f,
                "package manifest is published at {}, expected {}",
                published_at.as_deref().unwrap_or("no address"),
                expected.as_deref().unwrap_or("an unpublished package")
            ),
            ScriptError::TokenNotWhitelisted(token) => {
                write!(f, "token {} is not whitelisted yet", token)
            }
            ScriptError::MissingUpgradedPackage => {
                write!(f, "no new package ID found in upgrade result")
            }
            ScriptError::PackageBuild(s) => write!(f, "error building package: {}", s),
            ScriptError::ClientInitialization(s) => write!(f, "error initializing client: {}", s),
            ScriptError::ContractInteraction(s) => {
                write!(f, "error interacting with contract: {}", s)
            }
            ScriptError::TransactionFailed { digest, reason } => {
                write!(f, "transaction {} failed: {}", digest, reason)
            }
            ScriptError::Serde(s) => write!(f, "error de/serializing data: {}", s),
        }
    }
}

impl Error for ScriptError {}
