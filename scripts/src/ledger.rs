//! The deployment ledger: a JSON document recording, per network, every
//! deployment of the bridge package and the objects created for it.
//!
//! The ledger is read and rewritten wholesale by each command. There is no
//! locking, so commands must not be run concurrently against the same file.

use std::{fs, path::Path};

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::{errors::ScriptError, types::Amount};

/// The deployment ledger, keyed by network name
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeploymentLedger {
    /// The deployments of each network
    pub networks: IndexMap<String, NetworkDeployments>,
}

/// The deployments made on a single network
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NetworkDeployments {
    /// The deployments, in the order they were made
    #[serde(default)]
    pub deployments: Vec<DeploymentRecord>,
    /// Any other keys, preserved as-is
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A single publication of the bridge package and its associated objects
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentRecord {
    /// The ID of the deployment, unique within its network
    pub id: u64,
    /// When the package was published
    pub created_at: DateTime<Utc>,
    /// Whether this is the deployment the scripts operate on
    #[serde(default)]
    pub active: bool,
    /// The current address of the package
    #[serde(rename = "Package", default, skip_serializing_if = "Option::is_none")]
    pub package: Option<String>,
    /// The addresses of the package's objects, keyed by role
    #[serde(rename = "Objects", default)]
    pub objects: IndexMap<String, String>,
    /// The operators of the deployment
    #[serde(rename = "Operators", default)]
    pub operators: Operators,
    /// The digest of the publishing transaction
    #[serde(default)]
    pub digest: String,
    /// The tokens whitelisted on the bridge, keyed by token type
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub whitelisted_tokens: IndexMap<String, WhitelistedToken>,
    /// The most recent upgrade of the package
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_upgrade: Option<LastUpgrade>,
    /// Any other keys, preserved as-is
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The operators of a deployment
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Operators {
    /// The address of the admin that published the package
    #[serde(rename = "Admin", default)]
    pub admin: String,
    /// Any other operators, preserved as-is
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The configuration of a whitelisted token
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WhitelistedToken {
    /// The minimum amount of a single transfer
    pub min_amount: Amount,
    /// The maximum amount of a single transfer
    pub max_amount: Amount,
    /// Whether the token is native to Sui
    pub is_native: bool,
    /// Whether bridged tokens are locked rather than burned
    pub is_locked: bool,
    /// The total supply initialized into the bridge safe
    #[serde(default)]
    pub initialized_supply: Amount,
}

/// A record of the most recent package upgrade
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LastUpgrade {
    /// The package address before the upgrade
    pub previous_package: Option<String>,
    /// When the upgrade was performed
    pub upgraded_at: DateTime<Utc>,
    /// The digest of the upgrade transaction
    pub digest: String,
}

impl DeploymentLedger {
    /// Reads the ledger from the given path.
    ///
    /// A missing or empty file is read as an empty ledger.
    pub fn read(path: &Path) -> Result<Self, ScriptError> {
        if !path.exists() {
            debug!("No ledger at {}, starting empty", path.display());
            return Ok(Self::default());
        }

        let contents =
            fs::read_to_string(path).map_err(|e| ScriptError::ReadDeployments(e.to_string()))?;
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }

        serde_json::from_str(&contents).map_err(|e| {
            ScriptError::ReadDeployments(format!("could not parse {}: {}", path.display(), e))
        })
    }

    /// Rewrites the whole ledger at the given path
    pub fn write(&self, path: &Path) -> Result<(), ScriptError> {
        let mut contents = serde_json::to_string_pretty(self)
            .map_err(|e| ScriptError::WriteDeployments(e.to_string()))?;
        contents.push('\n');

        fs::write(path, contents).map_err(|e| ScriptError::WriteDeployments(e.to_string()))
    }

    /// The deployments made on the given network, oldest first
    pub fn deployments(&self, network: &str) -> &[DeploymentRecord] {
        self.networks
            .get(network)
            .map(|n| n.deployments.as_slice())
            .unwrap_or_default()
    }

    /// The ID to assign to the next deployment on the given network
    pub fn next_deployment_id(&self, network: &str) -> u64 {
        self.deployments(network)
            .iter()
            .map(|d| d.id)
            .max()
            .map_or(1, |id| id + 1)
    }

    /// Appends a deployment to the given network
    pub fn push_deployment(&mut self, network: &str, record: DeploymentRecord) {
        self.networks
            .entry(network.to_string())
            .or_default()
            .deployments
            .push(record);
    }

    /// Looks up the deployment with the given ID
    pub fn deployment(&self, network: &str, id: u64) -> Result<&DeploymentRecord, ScriptError> {
        let deployments = self.deployments(network);
        if deployments.is_empty() {
            return Err(ScriptError::NoDeployments(network.to_string()));
        }

        deployments
            .iter()
            .find(|d| d.id == id)
            .ok_or_else(|| ScriptError::DeploymentNotFound {
                network: network.to_string(),
                id,
            })
    }

    /// Looks up the deployment with the given ID for mutation
    pub fn deployment_mut(
        &mut self,
        network: &str,
        id: u64,
    ) -> Result<&mut DeploymentRecord, ScriptError> {
        let deployments = match self.networks.get_mut(network) {
            Some(n) if !n.deployments.is_empty() => &mut n.deployments,
            _ => return Err(ScriptError::NoDeployments(network.to_string())),
        };

        deployments
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or_else(|| ScriptError::DeploymentNotFound {
                network: network.to_string(),
                id,
            })
    }

    /// The active deployment of the given network.
    ///
    /// Should a hand-edited ledger mark several deployments active, the most
    /// recent one wins.
    pub fn active_deployment(&self, network: &str) -> Option<&DeploymentRecord> {
        self.deployments(network).iter().rev().find(|d| d.active)
    }

    /// Marks the deployment with the given ID as the only active one on its network
    pub fn set_active(&mut self, network: &str, id: u64) -> Result<(), ScriptError> {
        // Validate the ID before touching any record
        self.deployment(network, id)?;

        for record in self
            .networks
            .get_mut(network)
            .into_iter()
            .flat_map(|n| n.deployments.iter_mut())
        {
            record.active = record.id == id;
        }

        Ok(())
    }
}

impl DeploymentRecord {
    /// Creates an inactive deployment record
    pub fn new(
        id: u64,
        created_at: DateTime<Utc>,
        package: Option<String>,
        objects: IndexMap<String, String>,
        admin: String,
        digest: String,
    ) -> Self {
        Self {
            id,
            created_at,
            active: false,
            package,
            objects,
            operators: Operators {
                admin,
                extra: Map::new(),
            },
            digest,
            whitelisted_tokens: IndexMap::new(),
            last_upgrade: None,
            extra: Map::new(),
        }
    }

    /// The package address, which must be present for the deployment to be usable
    pub fn require_package(&self) -> Result<&str, ScriptError> {
        self.package
            .as_deref()
            .ok_or(ScriptError::NoActiveDeployment)
    }

    /// The address of the object with the given role
    pub fn require_object(&self, role: &str) -> Result<&str, ScriptError> {
        self.objects
            .get(role)
            .map(String::as_str)
            .ok_or_else(|| ScriptError::MissingObject(role.to_string()))
    }

    /// Merges newly created objects into the deployment, replacing existing roles
    pub fn merge_objects(&mut self, objects: impl IntoIterator<Item = (String, String)>) {
        self.objects.extend(objects);
    }

    /// Records a token as whitelisted, keeping any supply already initialized
    pub fn whitelist_token(
        &mut self,
        token_type: &str,
        min_amount: Amount,
        max_amount: Amount,
        is_native: bool,
        is_locked: bool,
    ) -> &WhitelistedToken {
        let token = self
            .whitelisted_tokens
            .entry(token_type.to_string())
            .or_default();
        token.min_amount = min_amount;
        token.max_amount = max_amount;
        token.is_native = is_native;
        token.is_locked = is_locked;
        token
    }

    /// Removes a token from the whitelist, returning its entry if it was present
    pub fn remove_whitelisted_token(&mut self, token_type: &str) -> Option<WhitelistedToken> {
        self.whitelisted_tokens.shift_remove(token_type)
    }

    /// Adds to the initialized supply of a whitelisted token, returning the new total
    pub fn add_initialized_supply(
        &mut self,
        token_type: &str,
        amount: &Amount,
    ) -> Result<Amount, ScriptError> {
        let token = self
            .whitelisted_tokens
            .get_mut(token_type)
            .ok_or_else(|| ScriptError::TokenNotWhitelisted(token_type.to_string()))?;

        token.initialized_supply = &token.initialized_supply + amount;
        Ok(token.initialized_supply.clone())
    }

    /// Points the deployment at an upgraded package, returning the previous package
    pub fn record_upgrade(
        &mut self,
        new_package: String,
        digest: String,
        upgraded_at: DateTime<Utc>,
    ) -> Option<String> {
        let previous_package = self.package.replace(new_package);
        self.last_upgrade = Some(LastUpgrade {
            previous_package: previous_package.clone(),
            upgraded_at,
            digest,
        });

        previous_package
    }
}

/// Applies a mutation to a single deployment in the ledger at `path`.
///
/// The ledger is read, the deployment located by ID, the mutation applied, and
/// the whole ledger written back. If the deployment cannot be found or the
/// mutation fails, the file is left untouched.
pub fn update_deployment<T>(
    path: &Path,
    network: &str,
    id: u64,
    mutation: impl FnOnce(&mut DeploymentRecord) -> Result<T, ScriptError>,
) -> Result<T, ScriptError> {
    let mut ledger = DeploymentLedger::read(path)?;
    let record = ledger.deployment_mut(network, id)?;
    let res = mutation(record)?;

    ledger.write(path)?;
    debug!("Updated deployment #{} on {} in {}", id, network, path.display());

    Ok(res)
}
