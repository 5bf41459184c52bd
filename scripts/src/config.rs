//! The configuration shared by every command

use std::{path::PathBuf, time::Duration};

use tracing::warn;

use crate::{
    client::CallTarget,
    errors::ScriptError,
    ledger::{DeploymentLedger, DeploymentRecord},
    types::Network,
};

/// The configuration a command runs with: who submits transactions, to which
/// network, and against which deployment
#[derive(Clone, Debug)]
pub struct ScriptConfig {
    /// The network the deployment lives on
    pub network: Network,
    /// The address of the admin submitting transactions
    pub admin: String,
    /// The path of the deployment ledger
    pub deployments_path: PathBuf,
    /// A snapshot of the selected deployment, taken when the config was loaded
    pub deployment: Option<DeploymentRecord>,
    /// How long to wait after submitting a transaction
    pub settle_delay: Duration,
}

impl ScriptConfig {
    /// Loads the configuration, selecting the deployment with the given ID,
    /// or the network's active deployment if no ID is given
    pub fn load(
        network: Network,
        admin: String,
        deployments_path: PathBuf,
        deployment_id: Option<u64>,
        settle_delay: Duration,
    ) -> Result<Self, ScriptError> {
        let ledger = DeploymentLedger::read(&deployments_path)?;
        let deployment = match deployment_id {
            Some(id) => match ledger.deployment(network.as_str(), id) {
                Ok(record) => Some(record.clone()),
                Err(e) => {
                    warn!("Ignoring selected deployment: {}", e);
                    None
                }
            },
            None => ledger.active_deployment(network.as_str()).cloned(),
        };

        Ok(Self {
            network,
            admin,
            deployments_path,
            deployment,
            settle_delay,
        })
    }

    /// The selected deployment, which must have a published package
    pub fn deployment(&self) -> Result<&DeploymentRecord, ScriptError> {
        let deployment = self
            .deployment
            .as_ref()
            .ok_or(ScriptError::NoActiveDeployment)?;
        deployment.require_package()?;

        Ok(deployment)
    }

    /// The package of the selected deployment
    pub fn package(&self) -> Result<&str, ScriptError> {
        self.deployment()?.require_package()
    }

    /// An object of the selected deployment
    pub fn object(&self, role: &str) -> Result<&str, ScriptError> {
        self.deployment()?.require_object(role)
    }

    /// The target of an admin call on the object with role `object`,
    /// authorized by the capability with role `cap`
    pub fn call_target(&self, object: &str, cap: &str) -> Result<CallTarget, ScriptError> {
        Ok(CallTarget {
            package: self.package()?.to_string(),
            object: self.object(object)?.to_string(),
            cap: self.object(cap)?.to_string(),
        })
    }
}
