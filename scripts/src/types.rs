//! Type definitions used throughout the scripts

use std::{
    fmt::{self, Display},
    ops::Add,
    path::PathBuf,
    str::FromStr,
};

use clap::ValueEnum;
use indexmap::IndexMap;
use num_bigint::BigUint;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{
    constants::{PACKAGE_KEY, RELAYER_KEY_LEN},
    errors::ScriptError,
};

/// The Sui networks the bridge can be deployed to.
///
/// The lowercase name doubles as the network key in the deployment ledger
/// and as the network segment of explorer links.
#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
pub enum Network {
    /// Sui mainnet
    Mainnet,
    /// Sui testnet
    Testnet,
    /// Sui devnet
    Devnet,
    /// A local Sui network
    Localnet,
}

impl Network {
    /// The name of the network, as used in the ledger
    pub fn as_str(&self) -> &'static str {
        match self {
            Network::Mainnet => "mainnet",
            Network::Testnet => "testnet",
            Network::Devnet => "devnet",
            Network::Localnet => "localnet",
        }
    }
}

impl Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A token amount of arbitrary precision.
///
/// Amounts are kept as decimal strings in the ledger so that large supplies
/// never lose precision.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Amount(pub BigUint);

impl Amount {
    /// The zero amount
    pub fn zero() -> Self {
        Amount(BigUint::default())
    }

    /// Whether the amount is zero
    pub fn is_zero(&self) -> bool {
        self.0 == BigUint::default()
    }
}

impl FromStr for Amount {
    type Err = ScriptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Ok(Amount::zero());
        }

        if !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ScriptError::InvalidParameter(format!(
                "{} is not a decimal amount",
                s
            )));
        }

        BigUint::from_str(s)
            .map(Amount)
            .map_err(|e| ScriptError::InvalidParameter(e.to_string()))
    }
}

impl From<u64> for Amount {
    fn from(value: u64) -> Self {
        Amount(BigUint::from(value))
    }
}

impl Add<&Amount> for &Amount {
    type Output = Amount;

    fn add(self, rhs: &Amount) -> Amount {
        Amount(&self.0 + &rhs.0)
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_string())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        /// Amounts written by hand may be numbers rather than strings.
        ///
        /// JSON numbers are accepted up to `u64::MAX`; larger amounts must be
        /// written as decimal strings.
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum AmountRepr {
            /// A decimal string
            Str(String),
            /// A JSON number, at most `u64::MAX`
            Num(u64),
        }

        match AmountRepr::deserialize(deserializer)? {
            AmountRepr::Str(s) => Amount::from_str(&s).map_err(serde::de::Error::custom),
            AmountRepr::Num(n) => Ok(Amount::from(n)),
        }
    }
}

/// A relayer's ed25519 public key
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RelayerKey(pub [u8; RELAYER_KEY_LEN]);

impl FromStr for RelayerKey {
    type Err = ScriptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let stripped = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(stripped).map_err(|e| {
            ScriptError::InvalidParameter(format!("relayer key {} is not hex: {}", s, e))
        })?;

        let key: [u8; RELAYER_KEY_LEN] = bytes.try_into().map_err(|bytes: Vec<u8>| {
            ScriptError::InvalidParameter(format!(
                "relayer key {} is {} bytes, expected {}",
                s,
                bytes.len(),
                RELAYER_KEY_LEN
            ))
        })?;

        Ok(RelayerKey(key))
    }
}

impl Display for RelayerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

/// The outcome of a submitted transaction
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TransactionResult {
    /// The transaction digest
    pub digest: String,
    /// The objects created by the transaction, keyed by role.
    ///
    /// A published package is keyed as `Package`, every other object by the
    /// name of its Move struct.
    pub created_objects: IndexMap<String, String>,
}

impl TransactionResult {
    /// The package published by the transaction, if any
    pub fn package(&self) -> Option<&str> {
        self.created_objects.get(PACKAGE_KEY).map(String::as_str)
    }

    /// The created objects other than the published package
    pub fn objects(&self) -> IndexMap<String, String> {
        self.created_objects
            .iter()
            .filter(|(role, _)| role.as_str() != PACKAGE_KEY)
            .map(|(role, id)| (role.clone(), id.clone()))
            .collect()
    }
}

/// A compiled Move package, as dumped by `sui move build`
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct CompiledPackage {
    /// The base64-encoded bytecode of each module
    pub modules: Vec<String>,
    /// The IDs of the packages this package depends on
    pub dependencies: Vec<String>,
    /// The content digest of the package
    pub digest: Vec<u8>,
    /// The directory the package was built from
    #[serde(skip)]
    pub path: PathBuf,
}

impl CompiledPackage {
    /// The content digest in hex form
    pub fn digest_hex(&self) -> String {
        hex::encode(&self.digest)
    }
}
