//! Scripts for deploying, upgrading, and administering the Sui bridge.
//!
//! Deployments are recorded per network in a JSON ledger, and every
//! administrative command operates on the active deployment of its network.

#![deny(missing_docs)]
#![deny(clippy::missing_docs_in_private_items)]

pub mod cli;
pub mod client;
pub mod commands;
pub mod config;
pub mod constants;
pub mod errors;
pub mod ledger;
pub mod sui;
pub mod types;
pub mod utils;
