//! Utilities for the bridge scripts.

use std::{path::Path, process::Stdio, time::Duration};

use tokio::process::Command;
use tracing::{debug, info};

use crate::{
    constants::{
        DUMP_BYTECODE_FLAG, EXPLORER_BASE_URL, MOVE_SUBCOMMAND, SUI_COMMAND,
        UNPUBLISHED_DEPENDENCIES_FLAG,
    },
    errors::ScriptError,
    types::{CompiledPackage, Network, TransactionResult},
};

/// Runs the command to completion, returning its stdout.
///
/// A command that cannot be spawned or that exits unsuccessfully is reported
/// through `err`, along with its stderr.
pub async fn command_stdout(
    mut cmd: Command,
    err: impl Fn(String) -> ScriptError,
) -> Result<String, ScriptError> {
    cmd.stdout(Stdio::piped()).stderr(Stdio::piped());
    debug!("Running {:?}", cmd.as_std());

    let output = cmd.output().await.map_err(|e| err(e.to_string()))?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(err(format!(
            "command exited with {}: {}",
            output.status,
            stderr.trim()
        )));
    }

    String::from_utf8(output.stdout).map_err(|e| err(e.to_string()))
}

/// Compiles the Move package at `package_path`, returning its bytecode and digest.
///
/// Assumes that `sui` is locally available, unless another binary is given.
pub async fn build_move_package(
    package_path: &Path,
    sui_bin: Option<&str>,
) -> Result<CompiledPackage, ScriptError> {
    let mut build_cmd = Command::new(sui_bin.unwrap_or(SUI_COMMAND));
    build_cmd.arg(MOVE_SUBCOMMAND);
    build_cmd.arg("build");
    // Bundle dependencies that have not been published yet
    build_cmd.arg(UNPUBLISHED_DEPENDENCIES_FLAG);
    // Emit the bytecode & digest as JSON on stdout
    build_cmd.arg(DUMP_BYTECODE_FLAG);
    build_cmd.arg("--path");
    build_cmd.arg(package_path);

    let stdout = command_stdout(build_cmd, ScriptError::PackageBuild).await?;
    let mut package = parse_build_output(&stdout)?;
    package.path = package_path.to_path_buf();

    debug!(
        "Built {} modules with digest {}",
        package.modules.len(),
        package.digest_hex()
    );
    Ok(package)
}

/// Parses the output of `sui move build --dump-bytecode-as-base64`.
///
/// The CLI may print build progress before the JSON document, so parsing
/// starts at the first opening brace.
pub fn parse_build_output(output: &str) -> Result<CompiledPackage, ScriptError> {
    let start = output.find('{').ok_or_else(|| {
        ScriptError::PackageBuild("build output does not contain a JSON document".to_string())
    })?;

    let package: CompiledPackage = serde_json::from_str(&output[start..])
        .map_err(|e| ScriptError::PackageBuild(e.to_string()))?;
    if package.modules.is_empty() {
        return Err(ScriptError::PackageBuild(
            "package contains no modules".to_string(),
        ));
    }

    Ok(package)
}

/// The block explorer link of a transaction
pub fn explorer_tx_url(network: Network, digest: &str) -> String {
    format!("{}/{}/tx/{}", EXPLORER_BASE_URL, network, digest)
}

/// Waits for a submitted transaction to propagate before reading further state
pub async fn settle(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}

/// Logs the digest & explorer link of an executed transaction
pub fn report_transaction(network: Network, action: &str, result: &TransactionResult) {
    info!("{} successful!", action);
    info!("Transaction digest: {}", result.digest);
    info!(
        "View transaction: {}",
        explorer_tx_url(network, &result.digest)
    );
}
