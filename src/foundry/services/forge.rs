// src/foundry/services/forge.rs
//
// Build-tool operations. All run in the configured project directory unless
// the parameters say otherwise.

use serde::Deserialize;

use crate::foundry::models::{FoundryError, ToolOutput};
use crate::foundry::options::CommandOptions;
use crate::foundry::{exec, validate};
use crate::AppState;

async fn run_forge(state: &AppState, argv: Vec<String>) -> ToolOutput {
    let result = exec::run_command("forge", &argv, state.config.workdir.as_deref()).await;
    ToolOutput::from_result(&result)
}

#[derive(Debug, Default, Deserialize)]
pub struct ForgeBuildParams {
    pub root: Option<String>,
    #[serde(default)]
    pub force: bool,
    #[serde(default)]
    pub sizes: bool,
}

/// `forge build`: compile the project.
pub async fn build(state: &AppState, params: ForgeBuildParams) -> Result<ToolOutput, FoundryError> {
    let mut argv = vec!["build".to_string()];
    argv.extend(
        CommandOptions::new()
            .arg_opt("root", params.root)
            .flag("force", params.force)
            .flag("sizes", params.sizes)
            .to_args(),
    );
    Ok(run_forge(state, argv).await)
}

#[derive(Debug, Default, Deserialize)]
pub struct ForgeTestParams {
    pub match_test: Option<String>,
    pub match_contract: Option<String>,
    pub match_path: Option<String>,
    pub fork_url: Option<String>,
    pub verbosity: Option<u8>,
    #[serde(default)]
    pub gas_report: bool,
}

/// `forge test`: run the project's test suite.
pub async fn test(state: &AppState, params: ForgeTestParams) -> Result<ToolOutput, FoundryError> {
    if let Some(fork) = params.fork_url.as_deref() {
        validate::ensure_url(fork)?;
    }
    let mut argv = vec!["test".to_string()];
    // Verbosity is the one option that is not flag+value shaped: forge
    // counts repeated -v occurrences.
    if let Some(level) = params.verbosity {
        let level = level.min(5);
        if level > 0 {
            argv.push(format!("-{}", "v".repeat(level as usize)));
        }
    }
    argv.extend(
        CommandOptions::new()
            .arg_opt("match-test", params.match_test)
            .arg_opt("match-contract", params.match_contract)
            .arg_opt("match-path", params.match_path)
            .arg_opt("fork-url", params.fork_url)
            .flag("gas-report", params.gas_report)
            .to_args(),
    );
    Ok(run_forge(state, argv).await)
}

#[derive(Debug, Deserialize)]
pub struct ForgeScriptParams {
    pub script_path: String,
    pub sig: Option<String>,
    pub rpc_url: Option<String>,
    #[serde(default)]
    pub broadcast: bool,
    pub private_key: Option<String>,
}

/// `forge script`: run a deployment/maintenance script; `broadcast`
/// submits the resulting transactions instead of simulating.
pub async fn script(
    state: &AppState,
    params: ForgeScriptParams,
) -> Result<ToolOutput, FoundryError> {
    validate::ensure_non_empty("script_path", &params.script_path)?;
    if let Some(url) = params.rpc_url.as_deref() {
        validate::ensure_url(url)?;
    }
    let private_key = params
        .private_key
        .or_else(|| state.config.default_private_key());
    if let Some(key) = private_key.as_deref() {
        validate::ensure_private_key(key)?;
    }

    let mut argv = vec!["script".to_string(), params.script_path];
    argv.extend(
        CommandOptions::new()
            .arg_opt("sig", params.sig)
            .arg_opt("rpc-url", params.rpc_url)
            .flag("broadcast", params.broadcast)
            .arg_opt("private-key", private_key)
            .to_args(),
    );
    Ok(run_forge(state, argv).await)
}

#[derive(Debug, Deserialize)]
pub struct ForgeInstallParams {
    pub dependency: String,
    #[serde(default)]
    pub no_commit: bool,
}

/// `forge install`: add a dependency (e.g. `org/repo` or `org/repo@tag`).
pub async fn install(
    state: &AppState,
    params: ForgeInstallParams,
) -> Result<ToolOutput, FoundryError> {
    validate::ensure_non_empty("dependency", &params.dependency)?;
    let mut argv = vec!["install".to_string(), params.dependency];
    argv.extend(
        CommandOptions::new()
            .flag("no-commit", params.no_commit)
            .to_args(),
    );
    Ok(run_forge(state, argv).await)
}

#[derive(Debug, Deserialize)]
pub struct ForgeRemoveParams {
    pub dependency: String,
}

/// `forge remove`: drop an installed dependency.
pub async fn remove(
    state: &AppState,
    params: ForgeRemoveParams,
) -> Result<ToolOutput, FoundryError> {
    validate::ensure_non_empty("dependency", &params.dependency)?;
    let argv = vec!["remove".to_string(), params.dependency];
    Ok(run_forge(state, argv).await)
}
