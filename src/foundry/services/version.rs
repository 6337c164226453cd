// src/foundry/services/version.rs

use crate::foundry::exec;
use crate::foundry::models::{FoundryError, ToolOutput};
use crate::AppState;

/// Reports the installed version of each toolchain binary.
///
/// The four `--version` invocations are independent, so they run
/// concurrently and are awaited together.
pub async fn versions(state: &AppState) -> Result<ToolOutput, FoundryError> {
    let (forge, cast, anvil, chisel) = futures::join!(
        probe(state, "forge"),
        probe(state, "cast"),
        probe(state, "anvil"),
        probe(state, "chisel"),
    );

    let mut lines = Vec::with_capacity(4);
    let mut missing = 0usize;
    for (tool, version) in [
        ("forge", forge),
        ("cast", cast),
        ("anvil", anvil),
        ("chisel", chisel),
    ] {
        match version {
            Some(v) => lines.push(format!("{}: {}", tool, v)),
            None => {
                missing += 1;
                lines.push(format!("{}: not available", tool));
            }
        }
    }
    if missing == 4 {
        lines.push(String::new());
        lines.push(
            "No Foundry binaries were found on PATH. Install them with foundryup.".to_string(),
        );
    }
    Ok(ToolOutput::success(lines.join("\n")))
}

async fn probe(state: &AppState, tool: &str) -> Option<String> {
    let result = exec::run_command(
        tool,
        &["--version".to_string()],
        state.config.workdir.as_deref(),
    )
    .await;
    if !result.success {
        return None;
    }
    // The banner is single-line; keep only the first line if a tool ever
    // prints more.
    result.stdout.lines().next().map(|line| line.to_string())
}
