// src/foundry/services/help.rs

use serde::Deserialize;

use crate::foundry::exec;
use crate::foundry::models::{FoundryError, ToolOutput};
use crate::AppState;

/// Binaries whose help output we are willing to scan. Also the closed set
/// of programs `list_commands` may spawn.
pub const KNOWN_TOOLS: &[&str] = &["forge", "cast", "anvil", "chisel"];

/// One subcommand parsed out of a help screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandEntry {
    pub name: String,
    pub description: String,
}

/// Best-effort extraction of the subcommand list from `--help` output.
///
/// Narrow grammar: a line reading `Commands:` opens the section; each
/// indented line contributes one entry (first token is the name, the rest
/// the description); a blank line or any non-indented line closes it, which
/// covers the `Options:` header. Anything the grammar cannot place is
/// ignored rather than guessed at.
pub fn scan_commands(help_text: &str) -> Vec<CommandEntry> {
    let mut entries = Vec::new();
    let mut in_section = false;

    for line in help_text.lines() {
        if !in_section {
            if line.trim_end() == "Commands:" {
                in_section = true;
            }
            continue;
        }
        if line.trim().is_empty() {
            break;
        }
        if !line.starts_with(' ') && !line.starts_with('\t') {
            break;
        }
        let mut parts = line.split_whitespace();
        if let Some(name) = parts.next() {
            entries.push(CommandEntry {
                name: name.to_string(),
                description: parts.collect::<Vec<_>>().join(" "),
            });
        }
    }
    entries
}

#[derive(Debug, Deserialize)]
pub struct ListCommandsParams {
    pub tool: String,
}

/// Runs `<tool> --help` and reports the scanned subcommand list.
pub async fn list_commands(
    state: &AppState,
    params: ListCommandsParams,
) -> Result<ToolOutput, FoundryError> {
    let tool = params.tool.trim().to_lowercase();
    if !KNOWN_TOOLS.contains(&tool.as_str()) {
        return Err(FoundryError::InvalidParams(format!(
            "unknown tool '{}'; expected one of: {}",
            params.tool,
            KNOWN_TOOLS.join(", ")
        )));
    }

    let result = exec::run_command(
        &tool,
        &["--help".to_string()],
        state.config.workdir.as_deref(),
    )
    .await;
    if !result.success {
        return Ok(ToolOutput::from_result(&result));
    }

    let entries = scan_commands(&result.stdout);
    if entries.is_empty() {
        return Ok(ToolOutput::success(format!(
            "No commands section found in '{} --help' output",
            tool
        )));
    }

    let width = entries.iter().map(|e| e.name.len()).max().unwrap_or(0);
    let lines: Vec<String> = entries
        .iter()
        .map(|e| format!("{:width$}  {}", e.name, e.description, width = width))
        .collect();
    Ok(ToolOutput::success(format!(
        "Available {} commands:\n{}",
        tool,
        lines.join("\n")
    )))
}
