// src/foundry/models.rs
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::process::Child;

// --- Error types for tool dispatch ---

#[derive(Error, Debug)]
pub enum FoundryError {
    /// Input failed shape validation before any subprocess or network call.
    #[error("{0}")]
    InvalidParams(String),
    /// Internal failure unrelated to the external tool's own outcome.
    #[error("{0}")]
    Internal(String),
}

impl FoundryError {
    /// JSON-RPC error code this failure maps to.
    pub fn code(&self) -> i32 {
        match self {
            FoundryError::InvalidParams(_) => crate::mcp::protocol::error_codes::INVALID_PARAMS,
            FoundryError::Internal(_) => crate::mcp::protocol::error_codes::INTERNAL_ERROR,
        }
    }
}

// --- Subprocess results ---

/// Text shown when a command succeeds without writing anything to stdout.
pub const EMPTY_OUTPUT_PLACEHOLDER: &str = "Command completed successfully with no output.";

/// Outcome of a single subprocess invocation.
///
/// Produced exactly once per run and never mutated afterwards. `success`
/// always agrees with `exit_code == 0`; spawn failures are folded into this
/// shape (exit code 1, reason in `stderr`) instead of being raised.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CommandResult {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

impl CommandResult {
    /// Wraps a spawn-time failure (missing binary, permission denied) as a
    /// normal failed result.
    pub fn from_spawn_error(description: String) -> Self {
        Self {
            success: false,
            stdout: String::new(),
            stderr: description,
            exit_code: 1,
        }
    }

    /// Renders the result as one text block.
    ///
    /// Success renders stdout, or a placeholder sentence when stdout is
    /// empty. Failure renders an error line (if stderr is non-empty), an
    /// output line (if stdout is non-empty), and always the exit code, so a
    /// failing command never produces empty diagnostics.
    pub fn render(&self) -> String {
        if self.success {
            if self.stdout.is_empty() {
                return EMPTY_OUTPUT_PLACEHOLDER.to_string();
            }
            return self.stdout.clone();
        }

        let mut lines = Vec::with_capacity(3);
        if !self.stderr.is_empty() {
            lines.push(format!("Error: {}", self.stderr));
        }
        if !self.stdout.is_empty() {
            lines.push(format!("Output: {}", self.stdout));
        }
        lines.push(format!("Exit code: {}", self.exit_code));
        lines.join("\n")
    }
}

// --- Tool call payloads ---

/// Final payload of one tool invocation: the rendered text plus the
/// success/failure framing the protocol layer reports alongside it.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ToolOutput {
    pub text: String,
    pub is_error: bool,
}

impl ToolOutput {
    pub fn success(text: String) -> Self {
        Self {
            text,
            is_error: false,
        }
    }

    pub fn failure(reason: String) -> Self {
        Self {
            text: format!("Error: {}", reason),
            is_error: true,
        }
    }

    /// Renders a command result, mirroring its exit status into the framing.
    pub fn from_result(result: &CommandResult) -> Self {
        Self {
            text: result.render(),
            is_error: !result.success,
        }
    }
}

// --- Node registry models ---

/// A locally started anvil process tracked by the registry.
///
/// Owned exclusively by the `NodeManager`; holding the child handle here is
/// what lets stop/self-heal terminate the process and lets server shutdown
/// reap every node that was never stopped explicitly.
#[derive(Debug)]
pub struct NodeInstance {
    pub port: u16,
    pub process_id: u32,
    pub fork_url: Option<String>,
    pub(crate) child: Child,
}

/// Serializable view of a tracked node, produced by status reads.
#[derive(Debug, Clone, Serialize)]
pub struct NodeSummary {
    pub port: u16,
    pub process_id: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fork_url: Option<String>,
    pub responsive: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(success: bool, stdout: &str, stderr: &str, exit_code: i32) -> CommandResult {
        CommandResult {
            success,
            stdout: stdout.to_string(),
            stderr: stderr.to_string(),
            exit_code,
        }
    }

    #[test]
    fn render_success_passes_stdout_through() {
        let r = result(true, "compiled 3 files", "", 0);
        assert_eq!(r.render(), "compiled 3 files");
    }

    #[test]
    fn render_empty_success_uses_placeholder() {
        let r = result(true, "", "", 0);
        assert_eq!(r.render(), EMPTY_OUTPUT_PLACEHOLDER);
        assert!(!r.render().is_empty());
    }

    #[test]
    fn render_failure_composes_all_three_lines() {
        let r = result(false, "partial output", "something broke", 1);
        assert_eq!(
            r.render(),
            "Error: something broke\nOutput: partial output\nExit code: 1"
        );
    }

    #[test]
    fn render_failure_with_empty_streams_still_reports_exit_code() {
        let r = result(false, "", "", 2);
        let text = r.render();
        assert_eq!(text, "Exit code: 2");
        assert!(text.contains('2'));
        assert!(!text.contains("Error:"));
        assert!(text.lines().last().unwrap().starts_with("Exit code:"));
    }

    #[test]
    fn render_failure_ends_with_exit_code_line() {
        let r = result(false, "out", "err", 3);
        assert_eq!(r.render().lines().last().unwrap(), "Exit code: 3");
    }

    #[test]
    fn spawn_error_is_a_failed_result() {
        let r = CommandResult::from_spawn_error("no such binary".to_string());
        assert!(!r.success);
        assert_eq!(r.exit_code, 1);
        assert_eq!(r.stderr, "no such binary");
        assert!(r.stdout.is_empty());
    }

    #[test]
    fn tool_output_mirrors_result_framing() {
        let ok = ToolOutput::from_result(&result(true, "fine", "", 0));
        assert!(!ok.is_error);
        assert_eq!(ok.text, "fine");

        let bad = ToolOutput::from_result(&result(false, "", "boom", 1));
        assert!(bad.is_error);
        assert!(bad.text.contains("boom"));
    }
}
