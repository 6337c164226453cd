// src/foundry/exec.rs

use std::path::Path;
use std::process::Stdio;

use tokio::io::AsyncReadExt;
use tokio::process::Command;
use tracing::debug;

use super::models::CommandResult;

/// Runs a program with a discrete argument vector, never through a shell.
///
/// The child inherits the parent environment plus `NO_COLOR=1` and
/// `FORCE_COLOR=0` so tool output stays free of ANSI escapes. Both output
/// streams are drained concurrently with the exit wait; everything that can
/// go wrong is folded into the returned `CommandResult`, this function does
/// not fail.
pub async fn run_command(
    program: &str,
    args: &[String],
    workdir: Option<&Path>,
) -> CommandResult {
    debug!(program, ?args, "spawning subprocess");
    let mut cmd = Command::new(program);
    cmd.args(args);
    prepare(&mut cmd, workdir);
    run_prepared(cmd, program).await
}

/// Runs a shell pipeline via `sh -c`.
///
/// Reserved for the chisel helper, which has to feed source text through
/// stdin; every other caller goes through `run_command`.
pub async fn run_shell(script: &str, workdir: Option<&Path>) -> CommandResult {
    debug!(script, "spawning shell pipeline");
    let mut cmd = Command::new("sh");
    cmd.arg("-c").arg(script);
    prepare(&mut cmd, workdir);
    run_prepared(cmd, "sh").await
}

fn prepare(cmd: &mut Command, workdir: Option<&Path>) {
    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .env("NO_COLOR", "1")
        .env("FORCE_COLOR", "0");
    if let Some(dir) = workdir {
        cmd.current_dir(dir);
    }
}

async fn run_prepared(mut cmd: Command, program: &str) -> CommandResult {
    let mut child = match cmd.spawn() {
        Ok(child) => child,
        Err(err) => {
            return CommandResult::from_spawn_error(format!(
                "Failed to start '{}': {}",
                program, err
            ))
        }
    };

    // Both pipes were requested in prepare(), so take() always succeeds.
    let mut stdout_pipe = child.stdout.take();
    let mut stderr_pipe = child.stderr.take();

    let drain_stdout = async {
        let mut buf = Vec::new();
        if let Some(pipe) = stdout_pipe.as_mut() {
            let _ = pipe.read_to_end(&mut buf).await;
        }
        buf
    };
    let drain_stderr = async {
        let mut buf = Vec::new();
        if let Some(pipe) = stderr_pipe.as_mut() {
            let _ = pipe.read_to_end(&mut buf).await;
        }
        buf
    };

    let (stdout_buf, stderr_buf, status) = tokio::join!(drain_stdout, drain_stderr, child.wait());

    let stdout = String::from_utf8_lossy(&stdout_buf).trim().to_string();
    let stderr = String::from_utf8_lossy(&stderr_buf).trim().to_string();

    match status {
        Ok(status) => {
            let exit_code = status.code().unwrap_or(-1);
            CommandResult {
                success: exit_code == 0,
                stdout,
                stderr,
                exit_code,
            }
        }
        Err(err) => CommandResult {
            success: false,
            stdout,
            stderr: format!("Failed to wait for '{}': {}", program, err),
            exit_code: 1,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn captures_stdout_of_successful_command() {
        let result = run_command("echo", &["ok".to_string()], None).await;
        assert!(result.success);
        assert_eq!(result.stdout, "ok");
        assert_eq!(result.stderr, "");
        assert_eq!(result.exit_code, 0);
    }

    #[tokio::test]
    async fn missing_binary_becomes_a_result_not_a_panic() {
        let result = run_command("definitely-not-a-real-binary-xyz", &[], None).await;
        assert!(!result.success);
        assert_eq!(result.exit_code, 1);
        assert!(!result.stderr.is_empty());
        assert!(result.stderr.contains("definitely-not-a-real-binary-xyz"));
    }

    #[tokio::test]
    async fn nonzero_exit_keeps_invariant() {
        let result = run_shell("exit 3", None).await;
        assert!(!result.success);
        assert_eq!(result.exit_code, 3);
    }

    #[tokio::test]
    async fn output_is_whitespace_trimmed() {
        let result = run_shell("printf '  spaced out  \\n'", None).await;
        assert!(result.success);
        assert_eq!(result.stdout, "spaced out");
    }

    #[tokio::test]
    async fn respects_working_directory() {
        let dir = tempfile::tempdir().unwrap();
        let canonical = std::fs::canonicalize(dir.path()).unwrap();
        let result = run_command("pwd", &[], Some(dir.path())).await;
        assert!(result.success);
        assert_eq!(result.stdout, canonical.to_string_lossy());
    }

    #[tokio::test]
    async fn shell_pipelines_run_end_to_end() {
        let result = run_shell("echo piped | tr a-z A-Z", None).await;
        assert!(result.success);
        assert_eq!(result.stdout, "PIPED");
    }
}
