// src/foundry/services/chisel.rs
//
// REPL operations. chisel reads its input from stdin, so these two
// operations are the only place in the crate that goes through a shell
// pipeline; the quoting rule and the temp-file lifetime both live here and
// nowhere else.

use serde::Deserialize;
use tempfile::NamedTempFile;

use crate::foundry::exec;
use crate::foundry::models::{FoundryError, ToolOutput};
use crate::foundry::validate;
use crate::AppState;

/// Single-quotes a string for `sh -c`, escaping embedded single quotes with
/// the `'\''` idiom. Inside single quotes nothing else is special to the
/// shell.
fn shell_quote(text: &str) -> String {
    format!("'{}'", text.replace('\'', r"'\''"))
}

#[derive(Debug, Deserialize)]
pub struct ChiselEvalParams {
    pub source: String,
}

/// Pipes an inline snippet into the REPL and returns what it prints.
pub async fn eval(state: &AppState, params: ChiselEvalParams) -> Result<ToolOutput, FoundryError> {
    validate::ensure_non_empty("source", &params.source)?;
    let script = format!("echo {} | chisel", shell_quote(&params.source));
    let result = exec::run_shell(&script, state.config.workdir.as_deref()).await;
    Ok(ToolOutput::from_result(&result))
}

#[derive(Debug, Deserialize)]
pub struct ChiselRunParams {
    pub source: String,
}

/// Writes multi-line source to a temporary file and pipes it into the REPL.
/// The file is removed when the guard drops, on every exit path including
/// success.
pub async fn run(state: &AppState, params: ChiselRunParams) -> Result<ToolOutput, FoundryError> {
    validate::ensure_non_empty("source", &params.source)?;

    let file = NamedTempFile::new()
        .map_err(|err| FoundryError::Internal(format!("failed to create temp file: {}", err)))?;
    std::fs::write(file.path(), &params.source)
        .map_err(|err| FoundryError::Internal(format!("failed to write temp file: {}", err)))?;

    let script = format!(
        "cat {} | chisel",
        shell_quote(&file.path().to_string_lossy())
    );
    let result = exec::run_shell(&script, state.config.workdir.as_deref()).await;
    Ok(ToolOutput::from_result(&result))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_wrapped_in_single_quotes() {
        assert_eq!(shell_quote("uint x = 1;"), "'uint x = 1;'");
    }

    #[test]
    fn embedded_single_quotes_use_the_close_escape_reopen_idiom() {
        assert_eq!(shell_quote("it's"), r"'it'\''s'");
    }

    #[test]
    fn shell_metacharacters_stay_inert() {
        // Backticks, dollars and semicolons carry no meaning inside single
        // quotes; they must come through verbatim.
        assert_eq!(
            shell_quote("$(rm -rf /); `id`"),
            "'$(rm -rf /); `id`'"
        );
    }

    #[tokio::test]
    async fn quoted_source_survives_the_pipeline_intact() {
        // Same pipeline shape as eval(), with cat standing in for chisel.
        let source = "string s = 'quoted'; emit($VALUE);";
        let script = format!("echo {} | cat", shell_quote(source));
        let result = exec::run_shell(&script, None).await;
        assert!(result.success);
        assert_eq!(result.stdout, source);
    }
}
