//! Running the target program with the resolved environment.

use std::path::PathBuf;
use std::process::{Command, ExitStatus};

use crate::env::ResolvedEnvironment;
use crate::error::PromptenvError;

/// Find `program` on PATH (or as a path) and spawn it with `args`.
///
/// The child inherits stdio and the current environment, plus the resolved
/// variables. Nothing about the tool itself (such as the active setting) is
/// passed along. Returns the child's exit code.
pub fn launch(
    program: &str,
    args: &[String],
    env: &ResolvedEnvironment,
) -> Result<i32, PromptenvError> {
    let path = locate(program)?;
    tracing::info!(program = %path.display(), variables = env.len(), "launching");

    let status = Command::new(&path)
        .args(args)
        .envs(env.iter())
        .status()
        .map_err(|e| PromptenvError::SpawnFailure {
            path: path.clone(),
            source: e,
        })?;

    let code = exit_code(status);
    tracing::debug!(code, "child exited");
    Ok(code)
}

fn locate(program: &str) -> Result<PathBuf, PromptenvError> {
    which::which(program).map_err(|e| PromptenvError::ExecutableNotFound {
        program: program.to_string(),
        source: e,
    })
}

/// The child's exit code; a signal-terminated child maps to `128 + signal`.
fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }
    1
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn env(pairs: &[(&str, &str)]) -> ResolvedEnvironment {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn passes_exit_code_through() {
        let code = launch("sh", &["-c".into(), "exit 3".into()], &env(&[])).unwrap();
        assert_eq!(code, 3);
    }

    #[test]
    fn injects_resolved_variables() {
        let code = launch(
            "sh",
            &["-c".into(), r#"test "$DB_HOST" = "localhost""#.into()],
            &env(&[("DB_HOST", "localhost")]),
        )
        .unwrap();
        assert_eq!(code, 0);
    }

    #[test]
    fn unknown_program_is_reported() {
        let result = launch("promptenv-no-such-program", &[], &env(&[]));
        match result {
            Err(PromptenvError::ExecutableNotFound { program, .. }) => {
                assert_eq!(program, "promptenv-no-such-program");
            }
            other => panic!("Expected ExecutableNotFound, got {other:?}"),
        }
    }

    #[test]
    fn signal_maps_above_128() {
        let code = launch("sh", &["-c".into(), "kill -TERM $$".into()], &env(&[])).unwrap();
        assert_eq!(code, 128 + 15);
    }
}
