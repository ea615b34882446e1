use std::process::Stdio;
use thiserror::Error;
use tokio::process::Command;
use tracing::trace;

/// Failure running an external helper (`nmcli`, `wpctl`, ...)
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("{program} is not installed")]
    NotFound { program: String },

    #[error("failed to run {program}: {source}")]
    Io {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with {code:?}: {stderr}")]
    Failed {
        program: String,
        code: Option<i32>,
        stderr: String,
    },
}

impl CommandError {
    /// Exit code of a failed run, if the process got that far
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            Self::Failed { code, .. } => *code,
            _ => None,
        }
    }
}

/// Run a program and return its stdout; non-zero exit is an error
pub async fn run(program: &str, args: &[&str]) -> Result<String, CommandError> {
    trace!("exec {} {:?}", program, args);

    let output = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .output()
        .await
        .map_err(|source| spawn_error(program, source))?;

    if !output.status.success() {
        return Err(CommandError::Failed {
            program: program.to_string(),
            code: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Run a program for its exit code only
pub async fn run_status(program: &str, args: &[&str]) -> Result<Option<i32>, CommandError> {
    trace!("exec {} {:?}", program, args);

    let status = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await
        .map_err(|source| spawn_error(program, source))?;

    Ok(status.code())
}

fn spawn_error(program: &str, source: std::io::Error) -> CommandError {
    if source.kind() == std::io::ErrorKind::NotFound {
        CommandError::NotFound {
            program: program.to_string(),
        }
    } else {
        CommandError::Io {
            program: program.to_string(),
            source,
        }
    }
}
