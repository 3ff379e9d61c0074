//! Subprocess helpers. Commands are always an argument vector, never a
//! shell string.

use crate::error::ArmError;
use std::ffi::OsStr;
use std::path::Path;
use std::process::{ExitStatus, Stdio};
use tokio::process::Command;
use tracing::debug;

#[derive(Debug, Clone, Default)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
}

fn display<S: AsRef<OsStr>>(program: &str, args: &[S]) -> String {
    let mut line = program.to_string();
    for arg in args {
        line.push(' ');
        line.push_str(&arg.as_ref().to_string_lossy());
    }
    line
}

fn start_failure(command: String, err: std::io::Error) -> ArmError {
    ArmError::ExternalCommand {
        command,
        status: "failed to start".to_string(),
        stderr: err.to_string(),
    }
}

fn check(command: String, status: ExitStatus, stderr: &str) -> Result<(), ArmError> {
    if status.success() {
        Ok(())
    } else {
        Err(ArmError::ExternalCommand {
            command,
            status: status.to_string(),
            stderr: stderr.to_string(),
        })
    }
}

/// Runs in the foreground with the terminal attached.
pub async fn run<S: AsRef<OsStr>>(program: &str, args: &[S]) -> Result<(), ArmError> {
    run_in(None, program, args).await
}

pub async fn run_in<S: AsRef<OsStr>>(
    cwd: Option<&Path>,
    program: &str,
    args: &[S],
) -> Result<(), ArmError> {
    let line = display(program, args);
    debug!(command = %line, cwd = ?cwd, "running");

    let mut cmd = Command::new(program);
    cmd.args(args);
    if let Some(dir) = cwd {
        cmd.current_dir(dir);
    }
    let status = cmd.status().await.map_err(|e| start_failure(line.clone(), e))?;
    check(line, status, "")
}

/// Runs with stdout and stderr captured.
pub async fn run_captured<S: AsRef<OsStr>>(program: &str, args: &[S]) -> Result<CommandOutput, ArmError> {
    let line = display(program, args);
    debug!(command = %line, "running (captured)");

    let out = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .output()
        .await
        .map_err(|e| start_failure(line.clone(), e))?;

    let output = CommandOutput {
        stdout: String::from_utf8_lossy(&out.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&out.stderr).into_owned(),
    };
    check(line, out.status, &output.stderr)?;
    Ok(output)
}

/// Runs `sudo <args...>` in the foreground.
pub async fn sudo_run<S: AsRef<OsStr>>(args: &[S]) -> Result<(), ArmError> {
    run("sudo", args).await
}

/// Whether the command exits zero. Start failures count as `false`.
pub async fn succeeds<S: AsRef<OsStr>>(program: &str, args: &[S]) -> bool {
    run_captured(program, args).await.is_ok()
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn captured_output_is_returned() {
        let out = run_captured("sh", &["-c", "printf hello"]).await.unwrap();
        assert_eq!(out.stdout, "hello");
    }

    #[tokio::test]
    async fn nonzero_exit_is_external_command_failure() {
        let err = run_captured("sh", &["-c", "echo broken >&2; exit 3"])
            .await
            .unwrap_err();
        match err {
            ArmError::ExternalCommand {
                command, stderr, ..
            } => {
                assert_eq!(command, "sh -c echo broken >&2; exit 3");
                assert_eq!(stderr.trim(), "broken");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_program_fails_to_start() {
        let err = run_captured("arm-cli-no-such-program", &["x"]).await.unwrap_err();
        assert!(matches!(
            err,
            ArmError::ExternalCommand { ref status, .. } if status == "failed to start"
        ));
        assert!(!succeeds("arm-cli-no-such-program", &["x"]).await);
    }

    #[tokio::test]
    async fn run_in_uses_working_directory() {
        let dir = tempfile::tempdir().unwrap();
        run_in(Some(dir.path()), "sh", &["-c", "touch marker"]).await.unwrap();
        assert!(dir.path().join("marker").exists());
    }
}
