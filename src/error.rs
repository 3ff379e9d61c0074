use std::path::PathBuf;

use thiserror::Error;

/// Failures that commands report to the user.
///
/// A cancelled prompt is not an error; see [`crate::prompt::Prompt`].
#[derive(Debug, Error)]
pub enum ArmError {
    #[error("{what} not found: {name}")]
    NotFound { what: &'static str, name: String },

    #[error("failed to parse {path}: {message}")]
    Malformed { path: PathBuf, message: String },

    #[error("a project named '{name}' is already registered at {existing}")]
    DuplicateName { name: String, existing: PathBuf },

    #[error("path is not valid UTF-8: {}", .path.display())]
    NonUtf8Path { path: PathBuf },

    #[error("`{command}` failed ({status}){}", stderr_suffix(.stderr))]
    ExternalCommand {
        command: String,
        status: String,
        stderr: String,
    },

    #[error("{action} requires sudo privileges. Please run: {remedy}")]
    PrivilegeRequired { action: String, remedy: String },

    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ArmError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

fn stderr_suffix(stderr: &str) -> String {
    let trimmed = stderr.trim();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!(": {trimmed}")
    }
}
