//! One-time host setup steps. Each step checks first and only changes the
//! system when the check fails.

use crate::cli::Cli;
use crate::error::ArmError;
use crate::process;
use crate::prompt::{Prompt, Prompter};
use anyhow::{Context, Result};
use clap::CommandFactory;
use clap_complete::{generate, Shell};
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

pub const DATA_SUBDIRS: [&str; 3] = ["influxdb2", "images", "node_exporter"];
pub const COMPLETION_FILE: &str = "arm-cli-completion.bash";

const BIN_NAME: &str = "arm-cli";
const SETUP_REMEDY: &str = "sudo arm-cli system setup";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    AlreadyDone,
    Applied,
    /// Declined, cancelled, or not applicable on this host.
    Skipped,
}

fn confirmed(prompter: &mut dyn Prompter, force: bool, message: &str) -> Result<bool> {
    if force {
        return Ok(true);
    }
    Ok(matches!(prompter.confirm(message, false)?, Prompt::Answered(true)))
}

// X11 access

pub async fn xhost_configured() -> bool {
    match process::run_captured::<&str>("xhost", &[]).await {
        Ok(out) => out.stdout.contains("LOCAL:docker"),
        Err(_) => false,
    }
}

pub async fn setup_xhost(prompter: &mut dyn Prompter, force: bool) -> Result<StepOutcome> {
    if xhost_configured().await {
        println!("X11 access for Docker containers is already configured.");
        return Ok(StepOutcome::AlreadyDone);
    }

    println!("Setting up X11 access for Docker containers...");
    if !confirmed(prompter, force, "Do you want to configure X11 access for Docker containers?")? {
        println!("X11 setup cancelled.");
        return Ok(StepOutcome::Skipped);
    }

    process::run("xhost", &["+local:docker"])
        .await
        .context("Error configuring xhost")?;
    println!("xhost configured successfully.");
    Ok(StepOutcome::Applied)
}

// Data directories

pub fn data_directories(root: &Path) -> Vec<PathBuf> {
    DATA_SUBDIRS.iter().map(|d| root.join(d)).collect()
}

/// Owner and group have full access; others cannot write.
pub fn mode_ready(mode: u32) -> bool {
    mode & 0o770 == 0o770 && mode & 0o002 == 0
}

#[cfg(unix)]
pub fn directory_ready(path: &Path, uid: u32, gid: u32) -> bool {
    use std::os::unix::fs::MetadataExt;

    match fs::metadata(path) {
        Ok(meta) => meta.is_dir() && meta.uid() == uid && meta.gid() == gid && mode_ready(meta.mode()),
        Err(_) => false,
    }
}

#[cfg(unix)]
pub fn data_directories_ready(dirs: &[PathBuf], uid: u32, gid: u32) -> bool {
    dirs.iter().all(|d| directory_ready(d, uid, gid))
}

#[cfg(unix)]
pub async fn setup_data_directories(
    prompter: &mut dyn Prompter,
    root: &Path,
    force: bool,
) -> Result<StepOutcome> {
    let uid = nix::unistd::getuid().as_raw();
    let gid = nix::unistd::getgid().as_raw();
    let dirs = data_directories(root);

    if data_directories_ready(&dirs, uid, gid) {
        println!("Data directories are already properly set up.");
        return Ok(StepOutcome::AlreadyDone);
    }

    println!("Setting up data directories...");
    let has_sudo = process::succeeds("sudo", &["-n", "true"]).await;
    create_data_directories(prompter, &dirs, uid, gid, has_sudo, force).await
}

/// Creates `dirs` with sudo and hands them to `uid:gid`. Without
/// passwordless sudo this fails with the command to re-run.
#[cfg(unix)]
async fn create_data_directories(
    prompter: &mut dyn Prompter,
    dirs: &[PathBuf],
    uid: u32,
    gid: u32,
    has_sudo: bool,
    force: bool,
) -> Result<StepOutcome> {
    if !has_sudo {
        return Err(ArmError::PrivilegeRequired {
            action: "Creating data directories".to_string(),
            remedy: SETUP_REMEDY.to_string(),
        }
        .into());
    }

    println!("This will create the following directories:");
    for dir in dirs {
        println!("  - {}", dir.display());
    }
    println!("And set appropriate ownership and permissions.");
    if !confirmed(prompter, force, "Do you want to proceed?")? {
        println!("Setup cancelled.");
        return Ok(StepOutcome::Skipped);
    }

    println!("Creating directories and setting permissions...");
    let paths: Vec<String> = dirs.iter().map(|d| d.to_string_lossy().into_owned()).collect();

    let mut mkdir = vec!["mkdir".to_string(), "-p".to_string()];
    mkdir.extend(paths.iter().cloned());
    process::sudo_run(&mkdir).await.context("Error setting up data directories")?;
    println!("Created directories.");

    let mut chown = vec!["chown".to_string(), "-R".to_string(), format!("{uid}:{gid}")];
    chown.extend(paths.iter().cloned());
    process::sudo_run(&chown).await.context("Error setting up data directories")?;
    println!("Set ownership.");

    let mut chmod = vec!["chmod".to_string(), "-R".to_string(), "775".to_string()];
    chmod.extend(paths);
    process::sudo_run(&chmod).await.context("Error setting up data directories")?;
    println!("Set permissions.");

    println!("Data directories setup completed successfully.");
    Ok(StepOutcome::Applied)
}

#[cfg(not(unix))]
pub async fn setup_data_directories(
    _prompter: &mut dyn Prompter,
    _root: &Path,
    _force: bool,
) -> Result<StepOutcome> {
    println!("Data directory setup is only supported on Unix hosts.");
    Ok(StepOutcome::Skipped)
}

// Shell completion

pub fn detect_shell() -> String {
    std::env::var("SHELL").unwrap_or_default()
}

/// Whether any line of `path` contains `line` (both trimmed). A missing
/// file contains nothing.
pub fn is_line_in_file(line: &str, path: &Path) -> Result<bool, ArmError> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(false),
        Err(e) => return Err(ArmError::io(path, e)),
    };
    let needle = line.trim();
    Ok(text.lines().any(|l| l.trim().contains(needle)))
}

/// Bash completion for the current command tree.
pub fn completion_script() -> Vec<u8> {
    let mut script = Vec::new();
    generate(Shell::Bash, &mut Cli::command(), BIN_NAME, &mut script);
    script
}

/// Writes the completion script into `data_dir`, replacing any older copy.
pub fn install_completion_script(data_dir: &Path) -> Result<PathBuf, ArmError> {
    fs::create_dir_all(data_dir).map_err(|e| ArmError::io(data_dir, e))?;
    let script = data_dir.join(COMPLETION_FILE);
    fs::write(&script, completion_script()).map_err(|e| ArmError::io(&script, e))?;
    Ok(script)
}

pub fn setup_shell(
    prompter: &mut dyn Prompter,
    shell: &str,
    rc_path: &Path,
    data_dir: &Path,
    force: bool,
) -> Result<StepOutcome> {
    if !shell.contains("bash") {
        eprintln!("Unsupported shell: {shell}");
        return Ok(StepOutcome::Skipped);
    }

    let line = format!("source {}", data_dir.join(COMPLETION_FILE).display());
    if is_line_in_file(&line, rc_path)? {
        // Keep the sourced script in step with this binary's commands.
        install_completion_script(data_dir)?;
        println!("Shell addins are already configured in {}", rc_path.display());
        return Ok(StepOutcome::AlreadyDone);
    }

    println!("Adding \n\"{line}\"\nto {}", rc_path.display());
    let question = format!("Do you want to add shell autocomplete to {}?", rc_path.display());
    if !confirmed(prompter, force, &question)? {
        println!("Shell setup cancelled.");
        return Ok(StepOutcome::Skipped);
    }

    install_completion_script(data_dir)?;
    let mut rc = OpenOptions::new()
        .create(true)
        .append(true)
        .open(rc_path)
        .map_err(|e| ArmError::io(rc_path, e))?;
    writeln!(rc, "\n{line}").map_err(|e| ArmError::io(rc_path, e))?;
    Ok(StepOutcome::Applied)
}
