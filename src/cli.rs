use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "arm-cli",
    version,
    about = "Experimental CLI for deploying robotic applications"
)]
pub struct Cli {
    /// Enable debug logging on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Manage ARM projects
    #[command(subcommand)]
    Projects(ProjectsCommand),

    /// Manage Docker containers
    #[command(subcommand)]
    Container(ContainerCommand),

    /// Manage the system this CLI is running on
    #[command(subcommand)]
    System(SystemCommand),

    /// Manage CLI configuration settings
    #[command(subcommand)]
    Config(ConfigCommand),

    /// Manage the CLI itself
    #[command(name = "self", subcommand)]
    SelfCmd(SelfCommand),
}

#[derive(Subcommand, Debug)]
pub enum ProjectsCommand {
    /// Register a project directory, creating its descriptor if needed
    Init {
        /// Project directory (created if missing)
        path: PathBuf,

        /// Project name (defaults to the directory name)
        #[arg(long)]
        name: Option<String>,
    },

    /// Activate a project from available projects
    Activate {
        /// Project name; prompts when omitted
        project: Option<String>,
    },

    /// Clear the active project
    Deactivate,

    /// List registered projects
    #[command(visible_alias = "ls")]
    List,

    /// Show information about the active project
    Info,

    /// Remove a project from the registry (its files are kept)
    #[command(visible_alias = "rm")]
    Remove {
        /// Project name; prompts when omitted
        project: Option<String>,

        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },

    /// Open a shell in the active project's directory
    Cd {
        /// Only print the directory path
        #[arg(long)]
        print: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum ContainerCommand {
    /// List running Docker containers
    #[command(visible_alias = "ls")]
    List,

    /// Attach a shell to a running container
    Attach {
        /// Container name; prompts when omitted
        container: Option<String>,
    },

    /// Stop a running container
    Stop {
        /// Container name; prompts when omitted
        container: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum SystemCommand {
    /// Configure X11 access, data directories and shell completion
    Setup {
        /// Apply every step without asking
        #[arg(short, long)]
        yes: bool,

        /// Skip the data directory step
        #[arg(long)]
        skip_data: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Show current configuration settings
    Show,

    /// Set the number of rows shown in interactive menus
    SetPageSize {
        size: usize,
    },

    /// Configure settings interactively
    Interactive,
}

#[derive(Subcommand, Debug)]
pub enum SelfCommand {
    /// Reinstall arm-cli from crates.io or a local source tree
    Update {
        /// Install from a local source path
        #[arg(long)]
        source: Option<PathBuf>,
    },
}
