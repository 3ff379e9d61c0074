//! Which registered project, if any, project-scoped commands act on.
//!
//! `active_project` is either empty (inactive) or a descriptor path. The path
//! may dangle after the descriptor is deleted outside the CLI; resolving it
//! then yields nothing instead of an error.

use crate::config::{GlobalConfig, ProjectEntry};
use crate::error::ArmError;
use crate::project::{self, ProjectConfig};
use crate::registry;
use std::path::PathBuf;
use tracing::debug;

/// Result of a successful [`activate`]. The registry entry is now active even
/// when its descriptor cannot currently be read.
#[derive(Debug)]
pub struct Activation {
    pub entry: ProjectEntry,
    pub project: Result<ProjectConfig, ArmError>,
}

#[derive(Debug)]
pub enum ActiveState {
    Inactive,
    Active(ProjectConfig),
    Dangling { path: PathBuf, error: ArmError },
}

/// Makes the project registered as `name` active.
///
/// Only registered names are accepted; on a miss the config is unchanged.
pub fn activate(config: &mut GlobalConfig, name: &str) -> Result<Activation, ArmError> {
    let entry = registry::find(config, name)
        .cloned()
        .ok_or_else(|| ArmError::NotFound {
            what: "project",
            name: name.to_string(),
        })?;

    let Some(active) = entry.path.to_str() else {
        return Err(ArmError::NonUtf8Path { path: entry.path.clone() });
    };
    config.active_project = active.to_string();
    debug!(name = %entry.name, path = %entry.path.display(), "activated project");

    let project = project::load(&entry.path);
    Ok(Activation { entry, project })
}

pub fn deactivate(config: &mut GlobalConfig) {
    config.active_project.clear();
}

/// The active project's descriptor, or `None` when inactive or unreadable.
pub fn resolve_active(config: &GlobalConfig) -> Option<ProjectConfig> {
    match diagnose(config) {
        ActiveState::Active(project) => Some(project),
        ActiveState::Inactive | ActiveState::Dangling { .. } => None,
    }
}

/// Like [`resolve_active`], but keeps the reason a set pointer did not resolve.
pub fn diagnose(config: &GlobalConfig) -> ActiveState {
    let Some(path) = config.active_path() else {
        return ActiveState::Inactive;
    };
    match project::load(path) {
        Ok(project) => ActiveState::Active(project),
        Err(error) => {
            debug!(path = %path.display(), "active project did not resolve: {error}");
            ActiveState::Dangling {
                path: path.to_path_buf(),
                error,
            }
        }
    }
}
