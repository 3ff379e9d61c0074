//! Registered projects, keyed by descriptor path and looked up by name.
//!
//! Operations mutate the [`GlobalConfig`] in memory; callers persist it.

use crate::config::{GlobalConfig, ProjectEntry};
use crate::error::ArmError;
use std::path::{Path, PathBuf};

fn same_name(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

/// Registers `path` under `name`.
///
/// Re-registering a known path renames it in place. A name already used by
/// a different path is rejected, and so is a path that is not UTF-8, since
/// the active project is stored as a string.
pub fn add(config: &mut GlobalConfig, path: impl Into<PathBuf>, name: &str) -> Result<(), ArmError> {
    let path = path.into();
    if path.to_str().is_none() {
        return Err(ArmError::NonUtf8Path { path });
    }

    if let Some(other) = config
        .available_projects
        .iter()
        .find(|e| e.path != path && same_name(&e.name, name))
    {
        return Err(ArmError::DuplicateName {
            name: name.to_string(),
            existing: other.path.clone(),
        });
    }

    match config.available_projects.iter_mut().find(|e| e.path == path) {
        Some(entry) => entry.name = name.to_string(),
        None => config.available_projects.push(ProjectEntry {
            name: name.to_string(),
            path,
        }),
    }
    Ok(())
}

/// Removes the first entry named `name`, clearing the active project if it
/// pointed at that entry. Returns whether anything was removed.
pub fn remove(config: &mut GlobalConfig, name: &str) -> bool {
    let Some(idx) = config
        .available_projects
        .iter()
        .position(|e| same_name(&e.name, name))
    else {
        return false;
    };

    let removed = config.available_projects.remove(idx);
    if is_active_path(config, &removed.path) {
        config.active_project.clear();
    }
    true
}

pub fn list(config: &GlobalConfig) -> &[ProjectEntry] {
    &config.available_projects
}

/// First entry, in registration order, whose name matches case-insensitively.
pub fn find<'a>(config: &'a GlobalConfig, name: &str) -> Option<&'a ProjectEntry> {
    config
        .available_projects
        .iter()
        .find(|e| same_name(&e.name, name))
}

pub fn is_active(config: &GlobalConfig, entry: &ProjectEntry) -> bool {
    is_active_path(config, &entry.path)
}

fn is_active_path(config: &GlobalConfig, path: &Path) -> bool {
    config.active_path() == Some(path)
}
