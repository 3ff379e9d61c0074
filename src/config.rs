use crate::error::ArmError;
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const DEFAULT_PAGE_SIZE: usize = 20;
pub const DEFAULT_DATA_ROOT: &str = "/DATA";

const CONFIG_FILE: &str = "config.json";

/// Process-wide CLI state, loaded once per invocation and saved by commands
/// that change it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalConfig {
    /// Descriptor path of the active project; empty when none is active.
    pub active_project: String,
    pub available_projects: Vec<ProjectEntry>,
    pub settings: Settings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectEntry {
    pub name: String,
    /// Location of the project's descriptor file, not its working directory.
    pub path: PathBuf,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Rows shown at once by interactive selection lists.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<usize>,
    /// Root of the host data directories created by `system setup`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_root: Option<PathBuf>,
}

impl Settings {
    pub fn page_size(&self) -> usize {
        self.page_size.unwrap_or(DEFAULT_PAGE_SIZE)
    }

    pub fn data_root(&self) -> PathBuf {
        self.data_root
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_ROOT))
    }
}

impl GlobalConfig {
    pub fn has_active(&self) -> bool {
        !self.active_project.is_empty()
    }

    pub fn active_path(&self) -> Option<&Path> {
        self.has_active().then(|| Path::new(&self.active_project))
    }

    /// Checks what serde cannot: values that parse but make no sense.
    fn validate(&self) -> Result<(), String> {
        if self.settings.page_size == Some(0) {
            return Err("settings.page_size must be at least 1".to_string());
        }
        for (i, entry) in self.available_projects.iter().enumerate() {
            if entry.name.trim().is_empty() {
                return Err(format!("available_projects[{i}] has an empty name"));
            }
            if entry.path.as_os_str().is_empty() {
                return Err(format!("available_projects[{i}] has an empty path"));
            }
        }
        Ok(())
    }
}

/// `override_dir` wins when set; otherwise `<platform dir>/arm-cli`, falling
/// back to `<home>/<home_relative>/arm-cli` when the platform has no such
/// directory.
fn app_dir(
    override_dir: Option<OsString>,
    platform_dir: Option<PathBuf>,
    home: Option<PathBuf>,
    home_relative: &str,
) -> PathBuf {
    if let Some(dir) = override_dir.filter(|d| !d.is_empty()) {
        return PathBuf::from(dir);
    }
    platform_dir
        .or_else(|| home.map(|h| h.join(home_relative)))
        .unwrap_or_else(|| std::env::temp_dir().join(home_relative))
        .join("arm-cli")
}

pub fn resolve_config_dir() -> PathBuf {
    app_dir(
        std::env::var_os("ARM_CLI_CONFIG_DIR"),
        dirs::config_dir(),
        dirs::home_dir(),
        ".config",
    )
}

pub fn resolve_data_dir() -> PathBuf {
    app_dir(
        std::env::var_os("ARM_CLI_DATA_DIR"),
        dirs::data_dir(),
        dirs::home_dir(),
        ".local/share",
    )
}

pub fn resolve_docker_binary() -> String {
    std::env::var("DOCKER_BIN").unwrap_or_else(|_| "docker".to_string())
}

/// Reads and writes the global config file at a fixed location.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn from_env() -> Self {
        Self::new(resolve_config_dir().join(CONFIG_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the config, replacing a missing or corrupted file with defaults.
    ///
    /// Never fails: the config is tool-owned state, so a broken file is
    /// overwritten rather than reported.
    pub fn load(&self) -> GlobalConfig {
        match fs::read_to_string(&self.path) {
            Ok(text) => match parse(&text) {
                Ok(config) => {
                    debug!(path = %self.path.display(), "loaded config");
                    return config;
                }
                Err(reason) => warn!(
                    path = %self.path.display(),
                    "config file corrupted, creating new default config: {reason}"
                ),
            },
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no config file, creating default");
            }
            Err(e) => warn!(
                path = %self.path.display(),
                "config file unreadable, creating new default config: {e}"
            ),
        }

        let config = GlobalConfig::default();
        if let Err(e) = self.save(&config) {
            warn!("failed to write default config: {e}");
        }
        config
    }

    pub fn save(&self, config: &GlobalConfig) -> Result<(), ArmError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| ArmError::io(parent, e))?;
        }
        let mut json = serde_json::to_string_pretty(config).map_err(|e| ArmError::Malformed {
            path: self.path.clone(),
            message: e.to_string(),
        })?;
        json.push('\n');
        fs::write(&self.path, json).map_err(|e| ArmError::io(&self.path, e))?;
        debug!(path = %self.path.display(), "saved config");
        Ok(())
    }
}

fn parse(text: &str) -> Result<GlobalConfig, String> {
    let config: GlobalConfig = serde_json::from_str(text).map_err(|e| e.to_string())?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(dir: &tempfile::TempDir) -> ConfigStore {
        ConfigStore::new(dir.path().join("nested").join(CONFIG_FILE))
    }

    fn read_json(path: &Path) -> serde_json::Value {
        serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
    }

    #[test]
    fn app_dir_prefers_override_then_platform_then_home() {
        assert_eq!(
            app_dir(Some("/custom".into()), Some("/xdg".into()), Some("/home/u".into()), ".config"),
            PathBuf::from("/custom")
        );
        assert_eq!(
            app_dir(Some("".into()), Some("/xdg".into()), Some("/home/u".into()), ".config"),
            PathBuf::from("/xdg/arm-cli")
        );
        assert_eq!(
            app_dir(None, None, Some("/home/u".into()), ".local/share"),
            PathBuf::from("/home/u/.local/share/arm-cli")
        );
        assert!(app_dir(None, None, None, ".config").is_absolute());
    }

    #[test]
    fn defaults_are_empty() {
        let config = GlobalConfig::default();
        assert!(!config.has_active());
        assert!(config.active_path().is_none());
        assert!(config.available_projects.is_empty());
        assert_eq!(config.settings.page_size(), DEFAULT_PAGE_SIZE);
        assert_eq!(config.settings.data_root(), PathBuf::from("/DATA"));
    }

    #[test]
    fn missing_file_creates_and_persists_default() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir);
        assert!(!store.path().exists());

        let config = store.load();

        assert_eq!(config, GlobalConfig::default());
        assert!(store.path().exists());
        assert_eq!(
            read_json(store.path()),
            serde_json::json!({ "active_project": "", "available_projects": [], "settings": {} })
        );
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir);
        let config = GlobalConfig {
            active_project: "/p/a/project_config.json".into(),
            available_projects: vec![
                ProjectEntry {
                    name: "A".into(),
                    path: "/p/a/project_config.json".into(),
                },
                ProjectEntry {
                    name: "B".into(),
                    path: "/p/b/project_config.json".into(),
                },
            ],
            settings: Settings {
                page_size: Some(7),
                data_root: Some("/srv/data".into()),
            },
        };

        store.save(&config).unwrap();
        assert_eq!(store.load(), config);
    }

    #[test]
    fn corrupted_file_is_overwritten_with_default() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir);
        fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        fs::write(store.path(), "invalid json content").unwrap();

        let config = store.load();

        assert_eq!(config, GlobalConfig::default());
        assert_eq!(read_json(store.path())["active_project"], "");
    }

    #[test]
    fn wrong_shape_is_treated_as_corrupted() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir);
        fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        fs::write(
            store.path(),
            r#"{"active_project": 42, "available_projects": "nope"}"#,
        )
        .unwrap();

        assert_eq!(store.load(), GlobalConfig::default());
    }

    #[test]
    fn zero_page_size_is_treated_as_corrupted() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir);
        fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        fs::write(store.path(), r#"{"settings": {"page_size": 0}}"#).unwrap();

        assert_eq!(store.load(), GlobalConfig::default());
        assert_eq!(read_json(store.path())["settings"], serde_json::json!({}));
    }

    #[test]
    fn missing_fields_take_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir);
        fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        fs::write(store.path(), "{}").unwrap();

        assert_eq!(store.load(), GlobalConfig::default());
    }

    #[test]
    fn existing_file_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir);
        fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        fs::write(
            store.path(),
            r#"{"active_project": "/x/project_config.json", "settings": {"page_size": 5}}"#,
        )
        .unwrap();

        let config = store.load();
        assert_eq!(config.active_project, "/x/project_config.json");
        assert_eq!(config.settings.page_size(), 5);
        assert!(config.available_projects.is_empty());
    }
}
