use crate::error::ArmError;
use serde::Deserialize;
use serde_json::Value;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Conventional descriptor file name inside a project directory.
pub const DESCRIPTOR_FILE: &str = "project_config.json";

const TEMPLATE: &str = include_str!("../resources/default_project_config.json");

/// A project's own descriptor. User-owned: the CLI writes it once at
/// registration and only reads it afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectConfig {
    pub name: String,
    pub description: Option<String>,
    pub project_directory: Option<PathBuf>,
    pub docker_compose_file: Option<PathBuf>,
    pub data_directory: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawProjectConfig {
    name: Option<String>,
    description: Option<String>,
    project_directory: Option<String>,
    docker_compose_file: Option<String>,
    data_directory: Option<String>,
}

impl ProjectConfig {
    #[cfg(test)]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            project_directory: None,
            docker_compose_file: None,
            data_directory: None,
        }
    }

    /// Compose file path, resolved against the project directory when relative.
    pub fn compose_file_path(&self) -> Option<PathBuf> {
        let compose = self.docker_compose_file.as_ref()?;
        match &self.project_directory {
            Some(dir) if compose.is_relative() => Some(dir.join(compose)),
            _ => Some(compose.clone()),
        }
    }
}

/// Loads the descriptor at `path`.
///
/// Missing files are `NotFound`; anything that is not a JSON object of the
/// expected shape is `Malformed`. Neither case touches the file.
pub fn load(path: &Path) -> Result<ProjectConfig, ArmError> {
    let text = fs::read_to_string(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => ArmError::NotFound {
            what: "project descriptor",
            name: path.display().to_string(),
        },
        _ => ArmError::io(path, e),
    })?;

    let malformed = |message: String| ArmError::Malformed {
        path: path.to_path_buf(),
        message,
    };
    let value: Value = serde_json::from_str(&text).map_err(|e| malformed(e.to_string()))?;
    if !value.is_object() {
        return Err(malformed("expected a JSON object".to_string()));
    }
    let raw: RawProjectConfig =
        serde_json::from_value(value).map_err(|e| malformed(e.to_string()))?;

    let name = match non_empty(raw.name) {
        Some(name) => name,
        None => default_name(path),
    };

    Ok(ProjectConfig {
        name,
        description: non_empty(raw.description),
        project_directory: non_empty(raw.project_directory).map(PathBuf::from),
        docker_compose_file: non_empty(raw.docker_compose_file).map(PathBuf::from),
        data_directory: non_empty(raw.data_directory).map(PathBuf::from),
    })
}

/// Creates `target_dir/project_config.json` from the bundled template and
/// loads it. An existing descriptor is loaded as-is and never overwritten.
pub fn init_from_template(target_dir: &Path, name: &str) -> Result<ProjectConfig, ArmError> {
    let descriptor = target_dir.join(DESCRIPTOR_FILE);
    if descriptor.exists() {
        debug!(path = %descriptor.display(), "descriptor exists, skipping template");
        return load(&descriptor);
    }

    fs::create_dir_all(target_dir).map_err(|e| ArmError::io(target_dir, e))?;
    let project_dir = fs::canonicalize(target_dir).map_err(|e| ArmError::io(target_dir, e))?;

    let mut doc: Value = serde_json::from_str(TEMPLATE).map_err(|e| ArmError::Malformed {
        path: PathBuf::from("<bundled project template>"),
        message: e.to_string(),
    })?;
    if let Some(fields) = doc.as_object_mut() {
        fields.insert("name".into(), Value::from(name));
        fields.insert(
            "project_directory".into(),
            Value::from(project_dir.to_string_lossy().into_owned()),
        );
    }

    let mut json = serde_json::to_string_pretty(&doc).map_err(|e| ArmError::Malformed {
        path: descriptor.clone(),
        message: e.to_string(),
    })?;
    json.push('\n');
    fs::write(&descriptor, json).map_err(|e| ArmError::io(&descriptor, e))?;
    debug!(path = %descriptor.display(), "wrote descriptor from template");

    load(&descriptor)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn default_name(descriptor: &Path) -> String {
    let parent_name = |p: &Path| {
        p.parent()
            .and_then(Path::file_name)
            .map(|n| n.to_string_lossy().into_owned())
    };
    parent_name(descriptor)
        .or_else(|| fs::canonicalize(descriptor).ok().as_deref().and_then(parent_name))
        .unwrap_or_else(|| "project".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(path: &Path, body: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, body).unwrap();
    }

    #[test]
    fn load_reads_all_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("robot").join(DESCRIPTOR_FILE);
        write(
            &path,
            r#"{
                "name": "test-project",
                "description": "Test project for unit tests",
                "project_directory": "/tmp/test-project",
                "docker_compose_file": "docker-compose.yml",
                "data_directory": "/DATA"
            }"#,
        );

        let project = load(&path).unwrap();
        assert_eq!(project.name, "test-project");
        assert_eq!(project.description.as_deref(), Some("Test project for unit tests"));
        assert_eq!(project.project_directory, Some(PathBuf::from("/tmp/test-project")));
        assert_eq!(project.docker_compose_file, Some(PathBuf::from("docker-compose.yml")));
        assert_eq!(project.data_directory, Some(PathBuf::from("/DATA")));
        assert_eq!(
            project.compose_file_path(),
            Some(PathBuf::from("/tmp/test-project/docker-compose.yml"))
        );
    }

    #[test]
    fn missing_name_defaults_to_directory_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rover").join(DESCRIPTOR_FILE);
        write(&path, r#"{"description": ""}"#);

        let project = load(&path).unwrap();
        assert_eq!(project, ProjectConfig::named("rover"));
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = load(&dir.path().join(DESCRIPTOR_FILE)).unwrap_err();
        assert!(matches!(err, ArmError::NotFound { .. }), "{err:?}");
    }

    #[test]
    fn invalid_json_is_malformed_and_left_alone() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DESCRIPTOR_FILE);
        write(&path, "{ not json");

        let err = load(&path).unwrap_err();
        assert!(matches!(err, ArmError::Malformed { .. }), "{err:?}");
        assert_eq!(fs::read_to_string(&path).unwrap(), "{ not json");
    }

    #[test]
    fn wrong_shape_is_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DESCRIPTOR_FILE);

        write(&path, "[]");
        assert!(matches!(load(&path), Err(ArmError::Malformed { .. })));

        write(&path, r#"{"name": 3}"#);
        assert!(matches!(load(&path), Err(ArmError::Malformed { .. })));
    }

    #[test]
    fn absolute_compose_file_is_kept() {
        let mut project = ProjectConfig::named("x");
        project.project_directory = Some("/work/x".into());
        project.docker_compose_file = Some("/etc/compose.yml".into());
        assert_eq!(project.compose_file_path(), Some(PathBuf::from("/etc/compose.yml")));

        project.docker_compose_file = None;
        assert_eq!(project.compose_file_path(), None);
    }

    #[test]
    fn init_writes_template_with_name_and_directory() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("new-robot");

        let project = init_from_template(&target, "Robo").unwrap();

        assert_eq!(project.name, "Robo");
        assert_eq!(
            project.project_directory,
            Some(fs::canonicalize(&target).unwrap())
        );
        assert_eq!(project.docker_compose_file, Some(PathBuf::from("docker-compose.yml")));
        assert!(target.join(DESCRIPTOR_FILE).exists());
    }

    #[test]
    fn init_twice_keeps_user_edits() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("robot");
        init_from_template(&target, "Robo").unwrap();

        let descriptor = target.join(DESCRIPTOR_FILE);
        let edited = r#"{"name": "Robo", "description": "hand edited"}"#;
        fs::write(&descriptor, edited).unwrap();

        let project = init_from_template(&target, "Other").unwrap();
        assert_eq!(project.name, "Robo");
        assert_eq!(project.description.as_deref(), Some("hand edited"));
        assert_eq!(fs::read_to_string(&descriptor).unwrap(), edited);
    }
}
