use crate::error::ArmError;
use crate::process;
use bollard::errors::Error as BollardError;
use bollard::models::ContainerSummary;
use bollard::query_parameters::{ListContainersOptions, StopContainerOptions};
use bollard::Docker;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunningContainer {
    pub id: String,
    pub name: String,
}

impl RunningContainer {
    fn from_summary(summary: ContainerSummary) -> Option<Self> {
        let id = summary.id?;
        let name = container_name(summary.names.as_deref().unwrap_or_default());
        Some(Self { id, name })
    }

    pub fn short_id(&self) -> &str {
        match self.id.char_indices().nth(12) {
            Some((idx, _)) => &self.id[..idx],
            None => &self.id,
        }
    }

    /// `name (short id)`, as shown in selection lists.
    pub fn label(&self) -> String {
        format!("{} ({})", self.name, self.short_id())
    }
}

/// First name reported by the API, without the leading `/`.
pub fn container_name(raw_names: &[String]) -> String {
    raw_names
        .first()
        .map(|n| n.trim().trim_start_matches('/').to_string())
        .unwrap_or_default()
}

fn api_failure(command: String, err: BollardError) -> ArmError {
    ArmError::ExternalCommand {
        command,
        status: "Docker API error".to_string(),
        stderr: err.to_string(),
    }
}

pub struct DockerClient {
    docker: Docker,
}

impl DockerClient {
    pub fn connect() -> Result<Self, ArmError> {
        let docker = Docker::connect_with_local_defaults()
            .map_err(|e| api_failure("docker connect".to_string(), e))?;
        Ok(Self { docker })
    }

    pub async fn running_containers(&self) -> Result<Vec<RunningContainer>, ArmError> {
        // The API lists only running containers unless `all` is set.
        let summaries = self
            .docker
            .list_containers(None::<ListContainersOptions>)
            .await
            .map_err(|e| api_failure("docker ps".to_string(), e))?;

        let mut containers: Vec<RunningContainer> = summaries
            .into_iter()
            .filter_map(RunningContainer::from_summary)
            .collect();
        containers.sort_by_key(|c| c.name.to_lowercase());
        debug!(count = containers.len(), "listed running containers");
        Ok(containers)
    }

    pub async fn stop(&self, name: &str) -> Result<(), ArmError> {
        self.docker
            .stop_container(name, None::<StopContainerOptions>)
            .await
            .map_err(|e| stop_error(name, e))
    }
}

/// A 404 from the daemon means no such container.
fn stop_error(name: &str, err: BollardError) -> ArmError {
    match err {
        BollardError::DockerResponseServerError {
            status_code: 404, ..
        } => ArmError::NotFound {
            what: "container",
            name: name.to_string(),
        },
        other => api_failure(format!("docker stop {name}"), other),
    }
}

/// Opens an interactive bash session inside `name` through the docker CLI.
pub async fn exec_shell(docker_bin: &str, name: &str) -> Result<(), ArmError> {
    process::run(docker_bin, &["exec", "-it", name, "/bin/bash"]).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn container_name_strips_slash_and_takes_first() {
        let names = vec!["/robot_core".to_string(), "/alias".to_string()];
        assert_eq!(container_name(&names), "robot_core");
        assert_eq!(container_name(&[]), "");
    }

    #[test]
    fn summary_without_id_is_skipped() {
        let summary = ContainerSummary {
            names: Some(vec!["/nameless".into()]),
            ..Default::default()
        };
        assert!(RunningContainer::from_summary(summary).is_none());
    }

    #[test]
    fn label_uses_twelve_char_id() {
        let summary = ContainerSummary {
            id: Some("0123456789abcdef0123".into()),
            names: Some(vec!["/influxdb".into()]),
            ..Default::default()
        };
        let container = RunningContainer::from_summary(summary).unwrap();
        assert_eq!(container.short_id(), "0123456789ab");
        assert_eq!(container.label(), "influxdb (0123456789ab)");
    }

    fn server_error(status_code: u16) -> BollardError {
        BollardError::DockerResponseServerError {
            status_code,
            message: "boom".into(),
        }
    }

    #[test]
    fn stop_missing_container_is_not_found() {
        let err = stop_error("ghost", server_error(404));
        assert!(
            matches!(err, ArmError::NotFound { what: "container", ref name } if name == "ghost"),
            "{err:?}"
        );
    }

    #[test]
    fn stop_other_api_errors_are_external_failures() {
        match stop_error("web", server_error(500)) {
            ArmError::ExternalCommand {
                command, status, stderr,
            } => {
                assert_eq!(command, "docker stop web");
                assert_eq!(status, "Docker API error");
                assert!(stderr.contains("boom"), "{stderr}");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn short_id_of_short_id_is_whole() {
        let container = RunningContainer {
            id: "abc".into(),
            name: "x".into(),
        };
        assert_eq!(container.short_id(), "abc");
    }
}
