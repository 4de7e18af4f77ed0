use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use bollard::container::{
    Config as BollardContainerConfig, CreateContainerOptions, ListContainersOptions,
    LogsOptions, RemoveContainerOptions, StopContainerOptions,
};
use bollard::image::CreateImageOptions;
use bollard::models::{HostConfig as BollardHostConfig, Mount, MountTypeEnum, PortBinding as BollardPortBinding};
use bollard::network::{ConnectNetworkOptions, CreateNetworkOptions, ListNetworksOptions};
use bollard::system::EventsOptions;
use bollard::Docker;
use futures_util::stream::BoxStream;
use futures_util::{StreamExt, TryStreamExt};
use tracing::instrument;

use crate::defaults;

use super::{
    ContainerConfig, ContainerState, ContainerSummary, EngineAdapter, EngineError, EngineEvent,
    HostConfig, NetworkConfig,
};

/// `EngineAdapter` backed by `bollard`, the idiomatic Rust Docker Engine
/// client (also the teacher's own dev-dependency for container-driven
/// tests, and used across the retrieved pack's other example repos).
pub struct BollardEngine {
    docker: Docker,
}

impl BollardEngine {
    pub fn connect() -> Result<Self, EngineError> {
        let docker = Docker::connect_with_local_defaults()
            .map_err(|e| EngineError::EngineUnavailable(e.to_string()))?;
        Ok(BollardEngine { docker })
    }
}

#[async_trait]
impl EngineAdapter for BollardEngine {
    #[instrument(skip(self))]
    async fn network_list(&self, name_filter: &str) -> Result<Vec<String>, EngineError> {
        let mut filters = HashMap::new();
        filters.insert("name".to_string(), vec![name_filter.to_string()]);
        let opts = ListNetworksOptions { filters };
        let networks = self
            .docker
            .list_networks(Some(opts))
            .await
            .map_err(|e| EngineError::from_bollard(name_filter, e))?;
        Ok(networks.into_iter().filter_map(|n| n.name).collect())
    }

    #[instrument(skip(self, config))]
    async fn network_create(&self, config: &NetworkConfig) -> Result<String, EngineError> {
        let opts = CreateNetworkOptions {
            name: config.name.clone(),
            attachable: config.attachable,
            check_duplicate: config.check_duplicate,
            ..Default::default()
        };
        let resp = self
            .docker
            .create_network(opts)
            .await
            .map_err(|e| EngineError::from_bollard(&config.name, e))?;
        resp.id
            .ok_or_else(|| EngineError::EngineUnavailable("network create returned no id".into()))
    }

    #[instrument(skip(self))]
    async fn network_connect(
        &self,
        network_id: &str,
        container_id: &str,
        aliases: &[String],
    ) -> Result<(), EngineError> {
        let endpoint_config = bollard::models::EndpointSettings {
            aliases: Some(aliases.to_vec()),
            ..Default::default()
        };
        let opts = ConnectNetworkOptions {
            container: container_id.to_string(),
            endpoint_config,
        };
        self.docker
            .connect_network(network_id, opts)
            .await
            .map_err(|e| EngineError::from_bollard(container_id, e))
    }

    #[instrument(skip(self))]
    async fn network_remove(&self, network_id: &str) -> Result<(), EngineError> {
        self.docker
            .remove_network(network_id)
            .await
            .map_err(|e| EngineError::from_bollard(network_id, e))
    }

    #[instrument(skip(self))]
    async fn image_pull(&self, reference: &str, auth: Option<&str>) -> Result<(), EngineError> {
        let opts = CreateImageOptions {
            from_image: reference.to_string(),
            platform: "linux/amd64".to_string(),
            ..Default::default()
        };
        let credentials = auth.map(|encoded| bollard::auth::DockerCredentials {
            auth: Some(encoded.to_string()),
            ..Default::default()
        });
        let mut stream = self.docker.create_image(Some(opts), None, credentials);
        while let Some(progress) = stream.next().await {
            progress.map_err(|e| EngineError::from_bollard_image(reference, e))?;
        }
        Ok(())
    }

    #[instrument(skip(self, config, host_config))]
    async fn container_create(
        &self,
        name: &str,
        config: &ContainerConfig,
        host_config: &HostConfig,
    ) -> Result<String, EngineError> {
        let exposed_ports: HashMap<String, HashMap<(), ()>> = config
            .ports
            .iter()
            .map(|p| (format!("{}/tcp", p.container_port), HashMap::new()))
            .collect();

        let port_bindings: HashMap<String, Option<Vec<BollardPortBinding>>> = config
            .ports
            .iter()
            .filter_map(|p| {
                p.host_port.as_ref().map(|host_port| {
                    (
                        format!("{}/tcp", p.container_port),
                        Some(vec![BollardPortBinding {
                            host_ip: None,
                            host_port: Some(host_port.clone()),
                        }]),
                    )
                })
            })
            .collect();

        let mounts: Vec<Mount> = host_config
            .binds
            .iter()
            .map(|b| Mount {
                target: Some(b.container_path.clone()),
                source: Some(b.host_path.clone()),
                typ: Some(MountTypeEnum::BIND),
                ..Default::default()
            })
            .collect();

        let bollard_host_config = BollardHostConfig {
            port_bindings: Some(port_bindings),
            mounts: Some(mounts),
            runtime: Some(host_config.runtime.clone()),
            auto_remove: Some(host_config.auto_remove),
            restart_policy: Some(bollard::models::RestartPolicy {
                name: Some(bollard::models::RestartPolicyNameEnum::ON_FAILURE),
                maximum_retry_count: Some(host_config.max_retry_count as isize),
            }),
            ..Default::default()
        };

        let bollard_config = BollardContainerConfig {
            image: Some(config.image.clone()),
            cmd: config.cmd.clone(),
            env: Some(config.env.clone()),
            labels: Some(config.labels.clone()),
            exposed_ports: Some(exposed_ports),
            host_config: Some(bollard_host_config),
            ..Default::default()
        };

        let opts = CreateContainerOptions {
            name: name.to_string(),
            platform: Some("linux/amd64".to_string()),
        };

        let resp = self
            .docker
            .create_container(Some(opts), bollard_config)
            .await
            .map_err(|e| EngineError::from_bollard(name, e))?;
        Ok(resp.id)
    }

    #[instrument(skip(self))]
    async fn container_start(&self, id_or_name: &str) -> Result<(), EngineError> {
        self.docker
            .start_container::<String>(id_or_name, None)
            .await
            .map_err(|e| EngineError::from_bollard(id_or_name, e))
    }

    #[instrument(skip(self))]
    async fn container_stop(&self, id_or_name: &str) -> Result<(), EngineError> {
        self.docker
            .stop_container(id_or_name, None::<StopContainerOptions>)
            .await
            .map_err(|e| EngineError::from_bollard(id_or_name, e))
    }

    #[instrument(skip(self))]
    async fn container_remove(&self, id_or_name: &str) -> Result<(), EngineError> {
        let opts = RemoveContainerOptions {
            force: true,
            v: true,
            ..Default::default()
        };
        self.docker
            .remove_container(id_or_name, Some(opts))
            .await
            .map_err(|e| EngineError::from_bollard(id_or_name, e))
    }

    #[instrument(skip(self))]
    async fn container_inspect(&self, id_or_name: &str) -> Result<ContainerState, EngineError> {
        let resp = self
            .docker
            .inspect_container(id_or_name, None)
            .await
            .map_err(|e| EngineError::from_bollard(id_or_name, e))?;
        let state = resp.state.unwrap_or_default();
        Ok(ContainerState {
            running: state.running.unwrap_or(false),
            status: state
                .status
                .map(|s| format!("{s:?}").to_lowercase())
                .unwrap_or_default(),
        })
    }

    #[instrument(skip(self))]
    async fn container_list(&self, name_filter: &str) -> Result<Vec<ContainerSummary>, EngineError> {
        let mut filters = HashMap::new();
        filters.insert("name".to_string(), vec![name_filter.to_string()]);
        let opts = ListContainersOptions {
            all: true,
            filters,
            ..Default::default()
        };
        let containers = self
            .docker
            .list_containers(Some(opts))
            .await
            .map_err(|e| EngineError::from_bollard(name_filter, e))?;
        Ok(containers
            .into_iter()
            .map(|c| ContainerSummary {
                id: c.id.unwrap_or_default(),
                names: c.names.unwrap_or_default(),
                labels: c.labels.unwrap_or_default(),
            })
            .collect())
    }

    #[instrument(skip(self))]
    async fn events(&self) -> Result<BoxStream<'static, Result<EngineEvent, EngineError>>, EngineError> {
        let stream = self
            .docker
            .events(None::<EventsOptions<String>>)
            .map(|item| {
                item.map(|msg| EngineEvent {
                    event_type: msg
                        .typ
                        .map(|t| format!("{t:?}").to_lowercase())
                        .unwrap_or_default(),
                    action: msg.action.unwrap_or_default(),
                    actor_id: msg.actor.as_ref().and_then(|a| a.id.clone()).unwrap_or_default(),
                    attributes: msg
                        .actor
                        .and_then(|a| a.attributes)
                        .unwrap_or_default(),
                })
                .map_err(|e| EngineError::from_bollard("events", e))
            })
            .boxed();
        Ok(stream)
    }

    #[instrument(skip(self))]
    async fn container_logs(
        &self,
        id_or_name: &str,
    ) -> Result<BoxStream<'static, Result<Vec<u8>, EngineError>>, EngineError> {
        let opts = LogsOptions::<String> {
            stdout: true,
            stderr: true,
            follow: false,
            ..Default::default()
        };
        let id = id_or_name.to_string();
        let timeout_id = id.clone();
        let stream = self
            .docker
            .logs(id_or_name, Some(opts))
            .map_ok(|chunk| chunk.into_bytes().to_vec())
            .map_err(move |e| EngineError::from_bollard(&id, e));
        let stream = tokio_stream::StreamExt::timeout(
            stream,
            Duration::from_secs(defaults::CONTAINER_LOGS_TIMEOUT_SECS),
        );
        let stream = StreamExt::map(stream, move |item| match item {
            Ok(result) => result,
            Err(_elapsed) => Err(EngineError::EngineUnavailable(format!(
                "container logs for {timeout_id} timed out after {}s",
                defaults::CONTAINER_LOGS_TIMEOUT_SECS
            ))),
        })
        .boxed();
        Ok(stream)
    }
}
