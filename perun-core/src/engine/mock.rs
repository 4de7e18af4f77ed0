use async_trait::async_trait;
use futures_util::stream::{self, BoxStream};
use futures_util::StreamExt;
use mockall::mock;

use super::{
    ContainerConfig, ContainerState, ContainerSummary, EngineAdapter, EngineError, EngineEvent,
    HostConfig, NetworkConfig,
};

mock! {
    pub EngineAdapter {}

    #[async_trait]
    impl EngineAdapter for EngineAdapter {
        async fn network_list(&self, name_filter: &str) -> Result<Vec<String>, EngineError>;
        async fn network_create(&self, config: &NetworkConfig) -> Result<String, EngineError>;
        async fn network_connect(
            &self,
            network_id: &str,
            container_id: &str,
            aliases: &[String],
        ) -> Result<(), EngineError>;
        async fn network_remove(&self, network_id: &str) -> Result<(), EngineError>;
        async fn image_pull(&self, reference: &str, auth: Option<&str>) -> Result<(), EngineError>;
        async fn container_create(
            &self,
            name: &str,
            config: &ContainerConfig,
            host_config: &HostConfig,
        ) -> Result<String, EngineError>;
        async fn container_start(&self, id_or_name: &str) -> Result<(), EngineError>;
        async fn container_stop(&self, id_or_name: &str) -> Result<(), EngineError>;
        async fn container_remove(&self, id_or_name: &str) -> Result<(), EngineError>;
        async fn container_inspect(&self, id_or_name: &str) -> Result<ContainerState, EngineError>;
        async fn container_list(&self, name_filter: &str) -> Result<Vec<ContainerSummary>, EngineError>;
        async fn events(&self) -> Result<BoxStream<'static, Result<EngineEvent, EngineError>>, EngineError>;
        async fn container_logs(
            &self,
            id_or_name: &str,
        ) -> Result<BoxStream<'static, Result<Vec<u8>, EngineError>>, EngineError>;
    }
}

impl MockEngineAdapter {
    /// Convenience helper for Reactor tests: makes `events()` return a
    /// fixed, already-terminated sequence instead of a live stream.
    pub fn should_emit(&mut self, events: Vec<EngineEvent>) {
        self.expect_events().returning(move || {
            let items: Vec<Result<EngineEvent, EngineError>> =
                events.clone().into_iter().map(Ok).collect();
            Ok(stream::iter(items).boxed())
        });
    }
}
