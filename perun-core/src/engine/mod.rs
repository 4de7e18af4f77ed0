//! The Engine Adapter (spec §4.1): a thin, typed surface over the container
//! engine, modeled as a trait so the Synchronizer and Reactor stay generic
//! over a real engine and a test double.

mod bollard_engine;
mod error;
mod types;

#[cfg(any(test, feature = "mocks"))]
pub mod mock;

pub use bollard_engine::BollardEngine;
pub use error::EngineError;
pub use types::{
    ContainerConfig, ContainerState, ContainerSummary, EngineEvent, HostConfig, NetworkConfig,
    PortBinding,
};

use async_trait::async_trait;
use futures_util::stream::BoxStream;

/// Abstracts the container engine (spec §4.1). All operations are
/// fallible with `EngineError`; the Synchronizer/Reactor are generic over
/// any `EngineAdapter` implementor.
#[async_trait]
pub trait EngineAdapter: Send + Sync {
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

    /// Streams engine events with no server-side filter, matching spec §4.5
    /// ("subscribes to the full event stream with no filter").
    async fn events(&self) -> Result<BoxStream<'static, Result<EngineEvent, EngineError>>, EngineError>;

    async fn container_logs(
        &self,
        id_or_name: &str,
    ) -> Result<BoxStream<'static, Result<Vec<u8>, EngineError>>, EngineError>;
}
