//! The Manifest data model (spec §3): Workspace, Environment, Service and
//! their nested configuration, serialized as YAML.

mod environment;
mod registry;
mod run_config;
mod service;
mod workspace;

pub use environment::{EnvironmentStatus, Target};
pub use registry::Registry;
pub use run_config::{BuildConfig, Command, Config, EnVar, Mount, Port, RunConfig};
pub use service::Service;
pub use workspace::Workspace;

pub use environment::Environment;
