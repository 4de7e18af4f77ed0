use thiserror::Error;

use crate::coordinator::CoordinatorError;
use crate::engine::EngineError;
use crate::importer::ImportError;
use crate::persistence::ManifestError;
use crate::reactor::ReactorError;
use crate::synchronizer::SynchronizeError;

/// Top-level error composed from every subsystem's own error enum, the way
/// `AgentError` composes per-module errors in the teacher crate.
#[derive(Error, Debug)]
pub enum PerunError {
    #[error("engine error: {0}")]
    Engine(#[from] EngineError),

    #[error("manifest error: {0}")]
    Manifest(#[from] ManifestError),

    #[error("synchronize error: {0}")]
    Synchronize(#[from] SynchronizeError),

    #[error("import error: {0}")]
    Import(#[from] ImportError),

    #[error("coordinator error: {0}")]
    Coordinator(#[from] CoordinatorError),

    #[error("reactor error: {0}")]
    Reactor(#[from] ReactorError),
}
