use thiserror::Error;

use crate::importer::ImportError;
use crate::persistence::ManifestError;
use crate::synchronizer::SynchronizeError;

#[derive(Error, Debug)]
pub enum CoordinatorError {
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    #[error(transparent)]
    Synchronize(#[from] SynchronizeError),

    #[error(transparent)]
    Import(#[from] ImportError),

    #[error("environment not found: {0}")]
    EnvironmentNotFound(String),

    #[error("environment name conflict: {0}")]
    EnvironmentNameConflict(String),
}
