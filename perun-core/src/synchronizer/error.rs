use fs::directory_manager::DirectoryManagementError;
use fs::file::writer::WriteError;
use thiserror::Error;

use crate::engine::EngineError;
use crate::persistence::ManifestError;

#[derive(Error, Debug)]
pub enum SynchronizeError {
    #[error("environment is already active")]
    AlreadyActive,

    #[error("more than one network named {0}")]
    NetworkAmbiguous(String),

    #[error("unsupported service type: {0}")]
    UnsupportedServiceType(String),

    #[error("unsupported source type: {0}")]
    UnsupportedSourceType(String),

    #[error("code analysis is not yet supported")]
    CodeAnalysisUnsupported,

    #[error("too many containers named {0}")]
    NameCollision(String),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Manifest(#[from] ManifestError),

    #[error("filesystem error: {0}")]
    Io(#[from] std::io::Error),

    #[error("directory error: {0}")]
    Directory(#[from] DirectoryManagementError),

    #[error("error writing mount config: {0}")]
    Write(#[from] WriteError),
}
