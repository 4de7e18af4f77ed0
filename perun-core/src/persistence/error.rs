use fs::directory_manager::DirectoryManagementError;
use fs::file::writer::WriteError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("directory error: {0}")]
    Directory(#[from] DirectoryManagementError),

    #[error("error writing manifest: {0}")]
    Write(#[from] WriteError),

    #[error("filesystem error: {0}")]
    Io(#[from] std::io::Error),

    #[error("error deserializing workspace document: {0}")]
    Deserialize(#[from] serde_yaml::Error),

    #[error("workspace not found: {0}")]
    NotFound(String),

    #[error("environment name conflict: {0}")]
    EnvironmentNameConflict(String),

    #[error("environment not found: {0}")]
    EnvironmentNotFound(String),
}
