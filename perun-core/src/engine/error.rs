use thiserror::Error;

/// Error kinds from spec §7 that the Engine Adapter itself can raise.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("container engine unreachable: {0}")]
    EngineUnavailable(String),

    #[error("image not found: {0}")]
    ImageNotFound(String),

    #[error("image pull failed for {reference}: {source}")]
    ImagePullFailed {
        reference: String,
        #[source]
        source: bollard::errors::Error,
    },

    #[error("container already exists: {0}")]
    ContainerAlreadyExists(String),

    #[error("container not found: {0}")]
    ContainerNotFound(String),

    #[error("more than one network named {0}")]
    NetworkAmbiguous(String),

    #[error("engine call failed: {0}")]
    Engine(#[from] bollard::errors::Error),
}

impl EngineError {
    /// Maps a raw `bollard` error onto the spec's documented error kinds,
    /// matching on the HTTP status the daemon returned.
    pub fn from_bollard(target: &str, err: bollard::errors::Error) -> Self {
        match &err {
            bollard::errors::Error::DockerResponseServerError {
                status_code: 404, ..
            } => EngineError::ContainerNotFound(target.to_string()),
            bollard::errors::Error::DockerResponseServerError {
                status_code: 409, ..
            } => EngineError::ContainerAlreadyExists(target.to_string()),
            bollard::errors::Error::HyperResponseError { .. }
            | bollard::errors::Error::IOError { .. } => {
                EngineError::EngineUnavailable(err.to_string())
            }
            _ => EngineError::Engine(err),
        }
    }

    /// Same mapping as `from_bollard`, but for image-pull progress errors,
    /// where a 404 means the reference itself doesn't exist in the registry
    /// rather than a missing container (spec §7).
    pub fn from_bollard_image(reference: &str, err: bollard::errors::Error) -> Self {
        match &err {
            bollard::errors::Error::DockerResponseServerError {
                status_code: 404, ..
            } => EngineError::ImageNotFound(reference.to_string()),
            _ => EngineError::ImagePullFailed {
                reference: reference.to_string(),
                source: err,
            },
        }
    }
}
