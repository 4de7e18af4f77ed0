use thiserror::Error;

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("cluster unreachable: {0}")]
    ClusterUnreachable(String),

    #[error("filesystem error: {0}")]
    Io(#[from] std::io::Error),

    #[error("error deserializing environment document: {0}")]
    Deserialize(#[from] serde_yaml::Error),

    #[cfg(feature = "k8s")]
    #[error("kubernetes api error: {0}")]
    Kube(#[from] kube::Error),

    #[cfg(feature = "k8s")]
    #[error("kubeconfig error: {0}")]
    KubeConfig(#[from] kube::config::KubeconfigError),
}
