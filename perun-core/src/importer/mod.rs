//! K8s Importer and Local Importer (spec §4.2/§4.3): build a Manifest from a
//! live namespace or load one from a path.

mod error;
mod local;
#[cfg(feature = "k8s")]
mod pod_select;
#[cfg(feature = "k8s")]
mod k8s;

pub use error::ImportError;
pub use local::{load_local_environment, LocalImportRequest};

#[cfg(feature = "k8s")]
pub use k8s::{import_k8s_environment, K8sImportRequest};
#[cfg(feature = "k8s")]
pub use pod_select::select_pod;
