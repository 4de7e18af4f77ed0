use serde::{Deserialize, Serialize};

/// Credentials for a private container registry a service's image is pulled
/// from (spec §3). `token` and `username`/`password` are mutually
/// exclusive in practice but the model does not enforce that, matching the
/// original's plain struct.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Registry {
    pub host: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub token: String,
}
