use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::{BuildConfig, Command, Registry, RunConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ServiceStatus {
    Active,
    Inactive,
}

impl Default for ServiceStatus {
    fn default() -> Self {
        ServiceStatus::Inactive
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Service {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type", default)]
    pub service_type: String,
    #[serde(default)]
    pub params: HashMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build: Option<BuildConfig>,
    #[serde(rename = "pre-run", default, skip_serializing_if = "Vec::is_empty")]
    pub pre_run: Vec<Command>,
    pub run: RunConfig,
    #[serde(rename = "post-run", default, skip_serializing_if = "Vec::is_empty")]
    pub post_run: Vec<Command>,
    #[serde(default)]
    pub status: ServiceStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registry: Option<Registry>,
}

impl Service {
    pub fn new(name: impl Into<String>) -> Self {
        Service {
            name: name.into(),
            description: String::new(),
            service_type: String::new(),
            params: HashMap::new(),
            depends_on: Vec::new(),
            build: None,
            pre_run: Vec::new(),
            run: RunConfig::default(),
            post_run: Vec::new(),
            status: ServiceStatus::Inactive,
            registry: None,
        }
    }

    pub fn is_db(&self) -> bool {
        self.name == crate::defaults::DB_SERVICE_NAME
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_service_is_inactive_with_empty_run() {
        let svc = Service::new("web");
        assert_eq!(svc.status, ServiceStatus::Inactive);
        assert_eq!(svc.run.cmd, "");
    }

    #[test]
    fn is_db_matches_reserved_name() {
        let svc = Service::new(crate::defaults::DB_SERVICE_NAME);
        assert!(svc.is_db());
        assert!(!Service::new("web").is_db());
    }
}
