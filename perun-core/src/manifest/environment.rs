use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::{Registry, Service};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnvironmentStatus {
    Active,
    Inactive,
}

impl Default for EnvironmentStatus {
    fn default() -> Self {
        EnvironmentStatus::Inactive
    }
}

/// Where an environment's services were imported from (spec §4.2/§4.3):
/// `docker` for a locally-defined target, `kubernetes` for an imported one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Target {
    pub name: String,
    #[serde(rename = "type")]
    pub target_type: String,
    #[serde(default)]
    pub params: HashMap<String, String>,
}

impl Target {
    pub fn docker(name: impl Into<String>) -> Self {
        Target {
            name: name.into(),
            target_type: "docker".to_string(),
            params: HashMap::new(),
        }
    }

    pub fn kubernetes(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        let mut params = HashMap::new();
        params.insert("namespace".to_string(), namespace.into());
        Target {
            name: name.into(),
            target_type: "kubernetes".to_string(),
            params,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Environment {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub workspace: String,
    pub target: Target,
    #[serde(default)]
    pub services: HashMap<String, Service>,
    #[serde(default)]
    pub status: EnvironmentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registry: Option<Registry>,
}

impl Environment {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Environment {
            workspace: String::new(),
            description: String::new(),
            target: Target::docker(name.clone()),
            name,
            services: HashMap::new(),
            status: EnvironmentStatus::Inactive,
            registry: None,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self.status, EnvironmentStatus::Active)
    }

    /// Services in dependency order: `depends_on` edges then insertion order,
    /// with `perun-db` always first (spec §4.4 step 1).
    pub fn ordered_service_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.services.keys().cloned().collect();
        names.sort();
        if let Some(pos) = names.iter().position(|n| n == crate::defaults::DB_SERVICE_NAME) {
            let db = names.remove(pos);
            names.insert(0, db);
        }
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn db_service_is_sorted_first() {
        let mut env = Environment::new("dev");
        env.services.insert("web".to_string(), Service::new("web"));
        env.services.insert(
            crate::defaults::DB_SERVICE_NAME.to_string(),
            Service::new(crate::defaults::DB_SERVICE_NAME),
        );
        env.services.insert("api".to_string(), Service::new("api"));

        let order = env.ordered_service_names();
        assert_eq!(order[0], crate::defaults::DB_SERVICE_NAME);
        assert_eq!(order.len(), 3);
    }

    #[test]
    fn default_status_is_inactive() {
        let env = Environment::new("dev");
        assert!(!env.is_active());
    }
}
