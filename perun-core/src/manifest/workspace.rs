use serde::{Deserialize, Serialize};

use super::Environment;

/// The only mode currently recognized (spec §3). Kept as an enum rather than
/// a bare string so an unrecognized mode fails to deserialize instead of
/// silently being accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkspaceMode {
    Local,
}

impl Default for WorkspaceMode {
    fn default() -> Self {
        WorkspaceMode::Local
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workspace {
    pub name: String,
    #[serde(default)]
    pub mode: WorkspaceMode,
    #[serde(default)]
    pub environments: Vec<Environment>,
}

impl Workspace {
    pub fn new(name: impl Into<String>) -> Self {
        Workspace {
            name: name.into(),
            mode: WorkspaceMode::Local,
            environments: Vec::new(),
        }
    }

    pub fn environment(&self, name: &str) -> Option<&Environment> {
        self.environments.iter().find(|e| e.name == name)
    }

    pub fn environment_mut(&mut self, name: &str) -> Option<&mut Environment> {
        self.environments.iter_mut().find(|e| e.name == name)
    }

    /// Replaces an environment with the same name, or appends it.
    pub fn upsert_environment(&mut self, env: Environment) {
        if let Some(existing) = self.environments.iter_mut().find(|e| e.name == env.name) {
            *existing = env;
        } else {
            self.environments.push(env);
        }
    }

    pub fn remove_environment(&mut self, name: &str) -> Option<Environment> {
        let idx = self.environments.iter().position(|e| e.name == name)?;
        Some(self.environments.remove(idx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_workspace_has_no_environments() {
        let ws = Workspace::new("acme");
        assert_eq!(ws.name, "acme");
        assert!(ws.environments.is_empty());
        assert_eq!(ws.mode, WorkspaceMode::Local);
    }

    #[test]
    fn upsert_replaces_existing_by_name() {
        let mut ws = Workspace::new("acme");
        ws.upsert_environment(Environment::new("dev"));
        assert_eq!(ws.environments.len(), 1);
        ws.upsert_environment(Environment::new("dev"));
        assert_eq!(ws.environments.len(), 1);
        ws.upsert_environment(Environment::new("staging"));
        assert_eq!(ws.environments.len(), 2);
    }

    #[test]
    fn serializes_mode_as_lowercase() {
        let ws = Workspace::new("acme");
        let yaml = serde_yaml::to_string(&ws).unwrap();
        assert!(yaml.contains("mode: local"));
    }
}
