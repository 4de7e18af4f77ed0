use std::path::Path;

use fs::file::reader::FileReader;
use tracing::instrument;

use crate::manifest::{Environment, EnvironmentStatus, ServiceStatus};

use super::ImportError;

/// Parameters for `import --type local` (spec §6/§4.2), matching
/// `original_source/services/persistence.go`'s `LoadEnvironment`.
#[derive(Debug, Clone)]
pub struct LocalImportRequest {
    pub env_path: String,
    pub name_override: Option<String>,
}

#[instrument(skip(file, request))]
pub fn load_local_environment<F: FileReader>(
    file: &F,
    request: &LocalImportRequest,
) -> Result<Environment, ImportError> {
    let content = file.read(Path::new(&request.env_path))?;
    let mut env: Environment = serde_yaml::from_str(&content)?;

    if let Some(name) = &request.name_override {
        env.name = name.clone();
    }

    env.status = EnvironmentStatus::Inactive;
    for service in env.services.values_mut() {
        service.status = ServiceStatus::Inactive;
    }

    Ok(env)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fs::file::LocalFile;

    #[test]
    fn loads_and_resets_statuses() {
        let tempdir = tempfile::tempdir().unwrap();
        let path = tempdir.path().join("hello.yml");
        std::fs::write(
            &path,
            r#"
name: api
workspace: demo
target:
  name: api
  type: docker
status: Active
services:
  web:
    name: web
    run: {}
    status: Active
"#,
        )
        .unwrap();

        let request = LocalImportRequest {
            env_path: path.to_string_lossy().to_string(),
            name_override: Some("renamed".to_string()),
        };
        let env = load_local_environment(&LocalFile, &request).unwrap();

        assert_eq!(env.name, "renamed");
        assert!(!env.is_active());
        assert_eq!(env.services["web"].status, ServiceStatus::Inactive);
    }
}
