use std::sync::Arc;

use fs::directory_manager::DirectoryManager;
use fs::file::reader::FileReader;
use fs::file::renamer::FileRenamer;
use fs::file::writer::FileWriter;
use tracing::instrument;

use crate::defaults::DB_SERVICE_NAME;
use crate::engine::EngineAdapter;
use crate::importer::{load_local_environment, LocalImportRequest};
use crate::manifest::{EnVar, Environment, RunConfig, Service, Workspace};
use crate::persistence::WorkspaceStore;
use crate::synchronizer::Synchronizer;

use super::reactor_process::{reactor_is_running, spawn_reactor};
use super::CoordinatorError;

/// Orchestrates import → persist → activate → deactivate → destroy (spec
/// §4.6), the single entry point the CLI talks to.
pub struct Coordinator<E, D, F>
where
    E: EngineAdapter,
    D: DirectoryManager,
    F: FileReader + FileWriter + FileRenamer,
{
    store: WorkspaceStore<D, F>,
    synchronizer: Synchronizer<E, D, F>,
}

impl<E, D, F> Coordinator<E, D, F>
where
    E: EngineAdapter,
    D: DirectoryManager,
    F: FileReader + FileWriter + FileRenamer,
{
    pub fn new(store: WorkspaceStore<D, F>, engine: Arc<E>, directory_manager: D, file: F) -> Self {
        Coordinator {
            store,
            synchronizer: Synchronizer::new(engine, directory_manager, file),
        }
    }

    #[instrument(skip(self))]
    pub fn create_workspace(&self, name: &str) -> Result<(), CoordinatorError> {
        let workspace = Workspace::new(name);
        self.store.persist(&workspace)?;
        Ok(())
    }

    #[instrument(skip(self))]
    pub fn get_workspace(&self, name: &str) -> Result<Option<Workspace>, CoordinatorError> {
        Ok(self.store.get(name)?)
    }

    #[instrument(skip(self))]
    pub fn list_workspaces(&self) -> Result<Vec<Workspace>, CoordinatorError> {
        Ok(self.store.list()?)
    }

    #[instrument(skip(self))]
    pub async fn destroy_workspace(&self, name: &str) -> Result<(), CoordinatorError> {
        let mut workspace = self.store.require(name)?;
        for env in &mut workspace.environments {
            self.synchronizer.destroy(env).await?;
        }
        self.store.clear(name)?;
        Ok(())
    }

    #[instrument(skip(self, file))]
    pub fn import_local_environment<R: FileReader>(
        &self,
        file: &R,
        workspace: &str,
        env_path: &str,
        name_override: Option<String>,
        db: Option<(String, String)>,
    ) -> Result<(), CoordinatorError> {
        let mut ws = self.store.require(workspace)?;

        let request = LocalImportRequest {
            env_path: env_path.to_string(),
            name_override,
        };
        let mut env = load_local_environment(file, &request)?;

        if ws.environment(&env.name).is_some() {
            return Err(CoordinatorError::EnvironmentNameConflict(env.name));
        }

        if let Some((db_type, db_url)) = db {
            env.services.insert(DB_SERVICE_NAME.to_string(), db_service(db_type, db_url));
        }

        ws.upsert_environment(env);
        self.store.persist(&ws)?;
        Ok(())
    }

    #[cfg(feature = "k8s")]
    #[instrument(skip(self, request))]
    pub async fn import_k8s_environment(
        &self,
        workspace: &str,
        request: &crate::importer::K8sImportRequest,
        db: Option<(String, String)>,
    ) -> Result<(), CoordinatorError> {
        let mut ws = self.store.require(workspace)?;
        let mut env = crate::importer::import_k8s_environment(request).await?;

        if ws.environment(&env.name).is_some() {
            return Err(CoordinatorError::EnvironmentNameConflict(env.name));
        }

        if let Some((db_type, db_url)) = db {
            env.services.insert(DB_SERVICE_NAME.to_string(), db_service(db_type, db_url));
        }

        ws.upsert_environment(env);
        self.store.persist(&ws)?;
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn activate_environment(&self, workspace: &str, env_name: &str) -> Result<(), CoordinatorError> {
        let mut ws = self.store.require(workspace)?;
        let env = ws
            .environment_mut(env_name)
            .ok_or_else(|| CoordinatorError::EnvironmentNotFound(env_name.to_string()))?;

        self.synchronizer.synchronize(env).await?;
        self.store.persist(&ws)?;

        if !reactor_is_running() {
            spawn_reactor(None);
        }
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn deactivate_environment(&self, workspace: &str, env_name: &str) -> Result<(), CoordinatorError> {
        let mut ws = self.store.require(workspace)?;
        let env = ws
            .environment_mut(env_name)
            .ok_or_else(|| CoordinatorError::EnvironmentNotFound(env_name.to_string()))?;

        self.synchronizer.unsynchronize(env).await?;
        self.store.persist(&ws)?;
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn destroy_environment(&self, workspace: &str, env_name: &str) -> Result<(), CoordinatorError> {
        let mut ws = self.store.require(workspace)?;
        let env = ws
            .environment_mut(env_name)
            .ok_or_else(|| CoordinatorError::EnvironmentNotFound(env_name.to_string()))?;

        self.synchronizer.destroy(env).await?;
        ws.remove_environment(env_name);
        self.store.persist(&ws)?;
        Ok(())
    }
}

/// Builds the reserved `perun-db` service appended after an import when
/// `--db-type`/`--db-url` are supplied (spec §4.3 step 4, §8.6).
fn db_service(db_type: String, db_url: String) -> Service {
    let mut service = Service::new(DB_SERVICE_NAME);
    service.service_type = "docker".to_string();

    let engine = crate::db_seeder::SqlEngine::parse(&db_type);
    let image = engine.map(|e| e.default_image().to_string()).unwrap_or_else(|| format!("{db_type}:latest"));
    let host_port = engine.map(|e| e.host_port().to_string()).unwrap_or_default();

    service.params.insert("image".to_string(), image.clone());

    let mut build_params = std::collections::HashMap::new();
    build_params.insert("type".to_string(), db_type);
    build_params.insert("url".to_string(), db_url.clone());
    build_params.insert("target-url".to_string(), db_url.clone());
    service.build = Some(crate::manifest::BuildConfig {
        build_type: "db".to_string(),
        params: build_params,
    });

    let en_vars = if let Ok(parts) = crate::db_seeder::UrlParts::parse(&db_url) {
        engine.map(|e| e.seed_env(&parts)).unwrap_or_default()
    } else {
        Vec::new()
    };

    service.run = RunConfig {
        en_vars: en_vars
            .into_iter()
            .map(|(key, value)| EnVar { key, value })
            .collect(),
        ports: vec![crate::manifest::Port {
            port: host_port.clone(),
            host_port,
            exposed: true,
        }],
        ..Default::default()
    };

    service
}
