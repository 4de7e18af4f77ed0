use std::collections::HashMap;
use std::sync::Arc;

use base64::engine::general_purpose::URL_SAFE;
use base64::Engine as _;
use fs::directory_manager::DirectoryManager;
use fs::file::writer::FileWriter;
use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::db_seeder::{self, SqlEngine};
use crate::defaults;
use crate::engine::{
    BindMount, ContainerConfig, EngineAdapter, HostConfig, NetworkConfig, PortBinding as EnginePort,
};
use crate::manifest::{Environment, EnvironmentStatus, Registry, Service, ServiceStatus};

use super::command::synthesize_command;
use super::image::resolve_image;
use super::mounts::materialize_mount;
use super::SynchronizeError;

#[derive(Serialize)]
struct AuthConfig<'a> {
    username: &'a str,
    password: &'a str,
    #[serde(rename = "registrytoken")]
    registry_token: &'a str,
}

/// Drives Synchronize/Unsynchronize/Destroy for a single Environment (spec
/// §4.4), composing `EngineAdapter` calls. Generic over the adapter and the
/// `fs` traits used to materialize mount configs, so tests run against
/// in-memory doubles.
pub struct Synchronizer<E, D, F>
where
    E: EngineAdapter,
    D: DirectoryManager,
    F: FileWriter,
{
    engine: Arc<E>,
    directory_manager: D,
    file: F,
}

impl<E, D, F> Synchronizer<E, D, F>
where
    E: EngineAdapter,
    D: DirectoryManager,
    F: FileWriter,
{
    pub fn new(engine: Arc<E>, directory_manager: D, file: F) -> Self {
        Synchronizer {
            engine,
            directory_manager,
            file,
        }
    }

    #[instrument(skip(self, env), fields(env = %env.name, workspace = %env.workspace))]
    pub async fn synchronize(&self, env: &mut Environment) -> Result<(), SynchronizeError> {
        let already_active_non_docker =
            env.is_active() && env.target.target_type != "docker";
        if env.is_active() && !already_active_non_docker {
            return Err(SynchronizeError::AlreadyActive);
        }

        let network_id = self.reconcile_network(&env.workspace).await?;

        if let Some(db_service) = env.services.get(defaults::DB_SERVICE_NAME).cloned() {
            let mut db_service = db_service;
            self.load_service(&network_id, env, &mut db_service).await?;
            env.services.insert(db_service.name.clone(), db_service.clone());

            tokio::time::sleep(std::time::Duration::from_secs(
                defaults::DB_BOOTSTRAP_DELAY_SECS,
            ))
            .await;

            if db_service
                .build
                .as_ref()
                .map(|b| b.build_type == "db")
                .unwrap_or(false)
            {
                // The seeder is an external collaborator (spec §4.7); a
                // failure to seed degrades functionality (the DB container
                // comes up empty) but must not abort the whole Synchronize,
                // the same way a failed Reactor spawn doesn't fail activation.
                if let Err(e) = self.seed_database(env, &db_service) {
                    warn!(error = %e, service = %db_service.name, "database seed failed, continuing without seeded data");
                }
            }
        }

        let names = env.ordered_service_names();
        for name in names {
            if name == defaults::DB_SERVICE_NAME {
                continue;
            }
            let mut service = env
                .services
                .get(&name)
                .cloned()
                .expect("name came from env.services keys");
            self.load_service(&network_id, env, &mut service).await?;
            env.services.insert(name, service);
        }

        env.status = EnvironmentStatus::Active;
        Ok(())
    }

    #[instrument(skip(self, env))]
    pub async fn unsynchronize(&self, env: &mut Environment) -> Result<(), SynchronizeError> {
        self.destroy(env).await?;
        env.status = EnvironmentStatus::Inactive;
        Ok(())
    }

    #[instrument(skip(self, env), fields(env = %env.name, workspace = %env.workspace))]
    pub async fn destroy(&self, env: &mut Environment) -> Result<(), SynchronizeError> {
        for service in env.services.values_mut() {
            let container_name = defaults::container_name(&env.name, &service.name);
            let containers = self.engine.container_list(&container_name).await?;

            let target = match containers.len() {
                0 => {
                    warn!(container = %container_name, "nothing to destroy, no container found");
                    continue;
                }
                1 => containers.into_iter().next().unwrap(),
                _ => {
                    let expected = format!("/{container_name}");
                    let matching: Vec<_> = containers
                        .into_iter()
                        .filter(|c| c.names.iter().any(|n| n == &expected))
                        .collect();
                    if matching.len() > 1 {
                        return Err(SynchronizeError::NameCollision(container_name));
                    }
                    match matching.into_iter().next() {
                        Some(c) => c,
                        None => continue,
                    }
                }
            };

            self.engine.container_stop(&target.id).await?;
            info!(container = %container_name, id = %target.id, "stopped container");
            self.engine.container_remove(&target.id).await?;
            info!(container = %container_name, id = %target.id, "removed container");
            service.status = ServiceStatus::Inactive;
        }

        let networks = self.engine.network_list(&env.workspace).await?;
        match networks.len() {
            1 => {
                self.engine.network_remove(&networks[0]).await?;
            }
            n => {
                return Err(SynchronizeError::NetworkAmbiguous(format!(
                    "{} ({} matches)",
                    env.workspace, n
                )))
            }
        }

        Ok(())
    }

    async fn reconcile_network(&self, workspace: &str) -> Result<String, SynchronizeError> {
        let networks = self.engine.network_list(workspace).await?;
        match networks.len() {
            0 => {
                let id = self
                    .engine
                    .network_create(&NetworkConfig {
                        name: workspace.to_string(),
                        attachable: true,
                        check_duplicate: true,
                    })
                    .await?;
                Ok(id)
            }
            1 => Ok(networks[0].clone()),
            _ => Err(SynchronizeError::NetworkAmbiguous(workspace.to_string())),
        }
    }

    #[instrument(skip(self, network_id, env, service), fields(service = %service.name))]
    async fn load_service(
        &self,
        network_id: &str,
        env: &Environment,
        service: &mut Service,
    ) -> Result<(), SynchronizeError> {
        let resolved = resolve_image(service)?;

        let auth = self.auth_blob(service, env);
        self.engine.image_pull(&resolved.image, auth.as_deref()).await?;

        let mut labels = HashMap::new();
        labels.insert(defaults::LABEL_PROVIDER.to_string(), defaults::LABEL_PROVIDER_VALUE.to_string());
        labels.insert(
            defaults::LABEL_PROVIDER_MODE.to_string(),
            defaults::PROVIDER_MODE_SYNC.to_string(),
        );
        labels.insert(defaults::LABEL_WORKSPACE.to_string(), env.workspace.clone());
        labels.insert(defaults::LABEL_ENV.to_string(), env.name.clone());
        labels.insert(defaults::LABEL_ENV_TARGET.to_string(), "docker".to_string());
        labels.insert(defaults::LABEL_SERVICE.to_string(), service.name.clone());

        let ports: Vec<EnginePort> = service
            .run
            .ports
            .iter()
            .map(|p| EnginePort {
                container_port: p.port.clone(),
                host_port: if p.exposed { Some(p.host_port.clone()) } else { None },
            })
            .collect();

        let env_vars: Vec<String> = service
            .run
            .en_vars
            .iter()
            .map(|e| format!("{}={}", e.key, e.value))
            .collect();

        let cmd = synthesize_command(&resolved.image, &service.pre_run, &service.run);

        let container_config = ContainerConfig {
            image: resolved.image.clone(),
            cmd,
            env: env_vars,
            labels,
            ports,
        };

        let mut binds = Vec::new();
        if let Some(local_path) = &resolved.volume_local_path {
            if !local_path.is_empty() {
                binds.push(BindMount {
                    host_path: local_path.clone(),
                    container_path: "/app".to_string(),
                });
            }
        }
        for mount in service.run.mounts.values() {
            let dir = materialize_mount(
                &self.directory_manager,
                &self.file,
                &env.workspace,
                &service.name,
                mount,
            )?;
            binds.push(BindMount {
                host_path: dir.to_string_lossy().to_string(),
                container_path: mount.path.clone(),
            });
        }

        let host_config = HostConfig {
            binds,
            runtime: "runc".to_string(),
            auto_remove: false,
            max_retry_count: 10,
        };

        let container_name = defaults::container_name(&env.name, &service.name);
        let container_id = self
            .engine
            .container_create(&container_name, &container_config, &host_config)
            .await?;

        self.engine
            .network_connect(network_id, &container_id, &[service.name.clone()])
            .await?;
        self.engine.container_start(&container_id).await?;

        service.status = ServiceStatus::Active;
        Ok(())
    }

    fn auth_blob(&self, service: &Service, env: &Environment) -> Option<String> {
        let registry: &Registry = service.registry.as_ref().or(env.registry.as_ref())?;
        let auth = AuthConfig {
            username: &registry.username,
            password: &registry.password,
            registry_token: &registry.token,
        };
        let json = serde_json::to_vec(&auth).ok()?;
        Some(URL_SAFE.encode(json))
    }

    fn seed_database(&self, env: &Environment, db_service: &Service) -> Result<(), SynchronizeError> {
        let Some(build) = &db_service.build else {
            return Ok(());
        };
        let db_type = build.params.get("type").map(String::as_str).unwrap_or("");
        let Some(engine) = SqlEngine::parse(db_type) else {
            warn!(db_type, "cannot load db, unsupported db type");
            return Ok(());
        };
        let url = build.params.get("url").cloned().unwrap_or_default();
        let target_db_url = build.params.get("target-url").cloned().unwrap_or_default();
        let location = defaults::db_dump_dir(&env.workspace, &db_service.name)?
            .join(&db_service.name)
            .to_string_lossy()
            .to_string();

        let copy = db_seeder::database_copy(engine, url, location, target_db_url);
        copy.copy().map_err(|e| SynchronizeError::Io(std::io::Error::other(e.to_string())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::mock::MockEngineAdapter;
    use crate::engine::{ContainerSummary, EngineError};
    use crate::manifest::{BuildConfig, Target};
    use assert_matches::assert_matches;
    use fs::directory_manager::DirectoryManagerFs;
    use fs::file::LocalFile;
    use mockall::Sequence;
    use std::collections::HashMap;

    fn docker_service(name: &str, image: &str) -> Service {
        let mut svc = Service::new(name);
        svc.service_type = "docker".to_string();
        svc.params.insert("image".to_string(), image.to_string());
        svc
    }

    fn synchronizer(mock: MockEngineAdapter) -> Synchronizer<MockEngineAdapter, DirectoryManagerFs, LocalFile> {
        Synchronizer::new(Arc::new(mock), DirectoryManagerFs, LocalFile)
    }

    fn environment(target: &str) -> Environment {
        let mut env = Environment::new("dev");
        env.workspace = "ws".to_string();
        env.target = match target {
            "local" => {
                let mut t = Target::docker("dev");
                t.target_type = "local".to_string();
                t
            }
            _ => Target::docker("dev"),
        };
        env
    }

    #[tokio::test]
    async fn synchronize_rejects_an_already_active_docker_environment() {
        let mock = MockEngineAdapter::new();
        let sync = synchronizer(mock);
        let mut env = environment("docker");
        env.status = EnvironmentStatus::Active;

        let result = sync.synchronize(&mut env).await;
        assert_matches!(result, Err(SynchronizeError::AlreadyActive));
    }

    #[tokio::test(start_paused = true)]
    async fn synchronize_loads_perun_db_before_other_services() {
        let tempdir = tempfile::tempdir().unwrap();
        std::env::set_var(defaults::PERUN_ROOT_ENV, tempdir.path());

        let mut env = environment("docker");
        env.services.insert(
            defaults::DB_SERVICE_NAME.to_string(),
            docker_service(defaults::DB_SERVICE_NAME, "mysql:8"),
        );
        env.services.insert("web".to_string(), docker_service("web", "nginx:latest"));

        let mut mock = MockEngineAdapter::new();
        mock.expect_network_list().returning(|_| Ok(vec!["net-1".to_string()]));
        mock.expect_image_pull().returning(|_, _| Ok(()));
        mock.expect_network_connect().returning(|_, _, _| Ok(()));
        mock.expect_container_start().returning(|_| Ok(()));

        let mut create_order = Sequence::new();
        mock.expect_container_create()
            .withf(|name, _, _| name == "dev-perun-db")
            .times(1)
            .in_sequence(&mut create_order)
            .returning(|_, _, _| Ok("db-container".to_string()));
        mock.expect_container_create()
            .withf(|name, _, _| name == "dev-web")
            .times(1)
            .in_sequence(&mut create_order)
            .returning(|_, _, _| Ok("web-container".to_string()));

        let sync = synchronizer(mock);
        let handle = tokio::spawn(async move {
            let mut env = env;
            sync.synchronize(&mut env).await.map(|_| env)
        });
        tokio::time::advance(std::time::Duration::from_secs(defaults::DB_BOOTSTRAP_DELAY_SECS + 1)).await;
        let env = handle.await.unwrap().unwrap();

        assert!(env.is_active());
        std::env::remove_var(defaults::PERUN_ROOT_ENV);
    }

    #[tokio::test(start_paused = true)]
    async fn seed_failure_degrades_but_does_not_abort_synchronize() {
        let tempdir = tempfile::tempdir().unwrap();
        std::env::set_var(defaults::PERUN_ROOT_ENV, tempdir.path());

        let mut env = environment("docker");
        let mut db = docker_service(defaults::DB_SERVICE_NAME, "mysql:8");
        db.build = Some(BuildConfig {
            build_type: "db".to_string(),
            params: HashMap::from([
                ("type".to_string(), "mysql".to_string()),
                ("url".to_string(), "mysql://u:p@host/db".to_string()),
                ("target-url".to_string(), "mysql://u:p@localhost/db".to_string()),
            ]),
        });
        env.services.insert(defaults::DB_SERVICE_NAME.to_string(), db);

        let mut mock = MockEngineAdapter::new();
        mock.expect_network_list().returning(|_| Ok(vec!["net-1".to_string()]));
        mock.expect_image_pull().returning(|_, _| Ok(()));
        mock.expect_container_create().returning(|_, _, _| Ok("db-container".to_string()));
        mock.expect_network_connect().returning(|_, _, _| Ok(()));
        mock.expect_container_start().returning(|_| Ok(()));

        let sync = synchronizer(mock);
        let handle = tokio::spawn(async move {
            let mut env = env;
            sync.synchronize(&mut env).await.map(|_| env)
        });
        tokio::time::advance(std::time::Duration::from_secs(defaults::DB_BOOTSTRAP_DELAY_SECS + 1)).await;
        let env = handle.await.unwrap().unwrap();

        // MySqlCopy::copy always fails (the real dumper is external, spec
        // §4.7); Synchronize must still report success.
        assert!(env.is_active());
        std::env::remove_var(defaults::PERUN_ROOT_ENV);
    }

    #[tokio::test]
    async fn destroy_reports_name_collision_when_containers_share_a_name() {
        let mut env = environment("docker");
        env.services.insert("web".to_string(), docker_service("web", "nginx:latest"));

        let mut mock = MockEngineAdapter::new();
        mock.expect_container_list().returning(|_| {
            Ok(vec![
                ContainerSummary {
                    id: "c1".to_string(),
                    names: vec!["/dev-web".to_string()],
                    labels: HashMap::new(),
                },
                ContainerSummary {
                    id: "c2".to_string(),
                    names: vec!["/dev-web".to_string()],
                    labels: HashMap::new(),
                },
            ])
        });

        let sync = synchronizer(mock);
        let result = sync.destroy(&mut env).await;
        assert_matches!(result, Err(SynchronizeError::NameCollision(_)));
    }

    #[tokio::test]
    async fn destroy_skips_services_with_no_matching_container() {
        let mut env = environment("docker");
        env.services.insert("web".to_string(), docker_service("web", "nginx:latest"));

        let mut mock = MockEngineAdapter::new();
        mock.expect_container_list().returning(|_| Ok(vec![]));
        mock.expect_network_list().returning(|_| Ok(vec!["net-1".to_string()]));
        mock.expect_network_remove().returning(|_| Ok(()));

        let sync = synchronizer(mock);
        sync.destroy(&mut env).await.unwrap();
    }

    #[tokio::test]
    async fn destroy_reports_network_ambiguous_when_more_than_one_network_matches() {
        let env = environment("docker");

        let mut mock = MockEngineAdapter::new();
        mock.expect_network_list()
            .returning(|_| Ok(vec!["net-1".to_string(), "net-2".to_string()]));

        let sync = synchronizer(mock);
        let mut env = env;
        let result = sync.destroy(&mut env).await;
        assert_matches!(result, Err(SynchronizeError::NetworkAmbiguous(_)));
    }

    #[tokio::test]
    async fn reconcile_network_creates_one_when_none_exists() {
        let mut mock = MockEngineAdapter::new();
        mock.expect_network_list().returning(|_| Ok(vec![]));
        mock.expect_network_create()
            .withf(|c| c.name == "ws")
            .returning(|_| Ok("new-net".to_string()));

        let sync = synchronizer(mock);
        let id = sync.reconcile_network("ws").await.unwrap();
        assert_eq!(id, "new-net");
    }

    #[tokio::test]
    async fn reconcile_network_reports_ambiguous_when_more_than_one_matches() {
        let mut mock = MockEngineAdapter::new();
        mock.expect_network_list()
            .returning(|_| Ok(vec!["net-1".to_string(), "net-2".to_string()]));

        let sync = synchronizer(mock);
        let result = sync.reconcile_network("ws").await;
        assert_matches!(result, Err(SynchronizeError::NetworkAmbiguous(_)));
    }

    #[tokio::test]
    async fn load_service_propagates_engine_errors() {
        let mut mock = MockEngineAdapter::new();
        mock.expect_image_pull()
            .returning(|_, _| Err(EngineError::ImageNotFound("nginx:latest".to_string())));

        let sync = synchronizer(mock);
        let env = environment("docker");
        let mut service = docker_service("web", "nginx:latest");
        let result = sync.load_service("net-1", &env, &mut service).await;
        assert_matches!(result, Err(SynchronizeError::Engine(EngineError::ImageNotFound(_))));
    }
}
