use fs::directory_manager::DirectoryManagerFs;
use fs::file::LocalFile;
use perun_core::coordinator::Coordinator;
use perun_core::engine::{BollardEngine, EngineAdapter};
use perun_core::ide::DebugLaunchSpec;
use tracing::info;

use crate::{CliError, ImportType};

type AppCoordinator = Coordinator<BollardEngine, DirectoryManagerFs, LocalFile>;

pub fn init(coordinator: &AppCoordinator, workspace: &str) -> Result<(), CliError> {
    coordinator.create_workspace(workspace)?;
    info!(workspace, "workspace created");
    println!("workspace {workspace} created");
    Ok(())
}

pub async fn apply(
    coordinator: &AppCoordinator,
    workspace: &str,
    env_name: &str,
    env_path: &str,
    dry_run: bool,
    db: Option<(String, String)>,
) -> Result<(), CliError> {
    coordinator.import_local_environment(
        &LocalFile,
        workspace,
        env_path,
        Some(env_name.to_string()),
        db,
    )?;

    if dry_run {
        println!("imported {env_name} into {workspace} (dry run, not activated)");
        return Ok(());
    }

    coordinator.activate_environment(workspace, env_name).await?;
    println!("{env_name} active in {workspace}");
    Ok(())
}

pub async fn destroy(coordinator: &AppCoordinator, workspace: &str, env_name: Option<&str>) -> Result<(), CliError> {
    match env_name {
        Some(env) => {
            coordinator.destroy_environment(workspace, env).await?;
            println!("destroyed {env} in {workspace}");
        }
        None => {
            coordinator.destroy_workspace(workspace).await?;
            println!("destroyed workspace {workspace}");
        }
    }
    Ok(())
}

pub fn list(coordinator: &AppCoordinator) -> Result<(), CliError> {
    for workspace in coordinator.list_workspaces()? {
        println!("{}", workspace.name);
        for env in &workspace.environments {
            println!("  {} [{:?}]", env.name, env.status);
        }
    }
    Ok(())
}

pub async fn activate(coordinator: &AppCoordinator, workspace: &str, env_name: &str) -> Result<(), CliError> {
    coordinator.activate_environment(workspace, env_name).await?;
    println!("{env_name} active in {workspace}");
    Ok(())
}

pub async fn deactivate(coordinator: &AppCoordinator, workspace: &str, env_name: &str) -> Result<(), CliError> {
    coordinator.deactivate_environment(workspace, env_name).await?;
    println!("{env_name} inactive in {workspace}");
    Ok(())
}

#[allow(clippy::too_many_arguments)]
pub async fn import(
    coordinator: &AppCoordinator,
    workspace: &str,
    import_type: ImportType,
    path: Option<String>,
    cluster: Option<String>,
    namespace: Option<String>,
    server: Option<String>,
    token: Option<String>,
    ca: Option<String>,
    name: Option<String>,
    exclude: Vec<String>,
    db: Option<(String, String)>,
) -> Result<(), CliError> {
    match import_type {
        ImportType::Local => {
            let path = path.ok_or_else(|| CliError::Usage("--path is required for --type local".to_string()))?;
            coordinator.import_local_environment(&LocalFile, workspace, &path, name, db)?;
        }
        ImportType::K8s => {
            import_k8s(coordinator, workspace, cluster, namespace, server, token, ca, exclude, db).await?;
        }
    }
    println!("import complete");
    Ok(())
}

#[allow(clippy::too_many_arguments)]
async fn import_k8s(
    coordinator: &AppCoordinator,
    workspace: &str,
    cluster: Option<String>,
    namespace: Option<String>,
    server: Option<String>,
    token: Option<String>,
    ca: Option<String>,
    exclude: Vec<String>,
    db: Option<(String, String)>,
) -> Result<(), CliError> {
    let cluster = cluster.ok_or_else(|| CliError::Usage("--cluster is required for --type k8s".to_string()))?;
    let namespace = namespace.unwrap_or_else(|| cluster.clone());
    let request = perun_core::importer::K8sImportRequest {
        workspace: workspace.to_string(),
        cluster,
        namespace,
        server,
        token,
        ca_base64: ca,
        exclude,
    };
    coordinator.import_k8s_environment(workspace, &request, db).await?;
    Ok(())
}

#[allow(clippy::too_many_arguments)]
pub fn generate(
    workspace: &str,
    env_name: &str,
    service_name: &str,
    ide: &str,
    source_location: &str,
    source_type: &str,
    command: &str,
    env_target: &str,
) -> Result<(), CliError> {
    let spec = DebugLaunchSpec::new(
        workspace,
        env_name,
        service_name,
        source_location,
        source_type,
        command,
        env_target,
    );
    println!("ide: {ide}");
    println!("debug container: {}", spec.debug_container_name());
    for (key, value) in spec.labels() {
        println!("label {key}={value}");
    }
    println!(
        "launch.json/tasks.json generation under {}/.vscode/ is handled by the external IDE-config generator",
        spec.source_location
    );
    Ok(())
}

pub async fn logs(id: &str) -> Result<(), CliError> {
    use futures_util::StreamExt;

    let engine = BollardEngine::connect()?;
    let mut stream = engine.container_logs(id).await?;
    while let Some(chunk) = stream.next().await {
        let bytes = chunk?;
        print!("{}", String::from_utf8_lossy(&bytes));
    }
    Ok(())
}
