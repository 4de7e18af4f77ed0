//! Naming convention and default paths (spec §3, §6).

use std::path::PathBuf;

/// Environment variable overriding the perun state root, mostly for tests.
pub const PERUN_ROOT_ENV: &str = "PERUN_ROOT";

/// Default per-user state directory, relative to the home directory.
pub const PERUN_ROOT_DIR: &str = ".perun";

pub const WORKSPACE_DOCUMENT_NAME: &str = "workspace.yml";

/// Service name reserved for the database seed container; brought up first.
pub const DB_SERVICE_NAME: &str = "perun-db";

pub const LABEL_PROVIDER: &str = "provider";
pub const LABEL_PROVIDER_VALUE: &str = "perun";
pub const LABEL_PROVIDER_MODE: &str = "provider-mode";
pub const LABEL_WORKSPACE: &str = "perun-workspace";
pub const LABEL_ENV: &str = "perun-env";
pub const LABEL_ENV_TARGET: &str = "perun-env-target";
pub const LABEL_SERVICE: &str = "perun-service";

pub const PROVIDER_MODE_SYNC: &str = "sync";
pub const PROVIDER_MODE_DEBUG: &str = "debug";

/// Seconds the Synchronizer waits after starting `perun-db` before seeding it.
/// A conservative constant, not probe-driven (spec §4.4, open question in §9).
pub const DB_BOOTSTRAP_DELAY_SECS: u64 = 15;

/// Timeout imposed on `ContainerLogs` (spec §5).
pub const CONTAINER_LOGS_TIMEOUT_SECS: u64 = 5;

/// Overlay network name for a workspace is the workspace name itself.
pub fn network_name(workspace: &str) -> String {
    workspace.to_string()
}

/// Container name for a service within an environment.
pub fn container_name(env_name: &str, service_name: &str) -> String {
    format!("{env_name}-{service_name}")
}

/// Debug image tag for a service within an environment/workspace.
pub fn debug_image_tag(workspace: &str, env_name: &str, service_name: &str) -> String {
    format!("{workspace}{env_name}{service_name}:latest")
}

/// Root directory under which all workspace state is persisted.
pub fn perun_root() -> std::io::Result<PathBuf> {
    if let Ok(root) = std::env::var(PERUN_ROOT_ENV) {
        return Ok(PathBuf::from(root));
    }
    let home = dirs::home_dir().ok_or_else(|| {
        std::io::Error::other("failed to determine home directory to locate perun state")
    })?;
    Ok(home.join(PERUN_ROOT_DIR))
}

pub fn workspace_dir(workspace: &str) -> std::io::Result<PathBuf> {
    Ok(perun_root()?.join(workspace))
}

pub fn workspace_document_path(workspace: &str) -> std::io::Result<PathBuf> {
    Ok(workspace_dir(workspace)?.join(WORKSPACE_DOCUMENT_NAME))
}

pub fn mount_properties_dir(workspace: &str, service: &str, mount_name: &str) -> std::io::Result<PathBuf> {
    Ok(workspace_dir(workspace)?
        .join(service)
        .join("properties")
        .join(mount_name))
}

pub fn db_dump_dir(workspace: &str, service: &str) -> std::io::Result<PathBuf> {
    Ok(workspace_dir(workspace)?.join(service).join("dump"))
}
