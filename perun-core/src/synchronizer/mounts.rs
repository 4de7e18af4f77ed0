use std::path::PathBuf;

use fs::directory_manager::DirectoryManager;
use fs::file::writer::FileWriter;
use tracing::instrument;

use crate::defaults;
use crate::manifest::Mount;

use super::SynchronizeError;

/// Resolves where a Mount's configs live on disk, materializing them under
/// a workspace-scoped temp directory when `sourcePath` is empty (spec §3
/// Mount, §4.4 "Mounts"). Returns the host directory to bind at `mount.path`.
#[instrument(skip(directory_manager, file, mount), fields(mount = %mount.name))]
pub fn materialize_mount<D, F>(
    directory_manager: &D,
    file: &F,
    workspace: &str,
    service_name: &str,
    mount: &Mount,
) -> Result<PathBuf, SynchronizeError>
where
    D: DirectoryManager,
    F: FileWriter,
{
    let dir = if mount.source_path.is_empty() {
        defaults::mount_properties_dir(workspace, service_name, &mount.name)?
    } else {
        PathBuf::from(&mount.source_path)
    };

    directory_manager.create(&dir)?;

    for config in &mount.configs {
        let path = dir.join(&config.config_name);
        file.write(&path, config.content.clone())?;
    }

    Ok(dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::Config;
    use fs::directory_manager::DirectoryManagerFs;
    use fs::file::LocalFile;

    #[test]
    fn materializes_configs_when_source_path_is_explicit() {
        let tempdir = tempfile::tempdir().unwrap();
        let mount = Mount {
            name: "config".to_string(),
            source_path: tempdir.path().to_string_lossy().to_string(),
            path: "/etc/app".to_string(),
            configs: vec![Config {
                config_name: "app.yml".to_string(),
                content: "key: value".to_string(),
            }],
        };

        let dir = materialize_mount(&DirectoryManagerFs, &LocalFile, "ws", "web", &mount).unwrap();
        assert_eq!(dir, tempdir.path());
        let content = std::fs::read_to_string(dir.join("app.yml")).unwrap();
        assert_eq!(content, "key: value");
    }
}
