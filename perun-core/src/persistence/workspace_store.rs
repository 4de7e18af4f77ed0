use std::path::{Path, PathBuf};

use fs::directory_manager::DirectoryManager;
use fs::file::reader::FileReader;
use fs::file::renamer::FileRenamer;
use fs::file::writer::FileWriter;
use fs::file::LocalFile;
use tracing::{instrument, warn};

use crate::defaults::{self, WORKSPACE_DOCUMENT_NAME};
use crate::manifest::Workspace;

use super::ManifestError;

/// Serializes each Workspace to a single document under
/// `~/<perun-root>/<workspace>/workspace.yml` (spec §4.2). Every write goes
/// through a temp file and an atomic rename, not just the importer's write
/// boundary — see DESIGN.md for the rationale.
pub struct WorkspaceStore<D = fs::directory_manager::DirectoryManagerFs, F = LocalFile>
where
    D: DirectoryManager,
    F: FileReader + FileWriter + FileRenamer,
{
    root: PathBuf,
    directory_manager: D,
    file: F,
}

impl WorkspaceStore<fs::directory_manager::DirectoryManagerFs, LocalFile> {
    pub fn new() -> Result<Self, ManifestError> {
        Ok(WorkspaceStore {
            root: defaults::perun_root()?,
            directory_manager: fs::directory_manager::DirectoryManagerFs,
            file: LocalFile,
        })
    }
}

impl<D, F> WorkspaceStore<D, F>
where
    D: DirectoryManager,
    F: FileReader + FileWriter + FileRenamer,
{
    pub fn with_root(root: PathBuf, directory_manager: D, file: F) -> Self {
        WorkspaceStore {
            root,
            directory_manager,
            file,
        }
    }

    fn workspace_dir(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    fn document_path(&self, name: &str) -> PathBuf {
        self.workspace_dir(name).join(WORKSPACE_DOCUMENT_NAME)
    }

    /// Reads a Workspace back, tolerating a missing directory (spec §4.2:
    /// "reads tolerate missing workspace directories, returns not found").
    #[instrument(skip(self))]
    pub fn get(&self, name: &str) -> Result<Option<Workspace>, ManifestError> {
        let path = self.document_path(name);
        if !path.exists() {
            return Ok(None);
        }
        let content = self.file.read(&path)?;
        let workspace: Workspace = serde_yaml::from_str(&content)?;
        Ok(Some(workspace))
    }

    #[instrument(skip(self))]
    pub fn require(&self, name: &str) -> Result<Workspace, ManifestError> {
        self.get(name)?
            .ok_or_else(|| ManifestError::NotFound(name.to_string()))
    }

    /// Atomically persists the Workspace document: write to `<doc>.tmp`,
    /// then rename into place (spec §4.3 step 5, applied to every write).
    #[instrument(skip(self, workspace))]
    pub fn persist(&self, workspace: &Workspace) -> Result<(), ManifestError> {
        let dir = self.workspace_dir(&workspace.name);
        self.directory_manager.create(&dir)?;

        let final_path = self.document_path(&workspace.name);
        let tmp_path = tmp_path_for(&final_path);

        let yaml = serde_yaml::to_string(workspace)?;
        self.file.write(&tmp_path, yaml)?;
        self.file.rename(&tmp_path, &final_path)?;
        Ok(())
    }

    /// Enumerates the workspaces directory; malformed documents are logged
    /// and skipped, never fatal (spec §4.6 `ListWorkspaces`).
    #[instrument(skip(self))]
    pub fn list(&self) -> Result<Vec<Workspace>, ManifestError> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }
        let entries = self.file.dir_entries(&self.root)?;
        let mut workspaces = Vec::new();
        for entry in entries {
            if !entry.is_dir() {
                continue;
            }
            let Some(name) = entry.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            match self.get(name) {
                Ok(Some(ws)) => workspaces.push(ws),
                Ok(None) => {}
                Err(e) => warn!(workspace = name, error = %e, "skipping malformed workspace document"),
            }
        }
        Ok(workspaces)
    }

    #[instrument(skip(self))]
    pub fn clear(&self, name: &str) -> Result<(), ManifestError> {
        self.directory_manager.delete(&self.workspace_dir(name))?;
        Ok(())
    }
}

fn tmp_path_for(final_path: &Path) -> PathBuf {
    let mut tmp = final_path.as_os_str().to_owned();
    tmp.push(".tmp");
    PathBuf::from(tmp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fs::directory_manager::DirectoryManagerFs;

    fn store(root: &Path) -> WorkspaceStore<DirectoryManagerFs, LocalFile> {
        WorkspaceStore::with_root(root.to_path_buf(), DirectoryManagerFs, LocalFile)
    }

    #[test]
    fn get_on_missing_workspace_returns_none() {
        let tempdir = tempfile::tempdir().unwrap();
        let store = store(tempdir.path());
        assert!(store.get("nope").unwrap().is_none());
    }

    #[test]
    fn persist_then_get_round_trips() {
        let tempdir = tempfile::tempdir().unwrap();
        let store = store(tempdir.path());

        let ws = Workspace::new("demo");
        store.persist(&ws).unwrap();

        let loaded = store.get("demo").unwrap().unwrap();
        assert_eq!(loaded.name, "demo");
        assert!(loaded.environments.is_empty());
    }

    #[test]
    fn persist_does_not_leave_tmp_file_behind() {
        let tempdir = tempfile::tempdir().unwrap();
        let store = store(tempdir.path());
        store.persist(&Workspace::new("demo")).unwrap();

        let tmp = tempdir.path().join("demo").join("workspace.yml.tmp");
        assert!(!tmp.exists());
    }

    #[test]
    fn list_skips_malformed_documents() {
        let tempdir = tempfile::tempdir().unwrap();
        let store = store(tempdir.path());
        store.persist(&Workspace::new("good")).unwrap();

        let bad_dir = tempdir.path().join("bad");
        std::fs::create_dir_all(&bad_dir).unwrap();
        std::fs::write(bad_dir.join("workspace.yml"), "not: [valid yaml: -").unwrap();

        let workspaces = store.list().unwrap();
        assert_eq!(workspaces.len(), 1);
        assert_eq!(workspaces[0].name, "good");
    }

    #[test]
    fn clear_removes_workspace_directory() {
        let tempdir = tempfile::tempdir().unwrap();
        let store = store(tempdir.path());
        store.persist(&Workspace::new("demo")).unwrap();
        store.clear("demo").unwrap();
        assert!(store.get("demo").unwrap().is_none());
    }
}
