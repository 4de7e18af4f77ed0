use super::utils::{validate_path, FsError};
use std::fs::{remove_dir_all, DirBuilder};
use std::io;
use std::path::Path;
use thiserror::Error;
use tracing::instrument;

#[derive(Error, Debug)]
pub enum DirectoryManagementError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),

    #[error("invalid path: {0}")]
    InvalidPath(#[from] FsError),
}

pub trait DirectoryManager {
    /// create will create a folder, recursively, tolerating it already existing.
    fn create(&self, path: &Path) -> Result<(), DirectoryManagementError>;

    /// Delete the folder and its contents. If the folder does not exist it
    /// will not return an error.
    fn delete(&self, path: &Path) -> Result<(), DirectoryManagementError>;
}

#[derive(Clone)]
pub struct DirectoryManagerFs;

impl DirectoryManager for DirectoryManagerFs {
    #[instrument(skip_all, fields(path = %path.display()))]
    fn create(&self, path: &Path) -> Result<(), DirectoryManagementError> {
        validate_path(path)?;
        let mut directory_builder = DirBuilder::new();
        directory_builder.recursive(true);

        #[cfg(target_family = "unix")]
        {
            use std::os::unix::fs::DirBuilderExt;
            use std::os::unix::fs::PermissionsExt;

            directory_builder.mode(DirectoryManagerFs::get_directory_permissions().mode());
        }

        directory_builder.create(path)?;

        Ok(())
    }

    #[instrument(skip_all, fields(path = %path.display()))]
    fn delete(&self, path: &Path) -> Result<(), DirectoryManagementError> {
        validate_path(path)?;

        if !path.exists() {
            return Ok(());
        }
        remove_dir_all(path)?;
        Ok(())
    }
}

impl DirectoryManagerFs {
    #[cfg(target_family = "unix")]
    fn get_directory_permissions() -> std::fs::Permissions {
        use std::os::unix::fs::PermissionsExt;

        std::fs::Permissions::from_mode(0o700)
    }
}

#[cfg(feature = "mocks")]
pub mod mock {
    use super::*;
    use mockall::{mock, predicate};
    use std::path::PathBuf;

    mock! {
        pub DirectoryManager {}

        impl DirectoryManager for DirectoryManager {
            fn create(&self, path: &Path) -> Result<(), DirectoryManagementError>;
            fn delete(&self, path: &Path) -> Result<(), DirectoryManagementError>;
        }
        impl Clone for DirectoryManager {
            fn clone(&self) -> Self;
        }
    }

    impl MockDirectoryManager {
        pub fn should_create(&mut self, path: &Path) {
            let path_clone = PathBuf::from(path);
            self.expect_create()
                .with(predicate::eq(path_clone))
                .once()
                .returning(|_| Ok(()));
        }

        pub fn should_delete(&mut self, path: &Path) {
            let path_clone = PathBuf::from(path);
            self.expect_delete()
                .with(predicate::eq(path_clone))
                .once()
                .returning(|_| Ok(()));
        }
    }
}
