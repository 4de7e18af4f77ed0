use super::super::directory_manager::DirectoryManagementError;
use super::super::utils::{validate_path, FsError};
use super::LocalFile;
use std::io::Write;
use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};
use std::path::Path;
use std::{fs, io};
use thiserror::Error;
use tracing::instrument;

#[derive(Error, Debug)]
pub enum WriteError {
    #[error("directory error: {0}")]
    DirectoryError(#[from] DirectoryManagementError),

    #[error("error creating file: {0}")]
    ErrorCreatingFile(#[from] io::Error),

    #[error("invalid path: {0}")]
    InvalidPath(#[from] FsError),
}

pub trait FileWriter {
    fn write(&self, path: &Path, buf: String) -> Result<(), WriteError>;
}

impl FileWriter for LocalFile {
    /// Write a file to disk given a path and content, setting permissions to 600.
    #[instrument(skip_all, fields(path = %path.display()))]
    fn write(&self, path: &Path, content: String) -> Result<(), WriteError> {
        validate_path(path)?;

        let mut file_options = fs::OpenOptions::new();
        file_options
            .create(true)
            .write(true)
            .truncate(true)
            .mode(LocalFile::get_file_permissions().mode());

        file_options.open(path)?.write_all(content.as_bytes())?;

        Ok(())
    }
}

impl LocalFile {
    fn get_file_permissions() -> std::fs::Permissions {
        std::fs::Permissions::from_mode(0o600)
    }
}

#[cfg(feature = "mocks")]
pub mod mock {
    use super::*;
    use crate::mock::MockLocalFile;
    use mockall::predicate;
    use std::io::{Error, ErrorKind};
    use std::path::PathBuf;

    impl MockLocalFile {
        pub fn should_write(&mut self, path: &Path, content: String) {
            let path_clone = PathBuf::from(path.to_str().unwrap().to_string().as_str());
            self.expect_write()
                .with(predicate::eq(path_clone), predicate::eq(content))
                .once()
                .returning(|_, _| Ok(()));
        }

        pub fn should_not_write(&mut self, path: &Path, content: String) {
            let path_clone = PathBuf::from(path.to_str().unwrap().to_string().as_str());
            self.expect_write()
                .with(predicate::eq(path_clone), predicate::eq(content))
                .once()
                .returning(|_, _| {
                    Err(WriteError::ErrorCreatingFile(io::Error::from(
                        ErrorKind::PermissionDenied,
                    )))
                });
        }

        pub fn should_write_any(&mut self, times: usize) {
            self.expect_write().times(times).returning(|_, _| Ok(()));
        }
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;

    #[test]
    fn test_file_writer_content_and_permissions() {
        let tempdir = tempfile::tempdir().unwrap();
        let path = tempdir.path().join("some_file");

        let writer = LocalFile;
        let write_result = writer.write(path.as_path(), "some content".to_string());
        assert!(write_result.is_ok());

        assert_eq!(fs::read_to_string(&path).unwrap(), "some content");
        assert_eq!(
            LocalFile::get_file_permissions().mode() & 0o777,
            fs::metadata(&path).unwrap().permissions().mode() & 0o777
        );
    }

    #[test]
    fn test_file_writer_should_not_return_error_if_file_already_exists() {
        let tempdir = tempfile::tempdir().unwrap();
        let path = tempdir.path().join("some_file");

        let writer = LocalFile;
        assert!(writer.write(path.as_path(), "a".to_string()).is_ok());
        assert!(writer.write(path.as_path(), "b".to_string()).is_ok());
    }

    #[test]
    fn test_file_writer_truncates_existing_file() {
        let tempdir = tempfile::tempdir().unwrap();
        let path = tempdir.path().join("some_file");
        fs::write(&path, "older content with greater len than new").unwrap();

        let writer = LocalFile;
        writer
            .write(path.as_path(), "new content".to_string())
            .expect("write failed");

        assert_eq!(fs::read_to_string(&path).unwrap(), "new content");
    }

    #[test]
    fn test_path_to_write_cannot_contain_dots() {
        let path = PathBuf::from("some/path/../../etc/passwd");
        let writer = LocalFile;

        let result = writer.write(&path, "".to_string());

        assert!(result.is_err());
        assert_eq!(
            "invalid path: dots disallowed in path some/path/../../etc/passwd".to_string(),
            result.unwrap_err().to_string()
        );
    }
}
