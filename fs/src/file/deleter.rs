use super::LocalFile;
use std::fs::remove_file;
use std::io;
use std::path::Path;

pub trait FileDeleter {
    fn delete(&self, file_path: &Path) -> io::Result<()>;
}

impl FileDeleter for LocalFile {
    fn delete(&self, file_path: &Path) -> io::Result<()> {
        if !file_path.exists() {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{}", file_path.display()),
            ));
        }

        remove_file(file_path)
    }
}

#[cfg(feature = "mocks")]
pub mod mock {
    use crate::mock::MockLocalFile;
    use mockall::predicate;
    use std::path::{Path, PathBuf};

    impl MockLocalFile {
        pub fn should_delete_file(&mut self, path: &Path) {
            self.expect_delete()
                .with(predicate::eq(PathBuf::from(path)))
                .once()
                .returning(|_| Ok(()));
        }
    }
}
