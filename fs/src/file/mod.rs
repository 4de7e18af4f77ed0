pub mod deleter;
pub mod reader;
pub mod renamer;
pub mod writer;

/// Handle to the local filesystem. All the `File*` traits are implemented on
/// this type; callers depend on the traits, not on `LocalFile` itself, so
/// tests can substitute the mocks in [`crate::mock`].
#[derive(Clone, Copy, Default)]
pub struct LocalFile;
