//! The filesystem seam used by target resolution, engines and writers.

use std::io;
use std::path::{Path, PathBuf};

/// What a `stat` told us about a path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileMetadata {
    pub exists: bool,
    /// False for directories and missing paths.
    pub is_file: bool,
    pub is_dir: bool,
    /// Zero unless `is_file`.
    pub size: u64,
}

/// Knobs for recursive discovery. Everything is off by default: hidden
/// entries are skipped, links are not followed and `.gitignore` is not read.
#[derive(Debug, Clone, Default)]
pub struct DiscoveryOptions {
    pub follow_symlinks: bool,
    /// `None` walks the whole tree.
    pub max_depth: Option<usize>,
    pub include_hidden: bool,
    pub respect_gitignore: bool,
}

/// Async filesystem abstraction.
///
/// Relative paths are resolved against [`FileSystem::root`]. Returned
/// listings use forward slashes and are sorted so callers see a stable
/// order across runs and platforms.
#[async_trait::async_trait]
pub trait FileSystem: Send + Sync {
    async fn exists(&self, path: &Path) -> io::Result<bool>;

    /// Whole-file read. Non-UTF-8 contents fail with `InvalidData`.
    async fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// A missing path is not an error; it reports `exists: false`.
    async fn metadata(&self, path: &Path) -> io::Result<FileMetadata>;

    /// Replace the file's contents. The parent directory must exist.
    async fn write(&self, path: &Path, contents: &str) -> io::Result<()>;

    async fn remove_file(&self, path: &Path) -> io::Result<()>;

    /// Second half of the write-to-tmp-then-rename save.
    async fn rename(&self, from: &Path, to: &Path) -> io::Result<()>;

    async fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Immediate children of a directory that are files, sorted.
    async fn list_files(&self, dir: &Path) -> io::Result<Vec<PathBuf>>;

    /// Expand a glob pattern against the root.
    ///
    /// Returns matching files only (directories are skipped), relative to
    /// the root when the pattern is relative.
    async fn expand_glob(&self, pattern: &str) -> io::Result<Vec<String>>;

    /// Recursively list files beneath `dir`, relative to `dir`.
    async fn discover(&self, dir: &Path, options: &DiscoveryOptions) -> io::Result<Vec<String>>;

    /// The directory relative paths are resolved against.
    fn root(&self) -> &Path;
}
