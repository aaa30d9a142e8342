//! `FileSystem` over the local disk.

use crate::patterns::to_slash;
use crate::{DiscoveryOptions, FileMetadata, FileSystem};
use ignore::WalkBuilder;
use std::io;
use std::path::{Path, PathBuf};
use tokio::task;

/// Local-disk filesystem rooted at a workspace directory.
///
/// Every std::fs call runs on the blocking pool.
#[derive(Debug, Clone)]
pub struct NativeFileSystem {
    root: PathBuf,
}

impl NativeFileSystem {
    /// Create a filesystem rooted at `root`.
    ///
    /// # Errors
    ///
    /// Returns an error if the root doesn't exist or isn't a directory.
    pub fn new(root: impl AsRef<Path>) -> io::Result<Self> {
        let root = root.as_ref();
        if !root.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("Root directory does not exist: {}", root.display()),
            ));
        }
        Ok(Self {
            root: root.to_path_buf(),
        })
    }

    /// Root at the process working directory.
    pub fn current_dir() -> io::Result<Self> {
        Self::new(std::env::current_dir()?)
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }
}

fn join_error(e: task::JoinError) -> io::Error {
    io::Error::new(io::ErrorKind::Other, e)
}

#[async_trait::async_trait]
impl FileSystem for NativeFileSystem {
    async fn exists(&self, path: &Path) -> io::Result<bool> {
        let resolved = self.resolve(path);
        task::spawn_blocking(move || Ok(resolved.exists()))
            .await
            .map_err(join_error)?
    }

    async fn read_to_string(&self, path: &Path) -> io::Result<String> {
        let resolved = self.resolve(path);
        task::spawn_blocking(move || std::fs::read_to_string(&resolved))
            .await
            .map_err(join_error)?
    }

    async fn metadata(&self, path: &Path) -> io::Result<FileMetadata> {
        let resolved = self.resolve(path);
        task::spawn_blocking(move || match std::fs::metadata(&resolved) {
            Ok(meta) => Ok(FileMetadata {
                exists: true,
                is_file: meta.is_file(),
                is_dir: meta.is_dir(),
                size: meta.len(),
            }),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(FileMetadata {
                exists: false,
                is_file: false,
                is_dir: false,
                size: 0,
            }),
            Err(e) => Err(e),
        })
        .await
        .map_err(join_error)?
    }

    async fn write(&self, path: &Path, contents: &str) -> io::Result<()> {
        let resolved = self.resolve(path);
        let contents = contents.to_string();
        task::spawn_blocking(move || std::fs::write(&resolved, contents))
            .await
            .map_err(join_error)?
    }

    async fn remove_file(&self, path: &Path) -> io::Result<()> {
        let resolved = self.resolve(path);
        task::spawn_blocking(move || std::fs::remove_file(&resolved))
            .await
            .map_err(join_error)?
    }

    async fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        let from = self.resolve(from);
        let to = self.resolve(to);
        task::spawn_blocking(move || std::fs::rename(&from, &to))
            .await
            .map_err(join_error)?
    }

    async fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        let resolved = self.resolve(path);
        task::spawn_blocking(move || std::fs::create_dir_all(&resolved))
            .await
            .map_err(join_error)?
    }

    async fn list_files(&self, dir: &Path) -> io::Result<Vec<PathBuf>> {
        let resolved = self.resolve(dir);
        task::spawn_blocking(move || {
            let mut files = Vec::new();
            for entry in std::fs::read_dir(&resolved)? {
                let entry = entry?;
                if entry.file_type()?.is_file() {
                    files.push(entry.path());
                }
            }
            files.sort();
            Ok(files)
        })
        .await
        .map_err(join_error)?
    }

    async fn expand_glob(&self, pattern: &str) -> io::Result<Vec<String>> {
        let root = self.root.clone();
        let pattern = pattern.to_string();
        task::spawn_blocking(move || expand_glob_sync(&root, &pattern))
            .await
            .map_err(join_error)?
    }

    async fn discover(&self, dir: &Path, options: &DiscoveryOptions) -> io::Result<Vec<String>> {
        let resolved = self.resolve(dir);
        let opts = options.clone();
        task::spawn_blocking(move || discover_sync(&resolved, &opts))
            .await
            .map_err(join_error)?
    }

    fn root(&self) -> &Path {
        &self.root
    }
}

fn expand_glob_sync(root: &Path, pattern: &str) -> io::Result<Vec<String>> {
    let relative = !Path::new(pattern).is_absolute();
    let full_pattern = if relative {
        let escaped_root = glob::Pattern::escape(&to_slash(root));
        format!("{}/{}", escaped_root.trim_end_matches('/'), pattern.trim_start_matches("./"))
    } else {
        pattern.to_string()
    };

    let options = glob::MatchOptions {
        case_sensitive: true,
        require_literal_separator: true,
        require_literal_leading_dot: true,
    };
    let paths = glob::glob_with(&full_pattern, options)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;

    let mut matches = Vec::new();
    for entry in paths {
        // Unreadable entries are skipped, as in bulk discovery.
        let Ok(path) = entry else { continue };
        if !path.is_file() {
            continue;
        }
        let shown = if relative {
            path.strip_prefix(root).map(Path::to_path_buf).unwrap_or(path)
        } else {
            path
        };
        matches.push(to_slash(&shown));
    }
    matches.sort();
    matches.dedup();
    Ok(matches)
}

/// Synchronous directory discovery.
fn discover_sync(dir: &Path, options: &DiscoveryOptions) -> io::Result<Vec<String>> {
    let mut walker = WalkBuilder::new(dir);
    walker
        .follow_links(options.follow_symlinks)
        .hidden(!options.include_hidden)
        .git_ignore(options.respect_gitignore)
        .git_exclude(options.respect_gitignore)
        .git_global(options.respect_gitignore)
        .ignore(options.respect_gitignore)
        .parents(options.respect_gitignore)
        .max_depth(options.max_depth);

    let mut discovered = Vec::new();
    for result in walker.build() {
        let entry = result.map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;

        if !entry.file_type().map(|ft| ft.is_file()).unwrap_or(false) {
            continue;
        }

        if let Ok(relative) = entry.path().strip_prefix(dir) {
            discovered.push(to_slash(relative));
        }
    }
    discovered.sort();
    Ok(discovered)
}
