//! Filesystem abstraction for sift.
//!
//! This crate provides a `FileSystem` trait used by the catalog, the target
//! resolver and the engines, plus [`TargetPatterns`] for evaluating an
//! engine's include/exclude globs.
//!
//! # Example
//!
//! ```no_run
//! use sift_fs::{FileSystem, NativeFileSystem};
//! use std::sync::Arc;
//! use std::path::Path;
//!
//! # #[tokio::main]
//! # async fn main() -> std::io::Result<()> {
//! let fs = Arc::new(NativeFileSystem::new(".")?);
//! let files = fs.expand_glob("src/**/*.cls").await?;
//! println!("{} files", files.len());
//! # Ok(())
//! # }
//! ```

mod file_system;
pub mod patterns;

pub use file_system::{DiscoveryOptions, FileMetadata, FileSystem};
pub use patterns::{has_magic, to_slash, TargetPatterns};

#[cfg(feature = "native")]
pub mod native;
#[cfg(feature = "native")]
pub use native::NativeFileSystem;
