//! Sift Pipeline - from selector to formatted results.
//!
//! Each stage is a plain type with an explicit constructor; nothing is
//! global. A run threads the same [`sift_core::EventHub`] through every
//! stage so non-fatal issues reach whatever listeners the caller attached.
//!
//! 1. [`CatalogStore::open`] loads or rebuilds the [`LocalCatalog`]
//! 2. [`SelectionResolver::resolve`] turns a [`Selector`] into a [`sift_core::RuleSelection`]
//! 3. [`TargetResolver::resolve_for_selection`] expands targets per engine
//! 4. [`Dispatcher::dispatch`] runs every engine concurrently, all or nothing
//! 5. [`recombine`] merges the batches and encodes them in an [`OutputFormat`]

pub mod catalog;
pub mod dispatcher;
pub mod filter;
pub mod formats;
pub mod recombinator;
pub mod selector;
pub mod targets;

pub use catalog::{fingerprint, CatalogStore, LocalCatalog};
pub use dispatcher::{Dispatcher, EngineBatch};
pub use filter::{matches_all, RuleFilter};
pub use formats::{FormatContext, OutputFormat, RESULT_FILE_EXTENSIONS};
pub use recombinator::recombine;
pub use selector::{normalize_tokens, SelectionResolver, Selector};
pub use targets::{EngineTargets, TargetResolver};
