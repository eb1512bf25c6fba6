//! # dirdex
//!
//! Async directory indexer — flattens a directory tree into a JSON:API-style
//! collection of entities and rebuilds nested views from it.
//!
//! dirdex owns two algorithms: the concurrent, filtered walk that produces a
//! [`FlatCollection`], and the [`resolve_children`] traversal that turns the
//! collection's parent→child references back into nested lists. It does
//! **not** know what your entries mean — per-entry attributes come from an
//! [`Enricher`] you supply.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use dirdex::TypeFilter;
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let flat = dirdex::scan("content")
//!     .matching(r"^[^.]")
//!     .run()
//!     .await?;
//!
//! println!("{}", serde_json::to_string_pretty(&flat)?);
//!
//! let roots: Vec<_> = flat.directories().filter(|d| d.depth == 0).collect();
//! let pages = dirdex::resolve_children(&flat, &roots, TypeFilter::Files, true)?;
//! println!("{} pages", pages.len());
//! # Ok(())
//! # }
//! ```
//!
//! # Custom Matchers and Enrichers
//!
//! Implement [`Matcher`] (or pass a closure) to choose which relative paths
//! are indexed, and [`Enricher`] to attach attributes:
//!
//! ```rust
//! use async_trait::async_trait;
//! use dirdex::{Attributes, BoxError, Enricher, EntryContext};
//!
//! struct WordCount;
//!
//! #[async_trait]
//! impl Enricher for WordCount {
//!     async fn enrich_file(&self, entry: &EntryContext) -> Result<Attributes, BoxError> {
//!         let text = tokio::fs::read_to_string(&entry.path).await?;
//!         let mut attrs = Attributes::new();
//!         attrs.insert("words".into(), text.split_whitespace().count().into());
//!         Ok(attrs)
//!     }
//! }
//! ```

#![forbid(unsafe_code)]

mod builder;
mod collection;
mod engine;
mod entry;
mod error;
mod resolve;
mod traits;

// ── Public re-exports ─────────────────────────────────────────────────────────

pub use builder::ScanBuilder;
pub use collection::{FlatCollection, ScanStats};
pub use entry::{Attributes, Entry, EntryContext, EntryKind, EntryRef, EntryType};
pub use error::{BoxError, ContractViolation, DirdexError, ParseTypeFilterError};
pub use resolve::{resolve_children, TypeFilter};
pub use traits::{Enricher, Matcher, NoEnrichment, StatEnricher};

// ── Entry point ───────────────────────────────────────────────────────────────

/// Create a new [`ScanBuilder`] rooted at `root`.
///
/// The root must be an existing, readable directory. Its own entry is never
/// part of the output; its direct children have depth 0.
///
/// # Example
///
/// ```rust,no_run
/// # async fn demo() -> Result<(), dirdex::DirdexError> {
/// let flat = dirdex::scan("content")
///     .glob(["!*.jpg"])
///     .run()
///     .await?;
///
/// for entry in &flat {
///     println!("{} {}", entry.entry_type(), entry.id);
/// }
/// # Ok(())
/// # }
/// ```
pub fn scan(root: impl Into<std::path::PathBuf>) -> ScanBuilder {
    ScanBuilder::new(root)
}
