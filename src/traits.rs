use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::entry::{Attributes, EntryContext};
use crate::error::BoxError;

/// Decides whether a filesystem node belongs in the index.
///
/// Evaluated exactly once per node, against its path relative to the scan
/// root (`/`-separated). A directory that fails the predicate is still
/// descended into; only its own entry is dropped.
///
/// # Thread Safety
///
/// `Send + Sync` are required — sibling entries are tested from concurrently
/// running tasks.
///
/// # Example
///
/// ```rust
/// use dirdex::Matcher;
///
/// struct ExtensionMatcher(&'static str);
///
/// impl Matcher for ExtensionMatcher {
///     fn is_match(&self, relative_path: &str) -> bool {
///         relative_path.ends_with(self.0)
///     }
/// }
///
/// assert!(ExtensionMatcher(".md").is_match("docs/intro.md"));
/// ```
pub trait Matcher: Send + Sync {
    /// Returns `true` if the entry at `relative_path` should be indexed.
    fn is_match(&self, relative_path: &str) -> bool;
}

impl<F> Matcher for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn is_match(&self, relative_path: &str) -> bool {
        self(relative_path)
    }
}

/// Computes extra attributes for matched entries.
///
/// `enrich_file` runs once per matched file and `enrich_dir` once per matched
/// directory, after every descendant has been indexed. Both default to an
/// empty mapping, so implementors only override what they need.
///
/// Returning `Err` aborts the whole scan; the indexer does no recovery.
///
/// # Example
///
/// ```rust
/// use async_trait::async_trait;
/// use dirdex::{Attributes, BoxError, Enricher, EntryContext};
///
/// struct Title;
///
/// #[async_trait]
/// impl Enricher for Title {
///     async fn enrich_file(&self, entry: &EntryContext) -> Result<Attributes, BoxError> {
///         let mut attrs = Attributes::new();
///         attrs.insert("title".into(), entry.name.trim_end_matches(".md").into());
///         Ok(attrs)
///     }
/// }
/// ```
#[async_trait]
pub trait Enricher: Send + Sync {
    async fn enrich_file(&self, _entry: &EntryContext) -> Result<Attributes, BoxError> {
        Ok(Attributes::new())
    }

    async fn enrich_dir(&self, _entry: &EntryContext) -> Result<Attributes, BoxError> {
        Ok(Attributes::new())
    }
}

/// Adds nothing. Used when no enricher is configured.
pub struct NoEnrichment;

#[async_trait]
impl Enricher for NoEnrichment {}

/// Reads `stat` metadata: `size` in bytes and `modified` as an RFC 3339 UTC
/// timestamp (omitted where the platform doesn't report it).
pub struct StatEnricher;

impl StatEnricher {
    async fn stat(entry: &EntryContext) -> Result<Attributes, BoxError> {
        let meta = tokio::fs::metadata(&entry.path).await?;

        let mut attrs = Attributes::new();
        attrs.insert("size".into(), Value::from(meta.len()));
        if let Ok(modified) = meta.modified() {
            let ts: DateTime<Utc> = modified.into();
            attrs.insert("modified".into(), Value::from(ts.to_rfc3339()));
        }
        Ok(attrs)
    }
}

#[async_trait]
impl Enricher for StatEnricher {
    async fn enrich_file(&self, entry: &EntryContext) -> Result<Attributes, BoxError> {
        Self::stat(entry).await
    }

    async fn enrich_dir(&self, entry: &EntryContext) -> Result<Attributes, BoxError> {
        Self::stat(entry).await
    }
}
