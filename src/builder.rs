use std::path::PathBuf;
use std::sync::Arc;

use ignore::overrides::{Override, OverrideBuilder};
use regex::Regex;

use crate::collection::FlatCollection;
use crate::engine::{run, EngineOptions};
use crate::error::DirdexError;
use crate::traits::{Enricher, Matcher, NoEnrichment};

// ---------------------------------------------------------------------------
// ScanBuilder
// ---------------------------------------------------------------------------

/// Entry point for configuring and executing a scan.
///
/// Created via [`dirdex::scan()`](crate::scan). Configure with chained
/// builder methods, then await [`run()`](ScanBuilder::run).
///
/// # Example
///
/// ```rust,ignore
/// let flat = dirdex::scan("content")
///     .matching(r"\.md$")
///     .enricher(FrontMatter)
///     .run()
///     .await?;
/// ```
pub struct ScanBuilder {
    root:     PathBuf,
    matcher:  MatcherSpec,
    enricher: Arc<dyn Enricher>,
}

/// Matchers are compiled in `run()` so pattern errors surface there.
enum MatcherSpec {
    All,
    Custom(Box<dyn Matcher>),
    Regex(String),
    Glob(Vec<String>),
}

impl ScanBuilder {
    pub(crate) fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root:     root.into(),
            matcher:  MatcherSpec::All,
            enricher: Arc::new(NoEnrichment),
        }
    }

    // ── Matcher ───────────────────────────────────────────────────────────

    /// Set a custom matcher. Closures `Fn(&str) -> bool` work too.
    ///
    /// The matcher sees each entry's path relative to the root. For the
    /// common cases prefer `.matching()` or `.glob()`.
    pub fn with_matcher(mut self, m: impl Matcher + 'static) -> Self {
        self.matcher = MatcherSpec::Custom(Box::new(m));
        self
    }

    /// Shorthand for a regular-expression matcher.
    ///
    /// The expression is tested against the relative path with
    /// `Regex::is_match`, so it is unanchored unless you anchor it.
    pub fn matching(mut self, pattern: impl Into<String>) -> Self {
        self.matcher = MatcherSpec::Regex(pattern.into());
        self
    }

    /// Shorthand for gitignore-style globs.
    ///
    /// Plain globs whitelist (anything not matching one is excluded);
    /// `!glob` excludes. With only exclusions, everything else matches.
    pub fn glob<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.matcher = MatcherSpec::Glob(patterns.into_iter().map(Into::into).collect());
        self
    }

    // ── Enrichment ────────────────────────────────────────────────────────

    /// Set the enricher called for every matched entry.
    ///
    /// Defaults to [`NoEnrichment`].
    pub fn enricher(mut self, e: impl Enricher + 'static) -> Self {
        self.enricher = Arc::new(e);
        self
    }

    // ── Execute ───────────────────────────────────────────────────────────

    /// Execute the scan and return the flat collection.
    ///
    /// # Errors
    ///
    /// `InvalidPattern` for a bad regex or glob, before any I/O. Otherwise
    /// the first listing or enrichment failure anywhere in the tree — there
    /// is no partial result.
    pub async fn run(self) -> Result<FlatCollection, DirdexError> {
        let matcher: Arc<dyn Matcher> = match self.matcher {
            MatcherSpec::All          => Arc::new(AllMatcher),
            MatcherSpec::Custom(m)    => Arc::from(m),
            MatcherSpec::Regex(p)     => Arc::new(RegexMatcher::new(&p)?),
            MatcherSpec::Glob(globs)  => Arc::new(GlobMatcher::new(&globs)?),
        };

        let opts = EngineOptions {
            root: self.root,
            matcher,
            enricher: self.enricher,
        };

        run(opts).await
    }
}

// ---------------------------------------------------------------------------
// Built-in matchers
// ---------------------------------------------------------------------------

/// Matches every entry. Used when no matcher is specified.
struct AllMatcher;

impl Matcher for AllMatcher {
    fn is_match(&self, _relative_path: &str) -> bool {
        true
    }
}

struct RegexMatcher(Regex);

impl RegexMatcher {
    fn new(pattern: &str) -> Result<Self, DirdexError> {
        Regex::new(pattern)
            .map(Self)
            .map_err(|e| DirdexError::InvalidPattern(e.to_string()))
    }
}

impl Matcher for RegexMatcher {
    fn is_match(&self, relative_path: &str) -> bool {
        self.0.is_match(relative_path)
    }
}

struct GlobMatcher(Override);

impl GlobMatcher {
    fn new(globs: &[String]) -> Result<Self, DirdexError> {
        // Ids are already relative, so the override root is empty.
        let mut builder = OverrideBuilder::new("");
        for glob in globs {
            builder
                .add(glob)
                .map_err(|e| DirdexError::InvalidPattern(e.to_string()))?;
        }
        builder
            .build()
            .map(Self)
            .map_err(|e| DirdexError::InvalidPattern(e.to_string()))
    }
}

impl Matcher for GlobMatcher {
    fn is_match(&self, relative_path: &str) -> bool {
        !self.0.matched(relative_path, false).is_ignore()
    }
}
