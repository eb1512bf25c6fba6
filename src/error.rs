use std::path::PathBuf;
use thiserror::Error;

/// Boxed error returned by [`Enricher`](crate::traits::Enricher) callbacks.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Fatal failures of a scan. Any of these aborts the whole call — there is
/// no partial result.
#[derive(Error, Debug)]
pub enum DirdexError {
    // Listing
    #[error("path not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("permission denied: {}", .0.display())]
    PermissionDenied(PathBuf),

    #[error("not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("IO error at {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Config
    #[error("invalid pattern: {0}")]
    InvalidPattern(String),

    // Naming
    #[error("distinct names on disk share the id `{0}`")]
    DuplicateId(String),

    // Enrichment
    #[error("enrichment failed for {}", .path.display())]
    Enrichment {
        path: PathBuf,
        #[source]
        source: BoxError,
    },
}

impl DirdexError {
    /// Map an `io::Error` from listing `path` onto the taxonomy.
    pub(crate) fn from_io(path: PathBuf, err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound         => Self::NotFound(path),
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied(path),
            _                                    => Self::Io { path, source: err },
        }
    }

    /// The path this error occurred at, if applicable.
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            Self::NotFound(p)
            | Self::PermissionDenied(p)
            | Self::NotADirectory(p)
            | Self::Io { path: p, .. }
            | Self::Enrichment { path: p, .. } => Some(p),
            Self::InvalidPattern(_) | Self::DuplicateId(_) => None,
        }
    }

    /// Whether this failure came from reading the filesystem rather than
    /// from configuration or a caller-supplied enricher.
    pub fn is_listing_failure(&self) -> bool {
        matches!(
            self,
            Self::NotFound(_) | Self::PermissionDenied(_) | Self::NotADirectory(_) | Self::Io { .. }
        )
    }
}

/// A flat collection and an entry or reference that do not belong together.
///
/// This is a programming error on the caller's side (e.g. resolving a
/// directory from a different scan), kept apart from [`DirdexError`] so it
/// can never be mistaken for an I/O failure or for "no children".
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContractViolation {
    #[error("directory `{parent}` references `{id}`, which is not in the collection")]
    DanglingReference { parent: String, id: String },

    #[error("`{0}` is not a directory entry")]
    NotADirectory(String),

    #[error("duplicate entry id `{0}`")]
    DuplicateId(String),
}

/// An unknown [`TypeFilter`](crate::TypeFilter) name.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown type filter `{0}` (expected files, directories or all)")]
pub struct ParseTypeFilterError(pub String);
