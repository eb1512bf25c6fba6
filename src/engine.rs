use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use futures::future::{try_join_all, BoxFuture, FutureExt};
use tracing::{debug, info, trace, warn};

use crate::collection::{FlatCollection, ScanStats};
use crate::entry::{Entry, EntryContext, EntryRef, EntryType};
use crate::error::DirdexError;
use crate::traits::{Enricher, Matcher};

// ---------------------------------------------------------------------------
// Engine options
// ---------------------------------------------------------------------------

/// Internal options passed from the builder to `run()`.
pub(crate) struct EngineOptions {
    pub root:     PathBuf,
    pub matcher:  Arc<dyn Matcher>,
    pub enricher: Arc<dyn Enricher>,
}

// ---------------------------------------------------------------------------
// Per-task results
// ---------------------------------------------------------------------------

/// What one directory's traversal hands back to its parent: every matched
/// entry below it, and references to its matched direct children.
#[derive(Default)]
struct Listing {
    entries:  Vec<Entry>,
    children: Vec<EntryRef>,
    files:    usize,
    dirs:     usize,
}

/// What one child task hands back: its own entries (a directory's come
/// after its descendants') and a reference for the parent if it matched.
#[derive(Default)]
struct Visited {
    entries:   Vec<Entry>,
    reference: Option<EntryRef>,
    files:     usize,
    dirs:      usize,
}

/// A listed child. `file_name` is the on-disk name and is what paths are
/// built from; `name` is its lossy UTF-8 form, used only for ids.
struct Child {
    file_name:  OsString,
    name:       String,
    entry_type: EntryType,
}

// ---------------------------------------------------------------------------
// run()
// ---------------------------------------------------------------------------

/// Index the tree under `opts.root`.
///
/// All siblings of a directory are visited concurrently and joined before
/// the directory itself is finished. Each task returns its own entries, so
/// the collection is assembled without any shared mutable state. The first
/// failure aborts the join and the whole scan.
pub(crate) async fn run(opts: EngineOptions) -> Result<FlatCollection, DirdexError> {
    let start = Instant::now();
    let root  = opts.root;

    let meta = tokio::fs::metadata(&root)
        .await
        .map_err(|e| DirdexError::from_io(root.clone(), e))?;
    if !meta.is_dir() {
        return Err(DirdexError::NotADirectory(root));
    }

    let ctx = WalkContext {
        matcher:  opts.matcher,
        enricher: opts.enricher,
    };

    // The root has no parent, so its own match result is irrelevant.
    let listing = walk_dir(&ctx, root.clone(), String::new(), 0).await?;

    let stats = ScanStats {
        files:    listing.files,
        dirs:     listing.dirs,
        matched:  listing.entries.len(),
        duration: start.elapsed(),
    };
    info!(
        root = %root.display(),
        files = stats.files,
        dirs = stats.dirs,
        matched = stats.matched,
        elapsed_ms = stats.duration.as_millis() as u64,
        "scan complete"
    );

    FlatCollection::from_scan(listing.entries, stats)
}

// ---------------------------------------------------------------------------
// Traversal
// ---------------------------------------------------------------------------

struct WalkContext {
    matcher:  Arc<dyn Matcher>,
    enricher: Arc<dyn Enricher>,
}

/// List `dir` and visit every child concurrently.
///
/// Boxed so the recursion through `visit` has a nameable size.
fn walk_dir<'a>(
    ctx:   &'a WalkContext,
    dir:   PathBuf,
    rel:   String,
    depth: usize,
) -> BoxFuture<'a, Result<Listing, DirdexError>> {
    async move {
        let children = list(&dir).await?;
        debug!(dir = %dir.display(), children = children.len(), "listed directory");

        let visited = try_join_all(
            children
                .into_iter()
                .map(|child| visit(ctx, &dir, &rel, depth, child)),
        )
        .await?;

        let mut listing = Listing::default();
        for v in visited {
            listing.entries.extend(v.entries);
            listing.children.extend(v.reference);
            listing.files += v.files;
            listing.dirs  += v.dirs;
        }
        Ok(listing)
    }
    .boxed()
}

async fn visit(
    ctx:        &WalkContext,
    parent:     &Path,
    parent_rel: &str,
    depth:      usize,
    child:      Child,
) -> Result<Visited, DirdexError> {
    let path = parent.join(&child.file_name);
    let relative_path = join_relative(parent_rel, &child.name);
    let matched = ctx.matcher.is_match(&relative_path);

    let entry_ctx = EntryContext {
        name: child.name,
        entry_type: child.entry_type,
        path,
        relative_path,
        depth,
    };

    match entry_ctx.entry_type {
        EntryType::File => {
            let mut visited = Visited { files: 1, ..Default::default() };
            if matched {
                let attributes = ctx
                    .enricher
                    .enrich_file(&entry_ctx)
                    .await
                    .map_err(|source| DirdexError::Enrichment {
                        path: entry_ctx.path.clone(),
                        source,
                    })?;

                trace!(id = %entry_ctx.relative_path, depth, "file");
                visited.reference = Some(EntryRef::file(entry_ctx.relative_path.clone()));
                visited.entries.push(Entry::file(entry_ctx.relative_path, depth, attributes));
            }
            Ok(visited)
        }
        EntryType::Directory => {
            // Descend first: descendants may match even when this directory doesn't.
            let listing = walk_dir(
                ctx,
                entry_ctx.path.clone(),
                entry_ctx.relative_path.clone(),
                depth + 1,
            )
            .await?;

            let mut visited = Visited {
                entries: listing.entries,
                files:   listing.files,
                dirs:    listing.dirs + 1,
                ..Default::default()
            };
            if matched {
                let attributes = ctx
                    .enricher
                    .enrich_dir(&entry_ctx)
                    .await
                    .map_err(|source| DirdexError::Enrichment {
                        path: entry_ctx.path.clone(),
                        source,
                    })?;

                trace!(id = %entry_ctx.relative_path, depth, children = listing.children.len(), "directory");
                visited.reference = Some(EntryRef::directory(entry_ctx.relative_path.clone()));
                visited.entries.push(Entry::directory(
                    entry_ctx.relative_path,
                    depth,
                    attributes,
                    listing.children,
                ));
            }
            Ok(visited)
        }
    }
}

/// Read the immediate children of `dir`.
///
/// Symlinks are classified by their own type and therefore skipped, along
/// with sockets, fifos and devices.
async fn list(dir: &Path) -> Result<Vec<Child>, DirdexError> {
    let io_err = |e| DirdexError::from_io(dir.to_path_buf(), e);

    let mut read_dir = tokio::fs::read_dir(dir).await.map_err(io_err)?;
    let mut children = Vec::new();

    while let Some(entry) = read_dir.next_entry().await.map_err(io_err)? {
        let ft = entry.file_type().await.map_err(|e| DirdexError::from_io(entry.path(), e))?;
        let entry_type = if ft.is_file() {
            EntryType::File
        } else if ft.is_dir() {
            EntryType::Directory
        } else {
            warn!(path = %entry.path().display(), "skipping entry that is neither file nor directory");
            continue;
        };

        let file_name = entry.file_name();
        children.push(Child {
            name: file_name.to_string_lossy().into_owned(),
            file_name,
            entry_type,
        });
    }

    Ok(children)
}

fn join_relative(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{parent}/{name}")
    }
}
