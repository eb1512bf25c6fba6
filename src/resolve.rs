use std::fmt;
use std::str::FromStr;

use crate::collection::FlatCollection;
use crate::entry::{Entry, EntryType};
use crate::error::{ContractViolation, ParseTypeFilterError};

/// Which entry kinds [`resolve_children`] returns.
///
/// Controls inclusion only: with `recurse` set, directories are still
/// descended into under [`TypeFilter::Files`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TypeFilter {
    Files,
    Directories,
    #[default]
    All,
}

impl TypeFilter {
    pub fn allows(&self, entry_type: EntryType) -> bool {
        match self {
            Self::All         => true,
            Self::Files       => entry_type == EntryType::File,
            Self::Directories => entry_type == EntryType::Directory,
        }
    }
}

impl FromStr for TypeFilter {
    type Err = ParseTypeFilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "files"       => Ok(Self::Files),
            "directories" => Ok(Self::Directories),
            "all"         => Ok(Self::All),
            other         => Err(ParseTypeFilterError(other.to_string())),
        }
    }
}

impl fmt::Display for TypeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Files       => "files",
            Self::Directories => "directories",
            Self::All         => "all",
        })
    }
}

/// Rebuild the nested view below `start` from a flat collection.
///
/// For each start directory (in order), its child references are looked up
/// in `flat` and kept if `filter` allows their type. With `recurse`, each
/// child directory's own children follow it depth-first, parent before
/// descendants. Never touches the filesystem and never mutates `flat`.
///
/// A reference that doesn't resolve in `flat`, or a start entry that isn't a
/// directory, is a [`ContractViolation`]. An empty `Vec` only ever means
/// "nothing matched".
///
/// # Example
///
/// ```rust
/// use dirdex::{resolve_children, Attributes, Entry, EntryRef, FlatCollection, TypeFilter};
///
/// let flat = FlatCollection::from_entries(vec![
///     Entry::file("child/b.md", 1, Attributes::new()),
///     Entry::directory("child", 0, Attributes::new(), vec![EntryRef::file("child/b.md")]),
/// ]).unwrap();
///
/// let child = flat.get("child").unwrap();
/// let found = resolve_children(&flat, &[child], TypeFilter::All, false).unwrap();
/// assert_eq!(found.len(), 1);
/// assert_eq!(found[0].id, "child/b.md");
/// ```
pub fn resolve_children<'a>(
    flat:    &'a FlatCollection,
    start:   &[&Entry],
    filter:  TypeFilter,
    recurse: bool,
) -> Result<Vec<&'a Entry>, ContractViolation> {
    let mut out = Vec::new();
    for dir in start {
        collect(flat, dir, filter, recurse, &mut out)?;
    }
    Ok(out)
}

fn collect<'a>(
    flat:    &'a FlatCollection,
    parent:  &Entry,
    filter:  TypeFilter,
    recurse: bool,
    out:     &mut Vec<&'a Entry>,
) -> Result<(), ContractViolation> {
    let children = parent
        .children()
        .ok_or_else(|| ContractViolation::NotADirectory(parent.id.clone()))?;

    for reference in children {
        let child = flat.resolve(reference).ok_or_else(|| ContractViolation::DanglingReference {
            parent: parent.id.clone(),
            id:     reference.id.clone(),
        })?;

        if filter.allows(child.entry_type()) {
            out.push(child);
        }
        if recurse && child.is_dir() {
            collect(flat, child, filter, recurse, out)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::{Attributes, EntryRef};

    /// ```text
    /// docs/
    ///   intro.md
    ///   guide/
    ///     setup.md
    ///     deep/
    ///       notes.md
    /// blog/
    ///   post.md
    /// ```
    fn tree() -> FlatCollection {
        let a = Attributes::new;
        FlatCollection::from_entries(vec![
            Entry::file("docs/intro.md", 1, a()),
            Entry::file("docs/guide/setup.md", 2, a()),
            Entry::file("docs/guide/deep/notes.md", 3, a()),
            Entry::directory("docs/guide/deep", 2, a(), vec![EntryRef::file("docs/guide/deep/notes.md")]),
            Entry::directory(
                "docs/guide",
                1,
                a(),
                vec![EntryRef::file("docs/guide/setup.md"), EntryRef::directory("docs/guide/deep")],
            ),
            Entry::directory(
                "docs",
                0,
                a(),
                vec![EntryRef::file("docs/intro.md"), EntryRef::directory("docs/guide")],
            ),
            Entry::file("blog/post.md", 1, a()),
            Entry::directory("blog", 0, a(), vec![EntryRef::file("blog/post.md")]),
        ])
        .unwrap()
    }

    fn ids(entries: &[&Entry]) -> Vec<String> {
        entries.iter().map(|e| e.id.clone()).collect()
    }

    #[test]
    fn direct_children_only() {
        let flat = tree();
        let docs = flat.get("docs").unwrap();
        let found = resolve_children(&flat, &[docs], TypeFilter::All, false).unwrap();
        assert_eq!(ids(&found), ["docs/intro.md", "docs/guide"]);
    }

    #[test]
    fn recursive_is_depth_first_parent_first() {
        let flat = tree();
        let docs = flat.get("docs").unwrap();
        let found = resolve_children(&flat, &[docs], TypeFilter::All, true).unwrap();
        assert_eq!(
            ids(&found),
            [
                "docs/intro.md",
                "docs/guide",
                "docs/guide/setup.md",
                "docs/guide/deep",
                "docs/guide/deep/notes.md",
            ]
        );
    }

    #[test]
    fn files_filter_still_descends() {
        let flat = tree();
        let docs = flat.get("docs").unwrap();
        let found = resolve_children(&flat, &[docs], TypeFilter::Files, true).unwrap();
        assert_eq!(
            ids(&found),
            ["docs/intro.md", "docs/guide/setup.md", "docs/guide/deep/notes.md"]
        );
        assert!(found.iter().all(|e| !e.is_dir()));
    }

    #[test]
    fn directories_filter() {
        let flat = tree();
        let docs = flat.get("docs").unwrap();
        let found = resolve_children(&flat, &[docs], TypeFilter::Directories, true).unwrap();
        assert_eq!(ids(&found), ["docs/guide", "docs/guide/deep"]);
    }

    #[test]
    fn groups_follow_start_order() {
        let flat = tree();
        let start = [flat.get("blog").unwrap(), flat.get("docs").unwrap()];
        let found = resolve_children(&flat, &start, TypeFilter::Files, false).unwrap();
        assert_eq!(ids(&found), ["blog/post.md", "docs/intro.md"]);
    }

    #[test]
    fn empty_directory_is_empty_result() {
        let flat = FlatCollection::from_entries(vec![Entry::directory(
            "empty",
            0,
            Attributes::new(),
            Vec::new(),
        )])
        .unwrap();
        let empty = flat.get("empty").unwrap();
        assert!(resolve_children(&flat, &[empty], TypeFilter::All, true).unwrap().is_empty());
    }

    #[test]
    fn foreign_directory_is_a_contract_violation() {
        let flat = tree();
        let foreign = Entry::directory("other", 0, Attributes::new(), vec![EntryRef::file("other/x.md")]);
        let err = resolve_children(&flat, &[&foreign], TypeFilter::All, false).unwrap_err();
        assert_eq!(
            err,
            ContractViolation::DanglingReference { parent: "other".into(), id: "other/x.md".into() }
        );
    }

    #[test]
    fn mistagged_reference_is_dangling() {
        let flat = tree();
        let bad = Entry::directory("x", 0, Attributes::new(), vec![EntryRef::file("docs")]);
        assert!(matches!(
            resolve_children(&flat, &[&bad], TypeFilter::All, false),
            Err(ContractViolation::DanglingReference { .. })
        ));
    }

    #[test]
    fn file_as_start_is_rejected() {
        let flat = tree();
        let file = flat.get("blog/post.md").unwrap();
        assert_eq!(
            resolve_children(&flat, &[file], TypeFilter::All, false).unwrap_err(),
            ContractViolation::NotADirectory("blog/post.md".into())
        );
    }

    #[test]
    fn filter_parses_from_str() {
        assert_eq!("files".parse::<TypeFilter>().unwrap(), TypeFilter::Files);
        assert_eq!("directories".parse::<TypeFilter>().unwrap(), TypeFilter::Directories);
        assert_eq!("all".parse::<TypeFilter>().unwrap(), TypeFilter::All);
        assert_eq!(
            "dirs".parse::<TypeFilter>().unwrap_err(),
            ParseTypeFilterError("dirs".into())
        );
    }
}
