use std::collections::HashMap;
use std::time::Duration;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::entry::{Entry, EntryRef};
use crate::error::{ContractViolation, DirdexError};

/// The output of one completed scan: every matched entry, exactly once.
///
/// Entries are owned here; directories only hold [`EntryRef`]s to their
/// children, which are resolved through the id index. Insertion order
/// groups each directory after all of its descendants but is otherwise
/// unspecified — don't rely on it beyond that.
#[derive(Debug, Clone, Default)]
pub struct FlatCollection {
    entries: Vec<Entry>,
    index:   HashMap<String, usize>,
    stats:   ScanStats,
}

impl FlatCollection {
    /// Build a collection from already-constructed entries.
    ///
    /// Fails on duplicate ids. Child references are not checked here —
    /// [`resolve_children`](crate::resolve_children) reports dangling ones.
    pub fn from_entries(entries: impl IntoIterator<Item = Entry>) -> Result<Self, ContractViolation> {
        let mut collection = Self::default();
        for entry in entries {
            collection.push(entry)?;
        }
        Ok(collection)
    }

    pub(crate) fn push(&mut self, entry: Entry) -> Result<(), ContractViolation> {
        self.try_insert(entry).map_err(ContractViolation::DuplicateId)
    }

    /// Insert unless the id is taken; returns the clashing id.
    fn try_insert(&mut self, entry: Entry) -> Result<(), String> {
        if self.index.contains_key(&entry.id) {
            return Err(entry.id);
        }
        self.index.insert(entry.id.clone(), self.entries.len());
        self.entries.push(entry);
        Ok(())
    }

    /// Assemble the walker's output.
    ///
    /// Distinct on-disk names can still share an id once made valid UTF-8
    /// (`f\xff.md` and `f\xfe.md` both become `f\u{FFFD}.md`), so a clash is
    /// reported instead of silently dropping one of them.
    pub(crate) fn from_scan(entries: Vec<Entry>, stats: ScanStats) -> Result<Self, DirdexError> {
        let mut collection = Self { stats, ..Self::default() };
        for entry in entries {
            collection.try_insert(entry).map_err(DirdexError::DuplicateId)?;
        }
        Ok(collection)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, Entry> {
        self.entries.iter()
    }

    /// Look up an entry by id (its relative path).
    pub fn get(&self, id: &str) -> Option<&Entry> {
        self.index.get(id).map(|&i| &self.entries[i])
    }

    /// Resolve a reference. The type tag must agree with the entry found.
    pub fn resolve(&self, reference: &EntryRef) -> Option<&Entry> {
        self.get(&reference.id)
            .filter(|e| e.entry_type() == reference.entry_type)
    }

    pub fn files(&self) -> impl Iterator<Item = &Entry> {
        self.entries.iter().filter(|e| !e.is_dir())
    }

    pub fn directories(&self) -> impl Iterator<Item = &Entry> {
        self.entries.iter().filter(|e| e.is_dir())
    }

    pub fn stats(&self) -> &ScanStats {
        &self.stats
    }

    /// The collection as a JSON:API document: `{"data": [...]}`.
    pub fn to_document(&self) -> serde_json::Result<Value> {
        serde_json::to_value(self)
    }
}

impl<'a> IntoIterator for &'a FlatCollection {
    type Item = &'a Entry;
    type IntoIter = std::slice::Iter<'a, Entry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl Serialize for FlatCollection {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry("data", &self.entries)?;
        map.end()
    }
}

/// Statistics for a completed scan.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScanStats {
    /// Files encountered, matched or not.
    pub files: usize,

    /// Directories encountered below the root, matched or not.
    pub dirs: usize,

    /// Entries that made it into the collection.
    pub matched: usize,

    /// Wall-clock time from scan start to completion.
    pub duration: Duration,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::Attributes;
    use serde_json::json;

    fn sample() -> FlatCollection {
        FlatCollection::from_entries(vec![
            Entry::file("a.md", 0, Attributes::new()),
            Entry::file("child/b.md", 1, Attributes::new()),
            Entry::directory("child", 0, Attributes::new(), vec![EntryRef::file("child/b.md")]),
        ])
        .unwrap()
    }

    #[test]
    fn lookup_by_id() {
        let flat = sample();
        assert_eq!(flat.len(), 3);
        assert_eq!(flat.get("child/b.md").map(|e| e.depth), Some(1));
        assert!(flat.get("missing").is_none());
    }

    #[test]
    fn resolve_checks_type_tag() {
        let flat = sample();
        assert!(flat.resolve(&EntryRef::directory("child")).is_some());
        assert!(flat.resolve(&EntryRef::file("child")).is_none());
    }

    #[test]
    fn rejects_duplicate_ids() {
        let err = FlatCollection::from_entries(vec![
            Entry::file("a.md", 0, Attributes::new()),
            Entry::file("a.md", 0, Attributes::new()),
        ])
        .unwrap_err();
        assert_eq!(err, ContractViolation::DuplicateId("a.md".into()));
    }

    #[test]
    fn scan_output_with_clashing_ids_is_an_error() {
        let err = FlatCollection::from_scan(
            vec![
                Entry::file("f\u{FFFD}.md", 0, Attributes::new()),
                Entry::file("f\u{FFFD}.md", 0, Attributes::new()),
            ],
            ScanStats::default(),
        )
        .unwrap_err();
        assert!(matches!(err, DirdexError::DuplicateId(id) if id == "f\u{FFFD}.md"));
    }

    #[test]
    fn files_and_directories_partition() {
        let flat = sample();
        assert_eq!(flat.files().count(), 2);
        assert_eq!(flat.directories().count(), 1);
    }

    #[test]
    fn document_wraps_data() {
        let doc = sample().to_document().unwrap();
        let data = doc["data"].as_array().unwrap();
        assert_eq!(data.len(), 3);
        assert_eq!(data[2]["type"], json!("directories"));
        assert_eq!(data[2]["children"][0], json!({ "type": "files", "id": "child/b.md" }));
    }
}
