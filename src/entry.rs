use std::fmt;
use std::path::PathBuf;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

/// Open-ended attribute bag produced by an [`Enricher`](crate::traits::Enricher).
///
/// The indexer never looks inside it — whatever the enricher returns is
/// carried through to the serialized `attributes` object.
pub type Attributes = serde_json::Map<String, Value>;

/// Type tag shared by entries and references.
///
/// Serializes to the JSON:API resource type names `"files"` and `"directories"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntryType {
    #[serde(rename = "files")]
    File,

    #[serde(rename = "directories")]
    Directory,
}

impl EntryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::File      => "files",
            Self::Directory => "directories",
        }
    }
}

impl fmt::Display for EntryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A non-owning pointer to an [`Entry`] in the same
/// [`FlatCollection`](crate::FlatCollection).
///
/// Carries no data of its own. Resolve it with
/// [`FlatCollection::resolve`](crate::FlatCollection::resolve).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntryRef {
    #[serde(rename = "type")]
    pub entry_type: EntryType,

    /// Relative path of the referenced entry.
    pub id: String,
}

impl EntryRef {
    pub fn file(id: impl Into<String>) -> Self {
        Self { entry_type: EntryType::File, id: id.into() }
    }

    pub fn directory(id: impl Into<String>) -> Self {
        Self { entry_type: EntryType::Directory, id: id.into() }
    }
}

/// Variant-specific part of an [`Entry`].
#[derive(Debug, Clone, PartialEq)]
pub enum EntryKind {
    /// A regular file.
    File,

    /// A directory, with references to its matched direct children in
    /// directory-read order.
    Directory { children: Vec<EntryRef> },
}

/// A single indexed filesystem node.
///
/// Identified by its path relative to the scan root, using `/` as the
/// separator on every platform. `depth` is 0 for the root's direct children.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub id: String,
    pub depth: usize,
    pub attributes: Attributes,
    pub kind: EntryKind,
}

impl Entry {
    pub fn file(id: impl Into<String>, depth: usize, attributes: Attributes) -> Self {
        Self { id: id.into(), depth, attributes, kind: EntryKind::File }
    }

    pub fn directory(
        id: impl Into<String>,
        depth: usize,
        attributes: Attributes,
        children: Vec<EntryRef>,
    ) -> Self {
        Self {
            id: id.into(),
            depth,
            attributes,
            kind: EntryKind::Directory { children },
        }
    }

    pub fn entry_type(&self) -> EntryType {
        match self.kind {
            EntryKind::File             => EntryType::File,
            EntryKind::Directory { .. } => EntryType::Directory,
        }
    }

    pub fn is_dir(&self) -> bool {
        matches!(self.kind, EntryKind::Directory { .. })
    }

    /// Child references, or `None` for files.
    pub fn children(&self) -> Option<&[EntryRef]> {
        match &self.kind {
            EntryKind::File                   => None,
            EntryKind::Directory { children } => Some(children.as_slice()),
        }
    }

    /// A reference pointing back at this entry.
    pub fn to_ref(&self) -> EntryRef {
        EntryRef { entry_type: self.entry_type(), id: self.id.clone() }
    }
}

// JSON:API resource object: {type, id, attributes, children?}.
// `depth` goes into `attributes` after the enrichment keys so it always wins.
impl Serialize for Entry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut attributes = self.attributes.clone();
        attributes.insert("depth".to_string(), Value::from(self.depth));

        let len = if self.is_dir() { 4 } else { 3 };
        let mut map = serializer.serialize_map(Some(len))?;
        map.serialize_entry("type", &self.entry_type())?;
        map.serialize_entry("id", &self.id)?;
        map.serialize_entry("attributes", &attributes)?;
        if let EntryKind::Directory { children } = &self.kind {
            map.serialize_entry("children", children)?;
        }
        map.end()
    }
}

/// The raw descriptor handed to an [`Enricher`](crate::traits::Enricher)
/// for one matched filesystem node.
#[derive(Debug, Clone)]
pub struct EntryContext {
    /// The node's own file name.
    pub name: String,

    pub entry_type: EntryType,

    /// Absolute (or caller-resolved) path on disk.
    pub path: PathBuf,

    /// Path relative to the scan root — the entry's id.
    pub relative_path: String,

    pub depth: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn file_serializes_as_resource_object() {
        let mut attrs = Attributes::new();
        attrs.insert("title".into(), json!("Hello"));
        let entry = Entry::file("a.md", 0, attrs);

        assert_eq!(
            serde_json::to_value(&entry).unwrap(),
            json!({
                "type": "files",
                "id": "a.md",
                "attributes": { "title": "Hello", "depth": 0 }
            })
        );
    }

    #[test]
    fn directory_serializes_children_refs() {
        let entry = Entry::directory(
            "child",
            0,
            Attributes::new(),
            vec![EntryRef::file("child/b.md"), EntryRef::directory("child/sub")],
        );

        assert_eq!(
            serde_json::to_value(&entry).unwrap(),
            json!({
                "type": "directories",
                "id": "child",
                "attributes": { "depth": 0 },
                "children": [
                    { "type": "files", "id": "child/b.md" },
                    { "type": "directories", "id": "child/sub" }
                ]
            })
        );
    }

    #[test]
    fn computed_depth_overrides_enrichment() {
        let mut attrs = Attributes::new();
        attrs.insert("depth".into(), json!("bogus"));
        let entry = Entry::file("x/y.md", 1, attrs);

        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["attributes"]["depth"], json!(1));
        // the stored bag is untouched
        assert_eq!(entry.attributes["depth"], json!("bogus"));
    }

    #[test]
    fn to_ref_matches_kind() {
        let dir = Entry::directory("d", 2, Attributes::new(), Vec::new());
        assert_eq!(dir.to_ref(), EntryRef::directory("d"));
        assert!(dir.children().unwrap().is_empty());
        assert!(Entry::file("f", 0, Attributes::new()).children().is_none());
    }
}
