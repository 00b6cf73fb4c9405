//! Tree node types.
//!
//! A directory owns its children by value, so the tree can never contain a
//! cycle or a shared node. Entries keep their insertion order, which is the
//! order `ls` reports and the order the session blob is written in.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A node in the tree: either a directory or a file.
///
/// Serialized with an explicit `type` tag (`"dir"` / `"file"`), the layout
/// used by persisted session blobs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Node {
    #[serde(rename = "dir")]
    Directory(Directory),
    #[serde(rename = "file")]
    File(FileNode),
}

impl Node {
    /// An empty directory node.
    pub fn dir() -> Self {
        Node::Directory(Directory::new())
    }

    /// A file node with the given content.
    pub fn file(content: impl Into<String>) -> Self {
        Node::File(FileNode::new(content))
    }

    /// Borrowed view of this node.
    pub fn as_node_ref(&self) -> NodeRef<'_> {
        match self {
            Node::Directory(dir) => NodeRef::Directory(dir),
            Node::File(file) => NodeRef::File(file),
        }
    }

    pub fn kind(&self) -> EntryKind {
        match self {
            Node::Directory(_) => EntryKind::Directory,
            Node::File(_) => EntryKind::File,
        }
    }
}

/// Borrowed view of a node, also able to point at the root directory
/// (which is not stored inside a [`Node`]).
#[derive(Debug, Clone, Copy)]
pub enum NodeRef<'a> {
    Directory(&'a Directory),
    File(&'a FileNode),
}

impl<'a> NodeRef<'a> {
    pub fn kind(&self) -> EntryKind {
        match self {
            NodeRef::Directory(_) => EntryKind::Directory,
            NodeRef::File(_) => EntryKind::File,
        }
    }

    /// The directory, if this is one.
    pub fn as_directory(self) -> Option<&'a Directory> {
        match self {
            NodeRef::Directory(dir) => Some(dir),
            NodeRef::File(_) => None,
        }
    }

    /// The file, if this is one.
    pub fn as_file(self) -> Option<&'a FileNode> {
        match self {
            NodeRef::File(file) => Some(file),
            NodeRef::Directory(_) => None,
        }
    }
}

/// Whether an entry is a file or a directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
}

/// A directory: a name-to-node mapping with unique names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Directory {
    #[serde(default)]
    entries: IndexMap<String, Node>,
}

impl Directory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a direct child by name.
    pub fn get(&self, name: &str) -> Option<&Node> {
        self.entries.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Node> {
        self.entries.get_mut(name)
    }

    /// Insert or replace a direct child. A replaced entry keeps its position.
    pub fn insert(&mut self, name: impl Into<String>, node: Node) -> Option<Node> {
        self.entries.insert(name.into(), node)
    }

    /// Remove a direct child, keeping the order of its siblings.
    pub fn remove(&mut self, name: &str) -> Option<Node> {
        self.entries.shift_remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Child names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Children in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Node)> {
        self.entries.iter().map(|(name, node)| (name.as_str(), node))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Return the child directory `name`, creating it if it is missing.
    ///
    /// A file occupying the slot is replaced by an empty directory.
    pub fn child_dir_mut(&mut self, name: &str) -> &mut Directory {
        let slot = self.entries.entry(name.to_string()).or_insert_with(Node::dir);
        if let Node::File(_) = slot {
            log::debug!("replacing file {name} with a directory");
            *slot = Node::dir();
        }
        match slot {
            Node::Directory(dir) => dir,
            Node::File(_) => unreachable!("file slot {name} was replaced above"),
        }
    }
}

/// A file holding text content.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileNode {
    #[serde(default)]
    pub content: String,
}

impl FileNode {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directory_keeps_insertion_order() {
        let mut dir = Directory::new();
        dir.insert("zeta", Node::dir());
        dir.insert("alpha", Node::file("a"));
        dir.insert("mid", Node::file("m"));
        let names: Vec<&str> = dir.names().collect();
        assert_eq!(names, ["zeta", "alpha", "mid"]);
    }

    #[test]
    fn replacing_entry_keeps_position() {
        let mut dir = Directory::new();
        dir.insert("a", Node::file("1"));
        dir.insert("b", Node::file("2"));
        dir.insert("a", Node::file("3"));
        let names: Vec<&str> = dir.names().collect();
        assert_eq!(names, ["a", "b"]);
        assert_eq!(dir.get("a"), Some(&Node::file("3")));
    }

    #[test]
    fn remove_keeps_sibling_order() {
        let mut dir = Directory::new();
        for name in ["a", "b", "c", "d"] {
            dir.insert(name, Node::dir());
        }
        dir.remove("b");
        let names: Vec<&str> = dir.names().collect();
        assert_eq!(names, ["a", "c", "d"]);
    }

    #[test]
    fn child_dir_mut_creates_once() {
        let mut dir = Directory::new();
        dir.child_dir_mut("x").insert("inner", Node::file("hi"));
        dir.child_dir_mut("x");
        assert_eq!(dir.len(), 1);
        let Some(Node::Directory(x)) = dir.get("x") else {
            panic!("expected directory");
        };
        assert!(x.contains("inner"));
    }

    #[test]
    fn child_dir_mut_replaces_file() {
        let mut dir = Directory::new();
        dir.insert("x", Node::file("old"));
        dir.child_dir_mut("x");
        assert_eq!(dir.get("x").map(Node::kind), Some(EntryKind::Directory));
    }

    #[test]
    fn node_serializes_with_type_tag() {
        let mut dir = Directory::new();
        dir.insert("readme", Node::file("hello"));
        let json = serde_json::to_value(Node::Directory(dir)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "type": "dir",
                "entries": { "readme": { "type": "file", "content": "hello" } }
            })
        );
    }

    #[test]
    fn node_deserializes_missing_fields() {
        let node: Node = serde_json::from_str(r#"{"type":"dir"}"#).unwrap();
        assert_eq!(node, Node::dir());
        let node: Node = serde_json::from_str(r#"{"type":"file"}"#).unwrap();
        assert_eq!(node, Node::file(""));
    }

    #[test]
    fn unknown_type_tag_rejected() {
        assert!(serde_json::from_str::<Node>(r#"{"type":"link"}"#).is_err());
    }
}
