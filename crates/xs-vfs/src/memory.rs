//! In-memory VFS implementation.
//!
//! The whole file tree hangs off a single root [`Directory`]. Lookups walk
//! one segment at a time, so every operation is O(depth).

use serde::{Deserialize, Serialize};
use xs_types::error::{Result, XsError};

use crate::node::{Directory, EntryKind, Node, NodeRef};
use crate::path;

/// A single directory entry as reported by [`MemoryVfs::list`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VfsEntry {
    pub name: String,
    pub kind: EntryKind,
    /// Content length in bytes (0 for directories).
    pub size: u64,
}

/// Totals over the whole tree (the root itself is not counted).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VfsStats {
    pub directories: u64,
    pub files: u64,
    pub bytes: u64,
}

/// A fully in-memory virtual file system.
///
/// Serializes as `{"/": <dir node>}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryVfs {
    #[serde(rename = "/", with = "root_node")]
    root: Directory,
}

impl MemoryVfs {
    /// Create a new in-memory VFS with only the root directory.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn root(&self) -> &Directory {
        &self.root
    }

    /// Resolve `input` against `cwd` and walk the tree.
    ///
    /// Returns `None` as soon as a segment is missing or an intermediate
    /// segment is a file.
    pub fn resolve(&self, input: &str, cwd: &str) -> Option<NodeRef<'_>> {
        let full = path::join(cwd, input);
        self.walk(&path::segments(&full))
    }

    fn walk(&self, segments: &[&str]) -> Option<NodeRef<'_>> {
        let mut current = NodeRef::Directory(&self.root);
        for seg in segments {
            let dir = current.as_directory()?;
            current = dir.get(seg)?.as_node_ref();
        }
        Some(current)
    }

    /// Walk `path` (taken as absolute), creating every missing directory.
    ///
    /// Never fails; calling it twice is a no-op the second time.
    pub fn ensure_directory(&mut self, path: &str) -> &mut Directory {
        let segs = path::segments(path);
        Self::ensure_segments(&mut self.root, &segs)
    }

    fn ensure_segments<'a>(root: &'a mut Directory, segments: &[&str]) -> &'a mut Directory {
        let mut dir = root;
        for seg in segments {
            dir = dir.child_dir_mut(seg);
        }
        dir
    }

    /// Like [`ensure_directory`](Self::ensure_directory), but refuses to
    /// go through or onto an existing file instead of replacing it.
    pub fn make_directory(&mut self, path: &str) -> Result<()> {
        let segs = path::segments(path);
        for end in 1..=segs.len() {
            if let Some(NodeRef::File(_)) = self.walk(&segs[..end]) {
                return Err(XsError::Validation(format!(
                    "file exists: /{}",
                    segs[..end].join("/")
                )));
            }
        }
        Self::ensure_segments(&mut self.root, &segs);
        Ok(())
    }

    /// Write a file at `path` (taken as absolute), creating parent
    /// directories as needed.
    ///
    /// Silently overwrites whatever occupied the final slot, including a
    /// directory and its whole subtree.
    pub fn write_file(&mut self, path: &str, content: impl Into<String>) -> Result<()> {
        let (parents, name) = path::split_parent(path)
            .ok_or_else(|| XsError::Validation(format!("missing file name: {path}")))?;
        let dir = Self::ensure_segments(&mut self.root, &parents);
        dir.insert(name, Node::file(content));
        Ok(())
    }

    /// Remove the entry at `path` (taken as absolute) and return it.
    ///
    /// Parent directories are never created. A directory goes away together
    /// with everything below it.
    pub fn remove(&mut self, path: &str) -> Result<Node> {
        let (parents, name) = path::split_parent(path)
            .ok_or_else(|| XsError::Validation("cannot remove root".to_string()))?;
        let mut dir = &mut self.root;
        for seg in parents {
            dir = match dir.get_mut(seg) {
                Some(Node::Directory(child)) => child,
                _ => return Err(XsError::NotFound(path.to_string())),
            };
        }
        dir.remove(name)
            .ok_or_else(|| XsError::NotFound(path.to_string()))
    }

    /// Move `cwd` to `input` if it names an existing directory.
    ///
    /// On success `cwd` holds the canonical resolved path; on failure it is
    /// left untouched.
    pub fn change_directory(&self, cwd: &mut String, input: &str) -> Result<()> {
        let full = path::join(cwd, input);
        match self.walk(&path::segments(&full)) {
            Some(NodeRef::Directory(_)) => {
                *cwd = path::canonical(&full);
                Ok(())
            },
            Some(NodeRef::File(_)) => Err(XsError::Validation(format!(
                "not a directory: {}",
                path::canonical(&full)
            ))),
            None => Err(XsError::NotFound(path::canonical(&full))),
        }
    }

    /// List the immediate children of a directory in insertion order.
    pub fn list(&self, input: &str, cwd: &str) -> Result<Vec<VfsEntry>> {
        let dir = match self.resolve(input, cwd) {
            Some(NodeRef::Directory(dir)) => dir,
            Some(NodeRef::File(_)) => {
                return Err(XsError::Validation(format!("not a directory: {input}")));
            },
            None => return Err(XsError::NotFound(input.to_string())),
        };
        Ok(dir
            .iter()
            .map(|(name, node)| VfsEntry {
                name: name.to_string(),
                kind: node.kind(),
                size: match node {
                    Node::File(file) => file.content.len() as u64,
                    Node::Directory(_) => 0,
                },
            })
            .collect())
    }

    /// Read a file's content.
    pub fn read_file(&self, input: &str, cwd: &str) -> Result<&str> {
        match self.resolve(input, cwd) {
            Some(NodeRef::File(file)) => Ok(&file.content),
            Some(NodeRef::Directory(_)) => {
                Err(XsError::Validation(format!("is a directory: {input}")))
            },
            None => Err(XsError::NotFound(input.to_string())),
        }
    }

    pub fn exists(&self, input: &str, cwd: &str) -> bool {
        self.resolve(input, cwd).is_some()
    }

    /// Count directories, files and content bytes below the root.
    pub fn stats(&self) -> VfsStats {
        let mut stats = VfsStats::default();
        let mut pending = vec![&self.root];
        while let Some(dir) = pending.pop() {
            for (_, node) in dir.iter() {
                match node {
                    Node::Directory(child) => {
                        stats.directories += 1;
                        pending.push(child);
                    },
                    Node::File(file) => {
                        stats.files += 1;
                        stats.bytes += file.content.len() as u64;
                    },
                }
            }
        }
        stats
    }
}

/// (De)serializes the root as a tagged directory node and rejects a blob
/// whose root is a file.
mod root_node {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use crate::node::{Directory, Node};

    #[derive(Serialize)]
    #[serde(tag = "type")]
    enum RootRef<'a> {
        #[serde(rename = "dir")]
        Directory(&'a Directory),
    }

    pub fn serialize<S: Serializer>(root: &Directory, s: S) -> Result<S::Ok, S::Error> {
        RootRef::Directory(root).serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Directory, D::Error> {
        match Node::deserialize(d)? {
            Node::Directory(dir) => Ok(dir),
            Node::File(_) => Err(D::Error::custom("filesystem root must be a directory")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_dir(vfs: &MemoryVfs, path: &str) -> bool {
        matches!(vfs.resolve(path, "/"), Some(NodeRef::Directory(_)))
    }

    fn names(vfs: &MemoryVfs, path: &str) -> Vec<String> {
        vfs.list(path, "/")
            .unwrap()
            .into_iter()
            .map(|e| e.name)
            .collect()
    }

    #[test]
    fn root_exists() {
        let vfs = MemoryVfs::new();
        assert!(is_dir(&vfs, "/"));
        assert!(is_dir(&vfs, ""));
    }

    #[test]
    fn ensure_directory_creates_parents() {
        let mut vfs = MemoryVfs::new();
        vfs.ensure_directory("/a/b/c");
        assert!(is_dir(&vfs, "/a"));
        assert!(is_dir(&vfs, "/a/b"));
        assert!(is_dir(&vfs, "/a/b/c"));
    }

    #[test]
    fn ensure_directory_is_idempotent() {
        let mut vfs = MemoryVfs::new();
        vfs.ensure_directory("/a/b");
        vfs.write_file("/a/b/keep.txt", "x").unwrap();
        let before = vfs.clone();
        vfs.ensure_directory("/a/b");
        assert_eq!(vfs, before);
    }

    #[test]
    fn make_directory_creates_parents() {
        let mut vfs = MemoryVfs::new();
        vfs.make_directory("/a/b").unwrap();
        assert!(is_dir(&vfs, "/a/b"));
        vfs.make_directory("/a/b").unwrap();
        assert_eq!(names(&vfs, "/a"), ["b"]);
    }

    #[test]
    fn make_directory_keeps_existing_file() {
        let mut vfs = MemoryVfs::new();
        vfs.write_file("/notes.txt", "important").unwrap();
        let before = vfs.clone();

        let err = vfs.make_directory("/notes.txt").unwrap_err();
        assert!(matches!(err, XsError::Validation(ref m) if m.contains("/notes.txt")));
        let err = vfs.make_directory("/notes.txt/inner").unwrap_err();
        assert!(matches!(err, XsError::Validation(_)));

        assert_eq!(vfs, before);
        assert_eq!(vfs.read_file("/notes.txt", "/").unwrap(), "important");
    }

    #[test]
    fn write_and_read() {
        let mut vfs = MemoryVfs::new();
        vfs.write_file("/tmp/test.txt", "hello world").unwrap();
        assert_eq!(vfs.read_file("/tmp/test.txt", "/").unwrap(), "hello world");
    }

    #[test]
    fn write_creates_missing_parents() {
        let mut vfs = MemoryVfs::new();
        vfs.write_file("/no/such/dir/file", "x").unwrap();
        assert!(is_dir(&vfs, "/no/such/dir"));
    }

    #[test]
    fn write_to_root_rejected() {
        let mut vfs = MemoryVfs::new();
        assert!(matches!(
            vfs.write_file("/", "x"),
            Err(XsError::Validation(_))
        ));
    }

    #[test]
    fn overwrite_file() {
        let mut vfs = MemoryVfs::new();
        vfs.write_file("/file", "old").unwrap();
        vfs.write_file("/file", "new content").unwrap();
        assert_eq!(vfs.read_file("/file", "/").unwrap(), "new content");
    }

    #[test]
    fn overwrite_directory_with_file() {
        let mut vfs = MemoryVfs::new();
        vfs.write_file("/dir/inner.txt", "x").unwrap();
        vfs.write_file("/dir", "now a file").unwrap();
        assert_eq!(vfs.read_file("/dir", "/").unwrap(), "now a file");
        assert!(vfs.resolve("/dir/inner.txt", "/").is_none());
    }

    #[test]
    fn resolve_relative_to_cwd() {
        let mut vfs = MemoryVfs::new();
        vfs.write_file("/home/xs/notes.txt", "n").unwrap();
        let node = vfs.resolve("notes.txt", "/home/xs").unwrap();
        assert_eq!(node.kind(), EntryKind::File);
    }

    #[test]
    fn resolve_through_file_fails() {
        let mut vfs = MemoryVfs::new();
        vfs.write_file("/file", "data").unwrap();
        assert!(vfs.resolve("/file/child", "/").is_none());
    }

    #[test]
    fn remove_file() {
        let mut vfs = MemoryVfs::new();
        vfs.write_file("/tmp/x", "data").unwrap();
        let removed = vfs.remove("/tmp/x").unwrap();
        assert_eq!(removed, Node::file("data"));
        assert!(vfs.resolve("/tmp/x", "/").is_none());
    }

    #[test]
    fn remove_nonempty_dir_takes_subtree() {
        let mut vfs = MemoryVfs::new();
        vfs.write_file("/dir/sub/file", "x").unwrap();
        vfs.remove("/dir").unwrap();
        assert!(vfs.resolve("/dir", "/").is_none());
        assert!(vfs.root().is_empty());
    }

    #[test]
    fn remove_leaves_siblings() {
        let mut vfs = MemoryVfs::new();
        vfs.write_file("/d/a", "1").unwrap();
        vfs.write_file("/d/b", "2").unwrap();
        vfs.write_file("/d/c", "3").unwrap();
        vfs.remove("/d/b").unwrap();
        assert_eq!(names(&vfs, "/d"), ["a", "c"]);
        assert_eq!(vfs.read_file("/d/a", "/").unwrap(), "1");
    }

    #[test]
    fn remove_does_not_create_parents() {
        let mut vfs = MemoryVfs::new();
        assert!(matches!(vfs.remove("/ghost/x"), Err(XsError::NotFound(_))));
        assert!(vfs.resolve("/ghost", "/").is_none());
    }

    #[test]
    fn remove_nonexistent_fails() {
        let mut vfs = MemoryVfs::new();
        assert!(matches!(vfs.remove("/ghost"), Err(XsError::NotFound(_))));
    }

    #[test]
    fn remove_root_fails() {
        let mut vfs = MemoryVfs::new();
        assert!(matches!(vfs.remove("/"), Err(XsError::Validation(_))));
    }

    #[test]
    fn change_directory_success_canonicalizes() {
        let mut vfs = MemoryVfs::new();
        vfs.ensure_directory("/home/xs/projects");
        let mut cwd = "/home".to_string();
        vfs.change_directory(&mut cwd, "xs//projects/").unwrap();
        assert_eq!(cwd, "/home/xs/projects");
    }

    #[test]
    fn change_directory_missing_keeps_cwd() {
        let vfs = MemoryVfs::new();
        let mut cwd = "/".to_string();
        assert!(matches!(
            vfs.change_directory(&mut cwd, "nowhere"),
            Err(XsError::NotFound(_))
        ));
        assert_eq!(cwd, "/");
    }

    #[test]
    fn change_directory_to_file_keeps_cwd() {
        let mut vfs = MemoryVfs::new();
        vfs.write_file("/file", "x").unwrap();
        let mut cwd = "/".to_string();
        assert!(vfs.change_directory(&mut cwd, "/file").is_err());
        assert_eq!(cwd, "/");
    }

    #[test]
    fn dotdot_is_not_resolved() {
        let mut vfs = MemoryVfs::new();
        vfs.ensure_directory("/a/b");
        let mut cwd = "/a/b".to_string();
        assert!(vfs.change_directory(&mut cwd, "..").is_err());
        assert_eq!(cwd, "/a/b");
    }

    #[test]
    fn dot_component_creates_literal_directory() {
        let mut vfs = MemoryVfs::new();
        vfs.write_file("/dir/./file", "data").unwrap();
        assert!(is_dir(&vfs, "/dir/."));
    }

    #[test]
    fn list_keeps_insertion_order() {
        let mut vfs = MemoryVfs::new();
        vfs.write_file("/z.txt", "").unwrap();
        vfs.ensure_directory("/a");
        vfs.write_file("/m.txt", "").unwrap();
        assert_eq!(names(&vfs, "/"), ["z.txt", "a", "m.txt"]);
    }

    #[test]
    fn list_reports_kind_and_size() {
        let mut vfs = MemoryVfs::new();
        vfs.write_file("/data/f.bin", "abc").unwrap();
        vfs.ensure_directory("/data/sub");
        let entries = vfs.list("/data", "/").unwrap();
        assert_eq!(
            entries,
            [
                VfsEntry {
                    name: "f.bin".into(),
                    kind: EntryKind::File,
                    size: 3
                },
                VfsEntry {
                    name: "sub".into(),
                    kind: EntryKind::Directory,
                    size: 0
                },
            ]
        );
    }

    #[test]
    fn list_on_file_fails() {
        let mut vfs = MemoryVfs::new();
        vfs.write_file("/file", "data").unwrap();
        assert!(matches!(vfs.list("/file", "/"), Err(XsError::Validation(_))));
    }

    #[test]
    fn list_missing_fails() {
        let vfs = MemoryVfs::new();
        assert!(matches!(vfs.list("/nope", "/"), Err(XsError::NotFound(_))));
    }

    #[test]
    fn read_dir_as_file_fails() {
        let mut vfs = MemoryVfs::new();
        vfs.ensure_directory("/dir");
        assert!(vfs.read_file("/dir", "/").is_err());
    }

    #[test]
    fn unicode_and_spaces_in_names() {
        let mut vfs = MemoryVfs::new();
        vfs.write_file("/file with spaces.txt", "ok").unwrap();
        vfs.write_file("/\u{1F600}_emoji.txt", "smiley").unwrap();
        assert_eq!(vfs.read_file("/file with spaces.txt", "/").unwrap(), "ok");
        assert_eq!(vfs.read_file("/\u{1F600}_emoji.txt", "/").unwrap(), "smiley");
    }

    #[test]
    fn deeply_nested_dirs() {
        let mut vfs = MemoryVfs::new();
        let path: String = (0..50).map(|i| format!("/d{i}")).collect();
        vfs.write_file(&format!("{path}/leaf.txt"), "deep").unwrap();
        assert_eq!(vfs.read_file(&format!("{path}/leaf.txt"), "/").unwrap(), "deep");
    }

    #[test]
    fn stats_counts_everything_below_root() {
        let mut vfs = MemoryVfs::new();
        vfs.write_file("/a/b/one.txt", "123").unwrap();
        vfs.write_file("/a/two.txt", "45").unwrap();
        vfs.ensure_directory("/empty");
        assert_eq!(
            vfs.stats(),
            VfsStats {
                directories: 3,
                files: 2,
                bytes: 5
            }
        );
    }

    #[test]
    fn serializes_under_root_key() {
        let mut vfs = MemoryVfs::new();
        vfs.write_file("/home/readme", "hi").unwrap();
        let json = serde_json::to_value(&vfs).unwrap();
        assert_eq!(json["/"]["type"], "dir");
        assert_eq!(json["/"]["entries"]["home"]["entries"]["readme"]["content"], "hi");
    }

    #[test]
    fn serde_roundtrip_preserves_tree() {
        let mut vfs = MemoryVfs::new();
        vfs.write_file("/b/x.txt", "x").unwrap();
        vfs.write_file("/a/y.txt", "y").unwrap();
        vfs.ensure_directory("/c/empty");
        let text = serde_json::to_string(&vfs).unwrap();
        let back: MemoryVfs = serde_json::from_str(&text).unwrap();
        assert_eq!(back, vfs);
        assert_eq!(names(&back, "/"), ["b", "a", "c"]);
    }

    #[test]
    fn file_root_rejected() {
        let text = r#"{"/": {"type": "file", "content": "x"}}"#;
        assert!(serde_json::from_str::<MemoryVfs>(text).is_err());
    }

    mod prop {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn ensured_directory_resolves(segments in proptest::collection::vec("[a-z]{1,6}", 0..6)) {
                let mut vfs = MemoryVfs::new();
                let path = format!("/{}", segments.join("/"));
                vfs.ensure_directory(&path);
                vfs.ensure_directory(&path);
                prop_assert!(is_dir(&vfs, &path));
            }

            #[test]
            fn write_then_read_roundtrips(
                segments in proptest::collection::vec("[a-z]{1,6}", 1..5),
                content in ".{0,64}",
            ) {
                let mut vfs = MemoryVfs::new();
                let path = format!("/{}", segments.join("/"));
                vfs.write_file(&path, content.clone()).unwrap();
                prop_assert_eq!(vfs.read_file(&path, "/").unwrap(), content.as_str());
            }

            #[test]
            fn remove_only_touches_target(
                names in proptest::collection::btree_set("[a-z]{1,6}", 2..8),
            ) {
                let mut vfs = MemoryVfs::new();
                let names: Vec<String> = names.into_iter().collect();
                for name in &names {
                    vfs.write_file(&format!("/d/{name}"), name.clone()).unwrap();
                }
                let victim = &names[0];
                vfs.remove(&format!("/d/{victim}")).unwrap();
                let victim_path = format!("/d/{victim}");
                prop_assert!(vfs.resolve(&victim_path, "/").is_none());
                for name in &names[1..] {
                    prop_assert_eq!(vfs.read_file(&format!("/d/{name}"), "/").unwrap(), name.as_str());
                }
            }

            #[test]
            fn failed_cd_never_moves(target in "[a-z]{1,8}") {
                let vfs = MemoryVfs::new();
                let mut cwd = "/".to_string();
                prop_assert!(vfs.change_directory(&mut cwd, &target).is_err());
                prop_assert_eq!(cwd, "/");
            }
        }
    }
}
