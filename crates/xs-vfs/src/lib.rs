//! Virtual file system for XS Terminal.
//!
//! A tree of directories and text files rooted at `/`. The tree is plain
//! data: it has no notion of a current directory of its own, so callers pass
//! the working directory into every relative operation.

mod memory;
mod node;
pub mod path;

pub use memory::{MemoryVfs, VfsEntry, VfsStats};
pub use node::{Directory, EntryKind, FileNode, Node, NodeRef};
