//! Repository materializer.
//!
//! Fetches a remote repository's file tree one request at a time, decodes
//! every file, caches the result in the session, and writes the files into
//! the VFS under `/repos/<owner>_<name>/`. Missing or forbidden subtrees
//! become warnings; only transport failures abort a clone.

mod decode;
mod github;
mod identifier;
mod materializer;
mod source;

pub use decode::decode_content;
pub use github::GithubSource;
pub use identifier::RepoId;
pub use materializer::{
    CloneReport, CloneWarning, MaterializeResult, Materializer, RepoCloner, apply_report,
};
pub use source::{FileDescriptor, Listing, RemoteEntry, RemoteKind, Reply, RepoSource};
