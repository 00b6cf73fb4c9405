//! The remote listing service seen by the materializer.

use serde::Deserialize;
use xs_types::error::Result;

use crate::identifier::RepoId;

/// Outcome of a remote request that reached the service.
///
/// Not-found and forbidden answers are expected during a walk and are kept
/// apart from transport failures, which travel as `Err`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply<T> {
    Found(T),
    NotFound,
    /// Access denied or rate limited.
    Forbidden,
}

/// Kind of a directory entry as reported by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RemoteKind {
    File,
    Dir,
    Symlink,
    Submodule,
    #[serde(other)]
    Other,
}

/// One entry of a directory listing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RemoteEntry {
    pub name: String,
    /// Path inside the repository.
    pub path: String,
    #[serde(rename = "type")]
    pub kind: RemoteKind,
    /// API URL returning this entry's content descriptor.
    #[serde(default)]
    pub url: String,
}

/// A single file with (usually base64) encoded content.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct FileDescriptor {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub encoding: Option<String>,
}

/// What a listing request returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Listing {
    /// The path is a directory.
    Entries(Vec<RemoteEntry>),
    /// The path is a single file.
    File(FileDescriptor),
    /// Some other object (symlink or submodule target, unknown shape).
    Other(String),
}

/// Remote repository listing service.
pub trait RepoSource {
    /// List `path` (empty for the repository root).
    fn list_contents(&self, repo: &RepoId, path: &str) -> Result<Reply<Listing>>;

    /// Fetch a file's content descriptor from an entry URL.
    fn fetch_file(&self, url: &str) -> Result<Reply<FileDescriptor>>;
}

impl<S: RepoSource + ?Sized> RepoSource for &S {
    fn list_contents(&self, repo: &RepoId, path: &str) -> Result<Reply<Listing>> {
        (**self).list_contents(repo, path)
    }

    fn fetch_file(&self, url: &str) -> Result<Reply<FileDescriptor>> {
        (**self).fetch_file(url)
    }
}
