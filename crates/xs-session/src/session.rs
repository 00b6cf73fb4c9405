//! The session blob.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use xs_types::config::XsConfig;
use xs_types::error::Result;
use xs_vfs::{MemoryVfs, NodeRef, path};

/// Session metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meta {
    pub created_at: DateTime<Utc>,
    #[serde(alias = "name")]
    pub user: String,
}

/// A cloned repository as cached in the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepoRecord {
    pub owner: String,
    #[serde(alias = "repo")]
    pub name: String,
    /// Relative path inside the repository to decoded content.
    #[serde(default)]
    pub files: IndexMap<String, String>,
    pub cloned_at: DateTime<Utc>,
}

/// Everything a running terminal owns: file tree, cwd, and repo cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub meta: Meta,
    pub fs: MemoryVfs,
    #[serde(default = "root_cwd")]
    pub cwd: String,
    /// Keyed by `owner/name`.
    #[serde(default)]
    pub repos: IndexMap<String, RepoRecord>,
}

fn root_cwd() -> String {
    "/".to_string()
}

impl Session {
    /// A fresh session: the root, a home directory, and cwd set to home.
    pub fn fresh(user: &str, home: &str) -> Self {
        let mut fs = MemoryVfs::new();
        fs.ensure_directory(home);
        Self {
            meta: Meta {
                created_at: Utc::now(),
                user: user.to_string(),
            },
            fs,
            cwd: path::canonical(home),
            repos: IndexMap::new(),
        }
    }

    pub fn from_config(config: &XsConfig) -> Self {
        Self::fresh(&config.user, &config.home)
    }

    /// Absolute, canonical form of `input` relative to the cwd.
    pub fn absolute(&self, input: &str) -> String {
        path::canonical(&path::join(&self.cwd, input))
    }

    /// Change the working directory; on failure the cwd is unchanged.
    pub fn change_directory(&mut self, input: &str) -> Result<()> {
        self.fs.change_directory(&mut self.cwd, input)
    }

    /// Parse a persisted blob.
    ///
    /// A cwd that no longer names a directory falls back to `/`.
    pub fn from_json(text: &str) -> Result<Self> {
        let mut session: Session = serde_json::from_str(text)?;
        if !matches!(session.fs.resolve(&session.cwd, "/"), Some(NodeRef::Directory(_))) {
            log::warn!("Stored cwd {} is not a directory, using /", session.cwd);
            session.cwd = root_cwd();
        }
        Ok(session)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
