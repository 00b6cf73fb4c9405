//! Repository identifiers (`owner/name`).

use std::fmt;

use xs_types::error::{Result, XsError};

/// URL prefixes stripped before parsing.
const HOST_PREFIXES: &[&str] = &[
    "https://github.com/",
    "http://github.com/",
    "https://www.github.com/",
    "github.com/",
];

/// A validated `owner/name` pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepoId {
    pub owner: String,
    pub name: String,
}

impl RepoId {
    /// Parse `owner/name` or a repository URL.
    ///
    /// A trailing `.git` or `/` is dropped, as are any path segments after
    /// the name (`/tree/main/...`).
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        let rest = HOST_PREFIXES
            .iter()
            .find_map(|prefix| trimmed.strip_prefix(prefix))
            .unwrap_or(trimmed);
        let rest = rest.trim_end_matches('/');
        let rest = rest.strip_suffix(".git").unwrap_or(rest);

        let mut parts = rest.split('/');
        let owner = parts.next().unwrap_or_default();
        let name = parts.next().unwrap_or_default();
        if owner.is_empty() || name.is_empty() {
            return Err(XsError::Validation(format!(
                "expected owner/repo, got {input:?}"
            )));
        }
        for part in [owner, name] {
            if !is_valid_segment(part) {
                return Err(XsError::Validation(format!(
                    "invalid repository name component {part:?}"
                )));
            }
        }
        Ok(Self {
            owner: owner.to_string(),
            name: name.to_string(),
        })
    }

    /// VFS directory the repository is materialized into.
    pub fn vfs_dir(&self) -> String {
        format!("/repos/{}_{}", self.owner, self.name)
    }
}

fn is_valid_segment(part: &str) -> bool {
    part.chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        && !part.chars().all(|c| c == '.')
}

impl fmt::Display for RepoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parsed(input: &str) -> String {
        RepoId::parse(input).unwrap().to_string()
    }

    #[test]
    fn bare_identifier() {
        assert_eq!(parsed("octo/demo"), "octo/demo");
        assert_eq!(parsed("  octo/demo  "), "octo/demo");
    }

    #[test]
    fn full_urls() {
        assert_eq!(parsed("https://github.com/octo/demo"), "octo/demo");
        assert_eq!(parsed("https://github.com/octo/demo.git"), "octo/demo");
        assert_eq!(parsed("https://github.com/octo/demo/"), "octo/demo");
        assert_eq!(parsed("http://github.com/octo/demo"), "octo/demo");
        assert_eq!(parsed("github.com/octo/demo"), "octo/demo");
    }

    #[test]
    fn extra_segments_ignored() {
        assert_eq!(parsed("https://github.com/octo/demo/tree/main/src"), "octo/demo");
    }

    #[test]
    fn dotted_names_allowed() {
        assert_eq!(parsed("octo/demo.rs"), "octo/demo.rs");
    }

    #[test]
    fn malformed_rejected() {
        for input in ["", "   ", "octo", "octo/", "/demo", "https://github.com/octo", "a b/c", "../x", "o/.."] {
            assert!(
                matches!(RepoId::parse(input), Err(XsError::Validation(_))),
                "{input:?} should be rejected"
            );
        }
    }

    #[test]
    fn vfs_dir_layout() {
        let id = RepoId::parse("octo/demo").unwrap();
        assert_eq!(id.vfs_dir(), "/repos/octo_demo");
    }
}
