//! Sequential repository walk and VFS materialization.

use std::collections::{HashSet, VecDeque};
use std::fmt;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use chrono::Utc;
use indexmap::IndexMap;
use xs_session::{RepoRecord, Session};
use xs_types::config::XsConfig;
use xs_types::error::{Result, XsError};

use crate::decode::decode_content;
use crate::identifier::RepoId;
use crate::source::{FileDescriptor, Listing, RemoteEntry, RemoteKind, Reply, RepoSource};

/// Default pause before each directory entry.
pub const DEFAULT_THROTTLE: Duration = Duration::from_millis(100);

/// Default maximum directory depth below the repository root.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// A recoverable condition met during a walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloneWarning {
    NotFound { path: String },
    /// Forbidden or rate limited; an authenticated retry may succeed.
    AccessDenied { path: String },
    Unexpected { path: String, detail: String },
    Skipped { path: String, kind: RemoteKind },
    Undecodable { path: String, reason: String },
    TooDeep { path: String },
}

impl fmt::Display for CloneWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CloneWarning::NotFound { path } => write!(f, "path not found: /{path}"),
            CloneWarning::AccessDenied { path } => write!(
                f,
                "access denied or rate limited at /{path}; retry with a token"
            ),
            CloneWarning::Unexpected { path, detail } => {
                write!(f, "unexpected response for /{path}: {detail}")
            },
            CloneWarning::Skipped { path, kind } => {
                write!(f, "skipped /{path} ({kind:?})")
            },
            CloneWarning::Undecodable { path, reason } => {
                write!(f, "could not decode /{path}: {reason}")
            },
            CloneWarning::TooDeep { path } => write!(f, "too deep, not descending into /{path}"),
        }
    }
}

/// Everything fetched for one repository, before it touches a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloneReport {
    pub repo: RepoId,
    /// Relative path to decoded content, in walk order.
    pub files: IndexMap<String, String>,
    pub warnings: Vec<CloneWarning>,
    /// Requests issued against the source.
    pub requests: usize,
}

/// Summary of a clone applied to a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaterializeResult {
    pub repo: RepoId,
    /// VFS directory holding the files.
    pub base_dir: String,
    pub files: usize,
    pub warnings: Vec<CloneWarning>,
}

/// Anything that can clone a repository into a session.
pub trait RepoCloner {
    fn clone_repo(&self, input: &str, session: &mut Session) -> Result<MaterializeResult>;
}

/// Walks a [`RepoSource`] and materializes what it finds.
///
/// Requests are strictly sequential. A per-repository in-flight marker
/// rejects a second clone of the same repository while one is running.
pub struct Materializer<S> {
    source: S,
    throttle: Duration,
    max_depth: usize,
    in_flight: Mutex<HashSet<String>>,
}

struct Frame {
    entries: VecDeque<RemoteEntry>,
    prefix: String,
    depth: usize,
}

/// Releases the in-flight marker on drop.
struct InFlight<'a> {
    set: &'a Mutex<HashSet<String>>,
    key: String,
}

impl<'a> InFlight<'a> {
    fn acquire(set: &'a Mutex<HashSet<String>>, key: String) -> Result<Self> {
        let mut guard = set.lock().unwrap_or_else(PoisonError::into_inner);
        if !guard.insert(key.clone()) {
            return Err(XsError::InProgress(key));
        }
        Ok(Self { set, key })
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.set
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.key);
    }
}

fn join_rel(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}/{name}")
    }
}

impl<S: RepoSource> Materializer<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            throttle: DEFAULT_THROTTLE,
            max_depth: DEFAULT_MAX_DEPTH,
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    pub fn from_config(source: S, config: &XsConfig) -> Self {
        Self::new(source)
            .with_throttle(config.throttle())
            .with_max_depth(config.max_depth)
    }

    pub fn with_throttle(mut self, throttle: Duration) -> Self {
        self.throttle = throttle;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Whether a clone of `repo` is currently running.
    pub fn is_in_flight(&self, repo: &RepoId) -> bool {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&repo.to_string())
    }

    /// Validate `input` and walk the repository.
    ///
    /// Malformed identifiers fail before any request is made.
    pub fn fetch(&self, input: &str) -> Result<CloneReport> {
        let repo = RepoId::parse(input)?;
        let _marker = InFlight::acquire(&self.in_flight, repo.to_string())?;
        log::info!("Cloning repository {repo}");

        let mut report = CloneReport {
            repo,
            files: IndexMap::new(),
            warnings: Vec::new(),
            requests: 0,
        };
        self.walk(&mut report)?;
        log::info!(
            "Fetched {} files from {} ({} requests, {} warnings)",
            report.files.len(),
            report.repo,
            report.requests,
            report.warnings.len()
        );
        Ok(report)
    }

    /// Fetch `input` and apply it to `session`.
    ///
    /// A transport failure leaves the session untouched.
    pub fn clone_into(&self, input: &str, session: &mut Session) -> Result<MaterializeResult> {
        let report = self.fetch(input)?;
        apply_report(report, session)
    }

    fn walk(&self, report: &mut CloneReport) -> Result<()> {
        let mut stack: Vec<Frame> = Vec::new();
        if let Some(root) = self.open("", String::new(), 0, report)? {
            stack.push(root);
        }

        while let Some(frame) = stack.last_mut() {
            let Some(entry) = frame.entries.pop_front() else {
                stack.pop();
                continue;
            };
            let prefix = frame.prefix.clone();
            let depth = frame.depth;

            self.pause();
            match entry.kind {
                RemoteKind::Dir => {
                    if depth + 1 > self.max_depth {
                        self.warn(report, CloneWarning::TooDeep { path: entry.path });
                        continue;
                    }
                    let child_prefix = join_rel(&prefix, &entry.name);
                    if let Some(child) = self.open(&entry.path, child_prefix, depth + 1, report)? {
                        stack.push(child);
                    }
                },
                RemoteKind::File => self.fetch_file(&entry, &prefix, report)?,
                kind => self.warn(
                    report,
                    CloneWarning::Skipped {
                        path: entry.path,
                        kind,
                    },
                ),
            }
        }
        Ok(())
    }

    /// List one directory. Returns a frame to descend into, or `None` when
    /// the listing was recorded directly or turned into a warning.
    fn open(
        &self,
        path: &str,
        prefix: String,
        depth: usize,
        report: &mut CloneReport,
    ) -> Result<Option<Frame>> {
        report.requests += 1;
        match self.source.list_contents(&report.repo, path)? {
            Reply::Found(Listing::Entries(entries)) => Ok(Some(Frame {
                entries: entries.into(),
                prefix,
                depth,
            })),
            Reply::Found(Listing::File(desc)) => {
                let name = desc.name.clone();
                self.record(&desc, &prefix, &name, report);
                Ok(None)
            },
            Reply::Found(Listing::Other(detail)) => {
                self.warn(report, CloneWarning::Unexpected {
                    path: path.to_string(),
                    detail,
                });
                Ok(None)
            },
            Reply::NotFound => {
                self.warn(report, CloneWarning::NotFound {
                    path: path.to_string(),
                });
                Ok(None)
            },
            Reply::Forbidden => {
                self.warn(report, CloneWarning::AccessDenied {
                    path: path.to_string(),
                });
                Ok(None)
            },
        }
    }

    fn fetch_file(&self, entry: &RemoteEntry, prefix: &str, report: &mut CloneReport) -> Result<()> {
        report.requests += 1;
        match self.source.fetch_file(&entry.url)? {
            Reply::Found(desc) => self.record(&desc, prefix, &entry.name, report),
            Reply::NotFound => self.warn(report, CloneWarning::NotFound {
                path: entry.path.clone(),
            }),
            Reply::Forbidden => self.warn(report, CloneWarning::AccessDenied {
                path: entry.path.clone(),
            }),
        }
        Ok(())
    }

    fn record(&self, desc: &FileDescriptor, prefix: &str, name: &str, report: &mut CloneReport) {
        let rel = join_rel(prefix, name);
        match decode_content(desc) {
            Ok(text) => {
                report.files.insert(rel, text);
            },
            Err(e) => self.warn(report, CloneWarning::Undecodable {
                path: rel,
                reason: e.to_string(),
            }),
        }
    }

    fn warn(&self, report: &mut CloneReport, warning: CloneWarning) {
        log::warn!("{}: {warning}", report.repo);
        report.warnings.push(warning);
    }

    fn pause(&self) {
        if !self.throttle.is_zero() {
            std::thread::sleep(self.throttle);
        }
    }
}

impl<S: RepoSource> RepoCloner for Materializer<S> {
    fn clone_repo(&self, input: &str, session: &mut Session) -> Result<MaterializeResult> {
        self.clone_into(input, session)
    }
}

/// Cache a report in the session and write its files under the
/// repository's VFS directory.
///
/// The base directory is created even when the report holds no files.
pub fn apply_report(report: CloneReport, session: &mut Session) -> Result<MaterializeResult> {
    let base_dir = report.repo.vfs_dir();
    session.fs.ensure_directory(&base_dir);
    for (rel, content) in &report.files {
        session
            .fs
            .write_file(&format!("{base_dir}/{rel}"), content.as_str())?;
    }

    let files = report.files.len();
    session.repos.insert(
        report.repo.to_string(),
        RepoRecord {
            owner: report.repo.owner.clone(),
            name: report.repo.name.clone(),
            files: report.files,
            cloned_at: Utc::now(),
        },
    );
    log::info!("Materialized {files} files into {base_dir}");
    Ok(MaterializeResult {
        repo: report.repo,
        base_dir,
        files,
        warnings: report.warnings,
    })
}
