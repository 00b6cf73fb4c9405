//! [`RepoSource`] over the GitHub contents REST API.

use std::time::Duration;

use url::Url;
use xs_types::config::XsConfig;
use xs_types::error::{Result, XsError};

use crate::identifier::RepoId;
use crate::source::{FileDescriptor, Listing, RemoteEntry, Reply, RepoSource};

/// Blocking GitHub client; one request at a time.
pub struct GithubSource {
    agent: ureq::Agent,
    api_base: Url,
    token: Option<String>,
}

impl GithubSource {
    pub fn new(api_base: &str, token: Option<&str>, user_agent: &str) -> Result<Self> {
        let api_base = Url::parse(api_base)
            .map_err(|e| XsError::Config(format!("invalid api_base {api_base:?}: {e}")))?;
        if api_base.cannot_be_a_base() {
            return Err(XsError::Config(format!("api_base cannot be a base URL: {api_base}")));
        }
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(30))
            .user_agent(user_agent)
            .build();
        Ok(Self {
            agent,
            api_base,
            token: token.map(str::to_string),
        })
    }

    pub fn from_config(config: &XsConfig) -> Result<Self> {
        Self::new(&config.api_base, config.token(), &config.user_agent)
    }

    /// `{api_base}/repos/{owner}/{name}/contents/{path}`, every segment
    /// percent-encoded.
    pub fn contents_url(&self, repo: &RepoId, path: &str) -> Result<Url> {
        let mut url = self.api_base.clone();
        url.path_segments_mut()
            .map_err(|()| XsError::Config(format!("api_base cannot be a base URL: {}", self.api_base)))?
            .pop_if_empty()
            .extend(["repos", repo.owner.as_str(), repo.name.as_str(), "contents"])
            .extend(path.split('/').filter(|s| !s.is_empty()));
        Ok(url)
    }

    fn get(&self, url: &str) -> Result<Reply<String>> {
        log::debug!("GET {url}");
        let mut req = self
            .agent
            .get(url)
            .set("Accept", "application/vnd.github+json");
        if let Some(token) = &self.token {
            req = req.set("Authorization", &format!("token {token}"));
        }
        match req.call() {
            Ok(resp) => resp
                .into_string()
                .map(Reply::Found)
                .map_err(|e| XsError::Transport(format!("{url}: {e}"))),
            Err(ureq::Error::Status(code, _)) => status_reply(code)
                .ok_or_else(|| XsError::Transport(format!("{url}: HTTP {code}"))),
            Err(ureq::Error::Transport(t)) => Err(XsError::Transport(format!("{url}: {t}"))),
        }
    }
}

/// Expected non-success statuses. A rejected or expired token (401) is
/// treated like a forbidden or rate-limited request.
fn status_reply<T>(code: u16) -> Option<Reply<T>> {
    match code {
        404 => Some(Reply::NotFound),
        401 | 403 | 429 => Some(Reply::Forbidden),
        _ => None,
    }
}

/// Classify a listing body: an array is a directory, an object with
/// `"type": "file"` is a single file, anything else is reported as-is.
pub(crate) fn parse_listing(body: &str) -> Result<Listing> {
    let value: serde_json::Value = serde_json::from_str(body)?;
    if value.is_array() {
        let entries: Vec<RemoteEntry> = serde_json::from_value(value)?;
        return Ok(Listing::Entries(entries));
    }
    match value.get("type").and_then(|t| t.as_str()) {
        Some("file") => Ok(Listing::File(serde_json::from_value(value)?)),
        Some(other) => Ok(Listing::Other(other.to_string())),
        None => Ok(Listing::Other("unknown".to_string())),
    }
}

impl RepoSource for GithubSource {
    fn list_contents(&self, repo: &RepoId, path: &str) -> Result<Reply<Listing>> {
        let url = self.contents_url(repo, path)?;
        Ok(match self.get(url.as_str())? {
            Reply::Found(body) => Reply::Found(parse_listing(&body)?),
            Reply::NotFound => Reply::NotFound,
            Reply::Forbidden => Reply::Forbidden,
        })
    }

    fn fetch_file(&self, url: &str) -> Result<Reply<FileDescriptor>> {
        Ok(match self.get(url)? {
            Reply::Found(body) => Reply::Found(serde_json::from_str(&body)?),
            Reply::NotFound => Reply::NotFound,
            Reply::Forbidden => Reply::Forbidden,
        })
    }
}
