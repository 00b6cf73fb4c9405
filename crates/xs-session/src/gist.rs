//! Mirroring the session blob to a private GitHub gist.
//!
//! The gist is recognized by a marker in its description. Its id is cached
//! in the key-value store after the first successful push or pull.

use std::time::Duration;

use serde::Deserialize;
use serde_json::json;
use xs_types::error::{Result, XsError};

use crate::persist::save_session;
use crate::session::Session;
use crate::store::KeyValueStore;

/// Store key caching the gist id.
pub const GIST_ID_KEY: &str = "xs_gist_id";
/// Substring identifying our gist among the user's gists.
pub const GIST_MARKER: &str = "xs-web-terminal-guest-data";
/// Full description written on create/update.
pub const GIST_DESCRIPTION: &str = "xs-web-terminal-guest-data - terminal_data.json";
/// File inside the gist holding the session blob.
pub const GIST_FILE: &str = "terminal_data.json";

/// A remote store of named text blobs.
pub trait BlobStore {
    /// Id of the first blob whose description contains `needle`.
    fn find(&self, needle: &str) -> Result<Option<String>>;

    /// Session content of blob `id`, or `None` if it holds no session file.
    fn get(&self, id: &str) -> Result<Option<String>>;

    /// Create a new blob and return its id.
    fn create(&self, description: &str, content: &str) -> Result<String>;

    /// Replace the content of blob `id` and return its id.
    fn update(&self, id: &str, content: &str) -> Result<String>;
}

/// Upload the session, updating the known gist or creating one.
///
/// Returns the gist id, which is also cached in `kv`.
pub fn push_session(blobs: &dyn BlobStore, kv: &dyn KeyValueStore, session: &Session) -> Result<String> {
    let content = session.to_json_pretty()?;
    let known = match kv.get(GIST_ID_KEY)? {
        Some(id) => Some(id),
        None => blobs.find(GIST_MARKER)?,
    };
    let id = match known {
        Some(id) => match blobs.update(&id, &content) {
            Ok(id) => id,
            Err(XsError::NotFound(_)) => {
                log::warn!("Gist {id} no longer exists, creating a new one");
                blobs.create(GIST_DESCRIPTION, &content)?
            },
            Err(e) => return Err(e),
        },
        None => blobs.create(GIST_DESCRIPTION, &content)?,
    };
    kv.set(GIST_ID_KEY, &id)?;
    log::info!("Session pushed to gist {id}");
    Ok(id)
}

/// Download the session from the gist and store it locally.
pub fn pull_session(blobs: &dyn BlobStore, kv: &dyn KeyValueStore) -> Result<Session> {
    let id = match kv.get(GIST_ID_KEY)? {
        Some(id) => id,
        None => blobs
            .find(GIST_MARKER)?
            .ok_or_else(|| XsError::NotFound("no session gist in this account".to_string()))?,
    };
    let content = blobs
        .get(&id)?
        .ok_or_else(|| XsError::NotFound(format!("gist {id} has no {GIST_FILE}")))?;
    let session = Session::from_json(&content)?;
    kv.set(GIST_ID_KEY, &id)?;
    save_session(kv, &session)?;
    log::info!("Session pulled from gist {id}");
    Ok(session)
}

/// [`BlobStore`] over the GitHub gist REST API.
pub struct GistClient {
    agent: ureq::Agent,
    api_base: String,
    token: String,
}

#[derive(Deserialize)]
struct GistSummary {
    id: String,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Deserialize)]
struct GistDetail {
    #[serde(default)]
    files: std::collections::HashMap<String, GistFile>,
}

#[derive(Deserialize)]
struct GistFile {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct GistCreated {
    id: String,
}

impl GistClient {
    pub fn new(api_base: &str, token: &str, user_agent: &str) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(30))
            .user_agent(user_agent)
            .build();
        Self {
            agent,
            api_base: api_base.trim_end_matches('/').to_string(),
            token: token.to_string(),
        }
    }

    fn request(&self, method: &str, path: &str) -> ureq::Request {
        self.agent
            .request(method, &format!("{}{path}", self.api_base))
            .set("Authorization", &format!("token {}", self.token))
            .set("Accept", "application/vnd.github+json")
    }

    fn send(&self, req: ureq::Request, body: Option<serde_json::Value>) -> Result<String> {
        let what = format!("{} {}", req.method(), req.url());
        let result = match body {
            Some(body) => req
                .set("Content-Type", "application/json")
                .send_string(&body.to_string()),
            None => req.call(),
        };
        match result {
            Ok(resp) => resp
                .into_string()
                .map_err(|e| XsError::Transport(format!("{what}: {e}"))),
            Err(ureq::Error::Status(404, _)) => Err(XsError::NotFound(what)),
            Err(ureq::Error::Status(code @ (401 | 403 | 429), _)) => {
                Err(XsError::AccessDenied(format!("{what}: HTTP {code}")))
            },
            Err(ureq::Error::Status(code, _)) => {
                Err(XsError::Transport(format!("{what}: HTTP {code}")))
            },
            Err(ureq::Error::Transport(t)) => Err(XsError::Transport(format!("{what}: {t}"))),
        }
    }
}

impl BlobStore for GistClient {
    fn find(&self, needle: &str) -> Result<Option<String>> {
        let text = self.send(self.request("GET", "/gists"), None)?;
        let gists: Vec<GistSummary> = serde_json::from_str(&text)?;
        Ok(gists
            .into_iter()
            .find(|g| g.description.as_deref().is_some_and(|d| d.contains(needle)))
            .map(|g| g.id))
    }

    fn get(&self, id: &str) -> Result<Option<String>> {
        let text = self.send(self.request("GET", &format!("/gists/{id}")), None)?;
        let mut gist: GistDetail = serde_json::from_str(&text)?;
        Ok(gist.files.remove(GIST_FILE).and_then(|f| f.content))
    }

    fn create(&self, description: &str, content: &str) -> Result<String> {
        let body = gist_body(description, content);
        let text = self.send(self.request("POST", "/gists"), Some(body))?;
        let created: GistCreated = serde_json::from_str(&text)?;
        Ok(created.id)
    }

    fn update(&self, id: &str, content: &str) -> Result<String> {
        let body = gist_body(GIST_DESCRIPTION, content);
        let text = self.send(self.request("PATCH", &format!("/gists/{id}")), Some(body))?;
        let updated: GistCreated = serde_json::from_str(&text)?;
        Ok(updated.id)
    }
}

fn gist_body(description: &str, content: &str) -> serde_json::Value {
    json!({
        "description": description,
        "public": false,
        "files": { GIST_FILE: { "content": content } },
    })
}
