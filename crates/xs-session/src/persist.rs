//! Loading and saving the session blob.

use xs_types::config::XsConfig;
use xs_types::error::{Result, XsError};

use crate::session::Session;
use crate::store::KeyValueStore;

/// Store key holding the serialized session.
pub const SESSION_KEY: &str = "xs_terminal_data_v1";

/// Where a loaded session came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOrigin {
    /// Deserialized from a stored blob.
    Restored,
    /// No blob was stored; a fresh session was created.
    Initialized,
    /// A blob was stored but could not be parsed; a fresh session replaced it.
    Recovered,
}

/// A session handed back by [`load_session`].
#[derive(Debug)]
pub struct LoadedSession {
    pub session: Session,
    pub origin: LoadOrigin,
    /// Set when the store could not be read or written. The session is then
    /// held in memory only until a later save succeeds.
    pub storage_error: Option<XsError>,
}

/// Load the stored session, or create and store a fresh one.
///
/// Never fails: a corrupt blob is logged and replaced, and a store that
/// cannot be read or written yields a fresh in-memory session with the
/// failure in [`LoadedSession::storage_error`].
pub fn load_session(store: &dyn KeyValueStore, config: &XsConfig) -> LoadedSession {
    let origin = match store.get(SESSION_KEY) {
        Ok(Some(text)) => match Session::from_json(&text) {
            Ok(session) => {
                let stats = session.fs.stats();
                log::info!(
                    "Restored session ({} dirs, {} files, {} repos)",
                    stats.directories,
                    stats.files,
                    session.repos.len()
                );
                return LoadedSession {
                    session,
                    origin: LoadOrigin::Restored,
                    storage_error: None,
                };
            },
            Err(e) => {
                log::error!("Stored session is unreadable, starting fresh: {e}");
                LoadOrigin::Recovered
            },
        },
        Ok(None) => LoadOrigin::Initialized,
        Err(e) => {
            log::error!("Failed to read stored session, starting fresh: {e}");
            return LoadedSession {
                session: Session::from_config(config),
                origin: LoadOrigin::Initialized,
                storage_error: Some(e),
            };
        },
    };
    let session = Session::from_config(config);
    let storage_error = match save_session(store, &session) {
        Ok(()) => None,
        Err(e) => {
            log::error!("Failed to store fresh session, continuing in memory: {e}");
            Some(e)
        },
    };
    log::info!("Initialized fresh session for {}", config.user);
    LoadedSession {
        session,
        origin,
        storage_error,
    }
}

/// Serialize the whole session into the store.
pub fn save_session(store: &dyn KeyValueStore, session: &Session) -> Result<()> {
    let text = session.to_json()?;
    store.set(SESSION_KEY, &text).map_err(|e| match e {
        storage @ XsError::Storage(_) => storage,
        other => XsError::Storage(other.to_string()),
    })?;
    log::debug!("Saved session ({} bytes)", text.len());
    Ok(())
}
