//! Session state and persistence for XS Terminal.
//!
//! A [`Session`] bundles the file tree, the working directory, and the cache
//! of cloned repositories. It is serialized wholesale into a key-value store
//! after every mutation and can be mirrored to a private gist.

pub mod gist;
mod persist;
mod session;
mod store;

pub use persist::{LoadOrigin, LoadedSession, SESSION_KEY, load_session, save_session};
pub use session::{Meta, RepoRecord, Session};
pub use store::{FileStore, KeyValueStore, MemoryStore};
