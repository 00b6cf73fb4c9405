//! Session blob commands: `json` and `gist`.

use std::path::Path;

use xs_session::gist::{pull_session, push_session};
use xs_session::{KeyValueStore, MemoryStore, Session};
use xs_types::error::{Result, XsError};

use crate::interpreter::{Command, CommandOutput, CommandRegistry, Environment};

/// Register the `json` and `gist` commands into a registry.
pub fn register_data_commands(reg: &mut CommandRegistry) {
    reg.register(Box::new(JsonCmd));
    reg.register(Box::new(GistCmd));
}

// ---------------------------------------------------------------------------
// json
// ---------------------------------------------------------------------------

struct JsonCmd;
impl Command for JsonCmd {
    fn name(&self) -> &str {
        "json"
    }
    fn description(&self) -> &str {
        "Show, reset, export or import the session blob"
    }
    fn usage(&self) -> &str {
        "json show | reset | export <file> | import <file>"
    }
    fn category(&self) -> &str {
        "data"
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        match args {
            ["show"] => Ok(CommandOutput::Text(env.session.to_json_pretty()?)),
            ["reset"] => {
                *env.session = Session::from_config(env.config);
                env.dirty = true;
                log::info!("Session reset");
                Ok(CommandOutput::Text("[ok] session reset".to_string()))
            },
            ["export", file] => {
                std::fs::write(Path::new(file), env.session.to_json_pretty()?)?;
                log::info!("Session exported to {file}");
                Ok(CommandOutput::Text(format!("[ok] exported to {file}")))
            },
            ["import", file] => {
                let text = std::fs::read_to_string(Path::new(file))?;
                *env.session = Session::from_json(&text)?;
                env.dirty = true;
                log::info!("Session imported from {file}");
                Ok(CommandOutput::Text(format!("[ok] imported {file}")))
            },
            _ => Err(XsError::Command(format!("usage: {}", self.usage()))),
        }
    }
}

// ---------------------------------------------------------------------------
// gist
// ---------------------------------------------------------------------------

struct GistCmd;
impl Command for GistCmd {
    fn name(&self) -> &str {
        "gist"
    }
    fn description(&self) -> &str {
        "Save or load the session blob to a private gist"
    }
    fn usage(&self) -> &str {
        "gist save | load"
    }
    fn category(&self) -> &str {
        "data"
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        let blobs = env.blobs.ok_or_else(|| {
            XsError::Command("gist: no GitHub token configured (set XS_GITHUB_TOKEN)".to_string())
        })?;
        // Without a persistent store the gist id only lives for this command.
        let scratch = MemoryStore::new();
        let kv: &dyn KeyValueStore = match env.store {
            Some(store) => store,
            None => &scratch,
        };

        match args {
            ["save"] => {
                let id = push_session(blobs, kv, env.session)?;
                Ok(CommandOutput::Text(format!("[ok] session saved to gist {id}")))
            },
            ["load"] => {
                *env.session = pull_session(blobs, kv)?;
                Ok(CommandOutput::Text("[ok] session loaded from gist".to_string()))
            },
            _ => Err(XsError::Command(format!("usage: {}", self.usage()))),
        }
    }
}
