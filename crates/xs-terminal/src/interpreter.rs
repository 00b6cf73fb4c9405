//! Command trait, registry, and dispatch logic.
//!
//! A line is split into quoted or whitespace-separated tokens; the first
//! token names the command. After a command that marked the session dirty,
//! the session is written back to the key-value store.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};

use xs_clone::RepoCloner;
use xs_session::gist::BlobStore;
use xs_session::{KeyValueStore, Session, save_session};
use xs_types::config::XsConfig;
use xs_types::error::{Result, XsError};

/// Output produced by a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutput {
    /// Plain text lines.
    Text(String),
    /// Command produced no visible output.
    None,
    /// Signal to clear the terminal output buffer.
    Clear,
}

impl CommandOutput {
    /// Append a trailing line. A `Clear` is replaced by the line alone.
    fn with_note(self, note: String) -> Self {
        match self {
            CommandOutput::Text(text) if text.is_empty() => CommandOutput::Text(note),
            CommandOutput::Text(text) => CommandOutput::Text(format!("{text}\n{note}")),
            CommandOutput::None => CommandOutput::Text(note),
            // The warning must reach the user; clearing would hide it.
            CommandOutput::Clear => CommandOutput::Text(note),
        }
    }
}

/// Shared mutable environment passed to every command.
pub struct Environment<'a> {
    /// File tree, working directory and repository cache.
    pub session: &'a mut Session,
    /// Used to build fresh sessions on reset.
    pub config: &'a XsConfig,
    /// Where the session is persisted. `None` keeps it in memory only.
    pub store: Option<&'a dyn KeyValueStore>,
    /// Repository cloner for `git clone`.
    pub cloner: Option<&'a dyn RepoCloner>,
    /// Remote blob store for `gist`; only present with a token.
    pub blobs: Option<&'a dyn BlobStore>,
    /// Set by commands that changed the session.
    pub dirty: bool,
}

impl<'a> Environment<'a> {
    pub fn new(session: &'a mut Session, config: &'a XsConfig) -> Self {
        Self {
            session,
            config,
            store: None,
            cloner: None,
            blobs: None,
            dirty: false,
        }
    }

    pub fn with_store(mut self, store: &'a dyn KeyValueStore) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_cloner(mut self, cloner: &'a dyn RepoCloner) -> Self {
        self.cloner = Some(cloner);
        self
    }

    pub fn with_blobs(mut self, blobs: &'a dyn BlobStore) -> Self {
        self.blobs = Some(blobs);
        self
    }

    /// Write the session back if a command changed it.
    fn flush(&mut self) -> Result<()> {
        if !std::mem::take(&mut self.dirty) {
            return Ok(());
        }
        match self.store {
            Some(store) => save_session(store, self.session),
            None => Ok(()),
        }
    }
}

/// A single executable command.
pub trait Command {
    /// The command name (what the user types).
    fn name(&self) -> &str;

    /// One-line description for `help`.
    fn description(&self) -> &str;

    /// Usage string (e.g. "ls \[path\]").
    fn usage(&self) -> &str;

    /// Command category for grouping in `help` output.
    fn category(&self) -> &str {
        "general"
    }

    /// Execute the command with the given arguments and environment.
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput>;
}

/// Maximum number of history entries to retain.
const MAX_HISTORY: usize = 100;

/// Registry of available commands with dispatch.
pub struct CommandRegistry {
    commands: HashMap<String, Box<dyn Command>>,
    history: RefCell<Vec<String>>,
}

impl CommandRegistry {
    /// Create an empty command registry.
    pub fn new() -> Self {
        Self {
            commands: HashMap::new(),
            history: RefCell::new(Vec::new()),
        }
    }

    /// Register a command. Replaces any existing command with the same name.
    pub fn register(&mut self, cmd: Box<dyn Command>) {
        self.commands.insert(cmd.name().to_string(), cmd);
    }

    /// Get command history.
    pub fn history(&self) -> Vec<String> {
        self.history.borrow().clone()
    }

    fn push_history(&self, line: &str) {
        let mut hist = self.history.borrow_mut();
        // Don't duplicate the last entry.
        if hist.last().is_none_or(|last| last != line) {
            hist.push(line.to_string());
            if hist.len() > MAX_HISTORY {
                hist.remove(0);
            }
        }
    }

    /// Parse and execute a command line.
    ///
    /// Command names are case-insensitive. A failure to persist the session
    /// does not fail the command: the in-memory session stays authoritative
    /// and a warning line is appended to the output.
    pub fn execute(&self, line: &str, env: &mut Environment<'_>) -> Result<CommandOutput> {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return Ok(CommandOutput::None);
        }
        self.push_history(trimmed);

        let tokens = tokenize(trimmed)?;
        let Some((name, rest)) = tokens.split_first() else {
            return Ok(CommandOutput::None);
        };
        let args: Vec<&str> = rest.iter().map(String::as_str).collect();
        let name_lower = name.to_ascii_lowercase();

        let result = match name_lower.as_str() {
            "help" => self.execute_help(&args),
            other => match self.commands.get(other) {
                Some(cmd) => cmd.execute(&args, env),
                None => Err(XsError::Command(format!("{name}: command not found"))),
            },
        };

        let saved = env.flush();
        let output = result?;
        match saved {
            Ok(()) => Ok(output),
            Err(e) => {
                log::error!("Failed to persist session: {e}");
                Ok(output.with_note(format!("[warn] session not saved: {e}")))
            },
        }
    }

    /// Built-in help with access to the registry.
    fn execute_help(&self, args: &[&str]) -> Result<CommandOutput> {
        if let Some(&name) = args.first() {
            let name_lower = name.to_ascii_lowercase();
            return match self.commands.get(name_lower.as_str()) {
                Some(cmd) => Ok(CommandOutput::Text(format!(
                    "{} ({})\n  {}\n  Usage: {}",
                    cmd.name(),
                    cmd.category(),
                    cmd.description(),
                    cmd.usage()
                ))),
                None if name_lower == "help" => Ok(CommandOutput::Text(
                    "help (general)\n  List available commands\n  Usage: help [command]"
                        .to_string(),
                )),
                None => Err(XsError::Command(format!("{name}: command not found"))),
            };
        }

        let mut categories: BTreeMap<&str, Vec<(&str, &str)>> = BTreeMap::new();
        categories
            .entry("general")
            .or_default()
            .push(("help", "List available commands"));
        for cmd in self.commands.values() {
            categories
                .entry(cmd.category())
                .or_default()
                .push((cmd.name(), cmd.description()));
        }

        let total: usize = categories.values().map(Vec::len).sum();
        let mut out = format!("Commands ({total}):\n");
        for (cat, cmds) in &mut categories {
            cmds.sort_by_key(|(name, _)| *name);
            out.push_str(&format!("\n  [{cat}]\n"));
            for (name, desc) in cmds.iter() {
                out.push_str(&format!("    {name:8} {desc}\n"));
            }
        }
        out.push_str("\nType 'help <command>' for details.");
        Ok(CommandOutput::Text(out))
    }

    /// Return a sorted list of (name, description) pairs.
    pub fn list_commands(&self) -> Vec<(&str, &str)> {
        let mut cmds: Vec<(&str, &str)> = self
            .commands
            .values()
            .map(|c| (c.name(), c.description()))
            .collect();
        cmds.sort_by_key(|(name, _)| *name);
        cmds
    }

    /// Return completions for a partial command name.
    pub fn completions(&self, partial: &str) -> Vec<String> {
        let lower = partial.to_ascii_lowercase();
        let mut names: Vec<String> = self
            .commands
            .keys()
            .map(String::as_str)
            .chain(std::iter::once("help"))
            .filter(|name| name.starts_with(&lower))
            .map(str::to_string)
            .collect();
        names.sort();
        names
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tokenizer: handles single quotes, double quotes, and backslash escapes.
// ---------------------------------------------------------------------------

/// Tokenize a command line respecting quotes and backslash escapes.
///
/// - Single-quoted strings preserve all characters literally.
/// - Inside double quotes a backslash escapes `"` and `\`.
/// - Backslash escapes the next character outside of quotes.
pub fn tokenize(input: &str) -> Result<Vec<String>> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut chars = input.chars().peekable();
    let mut in_single = false;
    let mut in_double = false;
    // Distinguishes `''` (an empty argument) from no token at all.
    let mut quoted = false;

    while let Some(ch) = chars.next() {
        if in_single {
            if ch == '\'' {
                in_single = false;
            } else {
                current.push(ch);
            }
        } else if in_double {
            match ch {
                '"' => in_double = false,
                '\\' => match chars.peek() {
                    Some(&next @ ('"' | '\\')) => {
                        current.push(next);
                        chars.next();
                    },
                    _ => current.push('\\'),
                },
                _ => current.push(ch),
            }
        } else {
            match ch {
                '\'' => {
                    in_single = true;
                    quoted = true;
                },
                '"' => {
                    in_double = true;
                    quoted = true;
                },
                '\\' => {
                    if let Some(next) = chars.next() {
                        current.push(next);
                    }
                },
                c if c.is_whitespace() => {
                    if !current.is_empty() || quoted {
                        tokens.push(std::mem::take(&mut current));
                        quoted = false;
                    }
                },
                _ => current.push(ch),
            }
        }
    }

    if in_single {
        return Err(XsError::Command("unterminated single quote".to_string()));
    }
    if in_double {
        return Err(XsError::Command("unterminated double quote".to_string()));
    }

    if !current.is_empty() || quoted {
        tokens.push(current);
    }

    Ok(tokens)
}
