//! Command interpreter for XS Terminal.
//!
//! The terminal is a registry-based dispatch system. Commands implement the
//! `Command` trait and are registered by name. The interpreter parses input
//! lines, resolves the command name, and dispatches `execute()` against the
//! session held in an `Environment`.

mod commands;
pub mod data_commands;
pub mod git_commands;
mod interpreter;

/// Register all built-in commands (fs, git, data) into a registry.
pub use commands::register_builtins;
/// Register the session blob commands (json, gist) into a registry.
pub use data_commands::register_data_commands;
/// Register the `git clone` command into a registry.
pub use git_commands::register_git_commands;
/// A single executable command trait.
pub use interpreter::Command;
/// Output produced by a command (text or signals).
pub use interpreter::CommandOutput;
/// Registry of available commands with dispatch.
pub use interpreter::CommandRegistry;
/// Shared mutable environment passed to every command.
pub use interpreter::Environment;
/// Quote-aware line tokenizer.
pub use interpreter::tokenize;
