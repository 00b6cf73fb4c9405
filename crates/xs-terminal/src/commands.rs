//! Built-in filesystem commands for the XS terminal.

use xs_types::error::{Result, XsError};
use xs_vfs::{EntryKind, Node, NodeRef};

use crate::interpreter::{Command, CommandOutput, CommandRegistry, Environment};

/// Register all built-in commands into a registry.
///
/// `help` is answered by the registry itself.
pub fn register_builtins(reg: &mut CommandRegistry) {
    reg.register(Box::new(LsCmd));
    reg.register(Box::new(PwdCmd));
    reg.register(Box::new(CdCmd));
    reg.register(Box::new(CatCmd));
    reg.register(Box::new(MkdirCmd));
    reg.register(Box::new(TouchCmd));
    reg.register(Box::new(RmCmd));
    reg.register(Box::new(ClearCmd));
    crate::register_git_commands(reg);
    crate::register_data_commands(reg);
}

// ---------------------------------------------------------------------------
// ls
// ---------------------------------------------------------------------------

struct LsCmd;
impl Command for LsCmd {
    fn name(&self) -> &str {
        "ls"
    }
    fn description(&self) -> &str {
        "List directory contents"
    }
    fn usage(&self) -> &str {
        "ls [path]"
    }
    fn category(&self) -> &str {
        "filesystem"
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        let target = args.first().copied().unwrap_or("");
        let entries = env.session.fs.list(target, &env.session.cwd)?;
        if entries.is_empty() {
            return Ok(CommandOutput::Text("(empty)".to_string()));
        }
        let names: Vec<String> = entries
            .iter()
            .map(|e| match e.kind {
                EntryKind::Directory => format!("{}/", e.name),
                EntryKind::File => e.name.clone(),
            })
            .collect();
        Ok(CommandOutput::Text(names.join("  ")))
    }
}

// ---------------------------------------------------------------------------
// pwd
// ---------------------------------------------------------------------------

struct PwdCmd;
impl Command for PwdCmd {
    fn name(&self) -> &str {
        "pwd"
    }
    fn description(&self) -> &str {
        "Print working directory"
    }
    fn usage(&self) -> &str {
        "pwd"
    }
    fn category(&self) -> &str {
        "filesystem"
    }
    fn execute(&self, _args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        Ok(CommandOutput::Text(env.session.cwd.clone()))
    }
}

// ---------------------------------------------------------------------------
// cd
// ---------------------------------------------------------------------------

struct CdCmd;
impl Command for CdCmd {
    fn name(&self) -> &str {
        "cd"
    }
    fn description(&self) -> &str {
        "Change working directory"
    }
    fn usage(&self) -> &str {
        "cd [path]"
    }
    fn category(&self) -> &str {
        "filesystem"
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        let target = args.first().copied().unwrap_or("/");
        env.session.change_directory(target)?;
        env.dirty = true;
        Ok(CommandOutput::None)
    }
}

// ---------------------------------------------------------------------------
// cat
// ---------------------------------------------------------------------------

struct CatCmd;
impl Command for CatCmd {
    fn name(&self) -> &str {
        "cat"
    }
    fn description(&self) -> &str {
        "Display file contents"
    }
    fn usage(&self) -> &str {
        "cat <file>"
    }
    fn category(&self) -> &str {
        "filesystem"
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        let Some(&file) = args.first() else {
            return Err(XsError::Command("usage: cat <file>".to_string()));
        };
        let text = env.session.fs.read_file(file, &env.session.cwd)?;
        Ok(CommandOutput::Text(text.to_string()))
    }
}

// ---------------------------------------------------------------------------
// mkdir
// ---------------------------------------------------------------------------

struct MkdirCmd;
impl Command for MkdirCmd {
    fn name(&self) -> &str {
        "mkdir"
    }
    fn description(&self) -> &str {
        "Create a directory and any missing parents"
    }
    fn usage(&self) -> &str {
        "mkdir <path>"
    }
    fn category(&self) -> &str {
        "filesystem"
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        let Some(&dir) = args.first() else {
            return Err(XsError::Command("usage: mkdir <path>".to_string()));
        };
        let path = env.session.absolute(dir);
        env.session.fs.make_directory(&path)?;
        env.dirty = true;
        Ok(CommandOutput::Text(format!("mkdir: created {path}")))
    }
}

// ---------------------------------------------------------------------------
// touch
// ---------------------------------------------------------------------------

struct TouchCmd;
impl Command for TouchCmd {
    fn name(&self) -> &str {
        "touch"
    }
    fn description(&self) -> &str {
        "Create an empty file"
    }
    fn usage(&self) -> &str {
        "touch <file>"
    }
    fn category(&self) -> &str {
        "filesystem"
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        let Some(&file) = args.first() else {
            return Err(XsError::Command("usage: touch <file>".to_string()));
        };
        let path = env.session.absolute(file);
        if env.session.fs.exists(&path, "/") {
            return Ok(CommandOutput::None);
        }
        env.session.fs.write_file(&path, "")?;
        env.dirty = true;
        Ok(CommandOutput::Text(format!("touch: created {path}")))
    }
}

// ---------------------------------------------------------------------------
// rm
// ---------------------------------------------------------------------------

struct RmCmd;
impl Command for RmCmd {
    fn name(&self) -> &str {
        "rm"
    }
    fn description(&self) -> &str {
        "Remove a file or a directory with everything below it"
    }
    fn usage(&self) -> &str {
        "rm <path>"
    }
    fn category(&self) -> &str {
        "filesystem"
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        let Some(&target) = args.first() else {
            return Err(XsError::Command("usage: rm <path>".to_string()));
        };
        let path = env.session.absolute(target);
        let removed = env.session.fs.remove(&path)?;
        env.dirty = true;

        let mut out = match removed {
            Node::Directory(_) => format!("rm: removed directory {path}"),
            Node::File(_) => format!("rm: removed {path}"),
        };
        // The working directory may have gone with the subtree.
        if !matches!(
            env.session.fs.resolve(&env.session.cwd, "/"),
            Some(NodeRef::Directory(_))
        ) {
            env.session.cwd = "/".to_string();
            out.push_str("\ncwd reset to /");
        }
        Ok(CommandOutput::Text(out))
    }
}

// ---------------------------------------------------------------------------
// clear
// ---------------------------------------------------------------------------

struct ClearCmd;
impl Command for ClearCmd {
    fn name(&self) -> &str {
        "clear"
    }
    fn description(&self) -> &str {
        "Clear terminal output"
    }
    fn usage(&self) -> &str {
        "clear"
    }
    fn execute(&self, _args: &[&str], _env: &mut Environment<'_>) -> Result<CommandOutput> {
        Ok(CommandOutput::Clear)
    }
}
