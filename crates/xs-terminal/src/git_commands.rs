//! `git clone` on top of the repository materializer.

use xs_types::error::{Result, XsError};

use crate::interpreter::{Command, CommandOutput, CommandRegistry, Environment};

/// Register the `git` command into a registry.
pub fn register_git_commands(reg: &mut CommandRegistry) {
    reg.register(Box::new(GitCmd));
}

// ---------------------------------------------------------------------------
// git
// ---------------------------------------------------------------------------

struct GitCmd;
impl Command for GitCmd {
    fn name(&self) -> &str {
        "git"
    }
    fn description(&self) -> &str {
        "Clone a remote repository into /repos"
    }
    fn usage(&self) -> &str {
        "git clone <owner/repo | url>"
    }
    fn category(&self) -> &str {
        "git"
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        let repo = match args {
            ["clone", repo] => *repo,
            ["clone"] => {
                return Err(XsError::Command(
                    "usage: git clone <owner/repo | url>".to_string(),
                ));
            },
            _ => {
                return Err(XsError::Command(
                    "git: only 'git clone owner/repo' is supported".to_string(),
                ));
            },
        };
        let cloner = env
            .cloner
            .ok_or_else(|| XsError::Command("git: cloning is not available".to_string()))?;

        let result = cloner.clone_repo(repo, env.session)?;
        env.dirty = true;

        let mut lines = vec![format!("Cloning repository {} ...", result.repo)];
        lines.extend(result.warnings.iter().map(|w| format!("[warn] {w}")));
        lines.push(format!(
            "[ok] clone complete: {} files in {}",
            result.files, result.base_dir
        ));
        Ok(CommandOutput::Text(lines.join("\n")))
    }
}
