//! XS Terminal entry point.
//!
//! Reads commands from stdin one line at a time, runs them against the
//! persisted session and prints the result. `exit`, `quit` or end of input
//! leaves the terminal.

mod commands;
mod setup;

use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};

use xs_clone::{GithubSource, Materializer};
use xs_session::gist::GistClient;
use xs_session::{FileStore, LoadOrigin, load_session};
use xs_terminal::{CommandRegistry, Environment, register_builtins};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = setup::load_config(std::env::args().nth(1))?;
    log::info!(
        "Starting XS Terminal (storage: {}, api: {})",
        config.storage_dir.display(),
        config.api_base,
    );

    let store = FileStore::open(&config.storage_dir)
        .with_context(|| format!("opening {}", config.storage_dir.display()))?;
    let loaded = load_session(&store, &config);
    let mut session = loaded.session;

    let source = GithubSource::from_config(&config)?;
    let materializer = Materializer::from_config(source, &config);
    let gists = config
        .token()
        .map(|token| GistClient::new(&config.api_base, token, &config.user_agent));
    if gists.is_none() {
        log::info!("No GitHub token configured; gist commands are disabled");
    }

    let mut cmd_reg = CommandRegistry::new();
    register_builtins(&mut cmd_reg);

    let mut stdout = io::stdout().lock();
    writeln!(stdout, "XS Terminal ready. Type 'help' to begin.")?;
    if loaded.origin == LoadOrigin::Recovered {
        writeln!(stdout, "[warn] stored session was unreadable; started fresh")?;
    }
    if let Some(e) = &loaded.storage_error {
        writeln!(stdout, "[err] session storage unavailable, changes stay in memory: {e}")?;
    }

    let mut stdin = io::stdin().lock();
    let mut line = String::new();
    loop {
        write!(stdout, "{}", commands::PROMPT)?;
        stdout.flush()?;
        line.clear();
        if stdin.read_line(&mut line)? == 0 {
            writeln!(stdout)?;
            break;
        }
        if commands::is_exit(&line) {
            break;
        }

        let mut env = Environment::new(&mut session, &config)
            .with_store(&store)
            .with_cloner(&materializer);
        if let Some(gists) = &gists {
            env = env.with_blobs(gists);
        }
        let result = cmd_reg.execute(&line, &mut env);
        commands::process_command_output(result, &mut stdout)?;
    }

    log::info!("Session ended");
    Ok(())
}
