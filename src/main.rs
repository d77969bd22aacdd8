mod busy;
mod cli;
mod commands;
mod config;
mod connectivity;
mod detect;
mod error;
mod oplog;
mod paths;
mod publish;
mod runner;
mod session;
mod staging;
mod state;
mod testutil;
mod website;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Command, PrefsCommand};
use std::path::PathBuf;

use busy::LOCK_FILENAME;
use connectivity::HttpProbe;
use oplog::ObservationLog;
use runner::SystemRunner;
use session::Session;
use state::FileStateStore;

type CliSession = Session<SystemRunner, HttpProbe, FileStateStore>;

fn main() {
    let cli = Cli::parse();
    init_logging(cli.debug);

    if let Err(e) = run(cli) {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

fn init_logging(debug: bool) {
    let default_level = if debug { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Init {
            source,
            repo,
            probe_url,
            probe_timeout_ms,
            force,
            show_path,
        } => {
            let config_path = paths::default_config_path()?;
            if show_path {
                println!("{}", config_path.display());
                return Ok(());
            }

            let (Some(source_file), Some(repo_root)) = (source, repo) else {
                eprintln!("error: --source and --repo are required\nHint: lap-updater init --source <personalbest.ini> --repo <website-repo>");
                std::process::exit(1);
            };

            let inputs = commands::InitInputs {
                source_file,
                repo_root,
                probe_url,
                probe_timeout_ms,
            };

            let result = commands::cmd_init(inputs, &config_path, force)?;
            output(&result, cli.json, commands::format_init_human)?;
        }
        Command::Check => {
            let mut session = open_session()?;
            let result = commands::cmd_check(&mut session, new_log(cli.json))?;
            output(&result, cli.json, commands::format_check_human)?;
        }
        Command::Publish { force } => {
            let mut session = open_session()?;
            let result = commands::cmd_publish(&mut session, new_log(cli.json), force)?;
            let failed = !result.report.success;
            output(&result, cli.json, commands::format_publish_human)?;
            if failed {
                std::process::exit(1);
            }
        }
        Command::Sync => {
            let mut session = open_session()?;
            let result = commands::cmd_sync(&mut session, new_log(cli.json))?;
            let failed = result.failed();
            output(&result, cli.json, commands::format_sync_human)?;
            if failed {
                std::process::exit(1);
            }
        }
        Command::Status => {
            let store = FileStateStore::in_dir(&paths::default_state_dir()?);
            log::debug!("reading state from {}", store.path().display());
            let result = commands::cmd_status(&store)?;
            output(&result, cli.json, commands::format_status_human)?;
        }
        Command::Prefs { repo, action } => {
            let repo_root = match repo {
                Some(r) => paths::expand_tilde(&r),
                None => config::load_default_config()?.repo_root,
            };
            let result = match action {
                PrefsCommand::Show => commands::cmd_prefs_show(&repo_root)?,
                PrefsCommand::Set(args) => commands::cmd_prefs_set(&repo_root, &args.into())?,
            };
            output(&result, cli.json, commands::format_prefs_human)?;
        }
    }
    Ok(())
}

fn open_session() -> Result<CliSession> {
    let config = config::load_default_config()?;
    let state_dir: PathBuf = paths::default_state_dir()?;
    let probe = HttpProbe::new(config.probe_url.clone(), config.probe_timeout);
    let store = FileStateStore::in_dir(&state_dir);
    log::debug!("state file {}", store.path().display());
    Ok(Session::new(
        config,
        SystemRunner,
        probe,
        store,
        state_dir.join(LOCK_FILENAME),
    ))
}

/// Human mode streams the step log to stderr as it happens; JSON mode returns it in the result.
fn new_log(json: bool) -> ObservationLog {
    if json {
        ObservationLog::new()
    } else {
        ObservationLog::echoing()
    }
}

fn output<T: serde::Serialize>(result: &T, json: bool, human_fn: fn(&T) -> String) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(result)?);
    } else {
        let text = human_fn(result);
        if !text.is_empty() {
            println!("{}", text);
        }
    }
    Ok(())
}
