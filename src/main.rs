//! SmileCare - terminal dental wellness assistant

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use colored::*;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};

use smilecare::analyzer::CheckKind;
use smilecare::cli::{Action, Args, Commands, RemindCommand, Verbosity};
use smilecare::config::Config;
use smilecare::execution;
use smilecare::logging;
use smilecare::repl::{DisplayManager, ReplSession};
use smilecare::state::StateStore;
use smilecare::watch;

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // `config --init` may name a file it is about to create
    let config = if matches!(args.command, Some(Commands::Config { init: true })) {
        Config::load_or_default(args.config.clone())
    } else {
        Config::load(args.config.clone())
    }
    .context("Failed to load configuration")?;

    let verbosity = if args.quiet || args.verbose > 0 {
        args.verbosity()
    } else {
        Verbosity::from_config(&config.display.default_verbosity)
    };
    if !config.display.color_output {
        colored::control::set_override(false);
    }
    logging::init(verbosity, config.display.color_output);
    debug!(verbosity = verbosity.as_str(), "starting smilecare {}", VERSION);

    let state_dir = args.state_dir.clone().unwrap_or_else(|| config.state_dir());
    let store = StateStore::in_dir(&state_dir);

    match &args.command {
        None | Some(Commands::Start) => run_repl(config, store)?,
        Some(Commands::Config { init }) => show_config(&args, &config, &store, *init)?,
        Some(Commands::Reset) => reset_state(&store)?,
        Some(Commands::Action(Action::Remind(RemindCommand::Watch { interval }))) => {
            let secs = interval.unwrap_or(config.reminders.watch_interval_secs).max(1);
            watch_reminders(&config, &store, secs).await?;
        }
        Some(Commands::Action(action)) => {
            let progress = verbosity.show_progress() && config.display.show_progress_bars;
            if !run_action(action, &config, &store, progress)? {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

fn run_repl(config: Config, store: StateStore) -> Result<()> {
    let history_path = config.history_file();
    let mut repl_session = ReplSession::with_history(config, store, history_path)?;
    repl_session.show_welcome(VERSION);
    repl_session.run()
}

/// Run one action against the stored state; returns false if it failed
fn run_action(action: &Action, config: &Config, store: &StateStore, progress: bool) -> Result<bool> {
    let mut state = store.load_or_fresh(config);
    let mut display = DisplayManager::new().with_progress(progress);

    if let Action::Analyze { image, check: CheckKind::Full } = action {
        display.start_analysis(&image.display().to_string());
    }

    let now = Local::now().naive_local();
    let result = execution::execute(action, &mut state, now, &mut |kind| display.advance(kind));

    match result {
        Ok(outcome) => {
            display.show_outcome(&outcome);
            if outcome.changed {
                store.save(&state)?;
                info!(path = %store.path().display(), "state saved");
            }
            Ok(true)
        }
        Err(e) => {
            display.show_error(&e.to_string());
            Ok(false)
        }
    }
}

/// Print reminders as they fall due until Ctrl-C
async fn watch_reminders(config: &Config, store: &StateStore, secs: u64) -> Result<()> {
    let display = DisplayManager::new();

    println!(
        "Watching reminders every {}s. Press {} to stop.",
        secs,
        "Ctrl-C".cyan()
    );

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("could not listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };
    let polls = watch::run(store, config, Duration::from_secs(secs), shutdown, |now, reminder| {
        display.show_due(&now.format("%H:%M").to_string(), &reminder.to_string());
    })
    .await;

    debug!(polls, "watch stopped");
    println!("\n{}", "Stopped watching reminders.".yellow());
    Ok(())
}

fn reset_state(store: &StateStore) -> Result<()> {
    if store.path().exists() {
        store.delete()?;
        println!("✓ Removed {}", store.path().display());
    } else {
        println!("No stored state found.");
    }
    Ok(())
}

fn show_config(args: &Args, config: &Config, store: &StateStore, init: bool) -> Result<()> {
    let path: Option<PathBuf> = args.config.clone().or_else(Config::default_path);

    if init {
        let path = path.context("No home directory; pass --config <PATH>")?;
        config.save(&path)?;
        println!("✓ Wrote configuration to {}", path.display());
        return Ok(());
    }

    println!("{}", "SmileCare Configuration".bold().cyan());
    println!("{}", "=".repeat(60).cyan());
    match &path {
        Some(p) if p.exists() => println!("  Config file: {}", p.display()),
        Some(p) => println!("  Config file: {} (not present, using defaults)", p.display()),
        None => println!("  Config file: (none, using defaults)"),
    }
    println!("  State file:  {}", store.path().display());
    println!("  History:     {}", config.history_file().display());
    println!();

    let rendered = toml::to_string_pretty(config).context("Failed to render configuration")?;
    println!("{}", rendered);
    Ok(())
}
