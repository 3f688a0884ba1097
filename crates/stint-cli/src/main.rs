use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use stint_core::Tracker;
use stint_store::Database;
use tracing_subscriber::EnvFilter;

use stint_cli::commands::{
    delete, info, list, modify, notes, query, report, start, transition, unset,
};
use stint_cli::editor::ExternalEditor;
use stint_cli::{Cli, Commands, Config};

/// Load config, open the database and load every entry.
fn open_tracker(config_path: Option<&Path>) -> Result<(Tracker<Database>, Config)> {
    let config = Config::load_from(config_path).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent).context("failed to create database directory")?;
    }

    let db = Database::open(&config.database_path).context("failed to open database")?;
    let tracker = Tracker::load(db).context("failed to load entries")?;
    for record in tracker.skipped() {
        eprintln!("warning: {record}");
    }
    Ok((tracker, config))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    let Some(command) = &cli.command else {
        use clap::CommandFactory;
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    let (mut tracker, config) = open_tracker(cli.config.as_deref())?;
    let now = Utc::now();
    let mut out = io::stdout().lock();

    match command {
        Commands::Start(args) => start::run(&mut out, &mut tracker, args, now)?,
        Commands::Pause(args) => transition::pause(&mut out, &mut tracker, args, now)?,
        Commands::Resume(args) => transition::resume(&mut out, &mut tracker, args, now)?,
        Commands::Stop(args) => transition::stop(&mut out, &mut tracker, args, &config, now)?,
        Commands::Modify(args) => modify::run(&mut out, &mut tracker, args, now)?,
        Commands::Unset(args) => unset::run(&mut out, &mut tracker, args, now)?,
        Commands::Notes(args) => {
            let editor = ExternalEditor::new(config.editor_command());
            notes::run(&mut out, &mut tracker, &editor, args, now)?;
        }
        Commands::Delete(args) => {
            let mut input = io::stdin().lock();
            delete::run(&mut out, &mut input, &mut tracker, args)?;
        }
        Commands::Info(args) => info::run(&mut out, &tracker, args, &config, now)?,
        Commands::List(args) => list::run(&mut out, &tracker, args, &config, now)?,
        Commands::Report(args) => report::run(&mut out, &tracker, args, &config, now)?,
        Commands::Query(args) => query::run(&mut out, &tracker, args, now)?,
    }

    out.flush()?;
    Ok(())
}
