use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use docqa_core::config::Config;

mod chat;
mod cli;
mod commands;
mod uploads;

use cli::{Cli, Command};

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let settings = Config::load()?.settings()?;
    match cli.command {
        Command::Build { paths, store } => commands::build(settings.clone(), &paths, &store.resolve(&settings)),
        Command::Query { question, k, index, store, show_sources } => {
            let dir = store.resolve(&settings);
            commands::query(settings, &question.join(" "), usize::from(k), index, &dir, show_sources)
        }
        Command::Chat { paths } => chat::run(settings, &paths),
        Command::List { store } => commands::list(&store.resolve(&settings)),
    }
}
