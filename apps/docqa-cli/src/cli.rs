use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use docqa_core::config::{expand_path, Settings};

#[derive(Parser, Debug)]
#[command(name = "docqa", version, about = "Ask questions about your PDF, TXT and Markdown files")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Index files (or directories of files) and store the result as the latest index
    Build {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        #[command(flatten)]
        store: StoreArgs,
    },
    /// Answer a question from a stored index
    Query {
        #[arg(required = true, num_args = 1..)]
        question: Vec<String>,
        /// Number of passages to retrieve
        #[arg(long, default_value_t = 4, value_parser = clap::value_parser!(u8).range(2..=8))]
        k: u8,
        /// Index id (defaults to the latest build)
        #[arg(long)]
        index: Option<String>,
        #[command(flatten)]
        store: StoreArgs,
        /// Also print the raw retrieved text
        #[arg(long)]
        show_sources: bool,
    },
    /// Build an in-memory index and ask questions interactively
    Chat { paths: Vec<PathBuf> },
    /// List stored indexes
    List {
        #[command(flatten)]
        store: StoreArgs,
    },
}

#[derive(Args, Debug)]
pub struct StoreArgs {
    /// Index store directory (defaults to `store.dir` from config)
    #[arg(long, env = "DOCQA_STORE")]
    pub store: Option<String>,
}

impl StoreArgs {
    pub fn resolve(&self, settings: &Settings) -> PathBuf {
        match &self.store {
            Some(dir) => expand_path(dir),
            None => settings.store.dir_path(),
        }
    }
}
