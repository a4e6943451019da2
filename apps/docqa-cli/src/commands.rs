use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Result};
use indicatif::{ProgressBar, ProgressStyle};
use tokio::runtime::Runtime;
use tracing::info;

use docqa_core::config::Settings;
use docqa_core::error::Error;
use docqa_core::types::Upload;
use docqa_embed::shared_embedder;
use docqa_rag::{format_sources, BuildReport, Session};
use docqa_vector::IndexStore;

use crate::uploads::collect_uploads;

pub const BUILD_FAILED: &str = "Build failed. See details below.";

pub fn spinner(message: &'static str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Run a session build behind a spinner that follows the build stages.
pub fn build_session(session: &mut Session, uploads: &[Upload]) -> docqa_core::Result<BuildReport> {
    let pb = spinner("Loading documents...");
    let result = session.build_with_progress(uploads, |stage| pb.set_message(stage.label()));
    pb.finish_and_clear();
    result
}

pub fn print_report(report: &BuildReport) {
    for name in &report.skipped {
        println!("Unsupported file type: {name} (use PDF/TXT/MD)");
    }
    println!("Indexed {} chunks ✅", report.chunks);
}

pub fn build(settings: Settings, paths: &[PathBuf], store_dir: &Path) -> Result<()> {
    let result = collect_uploads(paths).and_then(|uploads| {
        let mut session = Session::new(settings)?;
        let report = build_session(&mut session, &uploads)?;
        Ok((session, report))
    });
    let (session, report) = match result {
        Ok(built) => built,
        Err(e) => {
            println!("{BUILD_FAILED}");
            return Err(e);
        }
    };
    let index = session.index().ok_or(Error::NoIndex)?;

    let rt = Runtime::new()?;
    let id = rt.block_on(async {
        let store = IndexStore::open(store_dir).await?;
        store.save(index).await
    })?;
    print_report(&report);
    println!("Index id: {id}");
    info!("Stored {} in {}", id, store_dir.display());
    Ok(())
}

pub fn query(
    settings: Settings,
    question: &str,
    k: usize,
    index_id: Option<String>,
    store_dir: &Path,
    show_sources: bool,
) -> Result<()> {
    let mut session = Session::new(settings)?;
    if question.trim().is_empty() {
        return Err(Error::EmptyQuestion.into());
    }
    let embedder = shared_embedder(&session.settings().embedding)?;

    let rt = Runtime::new()?;
    let index = rt.block_on(async {
        let store = IndexStore::open(store_dir).await?;
        let id = match index_id {
            Some(id) => id,
            None => store.latest().await?.ok_or_else(|| anyhow!(Error::NoIndex))?,
        };
        store.load(&id, embedder).await
    })?;
    session.install(index);

    let pb = spinner("Retrieving relevant passages...");
    let answer = session.ask(question, k);
    pb.finish_and_clear();
    let answer = answer?;

    println!("{}", answer.text.trim_end());
    if show_sources {
        println!();
        print!("{}", format_sources(&answer.hits));
    }
    Ok(())
}

pub fn list(store_dir: &Path) -> Result<()> {
    let rt = Runtime::new()?;
    let stored = rt.block_on(async { IndexStore::open(store_dir).await?.list().await })?;
    if stored.is_empty() {
        println!("No stored indexes in {}", store_dir.display());
        return Ok(());
    }
    for s in stored {
        let marker = if s.latest { "*" } else { " " };
        println!("{} {}  {:>6} chunks  {}", marker, s.id, s.chunks, s.embedder_id);
    }
    Ok(())
}
