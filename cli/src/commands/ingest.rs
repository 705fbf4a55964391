use super::utils;
use anyhow::Result;
use earningsiq_core::config::Config;
use earningsiq_core::ingest::build_vectorstore;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub async fn handle_ingest(data_dir: Option<PathBuf>, config_path: Option<&Path>) -> Result<()> {
    let config = Config::load_from(config_path)?;
    let store = utils::build_store(&config)?;

    let dir = data_dir.unwrap_or_else(|| PathBuf::from(&config.ingest.data_dir));
    println!("Ingesting transcripts from {}", dir.display());

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::with_template("{spinner} {msg}")?);
    spinner.set_message("Embedding and storing chunks...");
    spinner.enable_steady_tick(Duration::from_millis(120));

    let written = build_vectorstore(store.as_ref(), &config.ingest, &dir).await?;

    spinner.finish_and_clear();
    println!("Done. Stored {} chunks in '{}'.", written, config.store.collection);

    Ok(())
}
