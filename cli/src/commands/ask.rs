use super::utils;
use anyhow::Result;
use earningsiq_core::config::Config;
use std::path::Path;

pub async fn handle_ask(query: String, verbose: bool, config_path: Option<&Path>) -> Result<()> {
    let config = Config::load_from(config_path)?;
    let pipeline = utils::build_pipeline(&config)?;

    let result = pipeline.run(&query).await?;
    utils::print_result(&result, verbose);

    Ok(())
}
