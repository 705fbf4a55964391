use super::utils;
use anyhow::Result;
use earningsiq_core::config::Config;
use std::path::Path;

pub async fn handle_status(config_path: Option<&Path>) -> Result<()> {
    let config = Config::load_from(config_path)?;
    let store = utils::build_store(&config)?;

    println!("Collection : {}", config.store.collection);
    println!(
        "Weights    : {:.1} vector / {:.1} lexical",
        config.retrieval.vector_weight, config.retrieval.lexical_weight
    );
    println!(
        "CRAG       : grade top {} | reject at {} irrelevant | corrective pool {}",
        config.crag.graded_top_k, config.crag.irrelevant_threshold, config.crag.corrected_pool_k
    );

    match store.count().await {
        Ok(count) => println!("Chunks     : {}", count),
        Err(err) => println!("Chunks     : unavailable ({:#})", err),
    }

    Ok(())
}
