pub mod ask;
pub mod chat;
pub mod ingest;
pub mod status;
pub mod utils;

pub use ask::handle_ask;
pub use chat::handle_chat;
pub use ingest::handle_ingest;
pub use status::handle_status;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "earningsiq")]
#[command(about = "earnings call question answering with hybrid retrieval and corrective grading")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Load, chunk, and store the transcript corpus
    Ingest {
        /// Directory of transcript .txt files (overrides config)
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },
    /// Answer one question
    Ask {
        /// The question
        query: String,

        /// Show intermediate chunks and scores
        #[arg(long, default_value_t = false)]
        verbose: bool,
    },
    /// Interactive question loop
    Chat,
    /// Show configuration and collection stats
    Status,
}
