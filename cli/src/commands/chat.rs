use super::utils;
use anyhow::Result;
use console::Style;
use earningsiq_core::config::Config;
use std::io::Write;
use std::path::Path;

pub async fn handle_chat(config_path: Option<&Path>) -> Result<()> {
    let config = Config::load_from(config_path)?;
    let pipeline = utils::build_pipeline(&config)?;

    let bold = Style::new().bold();
    println!("{}", "=".repeat(60));
    println!(
        "{}",
        bold.apply_to("  EarningsIQ - Earnings Call Intelligence")
    );
    println!("  Hybrid retrieval + re-ranking + corrective grading");
    println!("{}", "=".repeat(60));
    println!("  Type 'quit' to exit\n");

    let stdin = std::io::stdin();
    loop {
        print!(" Your question: ");
        std::io::stdout().flush()?;

        let mut line = String::new();
        if stdin.read_line(&mut line)? == 0 {
            break;
        }
        let query = line.trim();
        if query.is_empty() {
            continue;
        }
        if matches!(query.to_lowercase().as_str(), "quit" | "exit" | "q") {
            println!("\n Goodbye!");
            break;
        }

        println!("\n Processing pipeline...");
        match pipeline.run(query).await {
            Ok(result) => utils::print_result(&result, false),
            Err(err) => {
                eprintln!(
                    "{} {:#}",
                    Style::new().red().apply_to("Query failed:"),
                    err
                );
            }
        }
        println!();
    }

    Ok(())
}
