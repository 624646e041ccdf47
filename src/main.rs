use clap::Parser;
use yield_text::{Harvest, HarvestConfig};

mod args;
use args::Args;

#[tokio::main]
async fn main() {
    // Initialize logging
    env_logger::init();

    // Parse command-line arguments
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => match HarvestConfig::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                ::log::error!("Failed to load config {}: {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => HarvestConfig::default(),
    };
    let config = args.apply(config);

    if config.queries.is_empty() {
        ::log::error!("No queries given: pass --query or list them in the config file");
        std::process::exit(1);
    }

    ::log::info!(
        "Starting harvest of {} queries into {}",
        config.queries.len(),
        config.output_dir.display()
    );
    println!("Note: harvesting requires a WebDriver server (e.g., ChromeDriver).");
    println!(
        "Set WEBDRIVER_URL environment variable if not using {}",
        config.webdriver_url
    );

    let start_time = std::time::Instant::now();
    match Harvest::new(config).run().await {
        Ok(summary) => {
            ::log::info!(
                "Harvest complete - {} blocks from {} pages ({} urls) in {:.2} seconds",
                summary.blocks_written,
                summary.pages_fetched,
                summary.urls_discovered,
                start_time.elapsed().as_secs_f64()
            );
        }
        Err(e) => {
            ::log::error!("Harvest failed: {}", e);
            std::process::exit(1);
        }
    }
}
