//! Catalogue extractor CLI application.

use anyhow::{Context, Result};
use clap::Parser;
use extractor::{ContentFetcher, ExtractionPipeline, ExtractorRegistry, MalPlugin};
use shared::{Config, CrossListStore};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Import into the watch list instead of the tracked list
    #[arg(long, conflicts_with = "filter")]
    watch: bool,

    /// Import into the filter list instead of the tracked list
    #[arg(long)]
    filter: bool,

    /// Location tag stored on tracked entries
    #[arg(long, default_value = "-")]
    location: String,

    /// Also fetch and print recommendation counts per URL
    #[arg(long)]
    recommendations: bool,

    /// Entry URLs to import
    #[arg(required = true)]
    urls: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = Config::from_file(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    let log_level = if args.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    shared::logging::init(shared::LogConfig {
        log_dir: config.log_dir().to_string_lossy().to_string(),
        component: "catalogue-extractor".to_string(),
        default_level: log_level,
        console: true,
        file: config.logging.file,
        json_format: config.logging.json_format,
    })?;

    info!("Catalogue extractor starting");
    info!(config_file = %args.config.display(), "Loaded configuration");

    let registry = ExtractorRegistry::new(vec![Arc::new(MalPlugin)])
        .context("Failed to build extractor registry")?;
    let fetcher =
        ContentFetcher::from_config(&config.scraper).context("Failed to create fetcher")?;
    let store = Arc::new(CrossListStore::new());
    let pipeline = ExtractionPipeline::new(
        registry,
        fetcher,
        Arc::clone(&store),
        config.scraper.concurrent_fetches,
    );

    let mut imported = 0usize;
    let mut skipped = 0usize;
    let mut errors = 0usize;

    for url in &args.urls {
        let result = if args.watch {
            pipeline.import_watch(url).await
        } else if args.filter {
            pipeline.import_filter(url).await
        } else {
            pipeline.import_tracked(url, &args.location).await
        };

        match result {
            Ok(true) => imported += 1,
            Ok(false) => {
                skipped += 1;
                info!(url = url.as_str(), "Nothing imported for URL");
            }
            Err(e) => {
                errors += 1;
                warn!(url = url.as_str(), error = %e, "Import failed");
            }
        }

        if args.recommendations {
            match pipeline.fetch_recommendations(url).await {
                Ok(recs) => {
                    info!(url = url.as_str(), count = recs.len(), "Recommendations");
                    for (link, count) in recs {
                        info!(link = %link, recommended_by = count, "Recommendation");
                    }
                }
                Err(e) => warn!(url = url.as_str(), error = %e, "Recommendation fetch failed"),
            }
        }
    }

    info!("=== Import Complete ===");
    info!("Imported: {}", imported);
    info!("Skipped: {}", skipped);
    info!("Errors: {}", errors);
    info!("Tracked entries: {}", store.fetch_tracked_list().len());
    info!("Watch entries: {}", store.fetch_watch_list().len());
    info!("Filter entries: {}", store.fetch_filter_list().len());

    Ok(())
}
