// src/main.rs
mod extractors;
mod ic3;
mod storage;
mod utils;

use clap::Parser;

use extractors::TableExtractor;
use ic3::models::REGION_NAMES;
use ic3::{Ic3Client, ReportRequest};
use storage::StorageManager;
use utils::AppError;

/// Command Line Interface for the IC3 annual-report scraper
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// First report year to scrape (inclusive)
    #[arg(long, default_value_t = 2016)]
    start_year: u32,

    /// Last report year to scrape (inclusive)
    #[arg(long, default_value_t = 2023)]
    end_year: u32,

    /// First 1-based region code to scrape (inclusive)
    #[arg(long, default_value_t = 1)]
    start_region: u32,

    /// Last 1-based region code to scrape (inclusive)
    #[arg(long, default_value_t = REGION_NAMES.len() as u32)]
    end_region: u32,

    /// Output directory for partitioned record sets
    #[arg(short, long, default_value = "./ic3_data")]
    output_dir: String,
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // 1. Setup Logging (reads RUST_LOG env var)
    utils::logging::setup_logging();

    // 2. Parse CLI Arguments
    let args = Args::parse();
    tracing::info!("Starting scrape for args: {:?}", args);

    if args.start_year > args.end_year {
        return Err(AppError::Config(format!(
            "start year {} is after end year {}",
            args.start_year, args.end_year
        )));
    }
    if args.start_region > args.end_region {
        return Err(AppError::Config(format!(
            "start region {} is after end region {}",
            args.start_region, args.end_region
        )));
    }

    // 3. Initialize storage
    let storage = StorageManager::new(&args.output_dir)?;

    // 4. Initialize the shared HTTP client and the extractor
    let client = Ic3Client::new()?;
    let extractor = TableExtractor::new();

    // 5. Sweep the (year, region) grid sequentially. Every iteration is
    //    independent: a failed fetch, a skipped page, or a save error is
    //    logged and the sweep moves on.
    let mut success_count = 0;
    let mut failure_count = 0;

    for year in args.start_year..=args.end_year {
        for region_code in args.start_region..=args.end_region {
            let request = ReportRequest::new(year, region_code);
            let url = request.url();
            tracing::info!(
                "Processing year {} region {} ({})",
                year,
                request.region_name(),
                url
            );

            // Fetch failures were already logged by the client.
            let Some(body) = client.fetch(&url).await else {
                failure_count += 1;
                continue;
            };

            // An empty result means the page failed its schema checks.
            let result = extractor.extract(&body, &url);
            if result.is_empty() {
                failure_count += 1;
                continue;
            }

            match storage.save_report(&result, year, region_code) {
                Ok(paths) => {
                    tracing::info!(
                        "Saved {} files for year {} region {}",
                        paths.len(),
                        year,
                        request.region_name()
                    );
                    success_count += 1;
                }
                Err(e) => {
                    tracing::error!(
                        "Failed to save for year: {}, region: {}. Error: {}",
                        year,
                        request.region_name(),
                        e
                    );
                    failure_count += 1;
                }
            }
        }
    }

    tracing::info!(
        "Scrape finished. Success: {}, Failures: {}",
        success_count,
        failure_count
    );

    Ok(())
}
