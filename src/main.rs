use company_panel_lib::{input_loader, logger};
use company_panel_lib::{Scraper, ScraperConfig, SearchEngine};

use clap::Parser;
use log::{info, error};
use std::error::Error;
use std::path::PathBuf;

const DEFAULT_COMPANIES: [&str; 5] = ["Amazon", "Kroger", "Walgreens", "Rockstar", "Ebay"];

#[derive(Parser, Debug)]
#[command(name = "company-panel-scraper")]
#[command(about = "Scrapes search-engine knowledge panels for a list of companies into a CSV file")]
#[command(version)]
struct Args {
    /// Company names to look up
    companies: Vec<String>,

    /// CSV or Excel file with a "Company" column
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Output CSV file (overwritten)
    #[arg(short, long, default_value = "company_details.csv")]
    output: PathBuf,

    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Search URL template containing {query}
    #[arg(long)]
    endpoint: Option<String>,

    /// Attempts per company before skipping it
    #[arg(long)]
    max_attempts: Option<u32>,

    /// Per-request timeout in seconds
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Initial retry backoff in milliseconds (0 disables)
    #[arg(long)]
    backoff_ms: Option<u64>,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn scraper_config(&self) -> Result<ScraperConfig, Box<dyn Error>> {
        let mut config = match &self.config {
            Some(path) => ScraperConfig::from_file(path)?,
            None => ScraperConfig::default(),
        };
        if let Some(endpoint) = &self.endpoint {
            config = config.with_endpoint(endpoint.clone());
        }
        if let Some(attempts) = self.max_attempts {
            config = config.with_max_attempts(attempts);
        }
        if let Some(secs) = self.timeout_secs {
            config = config.with_request_timeout_secs(secs);
        }
        if let Some(ms) = self.backoff_ms {
            config = config.with_backoff_base_ms(ms);
        }
        config.validate()?;
        Ok(config)
    }

    fn company_names(&self) -> Result<Vec<String>, Box<dyn Error>> {
        let mut names = self.companies.clone();
        if let Some(input) = &self.input {
            names.extend(input_loader::load_company_names(input)?);
        }
        if names.is_empty() {
            info!("No companies given, using the default batch.");
            names = DEFAULT_COMPANIES.iter().map(|s| s.to_string()).collect();
        }
        Ok(names)
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    logger::init(args.verbose);
    info!("Starting Company Panel Scraper...");

    let config = args.scraper_config()?;
    let names = args.company_names()?;
    info!("{} companies queued, output: {:?}", names.len(), args.output);

    let scraper = Scraper::new(SearchEngine::new(config)?);
    match scraper.run(&names, &args.output) {
        Ok(report) => {
            for company in report.skipped() {
                info!("Skipped: {}", company);
            }
            info!("Done. {} rows written to {:?}", report.records.len(), args.output);
            Ok(())
        }
        Err(e) => {
            error!("Could not write {:?}: {}", args.output, e);
            Err(e.into())
        }
    }
}
