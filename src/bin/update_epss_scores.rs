use std::{error::Error, time::Duration};

use clap::Parser;
use epss::db::{
    epss::{epss_scores_archive::FIRST_DATE, lib_epss::HttpFetcher},
    prod_db::ProdDb,
};
use jiff::{civil::Date, Zoned};
use log::info;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Folder where the daily gz files are kept
    #[arg(long, default_value = "data/raw")]
    base_dir: String,

    /// JSON file collecting the failed downloads
    #[arg(long, default_value = "temp_error.json")]
    error_file: String,

    /// First day to download, e.g. 2021-04-14
    #[arg(long)]
    start: Option<Date>,

    /// Last day to download, defaults to today
    #[arg(long)]
    end: Option<Date>,

    /// Pause between requests, in milliseconds
    #[arg(long, default_value_t = 0)]
    delay_ms: u64,
}

/// Get all the EPSS files published so far.  Days already on disk are skipped,
/// so this can run any time.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .init();

    let mut archive = ProdDb::epss_scores();
    archive.base_dir = args.base_dir;
    archive.error_log_path = args.error_file;
    archive.delay = Duration::from_millis(args.delay_ms);

    let fetcher = HttpFetcher::new()?;
    let summary = match (args.start, args.end) {
        (None, None) => archive.run(&fetcher)?,
        (start, end) => {
            let start = start.unwrap_or(FIRST_DATE);
            let end = end.unwrap_or_else(|| Zoned::now().date());
            archive.download_days(&fetcher, start, end)?
        }
    };
    if summary.failed > 0 {
        info!("Download errors were logged to: {}", archive.error_log_path);
    }

    Ok(())
}
