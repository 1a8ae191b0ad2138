use std::error::Error;

use clap::Parser;
use epss::db::{epss::epss_scores_archive::ScoreTable, prod_db::ProdDb};
use jiff::civil::{date, Date};
use tabled::{builder::Builder, settings::Style};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Folder where the daily gz files are kept
    #[arg(long, default_value = "data/raw")]
    base_dir: String,

    /// Day of the file to look at
    #[arg(long, default_value_t = date(2021, 4, 15))]
    date: Date,

    /// How many rows of the table to show
    #[arg(long, default_value_t = 100)]
    rows: usize,
}

/// Make an ASCII table from the data
fn ascii_table(data: &ScoreTable) -> tabled::Table {
    let mut builder = Builder::new();
    let mut header = vec![String::new()];
    header.extend(data.headers.iter().cloned());
    builder.push_record(header);
    for (i, row) in data.rows.iter().enumerate() {
        let mut record = vec![i.to_string()];
        record.extend(row.iter().cloned());
        builder.push_record(record);
    }
    let mut table = builder.build();
    table.with(Style::sharp());
    table
}

/// Dump one downloaded file to the console
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .init();

    let mut archive = ProdDb::epss_scores();
    archive.base_dir = args.base_dir;

    for (i, line) in archive.read_lines(args.date)?.iter().enumerate() {
        println!("Line {}: {}", i + 1, line);
    }

    let data = archive.read_file(args.date)?;
    println!("\n[INFO] Table Loaded:");
    println!("{}", ascii_table(&data.head(args.rows)));
    println!("[{} rows x {} columns]", data.rows.len(), data.headers.len());

    Ok(())
}
