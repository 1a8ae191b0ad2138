use flate2::read::GzDecoder;
use jiff::civil::*;
use jiff::Zoned;
use log::{error, info};
use std::error::Error;
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use super::error_log::record_failure;
use super::lib_epss::Fetch;

/// Earliest day published on the EPSS site
pub const FIRST_DATE: Date = date(2021, 4, 14);

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// The file was already on disk, nothing was requested
    Skipped(PathBuf),
    Downloaded(PathBuf),
    /// Message of the failure, as written to the error log
    Failed(String),
}

impl Outcome {
    /// Local file for the day, if there is one after the attempt
    pub fn path(&self) -> Option<&Path> {
        match self {
            Outcome::Skipped(path) | Outcome::Downloaded(path) => Some(path.as_path()),
            Outcome::Failed(_) => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RunSummary {
    pub start: Date,
    pub end: Date,
    pub skipped: usize,
    pub downloaded: usize,
    pub failed: usize,
}

impl RunSummary {
    fn new(start: Date, end: Date) -> RunSummary {
        RunSummary {
            start,
            end,
            skipped: 0,
            downloaded: 0,
            failed: 0,
        }
    }

    fn add(&mut self, outcome: &Outcome) {
        match outcome {
            Outcome::Skipped(_) => self.skipped += 1,
            Outcome::Downloaded(_) => self.downloaded += 1,
            Outcome::Failed(_) => self.failed += 1,
        }
    }
}

/// Columns are kept as text, no schema is imposed on the file.
#[derive(Clone, Debug, PartialEq)]
pub struct ScoreTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl ScoreTable {
    /// Only the first `n` rows
    pub fn head(&self, n: usize) -> ScoreTable {
        ScoreTable {
            headers: self.headers.clone(),
            rows: self.rows.iter().take(n).cloned().collect(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct EpssScoresArchive {
    pub base_dir: String,
    pub error_log_path: String,
    pub base_url: String,
    /// Pause after each request, zero by default
    pub delay: Duration,
}

impl EpssScoresArchive {
    /// Path to the gz file for a given day
    pub fn filename(&self, date: Date) -> PathBuf {
        Path::new(&self.base_dir).join(format!(
            "epss_scores-{}.csv.gz",
            date.strftime("%Y-%m-%d")
        ))
    }

    pub fn url(&self, date: Date) -> String {
        format!(
            "{}/epss_scores-{}.csv.gz",
            self.base_url.trim_end_matches('/'),
            date.strftime("%Y-%m-%d")
        )
    }

    /// Download the file for one day, unless it is already there.
    ///
    /// A failed request is appended to the error log and reported as
    /// [`Outcome::Failed`].  Only filesystem errors are returned as `Err`.
    ///
    pub fn download_file(&self, fetcher: &impl Fetch, date: Date) -> Result<Outcome, Box<dyn Error>> {
        let url = self.url(date);
        let path = self.filename(date);
        fs::create_dir_all(&self.base_dir)?;

        if path.exists() {
            info!("{} already exists. Skipping download.", path.display());
            return Ok(Outcome::Skipped(path));
        }

        info!("Downloading {} -> {}", url, path.display());
        match fetcher.get(&url) {
            Ok(body) => {
                write_file(&path, &body)?;
                info!("Download complete: {}", path.display());
                Ok(Outcome::Downloaded(path))
            }
            Err(e) => {
                let message = e.to_string();
                error!("Failed to download {}: {}", url, message);
                record_failure(Path::new(&self.error_log_path), date, &message)?;
                Ok(Outcome::Failed(message))
            }
        }
    }

    /// Go through all the days between `start` and `end` inclusive, one at a
    /// time.  Failed days don't stop the run.
    pub fn download_days(
        &self,
        fetcher: &impl Fetch,
        start: Date,
        end: Date,
    ) -> Result<RunSummary, Box<dyn Error>> {
        let mut summary = RunSummary::new(start, end);
        let mut day = start;
        while day <= end {
            let outcome = self.download_file(fetcher, day)?;
            summary.add(&outcome);
            if let Some(pause) = self.pause_after(&outcome) {
                thread::sleep(pause);
            }
            if day == end {
                break;
            }
            day = day.tomorrow()?;
        }

        info!("Completed downloads from {} through {}.", start, end);
        info!(
            "{} downloaded, {} skipped, {} failed",
            summary.downloaded, summary.skipped, summary.failed
        );
        Ok(summary)
    }

    /// Only days that went to the network wait before the next one.
    fn pause_after(&self, outcome: &Outcome) -> Option<Duration> {
        match outcome {
            Outcome::Skipped(_) => None,
            _ if self.delay.is_zero() => None,
            _ => Some(self.delay),
        }
    }

    /// Make sure all the days since the first published one are on disk.
    pub fn run(&self, fetcher: &impl Fetch) -> Result<RunSummary, Box<dyn Error>> {
        let today = Zoned::now().date();
        self.download_days(fetcher, FIRST_DATE, today)
    }

    /// Decompressed lines of the file for this day, surrounding whitespace removed
    pub fn read_lines(&self, date: Date) -> Result<Vec<String>, Box<dyn Error>> {
        let file = File::open(self.filename(date))?;
        let reader = BufReader::new(GzDecoder::new(file));
        let mut out: Vec<String> = Vec::new();
        for line in reader.lines() {
            out.push(line?.trim().to_string());
        }
        Ok(out)
    }

    /// Read the gz file as a table.  Newer files start with a
    /// `#model_version:...` banner line, which is skipped.
    pub fn read_file(&self, date: Date) -> Result<ScoreTable, Box<dyn Error>> {
        let file = File::open(self.filename(date))?;
        let mut rdr = csv::ReaderBuilder::new()
            .flexible(true)
            .comment(Some(b'#'))
            .from_reader(GzDecoder::new(file));
        let headers: Vec<String> = rdr.headers()?.iter().map(|e| e.to_string()).collect();
        let mut rows: Vec<Vec<String>> = Vec::new();
        for record in rdr.records() {
            rows.push(record?.iter().map(|e| e.to_string()).collect());
        }
        Ok(ScoreTable { headers, rows })
    }
}

/// Write the body next to `path` and move it into place.  A killed process
/// leaves a .part file behind, never a truncated gz.
fn write_file(path: &Path, body: &[u8]) -> Result<(), Box<dyn Error>> {
    let mut part = OsString::from(path.as_os_str());
    part.push(".part");
    fs::write(&part, body)?;
    if let Err(e) = fs::rename(&part, path) {
        let _ = fs::remove_file(&part);
        return Err(e.into());
    }
    Ok(())
}
