use std::time::Duration;

use reqwest::{
    blocking::Client,
    header::{ACCEPT, USER_AGENT},
    StatusCode,
};
use thiserror::Error;

/// Host serving one gzipped CSV file per day
pub const EPSS_URL: &str = "https://epss.cyentia.com";

pub const TIMEOUT_SECS: u64 = 60;

#[derive(Error, Debug)]
pub enum DownloadError {
    #[error("{status} for url: {url}")]
    Status { status: StatusCode, url: String },
    #[error("{0}")]
    Transport(#[from] reqwest::Error),
}

/// Something that can GET a url and hand back the full body.
pub trait Fetch {
    fn get(&self, url: &str) -> Result<Vec<u8>, DownloadError>;
}

pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self, DownloadError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(TIMEOUT_SECS))
            .build()?;
        Ok(HttpFetcher { client })
    }
}

impl Fetch for HttpFetcher {
    /// One request, no retries.  Anything other than a 2xx is an error.
    fn get(&self, url: &str) -> Result<Vec<u8>, DownloadError> {
        let response = self
            .client
            .get(url)
            .header(USER_AGENT, "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36")
            .header(ACCEPT, "application/gzip, */*")
            .send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(DownloadError::Status {
                status,
                url: url.to_string(),
            });
        }
        Ok(response.bytes()?.to_vec())
    }
}

#[cfg(test)]
mod tests {

    use super::*;
    use std::error::Error;

    #[test]
    fn status_error_message() {
        let e = DownloadError::Status {
            status: StatusCode::NOT_FOUND,
            url: format!("{}/epss_scores-2021-04-13.csv.gz", EPSS_URL),
        };
        assert_eq!(
            e.to_string(),
            "404 Not Found for url: https://epss.cyentia.com/epss_scores-2021-04-13.csv.gz"
        );
    }

    #[ignore]
    #[test]
    fn get_one_day() -> Result<(), Box<dyn Error>> {
        let fetcher = HttpFetcher::new()?;
        let body = fetcher.get(&format!("{}/epss_scores-2021-04-15.csv.gz", EPSS_URL))?;
        // gzip magic bytes
        assert_eq!(&body[..2], &[0x1f, 0x8b]);
        Ok(())
    }
}
