use std::time::Duration;

use crate::db::epss::{epss_scores_archive::EpssScoresArchive, lib_epss::EPSS_URL};

pub struct ProdDb {}

impl ProdDb {
    /// Relative to the current working directory
    pub fn epss_scores() -> EpssScoresArchive {
        EpssScoresArchive {
            base_dir: "data/raw".to_string(),
            error_log_path: "temp_error.json".to_string(),
            base_url: EPSS_URL.to_string(),
            delay: Duration::ZERO,
        }
    }
}
