pub mod epss_scores_archive;
pub mod error_log;
pub mod lib_epss;
