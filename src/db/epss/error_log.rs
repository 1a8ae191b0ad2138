use jiff::civil::Date;
use log::warn;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fs;
use std::path::Path;

/// One failed download, as stored in the error log
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorRecord {
    pub date: Date,
    pub error: String,
}

/// Load the error log.  A missing file is an empty log, and so is a file that
/// can't be read or parsed: its content is dropped.
pub fn read_errors(path: &Path) -> Vec<ErrorRecord> {
    if !path.exists() {
        return Vec::new();
    }
    let parsed = fs::read_to_string(path)
        .map_err(|e| e.to_string())
        .and_then(|s| serde_json::from_str::<Vec<ErrorRecord>>(&s).map_err(|e| e.to_string()));
    match parsed {
        Ok(errors) => errors,
        Err(e) => {
            warn!(
                "Error log {} is corrupt, starting a new one: {}",
                path.display(),
                e
            );
            Vec::new()
        }
    }
}

/// Append a failure for this date.  The whole log is rewritten every time.
pub fn record_failure(path: &Path, date: Date, message: &str) -> Result<(), Box<dyn Error>> {
    let mut errors = read_errors(path);
    errors.push(ErrorRecord {
        date,
        error: message.to_string(),
    });

    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            fs::create_dir_all(dir)?;
        }
    }
    fs::write(path, serde_json::to_string_pretty(&errors)?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use jiff::civil::date;
    use std::error::Error;

    use super::*;

    #[test]
    fn missing_log_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read_errors(&dir.path().join("errors.json")).is_empty());
    }

    #[test]
    fn records_in_call_order() -> Result<(), Box<dyn Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("errors.json");
        let inputs = [
            (date(2021, 4, 20), "404 Not Found"),
            (date(2021, 4, 14), "timed out"),
            (date(2021, 4, 20), "404 Not Found"),
        ];
        for (day, message) in inputs {
            record_failure(&path, day, message)?;
        }

        let errors = read_errors(&path);
        assert_eq!(errors.len(), 3);
        for (record, (day, message)) in errors.iter().zip(inputs) {
            assert_eq!(record.date, day);
            assert_eq!(record.error, message);
        }
        Ok(())
    }

    #[test]
    fn pretty_printed_json() -> Result<(), Box<dyn Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("errors.json");
        record_failure(&path, date(2022, 1, 3), "boom")?;
        let content = fs::read_to_string(&path)?;
        assert_eq!(
            content,
            "[\n  {\n    \"date\": \"2022-01-03\",\n    \"error\": \"boom\"\n  }\n]"
        );
        Ok(())
    }

    #[test]
    fn corrupt_log_is_discarded() -> Result<(), Box<dyn Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("errors.json");
        fs::write(&path, "[{\"date\": \"2021-04-14\", \"error\": ")?;
        record_failure(&path, date(2021, 4, 15), "503 Service Unavailable")?;

        let errors = read_errors(&path);
        assert_eq!(
            errors,
            vec![ErrorRecord {
                date: date(2021, 4, 15),
                error: "503 Service Unavailable".to_string(),
            }]
        );
        Ok(())
    }

    #[test]
    fn non_array_log_is_discarded() -> Result<(), Box<dyn Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("errors.json");
        fs::write(&path, "{}")?;
        assert!(read_errors(&path).is_empty());

        record_failure(&path, date(2021, 4, 16), "boom")?;
        let errors = read_errors(&path);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].date, date(2021, 4, 16));
        Ok(())
    }

    #[test]
    fn creates_parent_dir() -> Result<(), Box<dyn Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("logs").join("errors.json");
        record_failure(&path, date(2021, 4, 15), "boom")?;
        assert_eq!(read_errors(&path).len(), 1);
        Ok(())
    }
}
