//! In-memory row buffer flushed to a delimited file

use chrono::NaiveDateTime;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Errors raised while persisting a log.
///
/// The in-memory buffer is never touched on failure, so the caller can
/// retry the save later.
#[derive(Debug, thiserror::Error)]
pub enum LogError {
    #[error("Failed to create log directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write log file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A fixed-schema row that renders to one CSV line
pub trait CsvRecord {
    /// Header line, without trailing newline
    const HEADER: &'static str;

    /// Row rendered with fixed decimal precision, without trailing newline
    fn to_csv_line(&self) -> String;
}

/// Ordered, append-only buffer of rows of one schema
#[derive(Debug, Clone)]
pub struct EventLog<R> {
    rows: Vec<R>,
}

impl<R> Default for EventLog<R> {
    fn default() -> Self {
        Self { rows: Vec::new() }
    }
}

impl<R: CsvRecord> EventLog<R> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, row: R) {
        self.rows.push(row);
    }

    pub fn rows(&self) -> &[R] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Drop every row (new session)
    pub fn clear(&mut self) {
        self.rows.clear();
    }

    /// Full file contents: header, then one line per row
    pub fn render(&self) -> String {
        let mut out = String::with_capacity(R::HEADER.len() + 1 + self.rows.len() * 32);
        out.push_str(R::HEADER);
        out.push('\n');
        for row in &self.rows {
            out.push_str(&row.to_csv_line());
            out.push('\n');
        }
        out
    }

    /// Write the whole buffer to `dir/file_name`, creating `dir` if needed.
    ///
    /// Overwrites any existing file, so saving an unchanged buffer twice
    /// produces identical bytes.
    pub fn save(&self, dir: &Path, file_name: &str) -> Result<PathBuf, LogError> {
        fs::create_dir_all(dir).map_err(|source| LogError::CreateDir {
            path: dir.to_path_buf(),
            source,
        })?;

        let path = dir.join(file_name);
        fs::write(&path, self.render()).map_err(|source| LogError::Write {
            path: path.clone(),
            source,
        })?;

        info!("Saved {} rows to {}", self.rows.len(), path.display());
        Ok(path)
    }
}

/// `<prefix>_yyyyMMdd_HHmmss.csv`
pub fn stamped_file_name(prefix: &str, at: NaiveDateTime) -> String {
    format!("{}_{}.csv", prefix, at.format("%Y%m%d_%H%M%S"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    struct Pair(u32, f64);

    impl CsvRecord for Pair {
        const HEADER: &'static str = "id,value";

        fn to_csv_line(&self) -> String {
            format!("{},{:.3}", self.0, self.1)
        }
    }

    #[test]
    fn test_render_header_first() {
        let mut log = EventLog::new();
        assert_eq!(log.render(), "id,value\n");

        log.append(Pair(1, 0.5));
        log.append(Pair(2, 1.23456));
        assert_eq!(log.render(), "id,value\n1,0.500\n2,1.235\n");
    }

    #[test]
    fn test_save_creates_directory() {
        let temp_dir = tempfile::tempdir().unwrap();
        let nested = temp_dir.path().join("csv data").join("run1");

        let mut log = EventLog::new();
        log.append(Pair(7, 2.0));
        let path = log.save(&nested, "log.csv").unwrap();

        assert_eq!(path, nested.join("log.csv"));
        assert_eq!(fs::read_to_string(&path).unwrap(), "id,value\n7,2.000\n");
    }

    #[test]
    fn test_save_twice_is_byte_identical() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut log = EventLog::new();
        log.append(Pair(1, 0.25));

        let path = log.save(temp_dir.path(), "log.csv").unwrap();
        let first = fs::read(&path).unwrap();
        log.save(temp_dir.path(), "log.csv").unwrap();
        let second = fs::read(&path).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_failed_save_keeps_buffer() {
        let temp_dir = tempfile::tempdir().unwrap();
        let blocker = temp_dir.path().join("not-a-dir");
        fs::write(&blocker, "file").unwrap();

        let mut log = EventLog::new();
        log.append(Pair(1, 1.0));
        let err = log.save(&blocker.join("sub"), "log.csv").unwrap_err();
        assert!(matches!(err, LogError::CreateDir { .. }));
        assert_eq!(log.len(), 1);

        let path = log.save(temp_dir.path(), "log.csv").unwrap();
        assert!(fs::read_to_string(path).unwrap().ends_with("1,1.000\n"));
    }

    #[test]
    fn test_stamped_file_name() {
        let at = NaiveDate::from_ymd_opt(2024, 2, 3)
            .unwrap()
            .and_hms_opt(14, 5, 9)
            .unwrap();
        assert_eq!(stamped_file_name("MosaicGaze", at), "MosaicGaze_20240203_140509.csv");
    }
}
