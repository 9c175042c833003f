use crate::core::error::TrackerError;
use crate::core::history::{HISTORY_HEADER, HistoryStore, PriceHistory, PriceRecord};
use std::fs::File;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// History persisted as a flat CSV file, rewritten in full on every save.
pub struct CsvHistoryStore {
    path: PathBuf,
}

impl CsvHistoryStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn corrupt(&self, err: impl std::fmt::Display) -> TrackerError {
        TrackerError::HistoryCorrupt {
            path: self.path.clone(),
            reason: err.to_string(),
        }
    }

    fn io_error(&self, source: std::io::Error) -> TrackerError {
        TrackerError::Io {
            path: self.path.clone(),
            source,
        }
    }

    fn write_error(&self, err: csv::Error) -> TrackerError {
        if !err.is_io_error() {
            return self.corrupt(err);
        }
        match err.into_kind() {
            csv::ErrorKind::Io(source) => self.io_error(source),
            kind => self.corrupt(format!("{kind:?}")),
        }
    }
}

impl HistoryStore for CsvHistoryStore {
    fn load(&self) -> Result<PriceHistory, TrackerError> {
        let file = File::open(&self.path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => TrackerError::HistoryNotFound(self.path.clone()),
            _ => self.io_error(e),
        })?;

        // Columns other than the three known ones (e.g. a leading unnamed
        // index column) are ignored.
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(file);

        let mut records = Vec::new();
        for result in reader.deserialize::<PriceRecord>() {
            records.push(result.map_err(|e| self.corrupt(e))?);
        }
        debug!(path = %self.path.display(), rows = records.len(), "Loaded price history");

        let history = PriceHistory::from(records);
        let duplicates = history.duplicate_dates();
        if !duplicates.is_empty() {
            warn!(
                path = %self.path.display(),
                ?duplicates,
                "Price history contains repeated dates"
            );
        }
        Ok(history)
    }

    fn save(&self, history: &PriceHistory) -> Result<(), TrackerError> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_path(&self.path)
            .map_err(|e| self.write_error(e))?;

        writer
            .write_record(HISTORY_HEADER)
            .map_err(|e| self.write_error(e))?;
        for record in history.records() {
            writer.serialize(record).map_err(|e| self.write_error(e))?;
        }
        writer.flush().map_err(|e| self.io_error(e))?;

        debug!(path = %self.path.display(), rows = history.len(), "Saved price history");
        Ok(())
    }
}
