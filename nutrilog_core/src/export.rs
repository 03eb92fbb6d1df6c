//! CSV export of the meal journal.
//!
//! Writes a fresh snapshot of the whole journal. The journal itself is
//! never touched; exporting twice simply rewrites the file.

use std::fs::File;
use std::path::Path;

use crate::{LogEntry, Result, Store};

/// A row in the CSV output
#[derive(Debug, serde::Serialize)]
struct CsvRow {
    id: u64,
    email: String,
    food: String,
    grams: f64,
    logged_at: String,
}

impl From<&LogEntry> for CsvRow {
    fn from(entry: &LogEntry) -> Self {
        CsvRow {
            id: entry.id,
            email: entry.email.clone(),
            food: entry.food.clone(),
            grams: entry.grams,
            logged_at: entry.logged_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}

/// Export every journal entry to `csv_path`, returning the row count.
///
/// An empty journal writes nothing and leaves no file behind. The CSV is
/// fsynced before returning so a crash cannot leave a half-written export
/// that looks complete.
pub fn export_meals_csv(store: &Store, csv_path: &Path) -> Result<usize> {
    let entries = store.all_meals()?;

    if entries.is_empty() {
        tracing::info!("meal journal is empty, nothing to export");
        return Ok(0);
    }

    if let Some(parent) = csv_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut writer = csv::Writer::from_writer(File::create(csv_path)?);
    for entry in &entries {
        writer.serialize(CsvRow::from(entry))?;
    }

    writer.flush()?;
    let file = writer
        .into_inner()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
    file.sync_all()?;

    tracing::info!(rows = entries.len(), path = %csv_path.display(), "journal exported");
    Ok(entries.len())
}
