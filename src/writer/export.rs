//! CSV snapshots of the raw and cleaned emission rows

use anyhow::{Context, Result};
use csv::WriterBuilder;
use serde::Serialize;
use std::path::Path;
use tracing::info;

/// Column header shared by both snapshots
pub const CSV_HEADER: [&str; 3] = ["country", "year", "emission_value"];

/// Write `rows` to `path` under [`CSV_HEADER`], replacing any existing file.
/// Absent values become empty fields.
pub fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<usize> {
    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .with_context(|| format!("Failed to create {:?}", path))?;

    // Written by hand so an empty snapshot still has its header
    writer.write_record(CSV_HEADER)?;
    for row in rows {
        writer
            .serialize(row)
            .with_context(|| format!("Failed to write row to {:?}", path))?;
    }
    writer.flush().with_context(|| format!("Failed to flush {:?}", path))?;

    info!("wrote {} rows to {}", rows.len(), path.display());
    Ok(rows.len())
}
