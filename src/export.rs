//! Catalog sink: CSV export of the record sequence.
//!
//! One row per record in discovery order, header written once from the
//! record's field order. Writing to an existing output path fully
//! replaces its contents.

use anyhow::{Context, Result};
use std::path::Path;

use crate::models::DocumentRecord;

/// Fixed column schema, matching `DocumentRecord` field order.
const CSV_COLUMNS: [&str; 9] = [
    "id",
    "file_path",
    "file_name",
    "file_type",
    "file_size",
    "content",
    "archive_path",
    "created_date",
    "content_hash",
];

pub fn export_csv(records: &[DocumentRecord], output: &Path) -> Result<()> {
    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
    }

    // Header is written explicitly so an empty run still produces it.
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(output)
        .with_context(|| format!("Failed to open {} for writing", output.display()))?;
    writer
        .write_record(CSV_COLUMNS)
        .context("Failed to write CSV header")?;
    for record in records {
        writer
            .serialize(record)
            .with_context(|| format!("Failed to write record {}", record.id))?;
    }
    writer.flush().context("Failed to flush CSV output")?;
    Ok(())
}
