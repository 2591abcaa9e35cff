//! Checkpoint tables persisted between pipeline stages.
//!
//! A checkpoint is a CSV file with a header row. Readers check the header for
//! the columns they need before touching any row; writers always produce a
//! complete new file and move it into place, so a crash never leaves a torn
//! table behind.

use std::fs;
use std::io::Write;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::{PipelineError, Result};

/// Read every row of a checkpoint, requiring `required` columns in the header.
pub fn read_rows<T: DeserializeOwned>(path: &Path, required: &[&str]) -> Result<Vec<T>> {
    if !path.exists() {
        return Err(PipelineError::MissingInput(path.to_path_buf()));
    }

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .from_path(path)?;
    let headers = reader.headers()?.clone();

    let missing: Vec<&str> = required
        .iter()
        .copied()
        .filter(|col| !headers.iter().any(|h| h == *col))
        .collect();
    if !missing.is_empty() {
        return Err(PipelineError::Checkpoint(format!(
            "{} is missing required columns: {}",
            path.display(),
            missing.join(", ")
        )));
    }

    let mut rows = Vec::new();
    for (index, result) in reader.deserialize().enumerate() {
        let row = result.map_err(|e| {
            PipelineError::Checkpoint(format!("{} row {}: {}", path.display(), index + 1, e))
        })?;
        rows.push(row);
    }

    debug!("Read {} rows from {}", rows.len(), path.display());
    Ok(rows)
}

/// Write `rows` under `columns` as a brand new file at `path`.
///
/// The header is written even for an empty table so the next stage can still
/// validate it.
pub fn write_rows<T: Serialize>(path: &Path, columns: &[&str], rows: &[T]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;

    let mut tmp = NamedTempFile::new_in(dir)?;
    {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(tmp.as_file_mut());
        writer.write_record(columns)?;
        for row in rows {
            writer.serialize(row)?;
        }
        writer.flush()?;
    }
    tmp.as_file_mut().flush()?;
    tmp.persist(path).map_err(|e| PipelineError::Io(e.error))?;

    debug!("Wrote {} rows to {}", rows.len(), path.display());
    Ok(())
}
