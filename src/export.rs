use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Local;
use tracing::info;

use crate::sink::Record;

/// Write records as a timestamped CSV under `output_dir`, creating the
/// directory if needed. Column order is the `Record` field order.
pub fn write_csv(records: &[Record], output_dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create {}", output_dir.display()))?;

    let path = output_dir.join(format!(
        "toolify_{}.csv",
        Local::now().format("%Y%m%d_%H%M%S")
    ));
    let file = fs::File::create(&path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    write_records(records, file)?;

    info!(records = records.len(), path = %path.display(), "CSV written");
    Ok(path)
}

fn write_records<W: Write>(records: &[Record], out: W) -> Result<()> {
    let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(out);
    // Explicit header so an empty run still yields a valid tabular file.
    writer.write_record(["name", "url", "category", "description", "created_at"])?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}
