use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Instant;

use anyhow::{Context, Result};
use souk_model::{import_csv, CsvOptions, RecordTable};

/// Dataset file expected next to the dashboard binary.
pub const DATA_FILE: &str = "transactions.csv";

static TABLE: OnceLock<RecordTable> = OnceLock::new();

/// Path of the dataset, derived from the executable's own location so the
/// dashboard stays independent of the invocation directory.
pub fn data_file_path() -> Result<PathBuf> {
    let exe = std::env::current_exe().context("locate the dashboard executable")?;
    let dir = exe
        .parent()
        .context("executable has no parent directory")?;
    Ok(dir.join(DATA_FILE))
}

/// The process-wide record table, read from disk on first use.
///
/// Later calls return the cached instance. A missing or unparsable dataset
/// is fatal: the dashboard has no alternate data source.
pub fn load_table() -> Result<&'static RecordTable> {
    if let Some(table) = TABLE.get() {
        return Ok(table);
    }

    let path = data_file_path()?;
    let table = load_from(&path)?;
    Ok(TABLE.get_or_init(|| table))
}

fn load_from(path: &Path) -> Result<RecordTable> {
    let started = Instant::now();
    let file =
        File::open(path).with_context(|| format!("open dataset {}", path.display()))?;
    let table = import_csv(BufReader::new(file), CsvOptions::default())
        .with_context(|| format!("parse dataset {}", path.display()))?;

    tracing::info!(
        rows = table.row_count(),
        columns = table.column_count(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "dataset loaded"
    );
    Ok(table)
}
