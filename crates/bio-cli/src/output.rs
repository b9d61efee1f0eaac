//! JSON dumps named `dataset_<kind>_<timestamp>.json`

use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{DateTime, Local};
use serde::Serialize;

/// File name for a dump of `kind` taken at `at`
pub fn dump_name(kind: &str, at: DateTime<Local>) -> String {
    format!("dataset_{}_{}.json", kind, at.format("%Y%m%d_%H%M%S"))
}

/// Serialize `value` into `directory`, creating it when missing
pub fn write_dump<T: Serialize>(
    directory: &Path,
    kind: &str,
    value: &T,
    pretty: bool,
) -> anyhow::Result<PathBuf> {
    std::fs::create_dir_all(directory)
        .with_context(|| format!("Failed to create output directory {}", directory.display()))?;

    let path = directory.join(dump_name(kind, Local::now()));
    let json = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
    .with_context(|| format!("Failed to serialize {} dump", kind))?;

    std::fs::write(&path, json)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    tracing::info!("Wrote {}", path.display());
    Ok(path)
}
