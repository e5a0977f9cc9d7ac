//! JSON export of scraped records.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use tracing::info;

use crate::error::Result;
use crate::record::SampleRecord;

/// Default export file name.
pub const DEFAULT_OUTPUT: &str = "all_math_ia_data.json";

/// Serialise `records` as a pretty-printed UTF-8 JSON array.
///
/// Non-ASCII text is written as-is rather than escaped.
///
/// # Errors
///
/// Returns [`crate::Error::Json`] if serialisation fails.
pub fn to_json(records: &[SampleRecord]) -> Result<String> {
    Ok(serde_json::to_string_pretty(records)?)
}

/// Write `records` to `path`, replacing any existing file.
///
/// Parent directories are created when missing.
///
/// # Errors
///
/// Returns [`crate::Error::Io`] on filesystem failures and
/// [`crate::Error::Json`] if serialisation fails.
pub fn write_json(path: &Path, records: &[SampleRecord]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let mut out = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut out, records)?;
    out.write_all(b"\n")?;
    out.flush()?;

    info!(path = %path.display(), records = records.len(), "wrote JSON export");
    Ok(())
}
