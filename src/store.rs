use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use tracing::info;

use crate::models::ExtractedRecord;

/// Write `records` as a compact JSON array, replacing whatever `output`
/// held before. The write is not atomic.
pub fn store_data(records: &[ExtractedRecord], output: &Path) -> io::Result<()> {
    let mut writer = BufWriter::new(File::create(output)?);
    serde_json::to_writer(&mut writer, records)?;
    writer.flush()?;

    info!(path = %output.display(), count = records.len(), "data stored");
    Ok(())
}
