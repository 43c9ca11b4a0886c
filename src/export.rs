use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::domain::{PipelineError, ResolvedMetadata};

/// Write the resolved records as an indented UTF-8 JSON array
pub fn write_metadata_json(path: &Path, records: &[ResolvedMetadata]) -> Result<(), PipelineError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|e| PipelineError::io(parent, e))?;
    }

    let file = File::create(path).map_err(|e| PipelineError::io(path, e))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, records)?;
    writer
        .write_all(b"\n")
        .and_then(|_| writer.flush())
        .map_err(|e| PipelineError::io(path, e))
}
