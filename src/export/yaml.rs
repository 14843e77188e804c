//! YAML export of the full data set

use std::io::Write;

use crate::error::{SpendwiseError, SpendwiseResult};
use crate::export::json::FullExport;
use crate::storage::Storage;

/// Export everything as YAML, preceded by a comment header
pub fn export_full_yaml<W: Write>(storage: &Storage, mut writer: W) -> SpendwiseResult<()> {
    let export = FullExport::from_storage(storage)?;

    let header = format!(
        "# Spendwise data export\n# Generated: {}\n# App version: {}\n\n",
        export.exported_at, export.app_version
    );
    writer
        .write_all(header.as_bytes())
        .map_err(|e| SpendwiseError::Export(e.to_string()))?;

    serde_yaml::to_writer(writer, &export).map_err(|e| SpendwiseError::Export(e.to_string()))
}

/// Parse and validate a YAML export
pub fn import_from_yaml(yaml: &str) -> SpendwiseResult<FullExport> {
    let export: FullExport =
        serde_yaml::from_str(yaml).map_err(|e| SpendwiseError::Import(e.to_string()))?;
    export.validate().map_err(SpendwiseError::Import)?;
    Ok(export)
}
