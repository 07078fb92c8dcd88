use super::ExportError;
use crate::engine::ProgressionOutcome;
use std::io::Write;
use std::path::Path;

/// Pretty-printed JSON for any serializable value
pub fn to_json_string<T: serde::Serialize>(data: &T) -> Result<String, ExportError> {
    serde_json::to_string_pretty(data).map_err(|e| ExportError::SerializationError(e.to_string()))
}

/// Export a regeneration outcome to JSON format
pub fn export_outcome<P: AsRef<Path>>(
    outcome: &ProgressionOutcome,
    output_path: P,
) -> Result<(), ExportError> {
    export_json(outcome, output_path)
}

/// Export any serializable data structure to JSON
pub fn export_json<T, P>(data: &T, output_path: P) -> Result<(), ExportError>
where
    T: serde::Serialize,
    P: AsRef<Path>,
{
    let json_data = to_json_string(data)?;

    let mut file = std::fs::File::create(output_path)?;
    file.write_all(json_data.as_bytes())?;

    Ok(())
}
