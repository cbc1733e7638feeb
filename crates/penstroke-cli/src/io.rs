use std::fs;
use std::path::{Path, PathBuf};

use penstroke_api_types::DraftSchema;

use crate::client::CliError;

fn read_file(path: &Path) -> Result<String, CliError> {
    fs::read_to_string(path).map_err(|source| CliError::InputFile {
        path: path.display().to_string(),
        source,
    })
}

/// Inline value or file contents; the file wins when both are given.
pub fn read_opt_value(
    val: Option<String>,
    file: Option<PathBuf>,
) -> Result<Option<String>, CliError> {
    if let Some(path) = file {
        return read_file(&path).map(Some);
    }
    Ok(val)
}

/// Default schema, overlaid with the constraints from `file` when given.
pub fn load_schema(file: Option<&Path>) -> Result<DraftSchema, CliError> {
    let Some(path) = file else {
        return Ok(DraftSchema::default());
    };

    let raw = read_file(path)?;
    let overrides: DraftSchema = toml::from_str(&raw).map_err(|e| CliError::SchemaFile {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    let schema = DraftSchema::default().overlay(overrides);
    schema.check().map_err(|e| CliError::SchemaFile {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    Ok(schema)
}
