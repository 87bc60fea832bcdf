use std::path::Path;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::lead::Lead;
use crate::LeadsFileError;

/// Columns every uploaded table must carry in at least one record.
const REQUIRED_COLUMNS: &[&str] = &["company_name", "website"];

/// Spreadsheet-style headers and the field each one feeds.
const COLUMN_ALIASES: &[(&str, &str)] = &[
    ("Company Name", "company_name"),
    ("Full Address", "full_address"),
    ("Phone", "phone"),
    ("Website", "website"),
    ("Business Type", "business_type"),
];

/// Label used in errors for tables parsed from memory.
const INLINE_ORIGIN: &str = "<inline>";

/// On-disk encodings accepted for lead tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeadsFormat {
    Json,
    Yaml,
}

impl LeadsFormat {
    /// Picks the format from the file extension.
    ///
    /// # Errors
    ///
    /// Returns [`LeadsFileError::UnsupportedFormat`] for any other extension.
    pub fn from_path(path: &Path) -> Result<Self, LeadsFileError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("json") => Ok(Self::Json),
            Some("yaml" | "yml") => Ok(Self::Yaml),
            _ => Err(LeadsFileError::UnsupportedFormat {
                path: path.display().to_string(),
            }),
        }
    }
}

/// Load a lead table from a `.json`, `.yaml` or `.yml` file.
///
/// The document is either a bare list of records or a mapping with a
/// `leads` list. Records that are not mappings are skipped with a warning.
///
/// # Errors
///
/// Returns `LeadsFileError` if the file cannot be read, has an unknown
/// extension, is not a list of records, or no record carries a
/// `company_name` or `website` column.
pub fn load_leads(path: &Path) -> Result<Vec<Lead>, LeadsFileError> {
    let format = LeadsFormat::from_path(path)?;
    let content = std::fs::read_to_string(path).map_err(|e| LeadsFileError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    decode_table(&content, format, &path.display().to_string())
}

/// Parse a lead table already held in memory.
///
/// # Errors
///
/// Same as [`load_leads`], minus the I/O and extension checks.
pub fn parse_leads(content: &str, format: LeadsFormat) -> Result<Vec<Lead>, LeadsFileError> {
    decode_table(content, format, INLINE_ORIGIN)
}

fn decode_table(
    content: &str,
    format: LeadsFormat,
    origin: &str,
) -> Result<Vec<Lead>, LeadsFileError> {
    let parse_err = |reason: String| LeadsFileError::Parse {
        path: origin.to_owned(),
        reason,
    };

    let document: Value = match format {
        LeadsFormat::Json => serde_json::from_str(content).map_err(|e| parse_err(e.to_string()))?,
        LeadsFormat::Yaml => serde_yaml::from_str(content).map_err(|e| parse_err(e.to_string()))?,
    };
    let records = match document {
        Value::Array(records) => records,
        Value::Object(mut wrapper) => match wrapper.remove("leads") {
            Some(Value::Array(records)) => records,
            _ => {
                return Err(parse_err(
                    "expected a list of records or a mapping with a `leads` list".to_owned(),
                ))
            }
        },
        _ => return Err(parse_err("expected a list of records".to_owned())),
    };

    let total = records.len();
    let rows: Vec<Map<String, Value>> = records
        .into_iter()
        .enumerate()
        .filter_map(|(index, record)| match record {
            Value::Object(fields) => Some(canonicalize_columns(fields)),
            other => {
                tracing::warn!(
                    origin,
                    index,
                    kind = value_kind(&other),
                    "skipping record that is not a mapping"
                );
                None
            }
        })
        .collect();

    if total > 0 {
        let missing: Vec<&'static str> = REQUIRED_COLUMNS
            .iter()
            .copied()
            .filter(|column| !rows.iter().any(|row| row.contains_key(*column)))
            .collect();
        if !missing.is_empty() {
            return Err(LeadsFileError::MissingColumns {
                path: origin.to_owned(),
                columns: missing,
            });
        }
    }

    Ok(rows
        .into_iter()
        .enumerate()
        .filter_map(|(index, row)| match serde_json::from_value::<Lead>(Value::Object(row)) {
            Ok(lead) => Some(lead),
            Err(e) => {
                tracing::warn!(origin, index, error = %e, "skipping malformed record");
                None
            }
        })
        .collect())
}

/// Folds header aliases into their field names. When both spellings are
/// present the field name wins unless its value is blank.
fn canonicalize_columns(mut fields: Map<String, Value>) -> Map<String, Value> {
    for (alias, column) in COLUMN_ALIASES {
        let Some(aliased) = fields.remove(*alias) else {
            continue;
        };
        let keep_existing = fields.get(*column).is_some_and(|v| !is_blank(v));
        if !keep_existing {
            fields.insert((*column).to_owned(), aliased);
        }
    }
    fields
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "mapping",
    }
}

/// Write any table of rows as pretty-printed JSON.
///
/// # Errors
///
/// Returns [`LeadsFileError::Write`] on serialization or I/O failure.
pub fn write_leads_json<T: Serialize>(path: &Path, rows: &[T]) -> Result<(), LeadsFileError> {
    let to_write_err = |reason: String| LeadsFileError::Write {
        path: path.display().to_string(),
        reason,
    };
    let body = serde_json::to_string_pretty(rows).map_err(|e| to_write_err(e.to_string()))?;
    std::fs::write(path, body).map_err(|e| to_write_err(e.to_string()))
}
