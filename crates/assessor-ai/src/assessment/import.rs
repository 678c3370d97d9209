//! Load property records from assessor CSV exports.

use std::io::Read;
use std::path::Path;

use serde_json::{Map, Number, Value};

use super::property::PropertyRecord;

/// Columns that are always kept as text, even when the cell looks numeric.
const TEXT_COLUMNS: [&str; 9] = [
    "parcel_id",
    "property_address",
    "property_city",
    "property_state",
    "property_zip",
    "property_class",
    "property_class_code",
    "valuation_method",
    "income_approach",
];

#[derive(Debug)]
pub enum ImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    Record {
        line: u64,
        source: serde_json::Error,
    },
}

impl std::fmt::Display for ImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImportError::Io(err) => write!(f, "failed to read property export: {}", err),
            ImportError::Csv(err) => write!(f, "invalid property CSV data: {}", err),
            ImportError::Record { line, source } => {
                write!(f, "could not build property record on line {}: {}", line, source)
            }
        }
    }
}

impl std::error::Error for ImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ImportError::Io(err) => Some(err),
            ImportError::Csv(err) => Some(err),
            ImportError::Record { source, .. } => Some(source),
        }
    }
}

impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

pub fn records_from_path<P: AsRef<Path>>(path: P) -> Result<Vec<PropertyRecord>, ImportError> {
    let file = std::fs::File::open(path)?;
    records_from_reader(file)
}

/// Parse a CSV export whose header row names [`PropertyRecord`] fields.
///
/// Blank cells are treated as missing fields. Unknown columns are ignored.
pub fn records_from_reader<R: Read>(reader: R) -> Result<Vec<PropertyRecord>, ImportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let headers = csv_reader.headers()?.clone();
    let mut records = Vec::new();

    for row in csv_reader.records() {
        let row = row?;
        let line = row.position().map(|position| position.line()).unwrap_or(0);

        let mut fields = Map::new();
        for (header, cell) in headers.iter().zip(row.iter()) {
            if cell.is_empty() {
                continue;
            }
            fields.insert(header.to_string(), cell_value(header, cell));
        }

        let record = serde_json::from_value(Value::Object(fields))
            .map_err(|source| ImportError::Record { line, source })?;
        records.push(record);
    }

    Ok(records)
}

fn cell_value(header: &str, cell: &str) -> Value {
    if TEXT_COLUMNS.contains(&header) {
        return Value::String(cell.to_string());
    }
    if let Ok(integer) = cell.parse::<i64>() {
        return Value::Number(integer.into());
    }
    cell.parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Value::Number)
        .unwrap_or_else(|| Value::String(cell.to_string()))
}
