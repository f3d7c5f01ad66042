use std::path::Path;

use anyhow::{bail, Context};

use super::model::{Dataset, Field, Record};
use crate::error::{Error, Result};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load the names dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`  – header `Nome,Cittadinanza,Sesso,Anno Nascita,Occorrenze`
///   (English headers `Name,CitizenshipGroup,Sex,BirthYear,Occurrences` work too)
/// * `.json` – `[{ "Nome": "Mario", "Cittadinanza": "Italiani", ... }, ...]`,
///   i.e. the same shape `/names` returns
///
/// Loading is all-or-nothing: any bad row fails the whole file.
pub fn load_file(path: &Path) -> Result<Dataset> {
    read_records(path)
        .map(Dataset::from_records)
        .map_err(|e| Error::DataUnavailable {
            path: path.to_path_buf(),
            reason: format!("{e:#}"),
        })
}

fn read_records(path: &Path) -> anyhow::Result<Vec<Record>> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "csv" => load_csv(path),
        "json" => load_json(path),
        other => bail!("Unsupported file extension: .{other}"),
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// Column positions of every [`Field`] in a CSV header.
struct ColumnIndex {
    name: usize,
    citizenship_group: usize,
    sex: usize,
    birth_year: usize,
    occurrences: usize,
}

impl ColumnIndex {
    fn from_headers(headers: &csv::StringRecord) -> anyhow::Result<Self> {
        let find = |field: Field| {
            headers
                .iter()
                .position(|h| field.matches(h.trim_start_matches('\u{feff}')))
                .with_context(|| format!("CSV missing '{}' column", field.label()))
        };

        Ok(ColumnIndex {
            name: find(Field::Name)?,
            citizenship_group: find(Field::CitizenshipGroup)?,
            sex: find(Field::Sex)?,
            birth_year: find(Field::BirthYear)?,
            occurrences: find(Field::Occurrences)?,
        })
    }
}

fn load_csv(path: &Path) -> anyhow::Result<Vec<Record>> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    let columns = ColumnIndex::from_headers(reader.headers().context("reading CSV headers")?)?;

    let mut records = Vec::new();

    // Line 1 is the header.
    for (row_no, result) in reader.records().enumerate() {
        let line = row_no + 2;
        let row = result.with_context(|| format!("CSV line {line}"))?;
        let cell = |idx: usize| row.get(idx).unwrap_or("");

        records.push(Record {
            name: cell(columns.name).to_string(),
            citizenship_group: cell(columns.citizenship_group).to_string(),
            sex: cell(columns.sex).to_string(),
            birth_year: parse_int(cell(columns.birth_year), line, Field::BirthYear)?,
            occurrences: parse_int(cell(columns.occurrences), line, Field::Occurrences)?,
        });
    }

    Ok(records)
}

fn parse_int<T: std::str::FromStr>(s: &str, line: usize, field: Field) -> anyhow::Result<T> {
    let tok = s.trim();
    match tok.parse::<T>() {
        Ok(v) => Ok(v),
        Err(_) => bail!("CSV line {line}, {}: '{tok}' is not a valid number", field.label()),
    }
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

fn load_json(path: &Path) -> anyhow::Result<Vec<Record>> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    serde_json::from_str(&text).context("parsing JSON records")
}
