//! CSV input: one [`Record`] per row, keyed by the header row.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use tracing::{debug, instrument};

use deckgen_shared::{DeckgenError, Record, Result};

/// A parsed CSV file.
#[derive(Debug, Clone, Default)]
pub struct Table {
    /// Header row, trimmed, in file order.
    pub headers: Vec<String>,
    /// Data rows in file order.
    pub records: Vec<Record>,
}

impl Table {
    /// Fail with a validation error listing every required column that is missing.
    pub fn require_columns(&self, columns: &[&str]) -> Result<()> {
        let missing: Vec<&str> = columns
            .iter()
            .copied()
            .filter(|c| !self.headers.iter().any(|h| h == c))
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(DeckgenError::validation(format!(
                "missing required column(s): {}",
                missing.join(", ")
            )))
        }
    }
}

/// Read a CSV file with a header row.
///
/// A missing or unreadable file is an I/O error; a malformed row is a parse error.
#[instrument(skip_all, fields(path = %path.display()))]
pub fn read_table(path: &Path) -> Result<Table> {
    let file = File::open(path).map_err(|e| DeckgenError::io(path, e))?;
    let table = read_table_from(file)?;
    debug!(
        rows = table.records.len(),
        columns = table.headers.len(),
        "CSV loaded"
    );
    Ok(table)
}

/// Read CSV data from any reader.
pub fn read_table_from<R: Read>(reader: R) -> Result<Table> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers: Vec<String> = rdr
        .headers()
        .map_err(|e| DeckgenError::parse(format!("invalid CSV header: {e}")))?
        .iter()
        .map(str::to_string)
        .collect();

    let mut records = Vec::new();
    for row in rdr.records() {
        let row = row.map_err(|e| DeckgenError::parse(format!("invalid CSV row: {e}")))?;
        records.push(
            headers
                .iter()
                .map(String::as_str)
                .zip(row.iter())
                .collect::<Record>(),
        );
    }

    Ok(Table { headers, records })
}
