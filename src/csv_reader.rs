use anyhow::{bail, Context, Result};
use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use crate::data::{Dataset, Row, Value};

/// Read a headed CSV into a dataset, normalizing numeric-looking fields.
///
/// Short records are padded with nulls; blank lines are ignored. A header
/// with no data rows yields an empty dataset, not an error.
pub fn read_dataset<R: Read>(reader: R, id_column: &str) -> Result<Dataset> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let columns: Vec<String> = rdr
        .headers()
        .context("Failed to read CSV header row")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    if columns.is_empty() || columns.iter().all(|c| c.is_empty()) {
        bail!("CSV input has no header row");
    }

    {
        let mut seen = HashSet::new();
        if let Some(duplicate) = columns.iter().find(|c| !seen.insert(c.as_str())) {
            bail!("CSV header repeats column '{}'", duplicate);
        }
    }

    let mut rows = Vec::new();
    for (idx, result) in rdr.records().enumerate() {
        // +2: one for the header, one for 1-based line numbers
        let record = result.with_context(|| format!("Failed to read CSV record at line {}", idx + 2))?;
        if record.iter().all(|f| f.is_empty()) {
            continue;
        }

        let values: HashMap<String, Value> = columns
            .iter()
            .enumerate()
            .map(|(i, name)| {
                let value = record.get(i).map(Value::from_field).unwrap_or(Value::Null);
                (name.clone(), value)
            })
            .collect();
        rows.push(Row::new(values));
    }

    tracing::info!(rows = rows.len(), columns = columns.len(), "loaded CSV dataset");
    Ok(Dataset::new(columns, rows, id_column))
}

pub fn read_dataset_from_path(path: impl AsRef<Path>, id_column: &str) -> Result<Dataset> {
    let path = path.as_ref();
    let file = File::open(path).with_context(|| format!("Failed to open '{}'", path.display()))?;
    read_dataset(file, id_column)
}

pub fn read_dataset_from_stdin(id_column: &str) -> Result<Dataset> {
    read_dataset(io::stdin().lock(), id_column)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_normalizes_fields() {
        let csv = "CustomerID,Region,Tenure,Senior,Churn\nC1,North,12,true,Yes\nC2, South ,3.5,false,No\n";
        let data = read_dataset(csv.as_bytes(), "CustomerID").unwrap();
        assert_eq!(data.len(), 2);
        assert_eq!(data.columns()[1], "Region");
        assert_eq!(data.rows()[1].get("Region"), Some(&Value::from("South")));
        assert_eq!(data.rows()[1].number("Tenure"), Some(3.5));
        assert_eq!(data.rows()[0].get("Senior"), Some(&Value::Bool(true)));
        assert_eq!(data.classification().numeric, vec!["Tenure".to_string()]);
        assert_eq!(
            data.classification().categorical,
            vec!["Region".to_string(), "Senior".to_string(), "Churn".to_string()]
        );
    }

    #[test]
    fn test_short_records_pad_with_null() {
        let csv = "a,b,c\n1,2\n";
        let data = read_dataset(csv.as_bytes(), "id").unwrap();
        assert_eq!(data.rows()[0].get("c"), Some(&Value::Null));
    }

    #[test]
    fn test_header_only_is_empty_dataset() {
        let data = read_dataset("x,y\n".as_bytes(), "id").unwrap();
        assert!(data.is_empty());
        assert_eq!(data.columns().len(), 2);
        assert!(!data.classification().is_available());
    }

    #[test]
    fn test_duplicate_header_fails() {
        let err = read_dataset("Region,Churn,Region\nNorth,Yes,South\n".as_bytes(), "id").unwrap_err();
        assert!(err.to_string().contains("Region"));
    }

    #[test]
    fn test_no_header_fails() {
        assert!(read_dataset("".as_bytes(), "id").is_err());
    }
}
