use serde::Serialize;

use crate::data::{Row, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    Numeric,
    Categorical,
}

/// Numeric vs categorical split of a dataset's columns, in column order.
/// The identifier column never appears in either list.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Classification {
    pub numeric: Vec<String>,
    pub categorical: Vec<String>,
    #[serde(skip)]
    pub id_column: String,
    /// Whether a row was available to sample.
    #[serde(skip)]
    pub sampled: bool,
}

impl Classification {
    /// False for an empty dataset: there was no row to sample.
    pub fn is_available(&self) -> bool {
        self.sampled
    }

    pub fn kind_of(&self, column: &str) -> Option<ColumnKind> {
        if self.numeric.iter().any(|c| c == column) {
            Some(ColumnKind::Numeric)
        } else if self.categorical.iter().any(|c| c == column) {
            Some(ColumnKind::Categorical)
        } else {
            None
        }
    }

    pub fn is_identifier(&self, column: &str) -> bool {
        !self.id_column.is_empty() && self.id_column == column
    }
}

/// Label every column from the value it holds in `sample_row`.
///
/// Missing values and anything that is not a number land in the categorical
/// bucket. Without a sample row both buckets stay empty.
pub fn classify(columns: &[String], sample_row: Option<&Row>, id_column: &str) -> Classification {
    let mut classification = Classification {
        id_column: id_column.to_string(),
        ..Default::default()
    };

    let Some(row) = sample_row else {
        return classification;
    };
    classification.sampled = true;

    for column in columns.iter().filter(|c| c.as_str() != id_column) {
        match row.get(column) {
            Some(Value::Number(_)) => classification.numeric.push(column.clone()),
            _ => classification.categorical.push(column.clone()),
        }
    }

    tracing::debug!(
        numeric = classification.numeric.len(),
        categorical = classification.categorical.len(),
        "classified columns"
    );

    classification
}
